//! Category manager
//!
//! Categories are referenced from charts by id only. Referential integrity
//! is kept here: deleting a category strips it from every chart, soft
//! deleted ones included.

use charts_shared::{now_iso, ChartCategory, ChartsError, ChartsResult};
use wasm_storage::KeyValueStorage;

use crate::{unique_id, ChartsStore};

impl<S: KeyValueStorage> ChartsStore<S> {
    /// Categories ordered by name, case-insensitively
    pub fn list_categories(&self) -> Vec<ChartCategory> {
        let mut categories = self.storage.load_categories();
        categories.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        categories
    }

    pub fn create_category(&self, name: &str) -> ChartsResult<ChartCategory> {
        let name = validate_name(name)?;

        let _guard = self.lock();
        let mut categories = self.storage.load_categories();
        self.ensure_name_available(&categories, name, None)?;

        let id = unique_id(|candidate| categories.iter().any(|c| c.id == candidate));
        let category = ChartCategory::new(id, name);
        categories.push(category.clone());
        self.storage.save_categories(&categories)?;

        log::debug!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    pub fn rename_category(&self, id: &str, new_name: &str) -> ChartsResult<ChartCategory> {
        let _guard = self.lock();
        let mut categories = self.storage.load_categories();
        let index = categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ChartsError::category_not_found(id))?;

        let name = validate_name(new_name)?;
        self.ensure_name_available(&categories, name, Some(id))?;

        let category = &mut categories[index];
        category.name = name.to_string();
        category.updated_at = now_iso();
        let renamed = category.clone();

        self.storage.save_categories(&categories)?;
        Ok(renamed)
    }

    /// Remove a category and detach it from every chart. Returns the
    /// number of charts that referenced it.
    pub fn delete_category(&self, id: &str) -> ChartsResult<usize> {
        let _guard = self.lock();
        let mut categories = self.storage.load_categories();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Err(ChartsError::category_not_found(id));
        }

        let mut charts = self.storage.load_charts();
        let mut detached = 0;
        for chart in charts.iter_mut() {
            if chart.remove_category(id) {
                chart.touch();
                detached += 1;
            }
        }

        self.storage.save_all(&charts, &categories)?;
        log::debug!("Deleted category {id}, detached from {detached} charts");
        Ok(detached)
    }

    fn ensure_name_available(
        &self,
        categories: &[ChartCategory],
        name: &str,
        except_id: Option<&str>,
    ) -> ChartsResult<()> {
        let policy = self.name_match();
        let clash = categories
            .iter()
            .filter(|c| Some(c.id.as_str()) != except_id)
            .any(|c| policy.matches(&c.name, name));

        if clash {
            return Err(ChartsError::validation_field(
                "name",
                format!("A category named '{name}' already exists"),
            ));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> ChartsResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ChartsError::validation_field(
            "name",
            "Category name cannot be empty",
        ));
    }
    Ok(trimmed)
}
