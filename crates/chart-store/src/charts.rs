//! Chart operations: save, edit, soft delete, favorites, category tags

use charts_shared::{now_iso, Chart, ChartsError, ChartsResult, StoredChart};
use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;
use wasm_storage::KeyValueStorage;

use crate::{unique_id, ChartsStore};

/// Listing filter for `ChartsStore::list_charts`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartQuery {
    pub include_deleted: bool,
    /// Newest `createdAt` first instead of stored order
    pub sort: bool,
    pub favorites_only: bool,
    pub category: Option<String>,
}

impl ChartQuery {
    pub fn sorted() -> Self {
        Self {
            sort: true,
            ..Self::default()
        }
    }

    pub fn in_category(category_id: impl Into<String>) -> Self {
        Self {
            category: Some(category_id.into()),
            ..Self::default()
        }
    }
}

impl<S: KeyValueStorage> ChartsStore<S> {
    pub fn list_charts(&self, query: &ChartQuery) -> Vec<StoredChart> {
        let mut charts: Vec<StoredChart> = self
            .storage
            .load_charts()
            .into_iter()
            .filter(|c| query.include_deleted || !c.deleted)
            .filter(|c| !query.favorites_only || c.favorite)
            .filter(|c| match &query.category {
                Some(category) => c.has_category(category),
                None => true,
            })
            .collect();

        if query.sort {
            charts.sort_by(|a, b| compare_created_desc(&a.chart.created_at, &b.chart.created_at));
        }
        charts
    }

    pub fn get_chart(&self, id: &str) -> ChartsResult<StoredChart> {
        self.storage
            .load_charts()
            .into_iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| ChartsError::chart_not_found(id))
    }

    /// Store a newly created chart at the front of the list. Saving an id
    /// that already exists leaves storage untouched and returns the stored
    /// chart.
    pub fn save_chart(&self, chart: Chart) -> ChartsResult<StoredChart> {
        chart
            .validate()
            .map_err(ChartsError::validation)?;

        let _guard = self.lock();
        let mut charts = self.storage.load_charts();
        if let Some(existing) = charts.iter().find(|c| c.id() == chart.id) {
            log::debug!("Chart {} already stored, not saving again", chart.id);
            return Ok(existing.clone());
        }

        let stored = StoredChart::new(chart);
        charts.insert(0, stored.clone());
        self.storage.save_charts(&charts)?;
        log::debug!("Saved chart {}", stored.id());
        Ok(stored)
    }

    /// Replace a chart's authored definition, keeping its favorite,
    /// deleted and category flags, and move it to the front
    pub fn update_chart(&self, chart: Chart) -> ChartsResult<StoredChart> {
        chart
            .validate()
            .map_err(ChartsError::validation)?;

        let _guard = self.lock();
        let mut charts = self.storage.load_charts();
        let mut stored = match charts.iter().position(|c| c.id() == chart.id) {
            Some(pos) => {
                let mut existing = charts.remove(pos);
                existing.chart = chart;
                existing
            }
            None => StoredChart::new(chart),
        };
        stored.touch();

        charts.insert(0, stored.clone());
        self.storage.save_charts(&charts)?;
        Ok(stored)
    }

    /// Soft delete: the chart stays in storage flagged as deleted
    pub fn delete_chart(&self, id: &str) -> ChartsResult<()> {
        self.modify_chart(id, |chart| {
            chart.deleted = true;
        })?;
        log::debug!("Chart {id} marked as deleted");
        Ok(())
    }

    /// Flip the favorite flag, returning the new value
    pub fn toggle_favorite(&self, id: &str) -> ChartsResult<bool> {
        self.modify_chart(id, |chart| {
            chart.favorite = !chart.favorite;
            chart.favorite
        })
    }

    /// Attach or detach a category, returning whether it is now attached.
    /// Only attaching requires the category to exist, so a dangling
    /// reference can always be removed.
    pub fn toggle_chart_category(&self, chart_id: &str, category_id: &str) -> ChartsResult<bool> {
        let _guard = self.lock();
        let mut charts = self.storage.load_charts();
        let chart = charts
            .iter_mut()
            .find(|c| c.id() == chart_id)
            .ok_or_else(|| ChartsError::chart_not_found(chart_id))?;

        let attached = if chart.remove_category(category_id) {
            false
        } else {
            let known = self
                .storage
                .load_categories()
                .iter()
                .any(|c| c.id == category_id);
            if !known {
                return Err(ChartsError::category_not_found(category_id));
            }
            chart.add_category(category_id)
        };
        chart.touch();

        self.storage.save_charts(&charts)?;
        Ok(attached)
    }

    /// Copy a chart under a fresh id, placed at the front
    pub fn duplicate_chart(&self, id: &str) -> ChartsResult<StoredChart> {
        let _guard = self.lock();
        let mut charts = self.storage.load_charts();
        let source = charts
            .iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| ChartsError::chart_not_found(id))?;

        let mut copy = source.clone();
        copy.chart.id = unique_id(|candidate| charts.iter().any(|c| c.id() == candidate));
        copy.chart.title = format!("{} (Copy)", source.title());
        copy.chart.created_at = now_iso();
        copy.chart.updated_at = copy.chart.created_at.clone();
        copy.favorite = false;
        copy.deleted = false;

        charts.insert(0, copy.clone());
        self.storage.save_charts(&charts)?;
        Ok(copy)
    }

    fn modify_chart<T>(&self, id: &str, apply: impl FnOnce(&mut StoredChart) -> T) -> ChartsResult<T> {
        let _guard = self.lock();
        let mut charts = self.storage.load_charts();
        let chart = charts
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| ChartsError::chart_not_found(id))?;

        let outcome = apply(chart);
        chart.touch();

        self.storage.save_charts(&charts)?;
        Ok(outcome)
    }
}

/// Newest first. Unparseable timestamps sort after parseable ones.
fn compare_created_desc(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| DateTime::<FixedOffset>::parse_from_rfc3339(s).ok();
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    }
}
