//! Backup import: validation, preview and conflict resolution
//!
//! Validation is fail-closed: one malformed chart or category rejects the
//! whole document, and the error names the offending entry.
//!
//! Categories are reconciled before charts. An imported category whose
//! trimmed name matches an existing one (under the configured
//! `NameMatch` policy) is folded into it, and charts referencing the
//! imported id are rewritten to the existing id. An imported category
//! whose id is taken by a differently named category gets a fresh id;
//! the existing category is never renamed.

use charts_config::NameMatch;
use charts_shared::{
    now_iso, ChartCategory, ChartsBackupFile, ChartsError, ChartsResult, ConflictStrategy,
    ImportConflict, ImportPreview, ImportResult, StoredChart, BACKUP_TYPE,
};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use wasm_storage::KeyValueStorage;

use crate::storage::json_type_name;
use crate::{unique_id, ChartsStore};

impl<S: KeyValueStorage> ChartsStore<S> {
    /// Validate `raw` as a backup and diff it against current storage.
    /// Read-only.
    pub fn preview_import(&self, raw: &Value) -> ChartsResult<(ChartsBackupFile, ImportPreview)> {
        let backup = parse_backup(raw, self.config.backup.version)?;
        let preview = compute_preview(
            &backup,
            &self.storage.load_charts(),
            &self.storage.load_categories(),
            self.name_match(),
        );
        Ok((backup, preview))
    }

    /// Merge a validated backup into storage. All changes are buffered
    /// and written in one step at the end.
    pub fn import_backup(
        &self,
        backup: &ChartsBackupFile,
        strategy: ConflictStrategy,
    ) -> ChartsResult<ImportResult> {
        validate_backup(backup, self.config.backup.version)?;

        let _guard = self.lock();
        let plan = apply_import(
            backup,
            strategy,
            self.storage.load_charts(),
            self.storage.load_categories(),
            self.name_match(),
        );
        self.storage.save_all(&plan.charts, &plan.categories)?;

        log::info!("Imported backup with strategy {strategy}: {}", plan.result.summary());
        Ok(plan.result)
    }
}

/// Parse an arbitrary JSON value as a backup document
pub fn parse_backup(raw: &Value, supported_version: u32) -> ChartsResult<ChartsBackupFile> {
    let object = raw.as_object().ok_or_else(|| {
        ChartsError::invalid_backup(
            format!("expected a JSON object, found {}", json_type_name(raw)),
            None,
        )
    })?;

    let kind = match object.get("type") {
        None => BACKUP_TYPE.to_string(),
        Some(Value::String(kind)) if kind == BACKUP_TYPE => kind.clone(),
        Some(other) => {
            return Err(ChartsError::invalid_backup(
                format!("type must be \"{BACKUP_TYPE}\", found {other}"),
                Some("type".into()),
            ))
        }
    };

    let version = parse_version(object.get("version"))?;
    if version == 0 || version > supported_version {
        return Err(ChartsError::invalid_backup(
            format!("unsupported backup version {version} (supported up to {supported_version})"),
            Some("version".into()),
        ));
    }

    let created_at = match object.get("createdAt").or_else(|| object.get("exportedAt")) {
        None => now_iso(),
        Some(Value::String(at)) => at.clone(),
        Some(other) => {
            return Err(ChartsError::invalid_backup(
                format!("createdAt must be a string, found {}", json_type_name(other)),
                Some("createdAt".into()),
            ))
        }
    };

    let charts = parse_entries(object, "charts", true, |chart: &StoredChart| {
        chart.chart.validate()
    })?;
    let categories = parse_entries(object, "categories", false, ChartCategory::validate)?;
    ensure_unique_category_ids(&categories)?;

    Ok(ChartsBackupFile {
        kind,
        version,
        created_at,
        charts,
        categories,
    })
}

fn parse_version(value: Option<&Value>) -> ChartsResult<u32> {
    let invalid = |found: String| {
        ChartsError::invalid_backup(
            format!("version must be a positive integer, found {found}"),
            Some("version".into()),
        )
    };

    match value {
        None => Ok(1),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| invalid(n.to_string())),
        Some(Value::String(s)) => s.trim().parse::<u32>().map_err(|_| invalid(format!("\"{s}\""))),
        Some(other) => Err(invalid(json_type_name(other).to_string())),
    }
}

fn parse_entries<T, F>(
    object: &Map<String, Value>,
    field: &str,
    required: bool,
    validate: F,
) -> ChartsResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    F: Fn(&T) -> Result<(), String>,
{
    let entries = match object.get(field) {
        None if required => {
            return Err(ChartsError::invalid_backup(
                format!("missing {field} list"),
                Some(field.to_string()),
            ))
        }
        None => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(ChartsError::invalid_backup(
                format!("{field} must be an array, found {}", json_type_name(other)),
                Some(field.to_string()),
            ))
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let location = format!("{field}[{index}]");
            let item: T = serde_json::from_value(entry.clone()).map_err(|err| {
                ChartsError::invalid_backup(format!("{location}: {err}"), Some(location.clone()))
            })?;
            validate(&item).map_err(|msg| {
                ChartsError::invalid_backup(format!("{location}: {msg}"), Some(location.clone()))
            })?;
            Ok(item)
        })
        .collect()
}

/// Checks for a backup built in code rather than parsed from JSON
fn validate_backup(backup: &ChartsBackupFile, supported_version: u32) -> ChartsResult<()> {
    if backup.kind != BACKUP_TYPE {
        return Err(ChartsError::invalid_backup(
            format!("type must be \"{BACKUP_TYPE}\", found \"{}\"", backup.kind),
            Some("type".into()),
        ));
    }
    if backup.version == 0 || backup.version > supported_version {
        return Err(ChartsError::invalid_backup(
            format!("unsupported backup version {}", backup.version),
            Some("version".into()),
        ));
    }
    for (index, chart) in backup.charts.iter().enumerate() {
        chart.chart.validate().map_err(|msg| {
            ChartsError::invalid_backup(format!("charts[{index}]: {msg}"), Some(format!("charts[{index}]")))
        })?;
    }
    for (index, category) in backup.categories.iter().enumerate() {
        category.validate().map_err(|msg| {
            ChartsError::invalid_backup(
                format!("categories[{index}]: {msg}"),
                Some(format!("categories[{index}]")),
            )
        })?;
    }
    ensure_unique_category_ids(&backup.categories)
}

/// Chart references resolve by category id, so a backup may not reuse one
fn ensure_unique_category_ids(categories: &[ChartCategory]) -> ChartsResult<()> {
    let mut seen = HashSet::new();
    for (index, category) in categories.iter().enumerate() {
        if !seen.insert(category.id.as_str()) {
            return Err(ChartsError::invalid_backup(
                format!("categories[{index}]: id {} is used more than once", category.id),
                Some(format!("categories[{index}]")),
            ));
        }
    }
    Ok(())
}

/// Diff a backup against the given store contents
pub fn compute_preview(
    backup: &ChartsBackupFile,
    existing_charts: &[StoredChart],
    existing_categories: &[ChartCategory],
    name_match: NameMatch,
) -> ImportPreview {
    let mut titles: HashMap<&str, &str> = existing_charts
        .iter()
        .map(|c| (c.id(), c.title()))
        .collect();

    let mut conflicts = Vec::new();
    let mut unique = 0;
    for chart in &backup.charts {
        match titles.get(chart.id()) {
            Some(current) => conflicts.push(ImportConflict {
                id: chart.id().to_string(),
                current_title: current.to_string(),
                imported_title: chart.title().to_string(),
            }),
            None => unique += 1,
        }
        // A repeated id inside the same backup collides with its first copy
        titles.insert(chart.id(), chart.title());
    }

    let mut names: HashSet<String> = existing_categories
        .iter()
        .map(|c| name_match.key(&c.name))
        .collect();
    let mut categories_new = 0;
    let mut categories_matched_by_name = 0;
    let mut seen_ids = HashSet::new();
    for category in &backup.categories {
        // Repeats are dropped on apply, so they are not counted here either
        if !seen_ids.insert(category.id.as_str()) {
            continue;
        }
        if names.insert(name_match.key(&category.name)) {
            categories_new += 1;
        } else {
            categories_matched_by_name += 1;
        }
    }

    ImportPreview {
        total_charts: backup.charts.len(),
        unique,
        conflicts,
        total_categories: seen_ids.len(),
        categories_new,
        categories_matched_by_name,
    }
}

/// Store contents after an import, plus the counts
#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub charts: Vec<StoredChart>,
    pub categories: Vec<ChartCategory>,
    pub result: ImportResult,
}

/// Merge `backup` into the given store contents in memory
pub fn apply_import(
    backup: &ChartsBackupFile,
    strategy: ConflictStrategy,
    mut charts: Vec<StoredChart>,
    mut categories: Vec<ChartCategory>,
    name_match: NameMatch,
) -> ImportPlan {
    let mut result = ImportResult::default();

    // Categories first, so chart references can be remapped
    let mut remap: HashMap<String, String> = HashMap::new();
    let mut by_name: HashMap<String, String> = HashMap::new();
    for category in &categories {
        by_name
            .entry(name_match.key(&category.name))
            .or_insert_with(|| category.id.clone());
    }
    let mut category_ids: HashSet<String> = categories.iter().map(|c| c.id.clone()).collect();

    for incoming in &backup.categories {
        if remap.contains_key(&incoming.id) {
            log::warn!("Backup repeats category id {}, ignoring the repeat", incoming.id);
            continue;
        }

        let key = name_match.key(&incoming.name);
        if let Some(existing_id) = by_name.get(&key) {
            remap.insert(incoming.id.clone(), existing_id.clone());
            result.categories_merged += 1;
            continue;
        }

        let mut category = incoming.clone();
        category.name = category.name.trim().to_string();
        if category_ids.contains(&category.id) {
            category.id = unique_id(|candidate| category_ids.contains(candidate));
            log::debug!(
                "Category id {} is taken by another name, imported as {}",
                incoming.id,
                category.id
            );
        }

        remap.insert(incoming.id.clone(), category.id.clone());
        by_name.insert(key, category.id.clone());
        category_ids.insert(category.id.clone());
        categories.push(category);
        result.categories_added += 1;
    }

    let mut positions: HashMap<String, usize> = charts
        .iter()
        .enumerate()
        .map(|(pos, c)| (c.id().to_string(), pos))
        .collect();

    for incoming in &backup.charts {
        let mut chart = incoming.clone();
        chart.categories = incoming
            .categories
            .iter()
            .filter_map(|id| match remap.get(id) {
                Some(target) => Some(target.clone()),
                None if category_ids.contains(id) => Some(id.clone()),
                None => {
                    log::debug!("Dropping unknown category {id} from chart {}", incoming.id());
                    None
                }
            })
            .collect();
        chart.dedup_categories();

        let pos = match positions.get(chart.id()).copied() {
            Some(pos) => pos,
            None => {
                positions.insert(chart.id().to_string(), charts.len());
                charts.push(chart);
                result.added += 1;
                continue;
            }
        };

        match strategy {
            ConflictStrategy::Skip => result.skipped += 1,
            ConflictStrategy::Replace => {
                chart.favorite = charts[pos].favorite;
                charts[pos] = chart;
                result.replaced += 1;
            }
            ConflictStrategy::KeepBoth => {
                chart.chart.id = unique_id(|candidate| positions.contains_key(candidate));
                positions.insert(chart.id().to_string(), charts.len());
                charts.push(chart);
                result.duplicated += 1;
            }
        }
    }

    ImportPlan {
        charts,
        categories,
        result,
    }
}
