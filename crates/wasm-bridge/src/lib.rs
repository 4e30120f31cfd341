//! Browser facade for the charts store
//!
//! Exposes `ChartsStoreHandle` to JavaScript. Structured values cross the
//! boundary as plain JS objects; failures are thrown as the JSON
//! `ErrorResponse` envelope so the UI can show `error.details.message`.

use charts_store::charts_shared::{Chart, ChartsError, ChartsResult};
use charts_store::{ChartQuery, ChartsStore, ImportOutcome, PasteTarget, PendingImport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod api;

use api::{Backend, ImportStatus, ListOptions};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn js_error(error: ChartsError, operation: &str) -> JsValue {
    JsValue::from_str(&api::error_json(error, operation))
}

fn to_js<T: Serialize>(value: &T, operation: &str) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| {
            js_error(
                ChartsError::Internal {
                    message: e.to_string(),
                },
                operation,
            )
        })
}

fn from_js<T: DeserializeOwned>(value: JsValue, operation: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| js_error(ChartsError::validation(e.to_string()), operation))
}

/// Charts store bound to one Web Storage area
#[wasm_bindgen]
pub struct ChartsStoreHandle {
    store: ChartsStore<Backend>,
    pending: Option<PendingImport>,
}

impl ChartsStoreHandle {
    fn run<T: Serialize>(
        &self,
        operation: &str,
        f: impl FnOnce(&ChartsStore<Backend>) -> ChartsResult<T>,
    ) -> Result<JsValue, JsValue> {
        let value = f(&self.store).map_err(|e| js_error(e, operation))?;
        to_js(&value, operation)
    }

    fn stage(&mut self, outcome: Option<ImportOutcome>) -> Result<JsValue, JsValue> {
        let status = ImportStatus::from(outcome.as_ref());
        // Ignored text leaves an open conflict dialog alone
        match outcome {
            Some(ImportOutcome::NeedsResolution(pending)) => self.pending = Some(pending),
            Some(ImportOutcome::Applied(_)) => self.pending = None,
            None => {}
        }
        to_js(&status, "stageImport")
    }
}

#[wasm_bindgen]
impl ChartsStoreHandle {
    /// Open the store. `config` is an optional `StoreConfig` document in
    /// `format` (`json` when omitted, or `yaml`/`toml`).
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>, format: Option<String>) -> Result<ChartsStoreHandle, JsValue> {
        let config = api::parse_config(config.as_deref(), format.as_deref())
            .map_err(|e| js_error(e, "new"))?;
        let backend = api::open_backend(config.storage.backend);
        let store = ChartsStore::with_config(backend, config).map_err(|e| js_error(e, "new"))?;
        log::info!("Charts store ready");

        Ok(Self {
            store,
            pending: None,
        })
    }

    #[wasm_bindgen(js_name = listCharts)]
    pub fn list_charts(&self, options: JsValue) -> Result<JsValue, JsValue> {
        let query: ChartQuery = if options.is_undefined() || options.is_null() {
            ChartQuery::default()
        } else {
            from_js::<ListOptions>(options, "listCharts")?.into()
        };
        to_js(&self.store.list_charts(&query), "listCharts")
    }

    #[wasm_bindgen(js_name = getChart)]
    pub fn get_chart(&self, id: &str) -> Result<JsValue, JsValue> {
        self.run("getChart", |store| store.get_chart(id))
    }

    #[wasm_bindgen(js_name = saveChart)]
    pub fn save_chart(&self, chart: JsValue) -> Result<JsValue, JsValue> {
        let chart: Chart = from_js(chart, "saveChart")?;
        self.run("saveChart", |store| store.save_chart(chart))
    }

    #[wasm_bindgen(js_name = updateChart)]
    pub fn update_chart(&self, chart: JsValue) -> Result<JsValue, JsValue> {
        let chart: Chart = from_js(chart, "updateChart")?;
        self.run("updateChart", |store| store.update_chart(chart))
    }

    #[wasm_bindgen(js_name = deleteChart)]
    pub fn delete_chart(&self, id: &str) -> Result<(), JsValue> {
        self.store
            .delete_chart(id)
            .map_err(|e| js_error(e, "deleteChart"))
    }

    #[wasm_bindgen(js_name = toggleFavorite)]
    pub fn toggle_favorite(&self, id: &str) -> Result<bool, JsValue> {
        self.store
            .toggle_favorite(id)
            .map_err(|e| js_error(e, "toggleFavorite"))
    }

    #[wasm_bindgen(js_name = toggleChartCategory)]
    pub fn toggle_chart_category(&self, chart_id: &str, category_id: &str) -> Result<bool, JsValue> {
        self.store
            .toggle_chart_category(chart_id, category_id)
            .map_err(|e| js_error(e, "toggleChartCategory"))
    }

    #[wasm_bindgen(js_name = duplicateChart)]
    pub fn duplicate_chart(&self, id: &str) -> Result<JsValue, JsValue> {
        self.run("duplicateChart", |store| store.duplicate_chart(id))
    }

    #[wasm_bindgen(js_name = listCategories)]
    pub fn list_categories(&self) -> Result<JsValue, JsValue> {
        to_js(&self.store.list_categories(), "listCategories")
    }

    #[wasm_bindgen(js_name = createCategory)]
    pub fn create_category(&self, name: &str) -> Result<JsValue, JsValue> {
        self.run("createCategory", |store| store.create_category(name))
    }

    #[wasm_bindgen(js_name = renameCategory)]
    pub fn rename_category(&self, id: &str, name: &str) -> Result<JsValue, JsValue> {
        self.run("renameCategory", |store| store.rename_category(id, name))
    }

    /// Returns how many charts the category was removed from
    #[wasm_bindgen(js_name = deleteCategory)]
    pub fn delete_category(&self, id: &str) -> Result<u32, JsValue> {
        let detached = self
            .store
            .delete_category(id)
            .map_err(|e| js_error(e, "deleteCategory"))?;
        Ok(u32::try_from(detached).unwrap_or(u32::MAX))
    }

    /// Backup document as the JSON text to download
    #[wasm_bindgen(js_name = exportBackup)]
    pub fn export_backup(&self) -> Result<String, JsValue> {
        let backup = self.store.create_backup();
        self.store
            .backup_to_json(&backup)
            .map_err(|e| js_error(e, "exportBackup"))
    }

    #[wasm_bindgen(js_name = backupFileName)]
    pub fn backup_file_name(&self) -> String {
        self.store.backup_file_name(chrono::Utc::now())
    }

    /// Feed file or clipboard text to the import funnel. `source` is
    /// `"file"` or `"clipboard"`.
    #[wasm_bindgen(js_name = stageImport)]
    pub fn stage_import(&mut self, text: &str, source: &str) -> Result<JsValue, JsValue> {
        let source = api::parse_source(source).map_err(|e| js_error(e, "stageImport"))?;
        let outcome = self
            .store
            .stage_import(text, source)
            .map_err(|e| js_error(e, "stageImport"))?;
        self.stage(outcome)
    }

    /// Document-level paste handler. `tag_name` is the focused element's
    /// tag, if any.
    #[wasm_bindgen(js_name = handlePaste)]
    pub fn handle_paste(
        &mut self,
        tag_name: Option<String>,
        content_editable: bool,
        text: &str,
    ) -> Result<JsValue, JsValue> {
        let target = tag_name.map(|tag_name| PasteTarget {
            tag_name,
            content_editable,
        });
        let outcome = self
            .store
            .handle_paste(target.as_ref(), text)
            .map_err(|e| js_error(e, "handlePaste"))?;
        self.stage(outcome)
    }

    #[wasm_bindgen(js_name = hasPendingImport)]
    pub fn has_pending_import(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the staged import with `"skip"`, `"replace"` or `"keep-both"`
    #[wasm_bindgen(js_name = resolveImport)]
    pub fn resolve_import(&mut self, strategy: &str) -> Result<JsValue, JsValue> {
        let strategy = api::parse_strategy(strategy).map_err(|e| js_error(e, "resolveImport"))?;
        let pending = self.pending.as_ref().ok_or_else(|| {
            js_error(
                ChartsError::validation("No import is waiting for a strategy"),
                "resolveImport",
            )
        })?;

        let result = self
            .store
            .resolve_pending(pending, strategy)
            .map_err(|e| js_error(e, "resolveImport"))?;
        self.pending = None;
        to_js(&ImportStatus::applied(result), "resolveImport")
    }

    #[wasm_bindgen(js_name = cancelImport)]
    pub fn cancel_import(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("Pending import cancelled");
        }
    }
}
