//! Oyatoi Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::config::AppConfig;
use crate::data::{load_boundaries, DataLoader, DataProcessor, FilterParams};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::pipeline::{compute_views, Dataset};
use crate::store::{LocalStore, ObjectStore, SourceId, SystemClock, TableCache};
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Dataset loading result from background thread
enum LoadResult {
    Progress(String),
    Complete(Dataset),
    Error(String),
}

/// Next pending result; a loader thread that went away without reporting
/// counts as a failure.
fn next_load_result(rx: &Receiver<LoadResult>) -> Option<LoadResult> {
    match rx.try_recv() {
        Ok(result) => Some(result),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => Some(LoadResult::Error(
            "loader stopped before finishing".to_string(),
        )),
    }
}

/// Main application window.
pub struct DashboardApp {
    config: AppConfig,
    store: Arc<dyn ObjectStore>,
    cache: TableCache<Dataset>,
    dataset: Option<Arc<Dataset>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Inputs of the views currently shown
    shown: Option<(FilterParams, bool)>,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let cache = TableCache::new(Arc::new(SystemClock), config.source.cache_ttl());
        let control_panel = ControlPanel::new(&config.display, store.describe());

        let mut app = Self {
            config,
            store,
            cache,
            dataset: None,
            control_panel,
            chart_viewer: ChartViewer::new(),
            shown: None,
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    fn records_id(&self) -> SourceId {
        SourceId::new(&self.config.source.bucket, &self.config.source.records_key)
    }

    /// Use the cached dataset when fresh, otherwise fetch it in the background.
    fn start_loading(&mut self) {
        if self.is_loading {
            return;
        }

        let id = self.records_id();
        if let Some(dataset) = self.cache.get(&id) {
            self.set_dataset(dataset);
            return;
        }

        self.chart_viewer.clear();
        self.control_panel.set_status("Loading data...");
        self.is_loading = true;
        self.control_panel.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let store = Arc::clone(&self.store);
        let boundaries_id = self
            .config
            .source
            .boundaries_key
            .as_ref()
            .map(|key| SourceId::new(&self.config.source.bucket, key));
        let region_property = self.config.display.region_property.clone();

        thread::spawn(move || {
            Self::run_load(tx, store, id, boundaries_id, region_property);
        });
    }

    /// Fetch and parse the dataset (called from background thread)
    fn run_load(
        tx: Sender<LoadResult>,
        store: Arc<dyn ObjectStore>,
        records_id: SourceId,
        boundaries_id: Option<SourceId>,
        region_property: String,
    ) {
        let _ = tx.send(LoadResult::Progress(format!("Fetching {}...", records_id)));
        let table = match store
            .fetch(&records_id)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                let _ = tx.send(LoadResult::Progress("Parsing records...".to_string()));
                DataLoader::load_records(bytes).map_err(|e| e.to_string())
            }) {
            Ok(table) => table,
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e));
                return;
            }
        };

        let boundaries = match boundaries_id {
            Some(id) => {
                let _ = tx.send(LoadResult::Progress(format!("Fetching {}...", id)));
                match store
                    .fetch(&id)
                    .map_err(|e| e.to_string())
                    .and_then(|bytes| {
                        load_boundaries(&bytes, &region_property).map_err(|e| e.to_string())
                    }) {
                    Ok(boundaries) => boundaries,
                    Err(e) => {
                        let _ = tx.send(LoadResult::Error(e));
                        return;
                    }
                }
            }
            None => Vec::new(),
        };

        let _ = tx.send(LoadResult::Complete(Dataset { table, boundaries }));
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Some(result) = next_load_result(&rx) {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_status(&status);
                    }
                    LoadResult::Complete(dataset) => {
                        let id = self.records_id();
                        let dataset = self.cache.insert(id, dataset);
                        self.finish_loading();
                        self.set_dataset(dataset);
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        log::error!("Loading failed: {}", error);
                        self.control_panel.set_status(&format!("Error: {}", error));
                        self.chart_viewer.set_error(error);
                        self.finish_loading();
                        should_keep_receiver = false;
                    }
                }
                // The worker hangs up after its final message.
                if !should_keep_receiver {
                    break;
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    fn finish_loading(&mut self) {
        self.is_loading = false;
        self.control_panel.is_loading = false;
    }

    fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.control_panel.row_summary = Some(format!(
            "{} records, {} regions",
            dataset.table.len(),
            dataset.boundaries.len()
        ));
        self.control_panel.set_status("Loading data ... Done!");
        self.dataset = Some(dataset);
        self.shown = None;
    }

    /// Re-run the pipeline when the selections differ from the views shown.
    fn refresh_views(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let params = self.control_panel.settings.filter_params();
        let show_raw = self.control_panel.settings.show_raw_data;
        if self.shown.as_ref() == Some(&(params.clone(), show_raw)) {
            return;
        }

        let views = compute_views(dataset, &params, &self.config.display);
        let raw = if show_raw {
            match DataProcessor::raw_view(
                &dataset.table.raw,
                params.industry,
                self.config.display.raw_row_limit,
            ) {
                Ok(df) => Some(df),
                Err(e) => {
                    self.control_panel.set_status(&format!("Error: {}", e));
                    None
                }
            }
        } else {
            None
        };

        self.chart_viewer.set_views(views, raw);
        self.shown = Some((params, show_raw));
    }

    fn handle_reload(&mut self) {
        self.cache.invalidate_all();
        log::info!("Reloading data (cache version {})", self.cache.version());
        self.dataset = None;
        self.start_loading();
    }

    fn handle_open_local_folder(&mut self) {
        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
            log::info!("Switching data source to {}", dir.display());
            let store = LocalStore::new(dir);
            self.control_panel.source = store.describe();
            self.store = Arc::new(store);
            self.handle_reload();
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();
        self.refresh_views();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::OpenLocalFolder => self.handle_open_local_folder(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
