//! Application module
//!
//! This module provides the main application structure with a clean UI:
//! - Full-screen map view centered on the dataset's city
//! - Heat layer rendering the sampled trip points
//! - Toggleable sidebar with tabs (Dataset and Settings)
//! - Responsive layout (sidebar from bottom on portrait displays)

mod heatmap;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::heatmap::{HeatStats, HeatmapPlugin};
use crate::app::settings::Settings;
use crate::app::state::{AppState, SidebarTab, TilesProvider};
use eframe::egui;
use std::sync::Arc;
use tokio::sync::RwLock;
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Initial view until data arrives: San Francisco at city level.
const INITIAL_CENTER: (f64, f64) = (37.774546, -122.433523);
const INITIAL_ZOOM: f64 = 13.0;

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17 // OpenTopoMap has max zoom of 17
    }
}

/// Persisted settings (lightweight, no point data)
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedSettings {
    /// UI settings
    variant: String,
    sample_size: usize,
    radius: f32,
    sidebar_open: bool,
    active_tab: String,
    tiles_provider: String,
    show_profiling: bool,
}

/// Main application structure
pub struct TripHeatmapApp {
    /// Application state (points, sample, UI settings, fetch lifecycle)
    state: AppState,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Show help overlay
    show_help: bool,

    /// Shared render statistics (updated by the heat layer each frame)
    heat_stats: Arc<RwLock<HeatStats>>,

    /// Whether we've issued the startup fetch
    started_initial_fetch: bool,
}

impl TripHeatmapApp {
    pub fn new(settings: Settings, cc: &eframe::CreationContext<'_>) -> Self {
        // Try to restore persisted settings (not point data)
        let mut state = if !settings.ignore_persisted {
            if let Some(storage) = cc.storage {
                Self::load_persisted_settings(storage, &settings)
            } else {
                AppState::new(&settings)
            }
        } else {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            AppState::new(&settings)
        };

        // An explicit --time wins over whatever variant was persisted
        if settings.time.is_some() {
            state.ui_settings.variant = settings.variant();
        }

        // Create tiles providers
        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        // Start over the dataset's city until points arrive
        let mut map_memory = MapMemory::default();
        map_memory.center_at(walkers::lat_lon(INITIAL_CENTER.0, INITIAL_CENTER.1));
        let _ = map_memory.set_zoom(INITIAL_ZOOM);

        tracing::info!(
            "Initialized; will fetch the {} dataset",
            state.ui_settings.variant.name()
        );

        Self {
            state,
            tiles_osm,
            tiles_otm,
            map_memory,
            show_help: false,
            heat_stats: Arc::new(RwLock::new(HeatStats::default())),
            started_initial_fetch: false,
        }
    }

    /// Load persisted settings from storage (fast, no point data)
    fn load_persisted_settings(storage: &dyn eframe::Storage, settings: &Settings) -> AppState {
        if let Some(json) = storage.get_string("persisted_settings")
            && !json.is_empty()
            && let Ok(persisted) = serde_json::from_str::<PersistedSettings>(&json)
        {
            tracing::info!("Restored persisted settings");
            return Self::state_from_persisted_settings(persisted, settings);
        }

        tracing::info!("No persisted settings found, starting fresh");
        AppState::new(settings)
    }

    /// Create AppState from persisted settings
    fn state_from_persisted_settings(persisted: PersistedSettings, settings: &Settings) -> AppState {
        use crate::data::DatasetVariant;

        let mut state = AppState::new(settings);
        state.ui_settings.variant = match persisted.variant.as_str() {
            "Night" => DatasetVariant::Night,
            _ => DatasetVariant::Day,
        };
        state.ui_settings.sample_size = persisted.sample_size;
        state.ui_settings.radius = persisted.radius;
        state.ui_settings.sidebar_open = persisted.sidebar_open;
        state.ui_settings.active_tab = match persisted.active_tab.as_str() {
            "Settings" => SidebarTab::Settings,
            _ => SidebarTab::Dataset,
        };
        state.ui_settings.tiles_provider = match persisted.tiles_provider.as_str() {
            "OpenTopoMap" => TilesProvider::OpenTopoMap,
            _ => TilesProvider::OpenStreetMap,
        };
        state.ui_settings.show_profiling = persisted.show_profiling;
        state
    }

    /// Fit the map view to the bounding box of the active dataset
    fn fit_to_bounds(&mut self) {
        let Some(bbox) = self.state.bounding_box() else {
            return;
        };

        let (min_lon, min_lat) = (bbox.min().x, bbox.min().y);
        let (max_lon, max_lat) = (bbox.max().x, bbox.max().y);

        let center_lat = (min_lat + max_lat) / 2.0;
        let center_lon = (min_lon + max_lon) / 2.0;

        // Calculate zoom level to fit the bounds
        let lat_span = (max_lat - min_lat).abs();
        let lon_span = (max_lon - min_lon).abs();
        let max_span = lat_span.max(lon_span);

        let zoom = if max_span > 0.0 {
            let zoom_estimate = (4.0 * 360.0 / max_span).log2() as f32;
            (zoom_estimate - 0.5).clamp(1.0, 18.0)
        } else {
            INITIAL_ZOOM as f32
        };

        self.map_memory
            .center_at(walkers::lat_lon(center_lat, center_lon));
        let _ = self.map_memory.set_zoom(zoom as f64);

        tracing::trace!(
            "Fitted view to bounds: ({:.4}, {:.4}) - ({:.4}, {:.4}), zoom: {:.1}",
            min_lat,
            min_lon,
            max_lat,
            max_lon,
            zoom
        );
    }
}

#[profiling::all_functions]
impl eframe::App for TripHeatmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) {
                self.show_help = !self.show_help;
            }
            if i.key_pressed(egui::Key::H) && i.modifiers.ctrl {
                self.show_help = !self.show_help;
            }

            // Zooming the map requires Ctrl, remind users who scroll without it
            if i.raw_scroll_delta.y != 0.0 && !i.modifiers.ctrl && !self.state.show_wheel_warning {
                self.state.show_wheel_zoom_warning();
            }
        });

        // Issue the startup fetch once the first frame runs
        if !self.started_initial_fetch {
            self.started_initial_fetch = true;
            let variant = self.state.ui_settings.variant;
            self.state.request_variant(variant);
        }

        // Pick up a completed fetch, if any
        if self.state.poll_fetch() {
            ctx.request_repaint();
        }
        if self.state.is_fetching() {
            // Keep polling the completion slot while the task runs
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        // Fit the view to the dataset when requested
        if self.state.pending_fit_bounds {
            self.state.pending_fit_bounds = false;
            self.fit_to_bounds();
        }

        // Show help overlay if enabled
        if self.show_help {
            ui_panels::help_overlay(ctx, &mut self.show_help);
        }

        // Render the main sidebar (responsive: side or bottom based on orientation)
        ui_panels::render_sidebar(ctx, &mut self.state);

        // Capture values we need before the closure
        let sample = self.state.sample.clone();
        let radius = self.state.ui_settings.radius;
        let tiles_provider = self.state.ui_settings.tiles_provider;
        let attribution_text = tiles_provider.attribution();
        let heat_stats = self.heat_stats.clone();

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let heat_plugin = HeatmapPlugin::new(sample, radius, heat_stats);

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(INITIAL_CENTER.0, INITIAL_CENTER.1),
                )
                .with_plugin(heat_plugin);

                ui.add(map);

                // Auto-hide the wheel warning after its timeout
                if self.state.show_wheel_warning && self.state.should_hide_wheel_warning() {
                    self.state.hide_wheel_zoom_warning();
                }

                // Use try_read for non-blocking UI polling.
                if let Ok(heat_stats) = self.heat_stats.try_read() {
                    self.state.stats.heat_projected_points = heat_stats.projected_points;
                    self.state.stats.heat_drawn_cells = heat_stats.drawn_cells;
                    self.state.stats.heat_peak_density = heat_stats.peak_density;
                }

                // Sidebar toggle button (overlaid on the map)
                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                // Tiles attribution (overlaid at the bottom of the map)
                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );

                // Wheel zoom warning (overlaid on the map)
                if self.state.show_wheel_warning {
                    ui_panels::show_wheel_zoom_warning(ui, &mut self.state);
                }
            });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        // Save settings only (no point data - fast)
        let persisted = PersistedSettings {
            variant: format!("{:?}", self.state.ui_settings.variant),
            sample_size: self.state.ui_settings.sample_size,
            radius: self.state.ui_settings.radius,
            sidebar_open: self.state.ui_settings.sidebar_open,
            active_tab: format!("{:?}", self.state.ui_settings.active_tab),
            tiles_provider: format!("{:?}", self.state.ui_settings.tiles_provider),
            show_profiling: self.state.ui_settings.show_profiling,
        };

        if let Ok(json) = serde_json::to_string(&persisted) {
            storage.set_string("persisted_settings", json);
            tracing::debug!("Saved settings on exit");
        }
    }
}
