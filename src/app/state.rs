//! Application state management
//!
//! This module manages the application state: the active dataset points,
//! the rendered sample, UI settings, and the dataset fetch lifecycle.

use crate::app::settings::Settings;
use crate::data::{
    self, Dataset, DatasetInfo, DatasetVariant, TimeWindow, TripPoint, bounding_box, sample,
};
use lru::LruCache;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// How many decoded dataset variants the loader keeps in memory.
const DATASET_CACHE_SIZE: NonZeroUsize = NonZeroUsize::new(2).unwrap();

/// Main application state
pub struct AppState {
    /// All usable points of the active dataset (after the optional time filter)
    pub points: Arc<Vec<TripPoint>>,

    /// The random subset currently handed to the heat layer
    pub sample: Arc<Vec<TripPoint>>,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Dataset fetch state
    pub loader: DatasetLoader,

    /// Statistics about the active dataset
    pub stats: Stats,

    /// Sampling RNG; seeded from `--seed` for reproducible draws
    rng: StdRng,

    /// Endpoint the dataset variants are fetched from
    endpoint: String,

    /// Optional record filter applied between decoding and sampling
    time_window: Option<TimeWindow>,

    /// Whether to show the mouse wheel zoom warning
    pub show_wheel_warning: bool,

    /// Timestamp when the warning was last shown
    pub wheel_warning_shown_at: Option<instant::Instant>,

    /// Fit the map to the dataset bounds on the next frame
    pub pending_fit_bounds: bool,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone)]
pub struct UiSettings {
    /// Active dataset variant
    pub variant: DatasetVariant,

    /// Maximum number of points handed to the heat layer
    pub sample_size: usize,

    /// Heat point radius in pixels
    pub radius: f32,

    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Current active tab in sidebar
    pub active_tab: SidebarTab,

    /// Whether to show profiling controls in the Settings tab
    pub show_profiling: bool,
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SidebarTab {
    Dataset,
    Settings,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }
}

/// Result of one fetch task, parked until the UI thread picks it up.
struct FetchOutcome {
    variant: DatasetVariant,
    result: data::Result<Dataset>,
    elapsed_ms: f64,
}

/// One decoded dataset variant, ready to be applied without refetching.
#[derive(Clone)]
struct CachedDataset {
    points: Arc<Vec<TripPoint>>,
    info: DatasetInfo,
    fetch_ms: f64,
}

/// Dataset fetch state and operations.
///
/// At most one fetch task runs at any time. Its result lands in `slot` and
/// is picked up by the UI thread each frame; a variant selected while a
/// fetch is in flight is remembered and started once the slot drains.
pub struct DatasetLoader {
    /// Completion slot written by the fetch task
    slot: Arc<RwLock<Option<FetchOutcome>>>,

    /// Variant currently being fetched
    in_flight: Option<DatasetVariant>,

    /// Variant selected while a fetch was in flight
    requested: Option<DatasetVariant>,

    /// Decoded variants, so switching back does not refetch
    cache: LruCache<DatasetVariant, CachedDataset>,
}

impl AppState {
    /// Create new application state from CLI settings
    pub fn new(settings: &Settings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let ui_settings = UiSettings {
            variant: settings.variant(),
            sample_size: settings.sample_size,
            radius: settings.radius,
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
            active_tab: SidebarTab::Dataset,
            show_profiling: false,
        };

        let loader = DatasetLoader {
            slot: Arc::new(RwLock::new(None)),
            in_flight: None,
            requested: None,
            cache: LruCache::new(DATASET_CACHE_SIZE),
        };

        Self {
            points: Arc::new(Vec::new()),
            sample: Arc::new(Vec::new()),
            ui_settings,
            loader,
            stats: Stats::default(),
            rng,
            endpoint: settings.endpoint.clone(),
            time_window: settings.time_window(),
            show_wheel_warning: false,
            wheel_warning_shown_at: None,
            pending_fit_bounds: false,
        }
    }

    /// Switch to a dataset variant: served from the cache when possible,
    /// fetched otherwise.
    pub fn request_variant(&mut self, variant: DatasetVariant) {
        self.ui_settings.variant = variant;

        if let Some(cached) = self.loader.cache.get(&variant).cloned() {
            tracing::debug!("Serving {} dataset from cache", variant.name());
            self.apply_cached(cached);
            return;
        }

        if self.loader.in_flight.is_some() {
            self.loader.requested = Some(variant);
            return;
        }

        self.start_fetch(variant);
    }

    /// Spawn the fetch task for one variant.
    fn start_fetch(&mut self, variant: DatasetVariant) {
        let slot = self.loader.slot.clone();
        let endpoint = self.endpoint.clone();
        self.loader.in_flight = Some(variant);

        spawn_task(async move {
            let started = instant::Instant::now();
            let result = data::fetch_dataset(&endpoint, variant).await;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            *slot.write().await = Some(FetchOutcome {
                variant,
                result,
                elapsed_ms,
            });
        });
    }

    /// Pick up a completed fetch, if any. Returns whether state changed.
    pub fn poll_fetch(&mut self) -> bool {
        // Use try_write for non-blocking UI polling.
        let outcome = match self.loader.slot.try_write() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };

        let Some(outcome) = outcome else {
            return false;
        };

        self.loader.in_flight = None;

        match outcome.result {
            Ok(dataset) => self.apply_dataset(outcome.variant, &dataset, outcome.elapsed_ms),
            Err(e) => {
                tracing::warn!(
                    "Fetching {} dataset failed: {e}; keeping previous data",
                    outcome.variant.name()
                );
            }
        }

        if let Some(next) = self.loader.requested.take() {
            self.request_variant(next);
        }

        true
    }

    /// Decode, filter, cache, and (when still selected) display a dataset.
    pub fn apply_dataset(&mut self, variant: DatasetVariant, dataset: &Dataset, fetch_ms: f64) {
        profiling::scope!("apply_dataset");

        let (mut points, info) = dataset.flatten();

        if let Some(window) = self.time_window {
            let before = points.len();
            window.apply(&mut points);
            tracing::debug!("Time window kept {} of {} points", points.len(), before);
        }

        tracing::info!(
            "Decoded {} dataset: {} trips, {} points ({} records skipped)",
            variant.name(),
            info.trip_count,
            points.len(),
            info.skipped_records
        );

        let cached = CachedDataset {
            points: Arc::new(points),
            info,
            fetch_ms,
        };
        self.loader.cache.put(variant, cached.clone());

        if self.ui_settings.variant == variant {
            self.apply_cached(cached);
        }
    }

    /// Make a decoded dataset the active one and draw a fresh sample.
    fn apply_cached(&mut self, cached: CachedDataset) {
        self.points = cached.points;
        self.stats.trip_count = cached.info.trip_count;
        self.stats.record_count = cached.info.record_count;
        self.stats.point_count = self.points.len();
        self.stats.skipped_records = cached.info.skipped_records;
        self.stats.last_fetch_ms = cached.fetch_ms;
        self.resample();
    }

    /// Draw a new random sample from the active points.
    pub fn resample(&mut self) {
        profiling::scope!("resample");

        let drawn = sample(&mut self.rng, &self.points, self.ui_settings.sample_size);
        self.stats.sampled_points = drawn.len();
        self.sample = Arc::new(drawn);
    }

    /// Change the sample size and redraw.
    pub fn set_sample_size(&mut self, sample_size: usize) {
        self.ui_settings.sample_size = sample_size;
        self.resample();
    }

    /// Whether a fetch task is currently running.
    pub fn is_fetching(&self) -> bool {
        self.loader.in_flight.is_some()
    }

    /// Variant currently being fetched, if any.
    pub fn fetching_variant(&self) -> Option<DatasetVariant> {
        self.loader.in_flight
    }

    /// Bounding rectangle of the active points (x = longitude, y = latitude).
    pub fn bounding_box(&self) -> Option<geo::Rect<f64>> {
        bounding_box(&self.points)
    }

    /// Show the wheel zoom warning
    pub fn show_wheel_zoom_warning(&mut self) {
        self.show_wheel_warning = true;
        self.wheel_warning_shown_at = Some(instant::Instant::now());
    }

    /// Hide the wheel zoom warning
    pub fn hide_wheel_zoom_warning(&mut self) {
        self.show_wheel_warning = false;
        self.wheel_warning_shown_at = None;
    }

    /// Check if the wheel warning should be hidden (after timeout)
    pub fn should_hide_wheel_warning(&self) -> bool {
        if let Some(shown_at) = self.wheel_warning_shown_at {
            shown_at.elapsed().as_secs_f32() > 1.0
        } else {
            false
        }
    }

    /// Get the alpha for the wheel warning (fade in, hold, fade out)
    pub fn get_wheel_warning_alpha(&self) -> f32 {
        if let Some(shown_at) = self.wheel_warning_shown_at {
            let elapsed = shown_at.elapsed().as_secs_f32();
            if elapsed < 0.15 {
                elapsed / 0.15
            } else if elapsed < 0.5 {
                1.0
            } else if elapsed < 1.0 {
                1.0 - ((elapsed - 0.5) / 0.5)
            } else {
                0.0
            }
        } else {
            0.0
        }
    }
}

/// Run a fetch future on the platform's task executor.
#[cfg(not(target_arch = "wasm32"))]
fn spawn_task<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

#[cfg(target_arch = "wasm32")]
fn spawn_task<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Statistics about the active dataset
#[derive(Default)]
pub struct Stats {
    /// Number of trips in the active dataset
    pub trip_count: usize,

    /// Total records on the wire, valid or not
    pub record_count: usize,

    /// Points available to the sampler
    pub point_count: usize,

    /// Records rejected while decoding
    pub skipped_records: usize,

    /// Points in the current sample
    pub sampled_points: usize,

    /// How long the last fetch took in milliseconds
    pub last_fetch_ms: f64,

    /// Sample points inside the viewport in the last frame
    pub heat_projected_points: usize,

    /// Heat cells painted in the last frame
    pub heat_drawn_cells: usize,

    /// Highest per-cell point count in the last frame
    pub heat_peak_density: u32,
}

impl Stats {
    /// Format point count with thousands separators
    pub fn format_points(&self) -> String {
        format_number_with_commas(self.point_count)
    }

    /// Format record count with thousands separators
    pub fn format_records(&self) -> String {
        format_number_with_commas(self.record_count)
    }

    /// Format sample size with thousands separators
    pub fn format_sampled(&self) -> String {
        format_number_with_commas(self.sampled_points)
    }

    /// Format in-view point count with thousands separators
    pub fn format_in_view(&self) -> String {
        format_number_with_commas(self.heat_projected_points)
    }

    /// Format the last fetch duration as a human-readable string
    pub fn format_fetch_time(&self) -> String {
        if self.last_fetch_ms >= 1000.0 {
            format!("{:.2} s", self.last_fetch_ms / 1000.0)
        } else {
            format!("{:.0} ms", self.last_fetch_ms)
        }
    }
}

/// Helper to format numbers with comma separators
fn format_number_with_commas(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn create_test_settings(args: &[&str]) -> Settings {
        let mut argv = vec!["trip-heatmap-viewer"];
        argv.extend_from_slice(args);
        Settings::parse_from(argv)
    }

    fn create_test_dataset() -> Dataset {
        Dataset::parse(
            r#"{
                "a": [[100.0, 37.774, -122.433], [200.0, 37.775, -122.434]],
                "b": [[300.0, 37.776, -122.435]]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_apply_dataset_updates_stats_and_sample() {
        let settings = create_test_settings(&["--seed", "42", "--sample-size", "2"]);
        let mut state = AppState::new(&settings);

        state.apply_dataset(DatasetVariant::Day, &create_test_dataset(), 12.0);

        assert_eq!(state.stats.trip_count, 2);
        assert_eq!(state.stats.record_count, 3);
        assert_eq!(state.stats.point_count, 3);
        assert_eq!(state.stats.sampled_points, 2);
        assert_eq!(state.sample.len(), 2);
        assert_eq!(state.stats.last_fetch_ms, 12.0);
    }

    #[test]
    fn test_apply_dataset_for_unselected_variant_only_caches() {
        let settings = create_test_settings(&["--seed", "7"]);
        let mut state = AppState::new(&settings);
        assert_eq!(state.ui_settings.variant, DatasetVariant::Day);

        state.apply_dataset(DatasetVariant::Night, &create_test_dataset(), 5.0);
        assert!(state.points.is_empty());

        // Switching to the cached variant applies it without a fetch
        state.request_variant(DatasetVariant::Night);
        assert_eq!(state.points.len(), 3);
        assert!(!state.is_fetching());
    }

    #[tokio::test]
    async fn test_variant_requested_mid_fetch_is_parked_until_poll() {
        let settings = create_test_settings(&[
            "--seed",
            "5",
            "--endpoint",
            "http://127.0.0.1:9/?name=",
        ]);
        let mut state = AppState::new(&settings);

        // A day fetch is in flight; switching to night must not start a
        // second task
        state.loader.in_flight = Some(DatasetVariant::Day);
        state.request_variant(DatasetVariant::Night);

        assert_eq!(state.loader.requested, Some(DatasetVariant::Night));
        assert_eq!(state.loader.in_flight, Some(DatasetVariant::Day));

        // The day fetch completes
        *state.loader.slot.write().await = Some(FetchOutcome {
            variant: DatasetVariant::Day,
            result: Ok(create_test_dataset()),
            elapsed_ms: 3.0,
        });

        assert!(state.poll_fetch());

        // Day landed in the cache without being applied, and the parked
        // night request became the in-flight fetch
        assert!(state.loader.cache.contains(&DatasetVariant::Day));
        assert!(state.points.is_empty());
        assert_eq!(state.loader.in_flight, Some(DatasetVariant::Night));
        assert_eq!(state.loader.requested, None);
    }

    #[test]
    fn test_time_window_filters_applied_points() {
        let settings = create_test_settings(&[
            "--seed",
            "1",
            "--time-center",
            "200",
            "--time-before",
            "100",
            "--time-after",
            "50",
        ]);
        let mut state = AppState::new(&settings);

        state.apply_dataset(DatasetVariant::Day, &create_test_dataset(), 1.0);

        // Window is [100, 250]: keeps t=100 and t=200, drops t=300
        assert_eq!(state.points.len(), 2);
        assert_eq!(state.stats.point_count, 2);
    }

    #[test]
    fn test_same_seed_draws_same_sample() {
        let settings = create_test_settings(&["--seed", "99", "--sample-size", "1"]);

        let mut first = AppState::new(&settings);
        first.apply_dataset(DatasetVariant::Day, &create_test_dataset(), 1.0);

        let mut second = AppState::new(&settings);
        second.apply_dataset(DatasetVariant::Day, &create_test_dataset(), 1.0);

        assert_eq!(*first.sample, *second.sample);
    }

    #[test]
    fn test_resample_respects_sample_size() {
        let settings = create_test_settings(&["--seed", "3", "--sample-size", "100"]);
        let mut state = AppState::new(&settings);
        state.apply_dataset(DatasetVariant::Day, &create_test_dataset(), 1.0);

        // Requests beyond the point count degrade to the full set
        assert_eq!(state.sample.len(), 3);

        state.set_sample_size(1);
        assert_eq!(state.sample.len(), 1);
        assert_eq!(state.stats.sampled_points, 1);
    }

    #[test]
    fn test_format_number_with_commas() {
        assert_eq!(format_number_with_commas(0), "0");
        assert_eq!(format_number_with_commas(999), "999");
        assert_eq!(format_number_with_commas(100000), "100,000");
        assert_eq!(format_number_with_commas(1234567), "1,234,567");
    }
}
