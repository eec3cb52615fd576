use crate::data::{
    DEFAULT_ENDPOINT, DEFAULT_WINDOW_AFTER, DEFAULT_WINDOW_BEFORE, DatasetVariant, TimeWindow,
};
use crate::entrypoints::cli::parse_args;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Trip Heatmap Viewer - A cross-platform application for visualizing trip GPS datasets as a density heatmap
pub struct Settings {
    /// Dataset selector: "day" (also the default) or anything else for night
    #[clap(short, long, value_name = "VARIANT")]
    pub time: Option<String>,

    /// Dataset endpoint; the variant file name is appended to it
    #[clap(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Maximum number of points handed to the heat layer
    #[clap(short, long, default_value = "100000")]
    pub sample_size: usize,

    /// Heat point radius in pixels
    #[clap(long, default_value = "7.0")]
    pub radius: f32,

    /// Seed for the sampling RNG (reproducible draws)
    #[clap(long)]
    pub seed: Option<u64>,

    /// Keep only records near this unix timestamp (seconds)
    #[clap(long, value_name = "UNIX_SECS")]
    pub time_center: Option<f64>,

    /// Window extent before the reference time, in seconds
    #[clap(long, default_value_t = DEFAULT_WINDOW_BEFORE)]
    pub time_before: f64,

    /// Window extent after the reference time, in seconds
    #[clap(long, default_value_t = DEFAULT_WINDOW_AFTER)]
    pub time_after: f64,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse settings from the command line (native) or GET params (web)
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => {
                #[cfg(not(target_arch = "wasm32"))]
                e.exit();
                #[cfg(target_arch = "wasm32")]
                {
                    let user_msg = format!(
                        "Error parsing CLI:\n{}\n
    You should change the GET params, using the cli prefix.\n
    Starting anyway without args.",
                        e
                    );
                    if let Some(window) = web_sys::window() {
                        window.alert_with_message(&user_msg).unwrap_or(());
                    } else {
                        tracing::error!(user_msg);
                    }
                    use clap::Parser;
                    Settings::parse_from(Vec::<String>::new()) // Default args on web if parsing fails
                }
            }
        }
    }

    /// Dataset variant selected by the `--time` value.
    pub fn variant(&self) -> DatasetVariant {
        DatasetVariant::from_param(self.time.as_deref())
    }

    /// Time window assembled from the `--time-*` values, if one was requested.
    pub fn time_window(&self) -> Option<TimeWindow> {
        self.time_center
            .map(|center| TimeWindow::new(center, self.time_before, self.time_after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_settings(args: &[&str]) -> Settings {
        let mut argv = vec!["trip-heatmap-viewer"];
        argv.extend_from_slice(args);
        Settings::parse_from(argv)
    }

    #[test]
    fn test_variant_selection_defaults_to_day() {
        assert_eq!(create_test_settings(&[]).variant(), DatasetVariant::Day);
        assert_eq!(
            create_test_settings(&["--time", "day"]).variant(),
            DatasetVariant::Day
        );
        assert_eq!(
            create_test_settings(&["--time", "noon"]).variant(),
            DatasetVariant::Night
        );
        // An empty value is not "day", so it selects night
        assert_eq!(
            create_test_settings(&["--time", ""]).variant(),
            DatasetVariant::Night
        );
    }

    #[test]
    fn test_time_window_requires_a_center() {
        assert!(create_test_settings(&[]).time_window().is_none());

        let window = create_test_settings(&["--time-center", "1000"])
            .time_window()
            .unwrap();
        assert_eq!(window.center, 1000.0);
        assert_eq!(window.before, DEFAULT_WINDOW_BEFORE);
        assert_eq!(window.after, DEFAULT_WINDOW_AFTER);
    }
}
