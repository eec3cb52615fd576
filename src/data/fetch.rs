//! Dataset variants and the HTTP fetch path

use crate::data::{Dataset, Result};

/// Default dataset endpoint; the variant file name is appended to it.
pub const DEFAULT_ENDPOINT: &str = "http://cs.unm.edu/~lnunno/uber-viz/json/fileLoader.php?name=";

/// The two dataset flavors served by the endpoint.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DatasetVariant {
    Day,
    Night,
}

impl DatasetVariant {
    /// Map a raw selector value to a variant. A missing value or the exact
    /// string `"day"` selects [`Day`](Self::Day); any other value falls back
    /// to [`Night`](Self::Night).
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None | Some("day") => Self::Day,
            Some(_) => Self::Night,
        }
    }

    /// File name stem of the variant on the endpoint.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Day, Self::Night]
    }

    /// Form the request URL by appending `<name>.json` to the endpoint.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}.json", endpoint, self.name())
    }
}

/// Fetch and decode one dataset variant.
pub async fn fetch_dataset(endpoint: &str, variant: DatasetVariant) -> Result<Dataset> {
    let url = variant.url(endpoint);
    tracing::info!("Fetching {} dataset from {url}", variant.name());

    let body = reqwest::get(&url).await?.error_for_status()?.text().await?;
    let dataset = Dataset::parse(&body)?;

    tracing::debug!(
        "Fetched {} trips with {} records",
        dataset.trip_count(),
        dataset.record_count()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_param() {
        assert_eq!(DatasetVariant::from_param(None), DatasetVariant::Day);
        assert_eq!(DatasetVariant::from_param(Some("day")), DatasetVariant::Day);
        assert_eq!(
            DatasetVariant::from_param(Some("night")),
            DatasetVariant::Night
        );
        // Anything that is not exactly "day" falls back to night
        assert_eq!(
            DatasetVariant::from_param(Some("Day")),
            DatasetVariant::Night
        );
        assert_eq!(DatasetVariant::from_param(Some("")), DatasetVariant::Night);
        assert_eq!(
            DatasetVariant::from_param(Some("dusk")),
            DatasetVariant::Night
        );
    }

    #[test]
    fn test_variant_url_appends_json_file_name() {
        assert_eq!(
            DatasetVariant::Day.url("https://example.com/data?name="),
            "https://example.com/data?name=day.json"
        );
        assert_eq!(
            DatasetVariant::Night.url(DEFAULT_ENDPOINT),
            format!("{DEFAULT_ENDPOINT}night.json")
        );
    }
}
