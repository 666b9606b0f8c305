//! OSRM Table service provider.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service>

use serde::Deserialize;

use crate::distance::provider::{DistanceProvider, Element, TrafficOptions};
use crate::error::ProviderError;
use crate::models::Coordinates;

use super::client::{BlockingClient, HttpProviderConfig, ProviderBuildError};

/// OSRM Table API response.
#[derive(Debug, Deserialize)]
pub(crate) struct TableResponse {
    /// `"Ok"` on success, e.g. `"InvalidQuery"` or `"NoTable"` otherwise.
    pub code: String,
    pub message: Option<String>,
    /// Seconds; `null` when no route exists.
    pub durations: Option<Vec<Vec<Option<f64>>>>,
    /// Metres; `null` when no route exists.
    pub distances: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// Road distances and durations from an OSRM server.
///
/// Origins and destinations are sent together; `sources` and `destinations`
/// select the block. OSRM has no traffic model, so traffic options are
/// ignored.
#[derive(Debug)]
pub struct OsrmTableProvider {
    profile: String,
    config: HttpProviderConfig,
    client: BlockingClient,
}

impl OsrmTableProvider {
    /// Driving profile on the given server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpProviderConfig::new(base_url))
    }

    /// Driving profile with explicit connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpProviderConfig) -> Result<Self, ProviderBuildError> {
        let client = BlockingClient::new(&config)?;
        Ok(Self {
            profile: "driving".to_owned(),
            config,
            client,
        })
    }

    /// Uses another routing profile, e.g. `"car"`.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// `{base}/table/v1/{profile}/{lon,lat;...}`
    fn table_url(&self, origins: &[Coordinates], destinations: &[Coordinates]) -> String {
        let coords = origins
            .iter()
            .chain(destinations)
            .map(|p| format!("{},{}", p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .join(";");
        self.config
            .endpoint(&format!("table/v1/{}/{}", self.profile, coords))
    }
}

impl DistanceProvider for OsrmTableProvider {
    fn name(&self) -> &str {
        "osrm"
    }

    fn max_locations_per_side(&self) -> usize {
        self.config.max_locations_per_side
    }

    fn distance_and_duration(
        &self,
        origins: &[Coordinates],
        destinations: &[Coordinates],
        _traffic: Option<&TrafficOptions>,
    ) -> Result<Vec<Vec<Element>>, ProviderError> {
        let limit = self.max_locations_per_side();
        let requested = origins.len().max(destinations.len());
        if requested > limit {
            return Err(ProviderError::BatchTooLarge { requested, limit });
        }
        let url = self.table_url(origins, destinations);
        let query = table_query(origins.len(), destinations.len());
        let response: TableResponse = self.client.get_json(&url, &query)?;
        convert_response(response, origins.len(), destinations.len())
    }
}

fn table_query(origins: usize, destinations: usize) -> Vec<(&'static str, String)> {
    let indices = |range: std::ops::Range<usize>| {
        range.map(|i| i.to_string()).collect::<Vec<_>>().join(";")
    };
    vec![
        ("sources", indices(0..origins)),
        ("destinations", indices(origins..origins + destinations)),
        ("annotations", "duration,distance".to_owned()),
    ]
}

pub(crate) fn convert_response(
    response: TableResponse,
    rows: usize,
    cols: usize,
) -> Result<Vec<Vec<Element>>, ProviderError> {
    if !response.is_ok() {
        return Err(ProviderError::Service {
            status: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    let durations = response
        .durations
        .ok_or_else(|| ProviderError::Parse("OSRM response missing durations array".to_owned()))?;
    let distances = response
        .distances
        .ok_or_else(|| ProviderError::Parse("OSRM response missing distances array".to_owned()))?;

    let well_formed =
        |grid: &[Vec<Option<f64>>]| grid.len() == rows && grid.iter().all(|r| r.len() == cols);
    if !well_formed(&durations[..]) || !well_formed(&distances[..]) {
        return Err(ProviderError::ShapeMismatch {
            expected: rows * cols,
            actual: durations.iter().map(Vec::len).sum(),
        });
    }

    Ok(distances
        .iter()
        .zip(&durations)
        .map(|(dist_row, dur_row)| {
            dist_row
                .iter()
                .zip(dur_row)
                .map(|(distance, duration)| {
                    match (valid(*distance), valid(*duration)) {
                        (Some(d), Some(t)) => Element::ok(d.round() as i64, t.round() as i64),
                        _ => Element::failed("NoRoute"),
                    }
                })
                .collect()
        })
        .collect())
}

/// Negative, NaN, and infinite values count as unreachable.
fn valid(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v >= 0.0 && v.is_finite())
}
