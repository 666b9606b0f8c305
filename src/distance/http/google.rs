//! Google Distance Matrix API provider.
//!
//! See: <https://developers.google.com/maps/documentation/distance-matrix>

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

use crate::distance::provider::{Departure, DistanceProvider, Element, TrafficOptions};
use crate::error::ProviderError;
use crate::models::Coordinates;

use super::client::{BlockingClient, HttpProviderConfig, ProviderBuildError};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const ENDPOINT: &str = "maps/api/distancematrix/json";

/// Top-level Distance Matrix response.
#[derive(Debug, Deserialize)]
pub(crate) struct DistanceMatrixResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub rows: Vec<ResponseRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseRow {
    #[serde(default)]
    pub elements: Vec<ResponseElement>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseElement {
    pub status: String,
    #[serde(default)]
    pub distance: Option<ValueField>,
    #[serde(default)]
    pub duration: Option<ValueField>,
    #[serde(default)]
    pub duration_in_traffic: Option<ValueField>,
}

/// `{ "text": "...", "value": n }` pairs; only the value is used.
#[derive(Debug, Deserialize)]
pub(crate) struct ValueField {
    pub value: f64,
}

/// Road distances and durations from the Google Distance Matrix API.
///
/// Supports live (`departure_time=now`) and predicted traffic. Elements with
/// a non-`OK` status are reported as failed cells so the matrix builder can
/// fall back for those pairs only.
///
/// ```no_run
/// use fleet_routing::distance::http::GoogleDistanceMatrixProvider;
/// use fleet_routing::distance::CostMatrixBuilder;
/// use fleet_routing::config::MatrixConfig;
///
/// let google = GoogleDistanceMatrixProvider::new("API_KEY")?;
/// let builder = CostMatrixBuilder::new(MatrixConfig::road_network()).with_provider(google);
/// # Ok::<(), fleet_routing::distance::http::ProviderBuildError>(())
/// ```
pub struct GoogleDistanceMatrixProvider {
    api_key: String,
    config: HttpProviderConfig,
    client: BlockingClient,
}

impl std::fmt::Debug for GoogleDistanceMatrixProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDistanceMatrixProvider")
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .field("client", &self.client)
            .finish()
    }
}

impl GoogleDistanceMatrixProvider {
    /// Provider for the public Google endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(api_key, HttpProviderConfig::new(DEFAULT_BASE_URL))
    }

    /// Provider with explicit connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(
        api_key: impl Into<String>,
        config: HttpProviderConfig,
    ) -> Result<Self, ProviderBuildError> {
        let client = BlockingClient::new(&config)?;
        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }

    fn query(
        &self,
        origins: &[Coordinates],
        destinations: &[Coordinates],
        traffic: Option<&TrafficOptions>,
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("origins", join_points(origins)),
            ("destinations", join_points(destinations)),
            ("mode", "driving".to_owned()),
            ("units", "metric".to_owned()),
            ("key", self.api_key.clone()),
        ];
        if let Some(traffic) = traffic {
            query.push(("departure_time", departure_param(traffic.departure, SystemTime::now())));
            query.push(("traffic_model", traffic.model.as_str().to_owned()));
        }
        query
    }
}

impl DistanceProvider for GoogleDistanceMatrixProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn max_locations_per_side(&self) -> usize {
        self.config.max_locations_per_side
    }

    fn distance_and_duration(
        &self,
        origins: &[Coordinates],
        destinations: &[Coordinates],
        traffic: Option<&TrafficOptions>,
    ) -> Result<Vec<Vec<Element>>, ProviderError> {
        let limit = self.max_locations_per_side();
        let requested = origins.len().max(destinations.len());
        if requested > limit {
            return Err(ProviderError::BatchTooLarge { requested, limit });
        }
        let url = self.config.endpoint(ENDPOINT);
        let response: DistanceMatrixResponse =
            self.client
                .get_json(&url, &self.query(origins, destinations, traffic))?;
        convert_response(response, origins.len(), destinations.len())
    }
}

/// `lat,lng|lat,lng|...`
fn join_points(points: &[Coordinates]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.latitude, p.longitude))
        .collect::<Vec<_>>()
        .join("|")
}

/// `now`, or unix seconds for a future departure. A departure already in the
/// past is sent as `now` since the API rejects it.
fn departure_param(departure: Departure, now: SystemTime) -> String {
    match departure {
        Departure::At(at) if at > now => at
            .duration_since(UNIX_EPOCH)
            .map_or_else(|_| "now".to_owned(), |d| d.as_secs().to_string()),
        _ => "now".to_owned(),
    }
}

pub(crate) fn convert_response(
    response: DistanceMatrixResponse,
    rows: usize,
    cols: usize,
) -> Result<Vec<Vec<Element>>, ProviderError> {
    if response.status != "OK" {
        return Err(ProviderError::Service {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }
    let cells: usize = response.rows.iter().map(|r| r.elements.len()).sum();
    if response.rows.len() != rows || response.rows.iter().any(|r| r.elements.len() != cols) {
        return Err(ProviderError::ShapeMismatch {
            expected: rows * cols,
            actual: cells,
        });
    }

    Ok(response
        .rows
        .into_iter()
        .map(|row| row.elements.into_iter().map(convert_element).collect())
        .collect())
}

fn convert_element(element: ResponseElement) -> Element {
    if element.status != "OK" {
        return Element::failed(element.status);
    }
    match (element.distance, element.duration) {
        (Some(distance), Some(duration)) => {
            let converted = Element::ok(
                distance.value.round() as i64,
                duration.value.round() as i64,
            );
            match element.duration_in_traffic {
                Some(traffic) => converted.with_traffic(traffic.value.round() as i64),
                None => converted,
            }
        }
        _ => Element::failed("MISSING_VALUES"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::provider::{ElementStatus, TrafficModel};
    use rstest::rstest;
    use std::time::Duration;

    fn parse(json: &str) -> DistanceMatrixResponse {
        serde_json::from_str(json).expect("should deserialise")
    }

    #[rstest]
    fn convert_response_prefers_traffic_and_flags_failed_cells() {
        let response = parse(
            r#"{
                "status": "OK",
                "rows": [{ "elements": [
                    { "status": "OK",
                      "distance": { "text": "1.2 km", "value": 1200 },
                      "duration": { "text": "3 mins", "value": 180 },
                      "duration_in_traffic": { "text": "5 mins", "value": 300 } },
                    { "status": "ZERO_RESULTS" }
                ]}]
            }"#,
        );
        let grid = convert_response(response, 1, 2).expect("should convert");
        assert_eq!(grid[0][0].distance_m, 1200);
        assert_eq!(grid[0][0].effective_duration_s(), 300);
        assert_eq!(grid[0][1].status, ElementStatus::Failed("ZERO_RESULTS".into()));
    }

    #[rstest]
    fn convert_response_reports_service_errors() {
        let response = parse(r#"{ "status": "REQUEST_DENIED", "error_message": "bad key" }"#);
        let err = convert_response(response, 1, 1).expect_err("should fail");
        assert_eq!(
            err,
            ProviderError::Service {
                status: "REQUEST_DENIED".into(),
                message: "bad key".into()
            }
        );
    }

    #[rstest]
    fn convert_response_checks_shape() {
        let response = parse(r#"{ "status": "OK", "rows": [{ "elements": [] }] }"#);
        let err = convert_response(response, 1, 2).expect_err("should fail");
        assert!(matches!(err, ProviderError::ShapeMismatch { expected: 2, actual: 0 }));
    }

    #[rstest]
    #[case::now(Departure::Now, "now")]
    #[case::past(Departure::At(UNIX_EPOCH + Duration::from_secs(10)), "now")]
    #[case::future(Departure::At(UNIX_EPOCH + Duration::from_secs(2_000)), "2000")]
    fn departure_parameter(#[case] departure: Departure, #[case] expected: &str) {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        assert_eq!(departure_param(departure, now), expected);
    }

    #[rstest]
    fn query_includes_traffic_parameters() {
        let provider = GoogleDistanceMatrixProvider::new("secret").expect("provider should build");
        let a = Coordinates::new(4.6, -74.1);
        let b = Coordinates::new(4.7, -74.0);
        let departure = SystemTime::now() + Duration::from_secs(3600);
        let traffic = TrafficOptions::predicted(departure, TrafficModel::Pessimistic);
        let query = provider.query(&[a], &[a, b], Some(&traffic));
        let get = |k: &str| query.iter().find(|(key, _)| *key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("origins"), Some("4.6,-74.1"));
        assert_eq!(get("destinations"), Some("4.6,-74.1|4.7,-74"));
        assert_eq!(get("traffic_model"), Some("pessimistic"));
        assert_ne!(get("departure_time"), Some("now"));
        assert!(provider.query(&[a], &[b], None).iter().all(|(k, _)| *k != "traffic_model"));
    }

    #[rstest]
    fn oversized_batch_is_rejected_without_a_request() {
        let config = HttpProviderConfig::new("http://127.0.0.1:9").with_max_locations_per_side(1);
        let provider =
            GoogleDistanceMatrixProvider::with_config("k", config).expect("provider should build");
        let p = Coordinates::new(0.0, 0.0);
        let err = provider.distance_and_duration(&[p, p], &[p], None).expect_err("should fail");
        assert_eq!(err, ProviderError::BatchTooLarge { requested: 2, limit: 1 });
    }
}
