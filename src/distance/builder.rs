//! Pairwise distance and duration matrix construction.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{CalculationConfig, DistanceMethod, MatrixConfig};
use crate::error::RoutingError;
use crate::models::{Coordinates, LocationSet};
use crate::progress::{ProgressEvent, ProgressObserver};

use super::great_circle::haversine_m;
use super::matrix::CostMatrix;
use super::provider::{DistanceProvider, StraightLineProvider};

/// Which source filled a matrix cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellSource {
    /// `i == j`; always zero and never requested.
    Diagonal,
    /// Great-circle estimate, either by choice or as a fallback.
    StraightLine,
    /// The named provider answered for this pair.
    Provider(String),
}

/// Distance (metres) and optional duration (seconds) matrices for one request.
///
/// Produced whole by [`CostMatrixBuilder::build`]; a partially filled value
/// is never returned.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrices {
    distance: CostMatrix,
    duration: Option<CostMatrix>,
    sources: Option<Vec<CellSource>>,
}

impl TravelMatrices {
    /// Wraps a distance matrix with no real durations.
    pub fn from_distance(distance: CostMatrix) -> Self {
        Self {
            distance,
            duration: None,
            sources: None,
        }
    }

    /// Attaches a duration matrix.
    pub fn with_duration(mut self, duration: CostMatrix) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Distance matrix in metres.
    pub fn distance(&self) -> &CostMatrix {
        &self.distance
    }

    /// Duration matrix in seconds, when a road network supplied one.
    pub fn duration(&self) -> Option<&CostMatrix> {
        self.duration.as_ref()
    }

    /// Number of nodes covered.
    pub fn size(&self) -> usize {
        self.distance.size()
    }

    /// Provenance of cell `(from, to)`, recorded in road-network mode.
    pub fn source(&self, from: usize, to: usize) -> Option<&CellSource> {
        self.sources
            .as_ref()
            .and_then(|s| s.get(from * self.distance.size() + to))
    }

    /// Number of off-diagonal cells filled by the straight-line fallback.
    pub fn fallback_cells(&self) -> usize {
        self.sources.as_ref().map_or(0, |s| {
            s.iter()
                .filter(|c| **c == CellSource::StraightLine)
                .count()
        })
    }
}

/// One filled cell of a block.
struct Cell {
    distance_m: i64,
    duration_s: i64,
    source: CellSource,
}

/// A finished block, addressed in full-matrix indices.
struct Block {
    rows: Range<usize>,
    cols: Range<usize>,
    cells: Vec<Cell>,
}

/// Builds [`TravelMatrices`] for depots followed by stops.
///
/// In straight-line mode distances are haversine metres and no duration
/// matrix is produced. In road-network mode the matrix is split into blocks
/// of at most `batch_size` origins × `batch_size` destinations; each block is
/// offered to the providers in order and any cell still missing falls back
/// to the straight-line estimate.
///
/// # Examples
///
/// ```
/// use fleet_routing::distance::CostMatrixBuilder;
/// use fleet_routing::models::{LocationSet, Node};
///
/// let locations = LocationSet::new(
///     vec![Node::depot("D", "Depot", 0.0, 0.0)],
///     vec![Node::stop("S", "Shop", 0.0, 0.01, 1)],
/// );
/// let matrices = CostMatrixBuilder::straight_line().build(&locations)?;
/// assert_eq!(matrices.distance().get(0, 1), 1112);
/// assert!(matrices.duration().is_none());
/// # Ok::<(), fleet_routing::RoutingError>(())
/// ```
pub struct CostMatrixBuilder {
    config: MatrixConfig,
    average_speed_kmh: f64,
    providers: Vec<Box<dyn DistanceProvider>>,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl CostMatrixBuilder {
    /// Creates a builder with no providers. Fallback durations use the
    /// default average speed until [`with_average_speed_kmh`] says otherwise.
    ///
    /// [`with_average_speed_kmh`]: Self::with_average_speed_kmh
    pub fn new(config: MatrixConfig) -> Self {
        Self {
            config,
            average_speed_kmh: CalculationConfig::default().average_speed_kmh,
            providers: Vec::new(),
            observer: None,
        }
    }

    /// Straight-line builder with default settings.
    pub fn straight_line() -> Self {
        Self::new(MatrixConfig::default())
    }

    /// Speed at which straight-line fallback cells are driven.
    pub fn with_average_speed_kmh(mut self, speed: f64) -> Self {
        self.average_speed_kmh = speed;
        self
    }

    /// Fallback driving speed.
    pub fn average_speed_kmh(&self) -> f64 {
        self.average_speed_kmh
    }

    /// Appends a provider to the fallback chain.
    pub fn with_provider(mut self, provider: impl DistanceProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Appends an already boxed provider to the fallback chain.
    pub fn with_boxed_provider(mut self, provider: Box<dyn DistanceProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Reports one event per finished block.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builder settings.
    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    /// Validates the locations and builds the matrices.
    ///
    /// Provider failures never surface here; only invalid input does.
    pub fn build(&self, locations: &LocationSet) -> Result<TravelMatrices, RoutingError> {
        locations.validate()?;
        let coords: Vec<Coordinates> = locations.nodes().iter().map(|n| n.coordinates()).collect();

        let matrices = match self.config.method {
            DistanceMethod::StraightLine => Self::straight_line_matrix(&coords),
            DistanceMethod::RoadNetwork if self.providers.is_empty() => {
                warn!(
                    "road-network matrix requested without providers; \
                     using straight-line distances"
                );
                Self::straight_line_matrix(&coords)
            }
            DistanceMethod::RoadNetwork => self.road_network_matrix(&coords),
        };
        info!(
            "built {n}x{n} travel matrices ({} fallback cells)",
            matrices.fallback_cells(),
            n = matrices.size()
        );
        Ok(matrices)
    }

    fn straight_line_matrix(coords: &[Coordinates]) -> TravelMatrices {
        let n = coords.len();
        let mut distance = CostMatrix::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = haversine_m(coords[i], coords[j]);
                distance.set(i, j, d);
                distance.set(j, i, d);
            }
        }
        TravelMatrices::from_distance(distance)
    }

    fn road_network_matrix(&self, coords: &[Coordinates]) -> TravelMatrices {
        let n = coords.len();
        let side = self
            .providers
            .iter()
            .map(|p| p.max_locations_per_side())
            .fold(self.config.batch_size, usize::min)
            .max(1);

        let spans: Vec<Range<usize>> = (0..n)
            .step_by(side)
            .map(|start| start..(start + side).min(n))
            .collect();
        let blocks: Vec<(Range<usize>, Range<usize>)> = spans
            .iter()
            .flat_map(|rows| spans.iter().map(move |cols| (rows.clone(), cols.clone())))
            .collect();
        let total = blocks.len();
        debug!("fetching {total} block(s) of at most {side}x{side} cells");

        let completed = AtomicUsize::new(0);
        let finished: Vec<Block> = blocks
            .into_par_iter()
            .map(|(rows, cols)| {
                let block = self.fetch_block(coords, rows, cols);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(observer) = &self.observer {
                    observer.on_event(&ProgressEvent::MatrixBlock {
                        completed: done,
                        total,
                    });
                }
                block
            })
            .collect();

        let mut distance = CostMatrix::new(n);
        let mut duration = CostMatrix::new(n);
        let mut sources = vec![CellSource::Diagonal; n * n];
        for block in finished {
            let width = block.cols.len();
            for (k, cell) in block.cells.into_iter().enumerate() {
                let i = block.rows.start + k / width;
                let j = block.cols.start + k % width;
                distance.set(i, j, cell.distance_m);
                duration.set(i, j, cell.duration_s);
                sources[i * n + j] = cell.source;
            }
        }

        TravelMatrices {
            distance,
            duration: Some(duration),
            sources: Some(sources),
        }
    }

    /// Fills one block, walking the provider chain.
    fn fetch_block(&self, coords: &[Coordinates], rows: Range<usize>, cols: Range<usize>) -> Block {
        let fallback = StraightLineProvider::new(self.average_speed_kmh);
        let origins = &coords[rows.clone()];
        let destinations = &coords[cols.clone()];

        for provider in &self.providers {
            let grid = match provider.distance_and_duration(
                origins,
                destinations,
                self.config.traffic.as_ref(),
            ) {
                Ok(grid) => grid,
                Err(err) => {
                    warn!(
                        "provider `{}` failed for block {rows:?}x{cols:?}: {err}",
                        provider.name()
                    );
                    continue;
                }
            };
            if grid.len() != origins.len() || grid.iter().any(|row| row.len() != destinations.len())
            {
                warn!(
                    "provider `{}` returned a malformed block for {rows:?}x{cols:?}",
                    provider.name()
                );
                continue;
            }

            let mut failed = 0usize;
            let mut cells = Vec::with_capacity(origins.len() * destinations.len());
            for (bi, row) in grid.iter().enumerate() {
                for (bj, element) in row.iter().enumerate() {
                    let (i, j) = (rows.start + bi, cols.start + bj);
                    cells.push(if i == j {
                        diagonal_cell()
                    } else if element.is_ok() {
                        Cell {
                            distance_m: element.distance_m.max(0),
                            duration_s: element.effective_duration_s().max(0),
                            source: CellSource::Provider(provider.name().to_owned()),
                        }
                    } else {
                        failed += 1;
                        debug!(
                            "cell ({i}, {j}) unavailable from `{}`: {:?}",
                            provider.name(),
                            element.status
                        );
                        fallback_cell(&fallback, coords[i], coords[j])
                    });
                }
            }
            if failed > 0 {
                warn!(
                    "{failed} cell(s) of block {rows:?}x{cols:?} used straight-line estimates"
                );
            }
            return Block { rows, cols, cells };
        }

        warn!("no provider served block {rows:?}x{cols:?}; using straight-line estimates");
        let cells = rows
            .clone()
            .flat_map(|i| cols.clone().map(move |j| (i, j)))
            .map(|(i, j)| {
                if i == j {
                    diagonal_cell()
                } else {
                    fallback_cell(&fallback, coords[i], coords[j])
                }
            })
            .collect();
        Block { rows, cols, cells }
    }
}

fn diagonal_cell() -> Cell {
    Cell {
        distance_m: 0,
        duration_s: 0,
        source: CellSource::Diagonal,
    }
}

fn fallback_cell(fallback: &StraightLineProvider, from: Coordinates, to: Coordinates) -> Cell {
    let element = fallback.element(from, to);
    Cell {
        distance_m: element.distance_m,
        duration_s: element.duration_s,
        source: CellSource::StraightLine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::provider::{Element, TrafficOptions};
    use crate::distance::seconds_at_speed;
    use crate::error::ProviderError;
    use crate::models::Node;
    use std::sync::Mutex;

    fn locations(n: usize) -> LocationSet {
        let depots = vec![Node::depot("D", "Depot", 0.0, 0.0)];
        let stops = (1..n)
            .map(|i| Node::stop(format!("S{i}"), format!("Stop {i}"), 0.0, i as f64 * 0.01, 1))
            .collect();
        LocationSet::new(depots, stops)
    }

    /// Road provider: distance = 1000 * (|i - j| + 1) keyed by longitude,
    /// with an extra 100 m when travelling "west" to make it asymmetric.
    struct FakeRoad {
        calls: Mutex<Vec<(usize, usize)>>,
        fail_pair: Option<(f64, f64)>,
        traffic: bool,
    }

    impl FakeRoad {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_pair: None,
                traffic: false,
            }
        }
    }

    impl DistanceProvider for FakeRoad {
        fn name(&self) -> &str {
            "fake_road"
        }

        fn max_locations_per_side(&self) -> usize {
            2
        }

        fn distance_and_duration(
            &self,
            origins: &[Coordinates],
            destinations: &[Coordinates],
            traffic: Option<&TrafficOptions>,
        ) -> Result<Vec<Vec<Element>>, ProviderError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((origins.len(), destinations.len()));
            }
            Ok(origins
                .iter()
                .map(|o| {
                    destinations
                        .iter()
                        .map(|d| {
                            if self.fail_pair == Some((o.longitude, d.longitude)) {
                                return Element::failed("NOT_FOUND");
                            }
                            let west = if d.longitude < o.longitude { 100 } else { 0 };
                            let e = Element::ok(5000 + west, 300);
                            if self.traffic && traffic.is_some() {
                                e.with_traffic(450)
                            } else {
                                e
                            }
                        })
                        .collect()
                })
                .collect())
        }
    }

    struct Down;

    impl DistanceProvider for Down {
        fn name(&self) -> &str {
            "down"
        }

        fn distance_and_duration(
            &self,
            _origins: &[Coordinates],
            _destinations: &[Coordinates],
            _traffic: Option<&TrafficOptions>,
        ) -> Result<Vec<Vec<Element>>, ProviderError> {
            Err(ProviderError::Service {
                status: "OVER_QUERY_LIMIT".into(),
                message: "quota".into(),
            })
        }
    }

    #[test]
    fn test_straight_line_is_symmetric_with_zero_diagonal() {
        let m = CostMatrixBuilder::straight_line()
            .build(&locations(4))
            .expect("valid");
        assert_eq!(m.size(), 4);
        assert!(m.distance().is_symmetric());
        assert!(m.distance().has_zero_diagonal());
        assert!(m.distance().get(0, 3) > m.distance().get(0, 1));
        assert!(m.source(0, 1).is_none());
    }

    #[test]
    fn test_invalid_coordinates_fail_fast() {
        let set = LocationSet::new(vec![Node::depot("D", "Bad", 0.0, 200.0)], Vec::new());
        let err = CostMatrixBuilder::straight_line().build(&set);
        assert!(matches!(err, Err(RoutingError::InvalidInput(_))));
    }

    #[test]
    fn test_road_network_batches_and_asymmetry() {
        let builder =
            CostMatrixBuilder::new(MatrixConfig::road_network()).with_provider(FakeRoad::new());
        let m = builder.build(&locations(5)).expect("valid");
        assert!(m.distance().has_zero_diagonal());
        assert!(!m.distance().is_symmetric());
        assert_eq!(m.distance().get(1, 2), 5000);
        assert_eq!(m.distance().get(2, 1), 5100);
        assert_eq!(m.duration().map(|d| d.get(1, 2)), Some(300));
        assert_eq!(m.source(1, 2), Some(&CellSource::Provider("fake_road".into())));
        assert_eq!(m.source(2, 2), Some(&CellSource::Diagonal));
        assert_eq!(m.fallback_cells(), 0);
    }

    #[test]
    fn test_blocks_respect_provider_limit() {
        let provider = Arc::new(FakeRoad::new());
        struct Shared(Arc<FakeRoad>);
        impl DistanceProvider for Shared {
            fn name(&self) -> &str {
                self.0.name()
            }
            fn max_locations_per_side(&self) -> usize {
                self.0.max_locations_per_side()
            }
            fn distance_and_duration(
                &self,
                origins: &[Coordinates],
                destinations: &[Coordinates],
                traffic: Option<&TrafficOptions>,
            ) -> Result<Vec<Vec<Element>>, ProviderError> {
                self.0.distance_and_duration(origins, destinations, traffic)
            }
        }
        let builder = CostMatrixBuilder::new(MatrixConfig::road_network())
            .with_provider(Shared(Arc::clone(&provider)));
        builder.build(&locations(5)).expect("valid");
        let calls = provider.calls.lock().expect("not poisoned");
        // 5 nodes in spans of 2 -> 3 spans -> 9 blocks
        assert_eq!(calls.len(), 9);
        assert!(calls.iter().all(|&(o, d)| o <= 2 && d <= 2));
    }

    #[test]
    fn test_failed_cell_uses_straight_line() {
        let mut road = FakeRoad::new();
        road.fail_pair = Some((0.0, 0.02));
        let m = CostMatrixBuilder::new(MatrixConfig::road_network())
            .with_provider(road)
            .build(&locations(3))
            .expect("valid");
        let expected = haversine_m(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 0.02));
        assert_eq!(m.distance().get(0, 2), expected);
        assert_eq!(m.source(0, 2), Some(&CellSource::StraightLine));
        assert_eq!(m.distance().get(2, 0), 5100);
        assert_eq!(m.fallback_cells(), 1);
    }

    #[test]
    fn test_chain_falls_through_to_next_provider() {
        let m = CostMatrixBuilder::new(MatrixConfig::road_network())
            .with_provider(Down)
            .with_provider(FakeRoad::new())
            .build(&locations(3))
            .expect("valid");
        assert_eq!(m.source(0, 1), Some(&CellSource::Provider("fake_road".into())));
        assert_eq!(m.fallback_cells(), 0);
    }

    #[test]
    fn test_all_providers_down_still_builds_full_matrix() {
        let m = CostMatrixBuilder::new(MatrixConfig::road_network())
            .with_provider(Down)
            .build(&locations(3))
            .expect("valid");
        assert_eq!(m.fallback_cells(), 6);
        assert!(m.distance().get(0, 1) > 0);
        assert!(m.duration().map_or(false, |d| d.get(0, 1) > 0));
    }

    #[test]
    fn test_fallback_durations_use_configured_speed() {
        let locations = locations(2);
        let slow = CostMatrixBuilder::new(MatrixConfig::road_network())
            .with_average_speed_kmh(20.0)
            .with_provider(Down)
            .build(&locations)
            .expect("valid");
        let fast = CostMatrixBuilder::new(MatrixConfig::road_network())
            .with_provider(Down)
            .build(&locations)
            .expect("valid");
        let metres = slow.distance().get(0, 1);
        assert_eq!(slow.duration().map(|d| d.get(0, 1)), Some(seconds_at_speed(metres, 20.0)));
        assert_eq!(fast.duration().map(|d| d.get(0, 1)), Some(seconds_at_speed(metres, 40.0)));
    }

    #[test]
    fn test_traffic_duration_preferred() {
        let mut road = FakeRoad::new();
        road.traffic = true;
        let config = MatrixConfig::road_network().with_traffic(TrafficOptions::now());
        let m = CostMatrixBuilder::new(config)
            .with_provider(road)
            .build(&locations(2))
            .expect("valid");
        assert_eq!(m.duration().map(|d| d.get(0, 1)), Some(450));
    }

    #[test]
    fn test_progress_events_per_block() {
        let events = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&events);
        let observer = move |e: &ProgressEvent| {
            if let (ProgressEvent::MatrixBlock { .. }, Ok(mut count)) = (e, sink.lock()) {
                *count += 1;
            }
        };
        CostMatrixBuilder::new(MatrixConfig::road_network())
            .with_provider(FakeRoad::new())
            .with_observer(Arc::new(observer))
            .build(&locations(4))
            .expect("valid");
        assert_eq!(*events.lock().expect("not poisoned"), 4);
    }
}
