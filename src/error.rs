//! Error types.
//!
//! Input validation and matrix-shape problems fail fast through
//! [`RoutingError::InvalidInput`]. Provider failures are reported as
//! [`ProviderError`] but are absorbed by the matrix builder, which falls back
//! to straight-line estimates. [`RoutingError::NoFeasibleSolution`] is the only
//! hard failure of a solve; a solution with unassigned stops is a normal
//! outcome.

use thiserror::Error;

/// A malformed node, vehicle, or matrix supplied to the core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// A vehicle references a depot that is not in the location set.
    #[error("vehicle `{vehicle}` references unknown depot `{depot}`")]
    MissingDepot {
        /// Vehicle identifier.
        vehicle: String,
        /// The depot identifier that could not be resolved.
        depot: String,
    },
    /// A vehicle capacity is zero or negative.
    #[error("vehicle `{vehicle}` has non-positive capacity {capacity}")]
    NonPositiveCapacity {
        /// Vehicle identifier.
        vehicle: String,
        /// Offending capacity.
        capacity: i32,
    },
    /// A stop demand is zero or negative.
    #[error("stop `{stop}` has non-positive demand {demand}")]
    NonPositiveDemand {
        /// Stop identifier.
        stop: String,
        /// Offending demand.
        demand: i32,
    },
    /// Latitude or longitude outside the valid range, or not finite.
    #[error("node `{node}` has out-of-range coordinates ({latitude}, {longitude})")]
    CoordinatesOutOfRange {
        /// Node identifier.
        node: String,
        /// Latitude in degrees.
        latitude: f64,
        /// Longitude in degrees.
        longitude: f64,
    },
    /// A depot was placed among the stops or vice versa.
    #[error("node `{node}` is listed as a {expected} but is not one")]
    WrongKind {
        /// Node identifier.
        node: String,
        /// What the list expected (`"depot"` or `"stop"`).
        expected: &'static str,
    },
    /// Two nodes or two vehicles share an identifier.
    #[error("duplicate identifier `{0}`")]
    DuplicateId(String),
    /// A matrix does not match the number of nodes.
    #[error("matrix has size {actual}, expected {expected}")]
    MatrixSizeMismatch {
        /// Expected dimension (number of nodes).
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },
    /// A matrix holds a negative cost or a non-zero diagonal entry.
    #[error("{matrix} matrix has invalid cost {value} from node {from} to node {to}")]
    InvalidMatrixCell {
        /// Which matrix: `"distance"`, `"duration"`, or `"cost"`.
        matrix: &'static str,
        /// Row index.
        from: usize,
        /// Column index.
        to: usize,
        /// Offending value.
        value: i64,
    },
    /// Per-vehicle arc costs were derived for a different fleet.
    #[error("objective prices {actual} vehicle(s), fleet has {expected}")]
    FleetMismatch {
        /// Fleet size.
        expected: usize,
        /// Vehicles priced by the objective.
        actual: usize,
    },
}

/// Errors surfaced by the routing core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// The request was rejected before any matrix was built.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    /// No stop can be served by any vehicle.
    #[error("no feasible assignment exists for {stops} stop(s) with {vehicles} vehicle(s)")]
    NoFeasibleSolution {
        /// Number of stops in the problem.
        stops: usize,
        /// Number of vehicles in the problem.
        vehicles: usize,
    },
}

/// A distance provider could not serve a batch.
///
/// Never propagated out of a solve: the matrix builder tries the next
/// provider in its chain and finally the straight-line estimate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The request did not reach the service or timed out.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The service answered with a non-success HTTP status.
    #[error("request to {url} returned HTTP {status}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The service answered but reported a failure for the whole batch.
    #[error("service returned status `{status}`: {message}")]
    Service {
        /// Top-level status reported by the service.
        status: String,
        /// Service-provided description.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse provider response: {0}")]
    Parse(String),
    /// The response shape does not match the request.
    #[error("provider returned {actual} cells, expected {expected}")]
    ShapeMismatch {
        /// Expected number of cells.
        expected: usize,
        /// Returned number of cells.
        actual: usize,
    },
    /// The batch exceeds what the provider accepts per call.
    #[error("batch of {requested} locations exceeds provider limit {limit}")]
    BatchTooLarge {
        /// Locations requested on one side of the batch.
        requested: usize,
        /// Provider limit per side.
        limit: usize,
    },
}
