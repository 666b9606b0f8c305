//! Per-vehicle itineraries from an engine assignment.

mod extractor;

pub use extractor::SolutionExtractor;
