//! Road-network distance providers over HTTP.
//!
//! Both providers implement the synchronous [`DistanceProvider`] trait by
//! blocking on reqwest futures, so the matrix builder can call them from
//! rayon workers.
//!
//! [`DistanceProvider`]: crate::distance::DistanceProvider

mod client;
mod google;
mod osrm;

pub use client::{HttpProviderConfig, ProviderBuildError, DEFAULT_USER_AGENT};
pub use google::GoogleDistanceMatrixProvider;
pub use osrm::OsrmTableProvider;
