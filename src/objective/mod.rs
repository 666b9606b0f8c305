//! Optimisation goals and the arc costs they induce.
//!
//! An [`ObjectiveModel`] turns a [`Goal`] plus travel matrices into an
//! [`Objective`]: integer arc costs in a goal-specific native unit and an
//! optional fixed cost per used vehicle.

mod goal;
mod model;

pub use goal::{Goal, ReportUnit};
pub use model::{ArcCost, Objective, ObjectiveModel};
