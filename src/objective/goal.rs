//! Optimisation goals and their reporting units.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

/// What the search minimises.
///
/// Names are matched case-insensitively, ignoring surrounding whitespace.
/// Spanish names used by dispatchers are accepted as aliases, and anything
/// unrecognised falls back to [`Goal::Distance`].
///
/// # Examples
///
/// ```
/// use fleet_routing::objective::Goal;
///
/// assert_eq!(Goal::from_name("Tiempo"), Goal::Time);
/// assert_eq!(Goal::from_name(" fleet-size "), Goal::FleetSize);
/// assert_eq!(Goal::from_name("fastest"), Goal::Distance);
/// assert_eq!(Goal::Balanced.as_str(), "balanced");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Goal {
    /// Total metres travelled.
    #[default]
    Distance,
    /// Total seconds travelled.
    Time,
    /// Money spent, using each vehicle's per-kilometre rate.
    Cost,
    /// Number of vehicles used, then distance.
    FleetSize,
    /// Weighted blend of distance and time.
    Balanced,
}

impl Goal {
    /// Every goal, in declaration order.
    pub const ALL: [Goal; 5] = [
        Goal::Distance,
        Goal::Time,
        Goal::Cost,
        Goal::FleetSize,
        Goal::Balanced,
    ];

    /// Parses a goal name, returning `None` when it is not recognised.
    pub fn recognise(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "distance" | "distancia" => Some(Self::Distance),
            "time" | "tiempo" => Some(Self::Time),
            "cost" | "costo" => Some(Self::Cost),
            "fleet-size" | "fleet_size" | "vehicles" | "vehiculos" => Some(Self::FleetSize),
            "balanced" | "balanceado" => Some(Self::Balanced),
            _ => None,
        }
    }

    /// Parses a goal name, falling back to [`Goal::Distance`].
    pub fn from_name(name: &str) -> Self {
        Self::recognise(name).unwrap_or_else(|| {
            debug!("unknown goal `{name}`; minimising distance");
            Self::Distance
        })
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Time => "time",
            Self::Cost => "cost",
            Self::FleetSize => "fleet-size",
            Self::Balanced => "balanced",
        }
    }

    /// Unit in which objective values of this goal are reported.
    pub fn report_unit(&self) -> ReportUnit {
        match self {
            Self::Distance | Self::FleetSize => ReportUnit::Kilometers,
            Self::Time => ReportUnit::Minutes,
            Self::Cost => ReportUnit::Currency,
            Self::Balanced => ReportUnit::Score,
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Goal {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl From<String> for Goal {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<Goal> for String {
    fn from(goal: Goal) -> Self {
        goal.as_str().to_owned()
    }
}

/// How native integer costs are presented to people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportUnit {
    /// Metres shown as kilometres.
    Kilometers,
    /// Seconds shown as minutes.
    Minutes,
    /// Cents shown as currency units.
    Currency,
    /// Blended score shown in thousands.
    Score,
}

impl ReportUnit {
    /// Native units per reported unit.
    pub fn divisor(&self) -> f64 {
        match self {
            Self::Kilometers | Self::Score => 1000.0,
            Self::Minutes => 60.0,
            Self::Currency => 100.0,
        }
    }

    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kilometers => "km",
            Self::Minutes => "min",
            Self::Currency => "$",
            Self::Score => "pts",
        }
    }

    /// Converts a native cost into this unit.
    pub fn convert(&self, native: i64) -> f64 {
        native as f64 / self.divisor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("distance", Goal::Distance)]
    #[case("DISTANCIA", Goal::Distance)]
    #[case("time", Goal::Time)]
    #[case(" tiempo ", Goal::Time)]
    #[case("cost", Goal::Cost)]
    #[case("Costo", Goal::Cost)]
    #[case("fleet-size", Goal::FleetSize)]
    #[case("fleet_size", Goal::FleetSize)]
    #[case("vehicles", Goal::FleetSize)]
    #[case("vehiculos", Goal::FleetSize)]
    #[case("balanced", Goal::Balanced)]
    #[case("balanceado", Goal::Balanced)]
    fn parses_names_and_aliases(#[case] name: &str, #[case] expected: Goal) {
        assert_eq!(Goal::from_name(name), expected);
        assert_eq!(name.parse::<Goal>(), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("shortest")]
    #[case("vehículos")]
    fn unknown_names_fall_back_to_distance(#[case] name: &str) {
        assert_eq!(Goal::recognise(name), None);
        assert_eq!(Goal::from_name(name), Goal::Distance);
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for goal in Goal::ALL {
            assert_eq!(Goal::recognise(goal.as_str()), Some(goal));
        }
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&Goal::FleetSize).expect("serialises");
        assert_eq!(json, "\"fleet-size\"");
        let goal: Goal = serde_json::from_str("\"costo\"").expect("deserialises");
        assert_eq!(goal, Goal::Cost);
    }

    #[rstest]
    #[case(Goal::Distance, 12_500, 12.5)]
    #[case(Goal::Time, 90, 1.5)]
    #[case(Goal::Cost, 250, 2.5)]
    #[case(Goal::Balanced, 3_000, 3.0)]
    fn converts_to_report_unit(#[case] goal: Goal, #[case] native: i64, #[case] reported: f64) {
        assert!((goal.report_unit().convert(native) - reported).abs() < 1e-9);
    }
}
