//! Guided local search penalties.
//!
//! Features are directed arcs `(i, j)`. At a local optimum the used arcs of
//! highest utility `cost / (1 + penalty)` are penalised, and the search
//! continues on the augmented cost `cost + lambda * penalty` until it finds
//! a new local optimum.
//!
//! # Reference
//!
//! Voudouris, C. & Tsang, E. (1999). "Guided local search and its
//! application to the traveling salesman problem", *European Journal of
//! Operational Research* 113(2), 469-499.

use log::debug;

use crate::models::RoutingProblem;

/// Dense row-major penalty counts per directed arc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PenaltyMatrix {
    data: Vec<u32>,
    size: usize,
}

impl PenaltyMatrix {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            data: vec![0; size * size],
            size,
        }
    }

    #[inline]
    pub(crate) fn get(&self, from: usize, to: usize) -> u32 {
        self.data[from * self.size + to]
    }

    #[inline]
    fn increment(&mut self, from: usize, to: usize) {
        let cell = &mut self.data[from * self.size + to];
        *cell = cell.saturating_add(1);
    }

    /// Penalises the used arcs of maximum utility. Returns how many arcs
    /// were penalised; 0 when no arc is in use.
    pub(crate) fn penalise(&mut self, problem: &RoutingProblem, routes: &[Vec<usize>]) -> usize {
        let mut best_utility = f64::NEG_INFINITY;
        let mut targets: Vec<(usize, usize)> = Vec::new();
        for (v, route) in routes.iter().enumerate() {
            for (from, to) in arcs(problem.start(v), route) {
                let cost = problem.arc_cost(v, from, to) as f64;
                let utility = cost / (1.0 + f64::from(self.get(from, to)));
                if utility > best_utility {
                    best_utility = utility;
                    targets.clear();
                    targets.push((from, to));
                } else if utility == best_utility && !targets.contains(&(from, to)) {
                    targets.push((from, to));
                }
            }
        }
        for &(from, to) in &targets {
            self.increment(from, to);
        }
        debug!("penalised {} arc(s) at utility {best_utility:.1}", targets.len());
        targets.len()
    }
}

/// Arcs driven by a route: depot → stops → depot. Empty routes drive none.
pub(crate) fn arcs(depot: usize, route: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let first = route.first().map(|&f| (depot, f));
    let last = route.last().map(|&l| (l, depot));
    first
        .into_iter()
        .chain(route.windows(2).map(|w| (w[0], w[1])))
        .chain(last)
}

/// `lambda = coefficient * transit cost / used arcs`, at least 1.
///
/// Returns `None` when no arc is in use.
pub(crate) fn lambda(
    problem: &RoutingProblem,
    routes: &[Vec<usize>],
    coefficient: f64,
) -> Option<i64> {
    let mut transit = 0i64;
    let mut count = 0usize;
    for (v, route) in routes.iter().enumerate() {
        for (from, to) in arcs(problem.start(v), route) {
            transit += problem.arc_cost(v, from, to);
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    let value = (coefficient * transit as f64 / count as f64).round() as i64;
    Some(value.max(1))
}

/// Arc pricing seen by the neighbourhoods: real costs, optionally augmented
/// by guided-search penalties.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pricing<'a> {
    problem: &'a RoutingProblem,
    penalties: Option<(&'a PenaltyMatrix, i64)>,
}

impl<'a> Pricing<'a> {
    /// Real costs only.
    pub(crate) fn real(problem: &'a RoutingProblem) -> Self {
        Self {
            problem,
            penalties: None,
        }
    }

    /// Real costs plus `lambda` per penalty count.
    pub(crate) fn augmented(
        problem: &'a RoutingProblem,
        penalties: &'a PenaltyMatrix,
        lambda: i64,
    ) -> Self {
        Self {
            problem,
            penalties: Some((penalties, lambda)),
        }
    }

    pub(crate) fn problem(&self) -> &'a RoutingProblem {
        self.problem
    }

    #[inline]
    pub(crate) fn arc(&self, v: usize, from: usize, to: usize) -> i64 {
        let base = self.problem.arc_cost(v, from, to);
        match self.penalties {
            Some((matrix, lambda)) => base + lambda * i64::from(matrix.get(from, to)),
            None => base,
        }
    }

    /// Fixed cost of putting a vehicle into service.
    #[inline]
    pub(crate) fn fixed(&self) -> i64 {
        self.problem.objective().fixed_vehicle_cost()
    }

    /// Cost of vehicle `v` driving `depot → nodes → depot`; 0 when `nodes` is empty.
    pub(crate) fn path_cost(&self, v: usize, nodes: impl IntoIterator<Item = usize>) -> i64 {
        let depot = self.problem.start(v);
        let mut prev = depot;
        let mut cost = 0;
        let mut any = false;
        for node in nodes {
            cost += self.arc(v, prev, node);
            prev = node;
            any = true;
        }
        if !any {
            return 0;
        }
        cost + self.arc(v, prev, depot) + self.fixed()
    }

    /// Cost of vehicle `v` driving `route`.
    pub(crate) fn route_cost(&self, v: usize, route: &[usize]) -> i64 {
        self.path_cost(v, route.iter().copied())
    }

    /// Node before position `pos` of `route`, or the depot.
    #[inline]
    pub(crate) fn prev(&self, v: usize, route: &[usize], pos: usize) -> usize {
        if pos == 0 {
            self.problem.start(v)
        } else {
            route[pos - 1]
        }
    }

    /// Node at position `pos` of `route`, or the depot past the end.
    #[inline]
    pub(crate) fn at(&self, v: usize, route: &[usize], pos: usize) -> usize {
        route.get(pos).copied().unwrap_or_else(|| self.problem.start(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arcs_cover_depot_round_trip() {
        let driven: Vec<_> = arcs(0, &[3, 4, 5]).collect();
        assert_eq!(driven, vec![(0, 3), (3, 4), (4, 5), (5, 0)]);
        assert_eq!(arcs(1, &[2]).collect::<Vec<_>>(), vec![(1, 2), (2, 1)]);
        assert_eq!(arcs(1, &[]).count(), 0);
    }

    #[test]
    fn test_penalty_matrix_saturates() {
        let mut m = PenaltyMatrix::new(2);
        m.data[1] = u32::MAX;
        m.increment(0, 1);
        assert_eq!(m.get(0, 1), u32::MAX);
        m.increment(1, 0);
        assert_eq!(m.get(1, 0), 1);
    }

    #[test]
    fn test_penalise_targets_longest_arc() {
        use crate::engine::moves::test_support::line_problem;
        use crate::models::Vehicle;

        // 0 -> 1 -> 4 -> 0: the way home is the longest arc
        let problem = line_problem(&[0], &[(1, 1), (4, 1)], vec![Vehicle::new("A", 5, "D0")]);
        let routes = vec![vec![1, 2]];
        let mut m = PenaltyMatrix::new(problem.num_nodes());
        assert_eq!(m.penalise(&problem, &routes), 1);
        assert_eq!(m.get(2, 0), 1);
        // utility of (2, 0) halves, so (1, 2) at 3 km now leads
        m.penalise(&problem, &routes);
        assert_eq!(m.get(1, 2), 1);

        assert_eq!(lambda(&problem, &routes, 0.1), Some(267));
        assert_eq!(lambda(&problem, &[vec![]], 0.1), None);

        let augmented = Pricing::augmented(&problem, &m, 100);
        assert_eq!(augmented.arc(0, 2, 0), 4_000 + 100);
        assert_eq!(Pricing::real(&problem).arc(0, 2, 0), 4_000);
        assert_eq!(augmented.route_cost(0, &[1, 2]), 8_000 + 200);
    }
}
