//! Path and reachability queries.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashMap, HashSet},
};

use pathfinding::prelude::bfs_reach;
use pathfinding::undirected::connected_components::connected_components;

use super::{StationGraph, StationId};

/// The result of a shortest path search.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Path length in survey units, or `-1.0` if no path exists.
    pub length: f64,
    /// Stations from start to goal inclusive; empty if no path exists.
    pub stations: Vec<StationId>,
}

impl Route {
    /// The route between stations in disconnected parts of a survey.
    pub fn unreachable() -> Self {
        Self {
            length: -1.0,
            stations: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        !self.stations.is_empty()
    }
}

/// An open node, ordered by estimated total cost, then by insertion.
#[derive(Debug)]
struct Frontier {
    estimate: f64,
    sequence: u64,
    station: StationId,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.estimate
            .total_cmp(&other.estimate)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl StationGraph {
    /// Shortest path between two stations along legs, in either direction.
    ///
    /// Uses A* with the straight-line distance to the goal as heuristic. Of
    /// open stations with equal estimates, the one opened first is expanded
    /// first.
    pub fn shortest_path(&self, start: StationId, goal: StationId) -> Route {
        let target = &self[goal];
        let heuristic = |id: StationId| self[id].distance(target);

        let mut open = BinaryHeap::new();
        let mut closed = HashSet::new();
        let mut cost = HashMap::from([(start, 0.0)]);
        let mut came_from = HashMap::new();
        let mut sequence = 0;

        open.push(Reverse(Frontier {
            estimate: heuristic(start),
            sequence,
            station: start,
        }));

        while let Some(Reverse(Frontier { station, .. })) = open.pop() {
            // Superseded entries surface after the station was expanded.
            if !closed.insert(station) {
                continue;
            }

            let g = cost[&station];

            if station == goal {
                let mut stations = vec![goal];
                let mut at = goal;
                while let Some(&prev) = came_from.get(&at) {
                    stations.push(prev);
                    at = prev;
                }
                stations.reverse();

                tracing::trace!(length = g, stations = stations.len(), "found path");
                return Route {
                    length: g,
                    stations,
                };
            }

            for next in self.neighbours(station) {
                if closed.contains(&next) {
                    continue;
                }

                let tentative = g + self[station].distance(&self[next]);
                if cost.get(&next).is_some_and(|&known| tentative >= known) {
                    continue;
                }

                cost.insert(next, tentative);
                came_from.insert(next, station);
                sequence += 1;
                open.push(Reverse(Frontier {
                    estimate: tentative + heuristic(next),
                    sequence,
                    station: next,
                }));
            }
        }

        Route::unreachable()
    }

    /// Shortest path between two labelled stations, if both labels exist.
    pub fn shortest_path_between(&self, from: &str, to: &str) -> Option<Route> {
        Some(self.shortest_path(self.by_label(from)?, self.by_label(to)?))
    }

    /// All stations reachable from `start` over legs in either direction.
    pub fn connected_component(&self, start: StationId) -> HashSet<StationId> {
        bfs_reach(start, |&id| self.neighbours(id)).collect()
    }

    /// Partition all stations into connected components, ordered by their
    /// earliest station.
    pub fn components(&self) -> Vec<HashSet<StationId>> {
        let starts: Vec<_> = self.stations().map(|(id, _)| id).collect();
        let mut components = connected_components(&starts, |&id| self.neighbours(id));
        components.sort_by_key(|c| c.iter().min().copied());
        components
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::graph::{Coord, LegFlags};

    fn graph(coords: &[(i32, i32, i32)], legs: &[(usize, usize)]) -> (StationGraph, Vec<StationId>) {
        let mut g = StationGraph::new();
        let ids: Vec<_> = coords
            .iter()
            .map(|&(x, y, z)| g.get_or_create(Coord::new(x, y, z)))
            .collect();
        for &(a, b) in legs {
            g.connect(ids[a], ids[b], LegFlags::empty());
        }
        (g, ids)
    }

    #[test]
    fn path_to_self() {
        let (g, ids) = graph(&[(0, 0, 0)], &[]);
        let route = g.shortest_path(ids[0], ids[0]);
        assert_eq!(route.length, 0.0);
        assert_eq!(route.stations, [ids[0]]);
    }

    #[test]
    fn disconnected_is_sentinel() {
        let (g, ids) = graph(&[(0, 0, 0), (10, 0, 0)], &[]);
        let route = g.shortest_path(ids[0], ids[1]);
        assert_eq!(route, Route::unreachable());
        assert!(!route.is_found());
    }

    #[test]
    fn follows_legs_against_their_direction() {
        let (g, ids) = graph(&[(0, 120, 0), (0, 0, 0), (340, 0, 0)], &[(1, 0), (2, 1)]);
        let route = g.shortest_path(ids[0], ids[2]);
        assert_eq!(route.length, 460.0);
        assert_eq!(route.stations, ids);
    }

    #[test]
    fn prefers_shorter_detour() {
        // A square with one diagonal: 0 -> 2 is shorter across the diagonal.
        let (g, ids) = graph(
            &[(0, 0, 0), (100, 0, 0), (100, 100, 0), (0, 100, 0)],
            &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)],
        );
        let route = g.shortest_path(ids[0], ids[2]);
        assert!((route.length - 200f64.sqrt() * 10.0).abs() < 1e-9);
        assert_eq!(route.stations, [ids[0], ids[2]]);
    }

    #[test]
    fn equal_routes_prefer_first_opened() {
        // Two routes of equal length around a square; the first leg recorded
        // from the start is expanded first.
        let (g, ids) = graph(
            &[(0, 0, 0), (100, 0, 0), (100, 100, 0), (0, 100, 0)],
            &[(0, 1), (0, 3), (1, 2), (3, 2)],
        );
        let route = g.shortest_path(ids[0], ids[2]);
        assert_eq!(route.stations, [ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn components_partition_stations() {
        let (g, ids) = graph(
            &[(0, 0, 0), (1, 0, 0), (5, 0, 0), (6, 0, 0), (9, 9, 9)],
            &[(1, 0), (2, 3)],
        );

        let components = g.components();
        assert_eq!(components.len(), 3);
        assert_eq!(components[0], HashSet::from([ids[0], ids[1]]));
        assert_eq!(components[1], HashSet::from([ids[2], ids[3]]));
        assert_eq!(components[2], HashSet::from([ids[4]]));

        assert_eq!(g.connected_component(ids[1]), components[0]);
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let n = 100_000;
        let coords: Vec<_> = (0..n).map(|i| (i, 0, 0)).collect();
        let legs: Vec<_> = (1..n as usize).map(|i| (i - 1, i)).collect();
        let (g, ids) = graph(&coords, &legs);

        assert_eq!(g.connected_component(ids[0]).len(), n as usize);
        assert_eq!(g.shortest_path(ids[0], ids[n as usize - 1]).length, f64::from(n - 1));
    }

    fn arbitrary_graph() -> impl Strategy<Value = (StationGraph, Vec<StationId>)> {
        (2usize..12)
            .prop_flat_map(|n| {
                (
                    prop::collection::vec((-50i32..50, -50i32..50, -50i32..50), n),
                    prop::collection::vec((0..n, 0..n), 0..2 * n),
                )
            })
            .prop_map(|(coords, legs)| {
                let mut coords = coords;
                // Distinct coordinates keep station indices aligned.
                for (i, c) in coords.iter_mut().enumerate() {
                    c.0 = c.0 * 100 + i as i32;
                }
                graph(&coords, &legs)
            })
    }

    proptest! {
        #[test]
        fn component_contains_start_and_is_symmetric((g, ids) in arbitrary_graph()) {
            for &a in &ids {
                let component = g.connected_component(a);
                prop_assert!(component.contains(&a));
                for &b in &component {
                    prop_assert!(g.connected_component(b).contains(&a));
                }
            }
        }

        #[test]
        fn paths_exist_exactly_within_components((g, ids) in arbitrary_graph()) {
            for &a in &ids {
                let component = g.connected_component(a);
                for &b in &ids {
                    let route = g.shortest_path(a, b);
                    prop_assert_eq!(route.is_found(), component.contains(&b));
                    if route.is_found() {
                        prop_assert_eq!(route.stations.first(), Some(&a));
                        prop_assert_eq!(route.stations.last(), Some(&b));
                        prop_assert!(route.length >= g[a].distance(&g[b]) - 1e-9);
                    } else {
                        prop_assert_eq!(route.length, -1.0);
                    }
                }
            }
        }

        #[test]
        fn triangle_inequality((g, ids) in arbitrary_graph()) {
            let lengths: Vec<Vec<f64>> = ids
                .iter()
                .map(|&a| ids.iter().map(|&b| g.shortest_path(a, b).length).collect())
                .collect();
            let n = ids.len();
            for a in 0..n {
                for b in 0..n {
                    for c in 0..n {
                        if lengths[a][b] >= 0.0 && lengths[b][c] >= 0.0 {
                            prop_assert!(lengths[a][c] <= lengths[a][b] + lengths[b][c] + 1e-6);
                        }
                    }
                }
            }
        }
    }
}
