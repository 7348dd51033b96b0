use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

use tracing::trace;

use crate::map_data::{graph::StreetGraph, point::GeoPoint};

/// Two distinct street names, stored in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreetPair<'a> {
    first: &'a str,
    second: &'a str,
}

impl<'a> StreetPair<'a> {
    /// Returns `None` when both names are the same street.
    pub fn new(name_a: &'a str, name_b: &'a str) -> Option<Self> {
        match name_a.cmp(name_b) {
            Ordering::Less => Some(Self {
                first: name_a,
                second: name_b,
            }),
            Ordering::Greater => Some(Self {
                first: name_b,
                second: name_a,
            }),
            Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &'a str {
        self.first
    }

    pub fn second(&self) -> &'a str {
        self.second
    }
}

impl Display for StreetPair<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ⚬ {}", self.first, self.second)
    }
}

/// Node id to the distinct street names passing through it.
pub type StreetMembership<'a> = BTreeMap<u64, BTreeSet<&'a str>>;

/// Every coordinate at which both streets of a pair meet.
pub type StreetPairLocations<'a> = BTreeMap<StreetPair<'a>, Vec<GeoPoint>>;

/// Only nodes carrying at least two street names are kept.
/// Way references to nodes missing from the graph are skipped.
pub fn build_membership(graph: &StreetGraph) -> StreetMembership<'_> {
    let mut membership: StreetMembership = BTreeMap::new();
    let mut missing_nodes = 0;

    for way in graph.ways() {
        for node_id in &way.node_ids {
            if graph.get_node(node_id).is_none() {
                missing_nodes += 1;
                continue;
            }
            membership
                .entry(*node_id)
                .or_default()
                .insert(way.name.as_str());
        }
    }

    membership.retain(|_, names| names.len() >= 2);

    trace!(
        missing_nodes,
        shared_nodes = membership.len(),
        "Street membership built"
    );

    membership
}

/// A node with k names contributes its coordinate to each of the C(k, 2) pairs.
pub fn build_pair_locations<'a>(
    graph: &StreetGraph,
    membership: &StreetMembership<'a>,
) -> StreetPairLocations<'a> {
    let mut pair_locations: StreetPairLocations = BTreeMap::new();

    for (node_id, names) in membership {
        let location = match graph.get_node(node_id) {
            Some(location) => *location,
            None => continue,
        };
        let names = names.iter().copied().collect::<Vec<&'a str>>();
        for (idx, &name_a) in names.iter().enumerate() {
            for &name_b in &names[idx + 1..] {
                if let Some(pair) = StreetPair::new(name_a, name_b) {
                    pair_locations.entry(pair).or_default().push(location);
                }
            }
        }
    }

    trace!(street_pairs = pair_locations.len(), "Street pair locations built");

    pair_locations
}
