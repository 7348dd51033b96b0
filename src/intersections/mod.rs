use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    map_data::{graph::StreetGraph, point::GeoPoint},
    rules::DetectionRules,
};

pub mod extractor;
pub mod selector;
pub mod similarity;

/// Two distant points where the same two streets meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateIntersection {
    pub street1: String,
    pub street2: String,
    /// Meters between `location1` and `location2`.
    pub distance: f64,
    pub location1: GeoPoint,
    pub location2: GeoPoint,
}

#[tracing::instrument(skip_all)]
pub fn find_duplicate_intersections(
    graph: &StreetGraph,
    rules: &DetectionRules,
) -> Vec<DuplicateIntersection> {
    let start = Instant::now();

    let membership = extractor::build_membership(graph);
    let pair_locations = extractor::build_pair_locations(graph, &membership);
    debug!(
        shared_nodes = membership.len(),
        street_pairs = pair_locations.len(),
        "Intersections extracted"
    );

    let duplicates = selector::select_duplicates(&pair_locations, rules);

    info!(
        duplicates = duplicates.len(),
        duration_ms = start.elapsed().as_millis(),
        "Duplicate intersections found"
    );

    duplicates
}
