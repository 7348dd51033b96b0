use std::collections::HashMap;

use tracing::trace;

use super::{
    osm::{OsmNode, OsmWay},
    point::GeoPoint,
};

#[derive(Debug, Clone, PartialEq)]
pub struct StreetWay {
    pub id: u64,
    pub name: String,
    pub node_ids: Vec<u64>,
}

/// Road graph snapshot of one city: every node coordinate plus the named ways.
#[derive(Debug, Default)]
pub struct StreetGraph {
    nodes: HashMap<u64, GeoPoint>,
    ways: Vec<StreetWay>,
    skipped_unnamed_ways: usize,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(&mut self, node: OsmNode) {
        self.nodes.insert(node.id, GeoPoint::new(node.lat, node.lon));
    }

    /// Ways without a `name` tag are not part of the model and are dropped here.
    pub fn insert_way(&mut self, osm_way: OsmWay) {
        let name = match osm_way.street_name() {
            Some(name) => name.to_string(),
            None => {
                trace!(way_id = osm_way.id, "Skipping unnamed way");
                self.skipped_unnamed_ways += 1;
                return;
            }
        };
        self.ways.push(StreetWay {
            id: osm_way.id,
            name,
            node_ids: osm_way.point_ids,
        });
    }

    pub fn get_node(&self, id: &u64) -> Option<&GeoPoint> {
        self.nodes.get(id)
    }

    pub fn ways(&self) -> &[StreetWay] {
        &self.ways
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    pub fn skipped_unnamed_ways(&self) -> usize {
        self.skipped_unnamed_ways
    }
}
