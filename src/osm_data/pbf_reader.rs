use crate::map_data::graph::StreetGraph;
use tracing::trace;

use crate::map_data::osm::{OsmNode, OsmWay};
use std::{path::PathBuf, time::Instant};

use super::OsmDataReaderError;

/// Reads named highways and their nodes from a PBF extract clipped to one city.
pub struct PbfReader<'a> {
    map_data: &'a mut StreetGraph,
    file_name: &'a PathBuf,
}

impl<'a> PbfReader<'a> {
    pub fn new(map_data: &'a mut StreetGraph, file_name: &'a PathBuf) -> Self {
        Self {
            map_data,
            file_name,
        }
    }

    pub fn read(self) -> Result<(), OsmDataReaderError> {
        let read_start = Instant::now();

        let r = std::fs::File::open(self.file_name)
            .map_err(|error| OsmDataReaderError::PbfFileOpenError { error })?;
        let mut pbf = osmpbfreader::OsmPbfReader::new(r);

        let elements = pbf
            .get_objs_and_deps(|obj| {
                obj.is_way()
                    && obj.tags().contains_key("highway")
                    && obj.tags().contains_key("name")
            })
            .map_err(|error| OsmDataReaderError::PbfFileReadError { error })?;

        for (_id, element) in elements {
            if element.is_node() {
                let node = element.node().ok_or(OsmDataReaderError::PbfFileError {
                    error: String::from("expected node, did not get it"),
                })?;
                self.map_data.insert_node(OsmNode {
                    id: node.id.0 as u64,
                    lat: node.lat(),
                    lon: node.lon(),
                });
            } else if element.is_way() {
                let way = element.way().ok_or(OsmDataReaderError::PbfFileError {
                    error: String::from("expected way, did not get it"),
                })?;
                self.map_data.insert_way(OsmWay {
                    id: way.id.0 as u64,
                    point_ids: way.nodes.iter().map(|v| v.0 as u64).collect(),
                    tags: Some(
                        way.tags
                            .iter()
                            .map(|v| (v.0.to_string(), v.1.to_string()))
                            .collect(),
                    ),
                });
            }
        }

        let read_duration = read_start.elapsed();
        trace!(
            nodes = self.map_data.node_count(),
            ways = self.map_data.way_count(),
            "PBF read took {} seconds",
            read_duration.as_secs()
        );

        Ok(())
    }
}
