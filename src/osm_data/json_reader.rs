use std::{io::BufRead, time::Instant};

use tracing::trace;

use crate::{map_data::graph::StreetGraph, osm_data::json_parser::OsmJsonParser};

use super::{
    json_parser::{OsmElement, OsmElementType},
    OsmDataReaderError,
};

/// Feeds Overpass JSON, line by line, into a street graph.
pub struct JsonReader<'a, R: BufRead> {
    map_data: &'a mut StreetGraph,
    reader: R,
}

impl<'a, R: BufRead> JsonReader<'a, R> {
    pub fn new(map_data: &'a mut StreetGraph, reader: R) -> Self {
        Self { map_data, reader }
    }

    pub fn read(mut self) -> Result<(), OsmDataReaderError> {
        let read_start = Instant::now();
        let mut parser_state = OsmJsonParser::new();

        let mut line = Vec::new();
        loop {
            line.clear();
            let len = self
                .reader
                .read_until(b'\n', &mut line)
                .map_err(|error| OsmDataReaderError::FileError { error })?;
            if len == 0 {
                break;
            }
            let elements = parser_state
                .parse_line(line.clone())
                .map_err(|error| OsmDataReaderError::ParserError { error })?;
            self.process_elements(elements)?;
        }

        let read_duration = read_start.elapsed();
        trace!(
            read_duration_ms = read_duration.as_millis(),
            nodes = self.map_data.node_count(),
            ways = self.map_data.way_count(),
            "JSON read done"
        );

        Ok(())
    }

    fn process_elements(&mut self, elements: Vec<OsmElement>) -> Result<(), OsmDataReaderError> {
        for element in elements {
            match element
                .get_element_type()
                .map_err(|error| OsmDataReaderError::ParserError { error })?
            {
                OsmElementType::Node => {
                    let node = element
                        .get_node_element()
                        .map_err(|error| OsmDataReaderError::ParserError { error })?;
                    self.map_data.insert_node(node);
                }
                OsmElementType::Way => {
                    let way = element
                        .get_way_element()
                        .map_err(|error| OsmDataReaderError::ParserError { error })?;
                    self.map_data.insert_way(way);
                }
                OsmElementType::Relation => {}
            }
        }
        Ok(())
    }
}
