use std::{fs::File, io::BufReader};

use tracing::info;

use crate::map_data::graph::StreetGraph;

use super::{
    json_reader::JsonReader, overpass::OverpassClient, pbf_reader::PbfReader, DataSource,
    OsmDataReaderError,
};

pub struct OsmDataReader {
    source: DataSource,
    map_data: StreetGraph,
}

impl OsmDataReader {
    pub fn new(data_source: DataSource) -> Self {
        Self {
            map_data: StreetGraph::new(),
            source: data_source,
        }
    }

    #[tracing::instrument(skip(self), fields(source = ?self.source))]
    pub fn read_data(mut self) -> Result<StreetGraph, OsmDataReaderError> {
        match self.source {
            DataSource::JsonFile { ref file } => {
                let file = File::open(file).map_err(|error| OsmDataReaderError::FileError { error })?;
                JsonReader::new(&mut self.map_data, BufReader::new(file)).read()?;
            }
            DataSource::PbfFile { ref file } => {
                PbfReader::new(&mut self.map_data, file).read()?;
            }
            DataSource::Overpass { ref city, ref url } => {
                OverpassClient::new(url)
                    .map_err(|error| OsmDataReaderError::Overpass { error })?
                    .fetch_city(city, &mut self.map_data)?;
            }
        };

        info!(
            nodes = self.map_data.node_count(),
            ways = self.map_data.way_count(),
            skipped_unnamed_ways = self.map_data.skipped_unnamed_ways(),
            "Street data loaded"
        );

        Ok(self.map_data)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::test_utils::get_test_data_osm_json;

    use super::*;

    #[test]
    fn reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(get_test_data_osm_json().join("\n").as_bytes())
            .unwrap();

        let graph = OsmDataReader::new(DataSource::JsonFile {
            file: file.path().to_path_buf(),
        })
        .read_data()
        .unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.way_count(), 2);
    }

    #[test]
    fn missing_json_file_fails() {
        let res = OsmDataReader::new(DataSource::JsonFile {
            file: "/nonexistent/street-dups/city.json".into(),
        })
        .read_data();

        assert!(matches!(res, Err(OsmDataReaderError::FileError { .. })));
    }

    #[test]
    fn missing_pbf_file_fails() {
        let res = OsmDataReader::new(DataSource::PbfFile {
            file: "/nonexistent/street-dups/city.osm.pbf".into(),
        })
        .read_data();

        assert!(matches!(
            res,
            Err(OsmDataReaderError::PbfFileOpenError { .. })
        ));
    }
}
