use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct OsmNode {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OsmWay {
    pub id: u64,
    pub point_ids: Vec<u64>,
    pub tags: Option<HashMap<String, String>>,
}

impl OsmWay {
    pub fn street_name(&self) -> Option<&str> {
        self.tags
            .as_ref()
            .and_then(|tags| tags.get("name"))
            .map(|name| name.as_str())
            .filter(|name| !name.trim().is_empty())
    }
}
