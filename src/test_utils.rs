use std::collections::HashMap;

use crate::map_data::{
    graph::StreetGraph,
    osm::{OsmNode, OsmWay},
};

pub fn get_test_data() -> (Vec<OsmNode>, Vec<OsmWay>) {
    //                      11 ---------- 12      (Beta)
    //                      |
    //                      |                     (Alpha)
    //                      |
    //                      |    10
    //                      |    |                (Delta)
    //                      |    |
    //                      4 -- 8 -- 9           (Alpha, Gamma)
    //                      |    |
    //                 5 -- 3 -- 6 -- 7           (Beta)
    //                 |    |
    //                 |    2
    //                 |    |
    //                 '--- 1                     (unnamed 1 - 5)
    let nodes = [
        (1, 32.000, 34.800),
        (2, 32.001, 34.800),
        (3, 32.002, 34.800),
        (4, 32.003, 34.800),
        (5, 32.002, 34.799),
        (6, 32.002, 34.801),
        (7, 32.002, 34.802),
        (8, 32.004, 34.801),
        (9, 32.004, 34.802),
        (10, 32.005, 34.801),
        (11, 32.010, 34.800),
        (12, 32.010, 34.805),
    ]
    .iter()
    .map(|&(id, lat, lon)| OsmNode { id, lat, lon })
    .collect();

    let ways = vec![
        test_way(1, Some("Alpha"), vec![1, 2, 3, 4, 8]),
        test_way(2, Some("Beta"), vec![5, 3, 6, 7]),
        test_way(3, Some("Gamma"), vec![6, 8, 9]),
        test_way(4, Some("Delta"), vec![8, 10, 99]),
        test_way(5, Some("Alpha"), vec![4, 11]),
        test_way(6, Some("Beta"), vec![11, 12]),
        test_way(7, None, vec![1, 5]),
    ];

    (nodes, ways)
}

pub fn test_way(id: u64, name: Option<&str>, point_ids: Vec<u64>) -> OsmWay {
    let mut tags = HashMap::from([("highway".to_string(), "residential".to_string())]);
    if let Some(name) = name {
        tags.insert("name".to_string(), name.to_string());
    }
    OsmWay {
        id,
        point_ids,
        tags: Some(tags),
    }
}

pub fn graph_from_test_data() -> StreetGraph {
    let (nodes, ways) = get_test_data();
    let mut graph = StreetGraph::new();
    for node in nodes {
        graph.insert_node(node);
    }
    for way in ways {
        graph.insert_way(way);
    }
    graph
}

/// Builds a graph from `(id, lat, lon)` nodes and `(name, node ids)` ways.
pub fn street_graph(nodes: &[(u64, f64, f64)], ways: &[(&str, Vec<u64>)]) -> StreetGraph {
    let mut graph = StreetGraph::new();
    for &(id, lat, lon) in nodes {
        graph.insert_node(OsmNode { id, lat, lon });
    }
    for (idx, (name, point_ids)) in ways.iter().enumerate() {
        graph.insert_way(test_way(idx as u64 + 1, Some(*name), point_ids.clone()));
    }
    graph
}

pub fn get_test_data_osm_json() -> Vec<&'static str> {
    vec![
        r#"{"#,
        r#"  "version": 0.6,"#,
        r#"  "generator": "Overpass API 0.7.62.1 084b4234","#,
        r#"  "osm3s": {"#,
        r#"    "timestamp_osm_base": "2024-07-23T11:01:29Z","#,
        r#"    "timestamp_areas_base": "2024-07-23T10:12:08Z","#,
        r#"    "copyright": "The data included in this document is from www.openstreetmap.org. The data is made available under ODbL.""#,
        r#"  },"#,
        r#"  "elements": ["#,
        r#""#,
        r#"{"#,
        r#"  "type": "way","#,
        r#"  "id": 25378224,"#,
        r#"  "nodes": ["#,
        r#"    276513839,"#,
        r#"    276513840,"#,
        r#"    276513841"#,
        r#"  ],"#,
        r#"  "tags": {"#,
        r#"    "highway": "residential","#,
        r#"    "name": "רחוב הרצל""#,
        r#"  }"#,
        r#"},"#,
        r#"{"#,
        r#"  "type": "way","#,
        r#"  "id": 25378225,"#,
        r#"  "nodes": ["#,
        r#"    276513841,"#,
        r#"    276513842"#,
        r#"  ],"#,
        r#"  "tags": {"#,
        r#"    "highway": "tertiary","#,
        r#"    "name": "ויצמן""#,
        r#"  }"#,
        r#"},"#,
        r#"{"#,
        r#"  "type": "node","#,
        r#"  "id": 276513839,"#,
        r#"  "lat": 32.0853024,"#,
        r#"  "lon": 34.7818064"#,
        r#"},"#,
        r#"{"#,
        r#"  "type": "node","#,
        r#"  "id": 276513840,"#,
        r#"  "lat": 32.0861201,"#,
        r#"  "lon": 34.7820132"#,
        r#"},"#,
        r#"{"#,
        r#"  "type": "node","#,
        r#"  "id": 276513841,"#,
        r#"  "lat": 32.0870013,"#,
        r#"  "lon": 34.7823009"#,
        r#"},"#,
        r#"{"#,
        r#"  "type": "node","#,
        r#"  "id": 276513842,"#,
        r#"  "lat": 32.0871,"#,
        r#"  "lon": 34.7841"#,
        r#"},"#,
        r#"{"#,
        r#"  "type": "relation","#,
        r#"  "id": 14385700,"#,
        r#"  "members": ["#,
        r#"    {"#,
        r#"      "type": "way","#,
        r#"      "ref": 25378224,"#,
        r#"      "role": "from""#,
        r#"    }"#,
        r#"  ],"#,
        r#"  "tags": {"#,
        r#"    "restriction": "no_u_turn","#,
        r#"    "type": "restriction""#,
        r#"  }"#,
        r#"}"#,
        r#""#,
        r#"  ]"#,
        r#"}"#,
    ]
}
