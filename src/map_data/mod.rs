pub mod graph;
pub mod osm;
pub mod point;
