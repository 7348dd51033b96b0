use std::{
    collections::HashMap,
    num::{ParseFloatError, ParseIntError},
    str::Utf8Error,
};

use json_tools::{Buffer, BufferType, Lexer, TokenType};

use crate::map_data::osm::{OsmNode, OsmWay};

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum OsmJsonParserError {
    #[error("Unexpected token {token:?} in context: {context}")]
    UnexpectedToken { token: TokenType, context: String },

    #[error("Failed to parse UTF-8: {error}")]
    Utf8ParseError { error: Utf8Error },

    #[error("Failed to decode JSON string {value}: {error}")]
    StringDecodeError { value: String, error: String },

    #[error("Unexpected buffer type")]
    UnexpectedBuffer,

    #[error("Array found in root context")]
    ArrayFoundInRoot,

    #[error("Failed to parse element ID: {error}")]
    FailedToParseId { error: ParseIntError },

    #[error("Failed to parse latitude: {error}")]
    FailedToParseLat { error: ParseFloatError },

    #[error("Failed to parse longitude: {error}")]
    FailedToParseLon { error: ParseFloatError },

    #[error("Unknown element type: {element_type}")]
    UnknownElementType { element_type: String },

    #[error("Missing element type for element: {element:?}")]
    MissingElementType { element: OsmElement },

    #[error("Missing value '{value}' for element type '{element_type}'")]
    MissingValueForElement { element_type: String, value: String },

    #[error("Parser in error state: {error}")]
    ParserInErrorState { error: Box<OsmJsonParserError> },

    #[error("Element is not a node")]
    ElementIsNotNode,

    #[error("Element is not a way")]
    ElementIsNotWay,
}

#[derive(Debug, PartialEq, Clone)]
pub enum OsmElementType {
    Node,
    Way,
    Relation,
}

/// One entry of the Overpass `elements` array, filled in token by token.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct OsmElement {
    element_type: Option<OsmElementType>,
    id: Option<u64>,
    tags: Option<HashMap<String, String>>,
    nodes: Option<Vec<u64>>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl OsmElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_element_type(&self) -> Result<OsmElementType, OsmJsonParserError> {
        self.element_type
            .to_owned()
            .ok_or(OsmJsonParserError::MissingElementType {
                element: self.clone(),
            })
    }

    pub fn get_node_element(&self) -> Result<OsmNode, OsmJsonParserError> {
        if let Ok(OsmElementType::Node) = self.get_element_type() {
            return Ok(OsmNode {
                id: self.id.ok_or(OsmJsonParserError::MissingValueForElement {
                    element_type: String::from("node"),
                    value: String::from("id"),
                })?,
                lat: self.lat.ok_or(OsmJsonParserError::MissingValueForElement {
                    element_type: String::from("node"),
                    value: String::from("lat"),
                })?,
                lon: self.lon.ok_or(OsmJsonParserError::MissingValueForElement {
                    element_type: String::from("node"),
                    value: String::from("lon"),
                })?,
            });
        }

        Err(OsmJsonParserError::ElementIsNotNode)
    }

    pub fn get_way_element(&self) -> Result<OsmWay, OsmJsonParserError> {
        if let Ok(OsmElementType::Way) = self.get_element_type() {
            return Ok(OsmWay {
                id: self.id.ok_or(OsmJsonParserError::MissingValueForElement {
                    element_type: String::from("way"),
                    value: String::from("id"),
                })?,
                point_ids: self.nodes.clone().ok_or(
                    OsmJsonParserError::MissingValueForElement {
                        element_type: String::from("way"),
                        value: String::from("nodes"),
                    },
                )?,
                tags: self.tags.clone(),
            });
        }

        Err(OsmJsonParserError::ElementIsNotWay)
    }
}

#[derive(Debug, PartialEq)]
enum ParserStateLocation {
    InObject(Option<String>),
    InList(String),
}

/// Streaming parser for Overpass JSON output, fed one line at a time.
///
/// Only the `elements` array is interpreted. After the first error every
/// following call fails with `ParserInErrorState`.
#[derive(Debug, Default)]
pub struct OsmJsonParser {
    location: Vec<ParserStateLocation>,
    prev_key: Option<String>,
    prev_string: Option<String>,
    current_element: Option<OsmElement>,
    prev_error: Option<OsmJsonParserError>,
}

impl OsmJsonParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_line(&mut self, line: Vec<u8>) -> Result<Vec<OsmElement>, OsmJsonParserError> {
        let parse_result = self.parse_line_internal(line);
        if let Err(error) = parse_result {
            match error {
                OsmJsonParserError::ParserInErrorState { error: _ } => {}
                _ => self.prev_error = Some(error.clone()),
            };
            return Err(error);
        }
        parse_result
    }

    fn parse_line_internal(
        &mut self,
        line: Vec<u8>,
    ) -> Result<Vec<OsmElement>, OsmJsonParserError> {
        if let Some(error) = &self.prev_error {
            return Err(OsmJsonParserError::ParserInErrorState {
                error: Box::new(error.clone()),
            });
        }
        let mut osm_elements = Vec::new();
        for token in Lexer::new(line, BufferType::Bytes(0)) {
            match token.kind {
                TokenType::BracketOpen => self.set_bracket_open()?,
                TokenType::BracketClose => self.set_bracket_close()?,
                TokenType::CurlyOpen => self.set_curly_open(),
                TokenType::CurlyClose => {
                    if let Some(element) = self.set_curly_close()? {
                        osm_elements.push(element);
                    }
                }
                TokenType::Colon => self.prev_key = self.prev_string.take(),
                TokenType::Comma => self.prev_string = None,
                TokenType::String | TokenType::Number => {
                    let Buffer::MultiByte(buf) = token.buf else {
                        return Err(OsmJsonParserError::UnexpectedBuffer);
                    };
                    let raw = std::str::from_utf8(&buf)
                        .map_err(|error| OsmJsonParserError::Utf8ParseError { error })?;
                    let val = if token.kind == TokenType::String {
                        serde_json::from_str::<String>(raw).map_err(|error| {
                            OsmJsonParserError::StringDecodeError {
                                value: raw.to_string(),
                                error: error.to_string(),
                            }
                        })?
                    } else {
                        raw.to_string()
                    };

                    if self.prev_key.is_some() {
                        self.check_update_current_element(&val)?;
                        if !self.is_in_nodes_list() {
                            self.prev_key = None;
                        }
                    }
                    self.prev_string = Some(val);
                }
                _ => {}
            }
        }

        Ok(osm_elements)
    }

    fn check_update_current_element(&mut self, val: &str) -> Result<(), OsmJsonParserError> {
        if self.prev_string.is_some() {
            return Ok(());
        }
        let Some(key) = self.prev_key.clone() else {
            return Ok(());
        };
        let in_elements_obj = self.is_in_elements_obj();
        let in_tags_obj = self.is_in_tags_obj();
        let in_nodes_list = self.is_in_nodes_list();
        let Some(current_element) = self.current_element.as_mut() else {
            return Ok(());
        };

        if in_elements_obj {
            match key.as_str() {
                "type" => {
                    current_element.element_type = Some(match val {
                        "node" => OsmElementType::Node,
                        "way" => OsmElementType::Way,
                        "relation" => OsmElementType::Relation,
                        _ => {
                            return Err(OsmJsonParserError::UnknownElementType {
                                element_type: val.to_string(),
                            });
                        }
                    })
                }
                "id" => {
                    let id = val
                        .parse::<u64>()
                        .map_err(|error| OsmJsonParserError::FailedToParseId { error })?;
                    current_element.id = Some(id)
                }
                "lat" => {
                    let lat = val
                        .parse::<f64>()
                        .map_err(|error| OsmJsonParserError::FailedToParseLat { error })?;
                    current_element.lat = Some(lat)
                }
                "lon" => {
                    let lon = val
                        .parse::<f64>()
                        .map_err(|error| OsmJsonParserError::FailedToParseLon { error })?;
                    current_element.lon = Some(lon)
                }
                _ => {}
            }
        } else if in_tags_obj {
            current_element
                .tags
                .get_or_insert_with(HashMap::new)
                .insert(key, val.to_string());
        } else if in_nodes_list {
            let node_id = val
                .parse::<u64>()
                .map_err(|error| OsmJsonParserError::FailedToParseId { error })?;
            current_element
                .nodes
                .get_or_insert_with(Vec::new)
                .push(node_id);
        }

        Ok(())
    }

    fn set_bracket_open(&mut self) -> Result<(), OsmJsonParserError> {
        if let Some(key) = &self.prev_key {
            self.location
                .push(ParserStateLocation::InList(key.to_string()));
            return Ok(());
        }

        Err(OsmJsonParserError::ArrayFoundInRoot)
    }

    fn set_bracket_close(&mut self) -> Result<(), OsmJsonParserError> {
        if let Some(loc) = self.location.last() {
            if let ParserStateLocation::InList(_) = *loc {
                self.location.pop();
            } else {
                return Err(OsmJsonParserError::UnexpectedToken {
                    token: TokenType::BracketClose,
                    context: String::from("not in a list"),
                });
            }
        }
        Ok(())
    }

    fn set_curly_open(&mut self) {
        self.location
            .push(ParserStateLocation::InObject(self.prev_key.clone()));
        if self.current_element.is_none() && self.is_in_elements_obj() {
            self.current_element = Some(OsmElement::new());
        }
        self.prev_key = None;
        self.prev_string = None;
    }

    fn set_curly_close(&mut self) -> Result<Option<OsmElement>, OsmJsonParserError> {
        if let Some(loc) = self.location.last() {
            if let ParserStateLocation::InObject(loc_key) = loc {
                self.prev_key = loc_key.clone();
                self.location.pop();
            } else {
                return Err(OsmJsonParserError::UnexpectedToken {
                    token: TokenType::CurlyClose,
                    context: String::from("not in a object"),
                });
            }
        }
        self.prev_string = None;

        if self.is_in_elements_list() {
            return Ok(self.current_element.take());
        }

        Ok(None)
    }

    fn is_in_elements_list(&self) -> bool {
        matches!(
            self.location.as_slice(),
            [
                ParserStateLocation::InObject(None),
                ParserStateLocation::InList(list_key),
            ] if list_key == "elements"
        )
    }

    fn is_in_elements_obj(&self) -> bool {
        matches!(
            self.location.as_slice(),
            [
                ParserStateLocation::InObject(None),
                ParserStateLocation::InList(list_key),
                ParserStateLocation::InObject(Some(obj_key)),
            ] if list_key == "elements" && obj_key == "elements"
        )
    }

    fn is_in_tags_obj(&self) -> bool {
        matches!(
            self.location.as_slice(),
            [
                ParserStateLocation::InObject(None),
                ParserStateLocation::InList(list_key),
                ParserStateLocation::InObject(Some(obj_key)),
                ParserStateLocation::InObject(Some(tags_key)),
            ] if list_key == "elements" && obj_key == "elements" && tags_key == "tags"
        )
    }

    fn is_in_nodes_list(&self) -> bool {
        matches!(
            self.location.as_slice(),
            [
                ParserStateLocation::InObject(None),
                ParserStateLocation::InList(list_key),
                ParserStateLocation::InObject(Some(obj_key)),
                ParserStateLocation::InList(nodes_key),
            ] if list_key == "elements" && obj_key == "elements" && nodes_key == "nodes"
        )
    }
}
