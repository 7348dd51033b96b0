use std::{io::BufReader, time::Duration};

use reqwest::{blocking::Client, StatusCode};
use tracing::{debug, info};

use crate::map_data::graph::StreetGraph;

use super::{json_reader::JsonReader, OsmDataReaderError};

pub const DEFAULT_OVERPASS_URL: &str = "http://overpass-api.de/api/interpreter";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum OverpassError {
    #[error("Failed to build HTTP client: {error}")]
    ClientBuild { error: reqwest::Error },

    #[error("Request to {url} failed: {error}")]
    Request { url: String, error: reqwest::Error },

    #[error("Overpass returned status {status} for '{city}'")]
    Status { city: String, status: StatusCode },
}

/// Named highways inside the city's administrative boundary, plus their nodes.
pub fn city_query(city: &str) -> String {
    let city = city.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        r#"[out:json];
area["name"="{city}"]["admin_level"~"^(7|8)$"]["boundary"="administrative"]->.city;
(
  way(area.city)["highway"]["name"];
);
out body;
>;
out skel qt;
"#
    )
}

pub struct OverpassClient {
    client: Client,
    url: String,
}

impl OverpassClient {
    pub fn new(url: &str) -> Result<Self, OverpassError> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| OverpassError::ClientBuild { error })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    #[tracing::instrument(skip(self, map_data))]
    pub fn fetch_city(&self, city: &str, map_data: &mut StreetGraph) -> Result<(), OsmDataReaderError> {
        info!(url = %self.url, "Downloading street data");
        let query = city_query(city);
        debug!(query = %query, "Overpass query");

        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query)])
            .send()
            .map_err(|error| OsmDataReaderError::Overpass {
                error: OverpassError::Request {
                    url: self.url.clone(),
                    error,
                },
            })?;

        if !response.status().is_success() {
            return Err(OsmDataReaderError::Overpass {
                error: OverpassError::Status {
                    city: city.to_string(),
                    status: response.status(),
                },
            });
        }

        JsonReader::new(map_data, BufReader::new(response)).read()
    }
}
