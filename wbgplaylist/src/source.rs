//! Source document retrieval
//!
//! The XSPF document is read once, with a single blocking request. Besides
//! `http://` and `https://` URLs, `file://` URLs and plain paths are read
//! from disk, which allows converting a previously downloaded playlist.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};
use ureq::Agent;
use xmltree::Element;

use crate::error::{Error, Result};

/// Weburg.tv published playlist
pub const DEFAULT_SOURCE_URL: &str = "http://weburg.tv/playlist.vlc";

/// Default global timeout of the HTTP fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("weburg-loader/", env!("CARGO_PKG_VERSION"));

/// Fetches `url` and parses it as XML
pub fn fetch_document(url: &str, timeout: Duration) -> Result<Element> {
    match local_path(url) {
        Some(path) => {
            info!(path = %path.display(), "Reading playlist from file");
            let file = File::open(&path).map_err(|source| Error::ReadSource {
                path: path.clone(),
                source,
            })?;
            parse_xml(url, BufReader::new(file))
        }
        None => {
            info!(url, timeout_secs = timeout.as_secs(), "Fetching playlist");
            let agent = Agent::config_builder()
                .timeout_global(Some(timeout))
                .build();
            let agent: Agent = agent.into();
            let response = agent
                .get(url)
                .header("User-Agent", USER_AGENT)
                .call()
                .map_err(|source| Error::Fetch {
                    url: url.to_string(),
                    source: Box::new(source),
                })?;
            debug!(url, status = %response.status(), "Playlist response received");
            let (_parts, body) = response.into_parts();
            parse_xml(url, BufReader::new(body.into_reader()))
        }
    }
}

fn parse_xml<R: Read>(url: &str, reader: R) -> Result<Element> {
    Element::parse(reader).map_err(|source| Error::Xml {
        url: url.to_string(),
        source,
    })
}

/// Local path designated by `url`, if it is not a network URL
fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if url.contains("://") {
        None
    } else {
        Some(PathBuf::from(url))
    }
}
