//! End-to-end conversion: fetch, parse, render both playlists
//!
//! The document is fetched and parsed once; the multicast and unicast
//! playlists are rendered from the same groups. Both files are fully staged
//! before either one replaces its destination, so a failing run never leaves
//! a half-written playlist behind.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;
use wbgutils::SocketAddress;

use crate::error::Error;
use crate::m3u::{self, PlaylistTarget};
use crate::source::{self, DEFAULT_FETCH_TIMEOUT, DEFAULT_SOURCE_URL};
use crate::xspf::{self, Namespaces};

/// Default multicast playlist file name
pub const DEFAULT_MULTICAST_PLAYLIST: &str = "Playlist (multicast).m3u";

/// Default unicast playlist file name
pub const DEFAULT_UNICAST_PLAYLIST: &str = "PlayList (unicast).m3u";

/// Options of one conversion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Source XSPF document (URL, `file://` URL or path)
    pub url: String,
    /// Unicast proxy host
    pub host: String,
    /// Unicast proxy port
    pub port: u16,
    pub multicast_playlist: PathBuf,
    pub unicast_playlist: PathBuf,
    /// Sort groups, and channels within groups, by name
    pub sort_by_name: bool,
    pub fetch_timeout: Duration,
}

impl LoaderOptions {
    /// Options with the default source and output names
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            host: host.into(),
            port,
            multicast_playlist: PathBuf::from(DEFAULT_MULTICAST_PLAYLIST),
            unicast_playlist: PathBuf::from(DEFAULT_UNICAST_PLAYLIST),
            sort_by_name: false,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn proxy_address(&self) -> SocketAddress {
        SocketAddress::new(self.host.clone(), self.port)
    }
}

/// Pipeline step where a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Catalog,
    Groups,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Catalog => "catalog",
            Stage::Groups => "groups",
            Stage::Render => "render",
        };
        f.write_str(name)
    }
}

/// A failed run, tagged with the stage that failed
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed")]
pub struct LoaderError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

fn at(stage: Stage) -> impl FnOnce(Error) -> LoaderError {
    move |source| LoaderError { stage, source }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub channels: usize,
    pub groups: usize,
    pub multicast_playlist: PathBuf,
    pub unicast_playlist: PathBuf,
}

/// Runs the whole conversion
pub fn run(options: LoaderOptions) -> Result<RunSummary, LoaderError> {
    let root = source::fetch_document(&options.url, options.fetch_timeout).map_err(at(Stage::Fetch))?;

    let ns = Namespaces::default();
    if let Some(title) = xspf::document_title(&root, &ns) {
        info!(title = %title, "Source playlist");
    }
    let catalog = xspf::build_catalog(&root, &ns).map_err(at(Stage::Catalog))?;
    info!(channels = catalog.len(), "Channel catalog built");

    let groups = xspf::build_groups(&root, &ns, &catalog).map_err(at(Stage::Groups))?;
    info!(groups = groups.len(), "Channel groups built");

    let sort = options.sort_by_name;
    let unicast_target = PlaylistTarget::Unicast {
        proxy: options.proxy_address(),
    };
    let multicast = m3u::stage(&options.multicast_playlist, &groups, &PlaylistTarget::Multicast, sort)
        .map_err(at(Stage::Render))?;
    let unicast = m3u::stage(&options.unicast_playlist, &groups, &unicast_target, sort)
        .map_err(at(Stage::Render))?;

    let multicast_playlist = multicast.commit().map_err(at(Stage::Render))?;
    info!(path = %multicast_playlist.display(), "Multicast playlist written");
    let unicast_playlist = unicast.commit().map_err(at(Stage::Render))?;
    info!(path = %unicast_playlist.display(), proxy = %options.proxy_address(), "Unicast playlist written");

    Ok(RunSummary {
        channels: catalog.len(),
        groups: groups.len(),
        multicast_playlist,
        unicast_playlist,
    })
}
