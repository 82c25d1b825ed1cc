//! Weburg.tv playlist conversion library
//!
//! This crate turns the XSPF channel list published by Weburg.tv into M3U
//! playlists usable by IPTV players.
//!
//! # Features
//!
//! - **XSPF parsing**: channel catalog from the track list, channel groups
//!   from the VLC `node` extension, matched by namespace
//! - **Two playlist flavours**: raw multicast (`udp://@group:port`) and
//!   unicast through an HTTP proxy (`http://proxy/udp/group:port`)
//! - **Atomic output**: playlists are staged in temporary files and renamed
//!   into place
//! - **Configuration Extension**: typed loader options from `wbgconfig`
//!
//! # Example
//!
//! ```no_run
//! use wbgplaylist::{LoaderOptions, run};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut options = LoaderOptions::new("192.168.1.1", 4022);
//!     options.sort_by_name = true;
//!
//!     let summary = run(options)?;
//!     println!(
//!         "{} channels in {} groups written to {}",
//!         summary.channels,
//!         summary.groups,
//!         summary.unicast_playlist.display()
//!     );
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod m3u;
pub mod model;
pub mod source;
pub mod xspf;

#[cfg(feature = "wbgconfig")]
pub mod config_ext;

pub use error::{Error, LocationError, Result};
pub use loader::{LoaderError, LoaderOptions, RunSummary, Stage, run};
pub use m3u::{PlaylistTarget, StagedPlaylist, render, write_playlist};
pub use model::{Catalog, Channel, ChannelGroup, ChannelId};
pub use source::{DEFAULT_FETCH_TIMEOUT, DEFAULT_SOURCE_URL, fetch_document};
pub use xspf::{Namespaces, build_catalog, build_groups, document_title};

#[cfg(feature = "wbgconfig")]
pub use config_ext::PlaylistConfigExt;

pub use wbgutils::SocketAddress;
