//! Error types for the playlist loader

use std::num::ParseIntError;
use std::path::PathBuf;

use wbgutils::AddressError;

use crate::model::ChannelId;

/// Result type alias for playlist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching, parsing or rendering a playlist
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (unreachable host, non-2xx status, timeout...)
    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// Local source file could not be read
    #[error("failed to read {}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source document is not well-formed XML
    #[error("{url} is not a valid XML document")]
    Xml {
        url: String,
        #[source]
        source: xmltree::ParseError,
    },

    /// An expected element is missing
    #[error("missing <{element}> in {context}")]
    MissingElement {
        element: &'static str,
        context: String,
    },

    /// An expected attribute is missing
    #[error("missing attribute '{attribute}' on <{element}> in {context}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        context: String,
    },

    /// `<location>` text is not of the form `scheme://@host:port`
    #[error("invalid location {value:?} in {context}")]
    InvalidLocation {
        value: String,
        context: String,
        #[source]
        reason: LocationError,
    },

    /// `<vlc:id>` text is not an integer
    #[error("invalid channel id {value:?} in {context}")]
    InvalidChannelId {
        value: String,
        context: String,
        #[source]
        source: ParseIntError,
    },

    /// A track has no `<vlc:id>`
    #[error("{context} ({title:?}) has no channel id")]
    MissingChannelId { context: String, title: String },

    /// A group member `tid` is not an integer
    #[error("invalid tid {value:?} in group {group:?}")]
    InvalidMemberId {
        group: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// A group references a channel id absent from the catalog
    #[error("group {group:?} references unknown channel {id}")]
    UnknownChannel { group: String, id: ChannelId },

    /// Writing an output playlist failed
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a `<location>` value was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// No `@` separating the scheme from the address
    #[error("expected 'scheme://@host:port'")]
    MissingAt,
    /// The address part could not be parsed
    #[error(transparent)]
    Address(AddressError),
}
