//! XSPF channel list parsing
//!
//! The Weburg.tv playlist is an XSPF document with VLC extensions:
//!
//! ```xml
//! <playlist xmlns="http://xspf.org/ns/0/"
//!           xmlns:vlc="http://www.videolan.org/vlc/playlist/ns/0/">
//!   <trackList>
//!     <track>
//!       <title>Channel One</title>
//!       <location>udp://@239.1.1.1:1234</location>
//!       <extension application="http://www.videolan.org/vlc/playlist/0">
//!         <vlc:id>0</vlc:id>
//!       </extension>
//!     </track>
//!   </trackList>
//!   <extension application="http://www.videolan.org/vlc/playlist/0">
//!     <vlc:node title="General">
//!       <vlc:item tid="0"/>
//!     </vlc:node>
//!   </extension>
//! </playlist>
//! ```
//!
//! Tracks become the [`Catalog`], `vlc:node` elements become the
//! [`ChannelGroup`]s. Elements are matched on namespace URI and local name,
//! so any prefix used by the document is accepted.

use tracing::{debug, warn};
use wbgutils::xml::{attribute, children_named, find_child, trimmed_text, xml_children};
use wbgutils::SocketAddress;
use xmltree::Element;

use crate::error::{Error, LocationError, Result};
use crate::model::{Catalog, Channel, ChannelGroup, ChannelId};

/// XSPF playlist namespace
pub const XSPF_NAMESPACE: &str = "http://xspf.org/ns/0/";

/// VLC playlist extension namespace
pub const VLC_NAMESPACE: &str = "http://www.videolan.org/vlc/playlist/ns/0/";

/// Namespace bindings used to query the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    pub xspf: String,
    pub vlc: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            xspf: XSPF_NAMESPACE.to_string(),
            vlc: VLC_NAMESPACE.to_string(),
        }
    }
}

/// Trimmed document `<title>`, if any
pub fn document_title(root: &Element, ns: &Namespaces) -> Option<String> {
    find_child(root, &ns.xspf, "title")
        .map(trimmed_text)
        .filter(|title| !title.is_empty())
}

/// Builds the channel catalog from `trackList/track` elements
///
/// A repeated channel id replaces the earlier track (a warning is logged).
/// A track without `vlc:id` is rejected.
pub fn build_catalog(root: &Element, ns: &Namespaces) -> Result<Catalog> {
    let mut track_lists = children_named(root, &ns.xspf, "trackList").peekable();
    if track_lists.peek().is_none() {
        return Err(Error::MissingElement {
            element: "trackList",
            context: "playlist".to_string(),
        });
    }

    let mut catalog = Catalog::new();
    let tracks = track_lists.flat_map(|list| children_named(list, &ns.xspf, "track"));

    for (index, track) in tracks.enumerate() {
        let channel = parse_track(track, index + 1, ns)?;
        let id = channel.id;
        if let Some(previous) = catalog.insert(channel) {
            warn!(
                id = %id,
                replaced = %previous.name,
                "Duplicate channel id, keeping the last track"
            );
        }
    }

    Ok(catalog)
}

fn parse_track(track: &Element, position: usize, ns: &Namespaces) -> Result<Channel> {
    let context = format!("track #{}", position);

    let mut id: Option<ChannelId> = None;
    let mut name: Option<String> = None;
    let mut address: Option<SocketAddress> = None;

    for child in xml_children(track) {
        if child.namespace.as_deref() != Some(ns.xspf.as_str()) {
            continue;
        }
        match child.name.as_str() {
            "title" => name = Some(trimmed_text(child)),
            "location" => address = Some(parse_location(&trimmed_text(child), &context)?),
            "extension" => {
                if let Some(id_elem) = find_child(child, &ns.vlc, "id") {
                    id = Some(parse_channel_id(&trimmed_text(id_elem), &context)?);
                }
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| Error::MissingElement {
        element: "title",
        context: context.clone(),
    })?;
    let address = address.ok_or_else(|| Error::MissingElement {
        element: "location",
        context: context.clone(),
    })?;
    let id = id.ok_or_else(|| Error::MissingChannelId {
        context,
        title: name.clone(),
    })?;

    Ok(Channel::new(id, name, address))
}

/// Extracts the multicast address from `scheme://@host:port`
///
/// ```
/// use wbgplaylist::xspf::parse_location;
///
/// let addr = parse_location("rtp://@239.1.1.1:1234", "track #1").unwrap();
/// assert_eq!(addr.host(), "239.1.1.1");
/// assert_eq!(addr.port(), 1234);
/// ```
pub fn parse_location(value: &str, context: &str) -> Result<SocketAddress> {
    let invalid = |reason| Error::InvalidLocation {
        value: value.to_string(),
        context: context.to_string(),
        reason,
    };

    let (_scheme, address) = value
        .split_once('@')
        .ok_or_else(|| invalid(LocationError::MissingAt))?;

    SocketAddress::parse(address).map_err(|err| invalid(LocationError::Address(err)))
}

fn parse_channel_id(value: &str, context: &str) -> Result<ChannelId> {
    value
        .parse::<i64>()
        .map(ChannelId)
        .map_err(|source| Error::InvalidChannelId {
            value: value.to_string(),
            context: context.to_string(),
            source,
        })
}

/// Builds the channel groups from `extension/vlc:node` elements
///
/// Every child of a node is a membership entry whose `tid` must name a
/// channel of `catalog`.
pub fn build_groups(root: &Element, ns: &Namespaces, catalog: &Catalog) -> Result<Vec<ChannelGroup>> {
    let nodes = children_named(root, &ns.xspf, "extension")
        .flat_map(|extension| children_named(extension, &ns.vlc, "node"));

    let mut groups = Vec::new();
    for (index, node) in nodes.enumerate() {
        let name = attribute(node, "title")
            .map(|title| title.trim().to_string())
            .ok_or_else(|| Error::MissingAttribute {
                element: "node",
                attribute: "title",
                context: format!("group #{}", index + 1),
            })?;

        let mut channels = Vec::new();
        for item in xml_children(node) {
            let tid = attribute(item, "tid").ok_or_else(|| Error::MissingAttribute {
                element: "item",
                attribute: "tid",
                context: format!("group {:?}", name),
            })?;
            let id = tid
                .trim()
                .parse::<i64>()
                .map(ChannelId)
                .map_err(|source| Error::InvalidMemberId {
                    group: name.clone(),
                    value: tid.to_string(),
                    source,
                })?;
            let channel = catalog.get(id).ok_or_else(|| Error::UnknownChannel {
                group: name.clone(),
                id,
            })?;
            channels.push(channel.clone());
        }

        debug!(group = %name, channels = channels.len(), "Parsed channel group");
        groups.push(ChannelGroup::new(name, channels));
    }

    Ok(groups)
}
