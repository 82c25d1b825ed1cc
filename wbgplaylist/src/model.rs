//! Channel model shared by the XSPF parser and the M3U renderer
//!
//! A [`Channel`] is created once per parsed track and shared through `Arc`
//! between the [`Catalog`] and every [`ChannelGroup`] that lists it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use wbgutils::SocketAddress;

/// Provider's numeric track identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub i64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A TV channel and the multicast group it is broadcast on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    /// Trimmed display name
    pub name: String,
    /// Multicast group address
    pub address: SocketAddress,
}

impl Channel {
    pub fn new(id: ChannelId, name: impl Into<String>, address: SocketAddress) -> Self {
        Self {
            id,
            name: name.into(),
            address,
        }
    }
}

/// A named group of channels, in source document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    pub name: String,
    pub channels: Vec<Arc<Channel>>,
}

impl ChannelGroup {
    pub fn new(name: impl Into<String>, channels: Vec<Arc<Channel>>) -> Self {
        Self {
            name: name.into(),
            channels,
        }
    }
}

/// Channels indexed by id, used to resolve group membership
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    channels: HashMap<ChannelId, Arc<Channel>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a channel, returning the one previously stored under the same id
    pub fn insert(&mut self, channel: Channel) -> Option<Arc<Channel>> {
        self.channels.insert(channel.id, Arc::new(channel))
    }

    pub fn get(&self, id: ChannelId) -> Option<&Arc<Channel>> {
        self.channels.get(&id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Iterates over the channels in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Channel>> {
        self.channels.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: i64, name: &str) -> Channel {
        Channel::new(ChannelId(id), name, SocketAddress::new("239.0.0.1", 1234))
    }

    #[test]
    fn test_catalog_last_insert_wins() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert(channel(1, "First")).is_none());
        let previous = catalog.insert(channel(1, "Second")).unwrap();

        assert_eq!(previous.name, "First");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(ChannelId(1)).unwrap().name, "Second");
    }

    #[test]
    fn test_groups_share_channels() {
        let mut catalog = Catalog::new();
        catalog.insert(channel(7, "News"));
        let shared = catalog.get(ChannelId(7)).unwrap().clone();

        let a = ChannelGroup::new("A", vec![shared.clone()]);
        let b = ChannelGroup::new("B", vec![shared]);

        assert!(Arc::ptr_eq(&a.channels[0], &b.channels[0]));
        assert!(Arc::ptr_eq(&a.channels[0], catalog.get(ChannelId(7)).unwrap()));
    }

    #[test]
    fn test_negative_ids() {
        let mut catalog = Catalog::new();
        catalog.insert(channel(-1, "Minus one"));
        assert_eq!(catalog.get(ChannelId(-1)).unwrap().name, "Minus one");
        assert!(catalog.get(ChannelId(1)).is_none());
        assert_eq!(ChannelId(-1).to_string(), "-1");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.get(ChannelId(0)).is_none());
        assert_eq!(catalog.iter().count(), 0);
    }
}
