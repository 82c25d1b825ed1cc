//! Utilitaires partagés par les crates Weburg.
//!
//! - [`SocketAddress`] : couple hôte/port tel qu'il apparaît dans les playlists
//!   (groupe multicast d'une chaîne, ou adresse du proxy unicast).
//! - [`xml`] : helpers de navigation `xmltree` sensibles aux namespaces.
//!
//! # Examples
//!
//! ```
//! use wbgutils::SocketAddress;
//!
//! let addr: SocketAddress = "239.1.1.1:1234".parse().unwrap();
//! assert_eq!(addr.to_string(), "239.1.1.1:1234");
//! ```

mod socket_address;
pub mod xml;

pub use socket_address::{AddressError, SocketAddress};
