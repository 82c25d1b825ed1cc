use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Erreurs de lecture d'une adresse `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("missing ':' between host and port in {0:?}")]
    MissingPort(String),

    #[error("invalid port {port:?} in {input:?}")]
    InvalidPort {
        input: String,
        port: String,
        #[source]
        source: ParseIntError,
    },
}

/// Adresse réseau sous forme hôte + port.
///
/// L'hôte n'est pas validé : il peut s'agir d'une IPv4, d'un nom DNS ou de
/// n'importe quel texte fourni par la playlist source. La représentation
/// textuelle est toujours `host:port`, aussi bien pour la cible multicast
/// que pour le segment de chemin du proxy et l'affichage du proxy lui-même.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocketAddress {
    host: String,
    port: u16,
}

impl SocketAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse une adresse `host:port`, en coupant sur le *premier* `:`.
    ///
    /// ```
    /// use wbgutils::SocketAddress;
    ///
    /// let addr = SocketAddress::parse("239.1.1.1:1234").unwrap();
    /// assert_eq!(addr.host(), "239.1.1.1");
    /// assert_eq!(addr.port(), 1234);
    /// ```
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let input = input.trim();
        let (host, port) = input
            .split_once(':')
            .ok_or_else(|| AddressError::MissingPort(input.to_string()))?;

        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|source| AddressError::InvalidPort {
                input: input.to_string(),
                port: port.to_string(),
                source,
            })?;

        Ok(Self::new(host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for SocketAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
