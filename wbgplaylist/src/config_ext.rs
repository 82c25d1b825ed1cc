//! Extension pour lire les options du loader depuis wbgconfig
//!
//! Ce module fournit le trait `PlaylistConfigExt` qui ajoute à
//! `wbgconfig::Config` des getters typés pour la source, le proxy et les
//! fichiers de sortie.
//!
//! # Exemple
//!
//! ```no_run
//! use wbgconfig::Config;
//! use wbgplaylist::PlaylistConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load_config("")?;
//! let options = config.loader_options()?;
//! println!("proxy: {}", options.proxy_address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use wbgconfig::Config;

use crate::loader::{DEFAULT_MULTICAST_PLAYLIST, DEFAULT_UNICAST_PLAYLIST, LoaderOptions};
use crate::source::{DEFAULT_FETCH_TIMEOUT, DEFAULT_SOURCE_URL};

/// Trait d'extension pour la configuration du loader
///
/// Chaque getter retombe sur la valeur par défaut du loader quand la clé est
/// absente ou nulle, sauf l'hôte et le port du proxy qui n'en ont pas.
pub trait PlaylistConfigExt {
    /// URL (ou chemin) de la playlist XSPF source
    fn get_source_url(&self) -> Result<String>;

    /// Timeout global du téléchargement
    fn get_fetch_timeout(&self) -> Result<Duration>;

    /// Hôte du proxy unicast, s'il est configuré
    fn get_proxy_host(&self) -> Result<Option<String>>;

    /// Port du proxy unicast, s'il est configuré
    fn get_proxy_port(&self) -> Result<Option<u16>>;

    fn get_multicast_playlist(&self) -> Result<PathBuf>;

    fn get_unicast_playlist(&self) -> Result<PathBuf>;

    /// Tri des groupes et chaînes par nom
    fn get_sort_by_name(&self) -> Result<bool>;

    /// Assemble les options complètes d'un run
    ///
    /// Échoue si l'hôte ou le port du proxy ne sont pas configurés.
    fn loader_options(&self) -> Result<LoaderOptions>;
}

impl PlaylistConfigExt for Config {
    fn get_source_url(&self) -> Result<String> {
        Ok(self
            .get_string(&["source", "url"])?
            .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()))
    }

    fn get_fetch_timeout(&self) -> Result<Duration> {
        Ok(self
            .get_u64(&["source", "timeout_secs"])?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT))
    }

    fn get_proxy_host(&self) -> Result<Option<String>> {
        self.get_string(&["proxy", "host"])
    }

    fn get_proxy_port(&self) -> Result<Option<u16>> {
        match self.get_u64(&["proxy", "port"])? {
            Some(port) => u16::try_from(port)
                .map(Some)
                .with_context(|| format!("proxy.port {} is out of range", port)),
            None => Ok(None),
        }
    }

    fn get_multicast_playlist(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(
            self.get_string(&["output", "multicast_playlist"])?
                .unwrap_or_else(|| DEFAULT_MULTICAST_PLAYLIST.to_string()),
        ))
    }

    fn get_unicast_playlist(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(
            self.get_string(&["output", "unicast_playlist"])?
                .unwrap_or_else(|| DEFAULT_UNICAST_PLAYLIST.to_string()),
        ))
    }

    fn get_sort_by_name(&self) -> Result<bool> {
        Ok(self.get_bool(&["output", "sort_by_name"])?.unwrap_or(false))
    }

    fn loader_options(&self) -> Result<LoaderOptions> {
        let host = self
            .get_proxy_host()?
            .ok_or_else(|| anyhow!("proxy host is not configured"))?;
        let port = self
            .get_proxy_port()?
            .ok_or_else(|| anyhow!("proxy port is not configured"))?;

        let mut options = LoaderOptions::new(host, port);
        options.url = self.get_source_url()?;
        options.fetch_timeout = self.get_fetch_timeout()?;
        options.multicast_playlist = self.get_multicast_playlist()?;
        options.unicast_playlist = self.get_unicast_playlist()?;
        options.sort_by_name = self.get_sort_by_name()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wbgconfig::Config;

    fn empty_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_proxy_is_required() {
        let (_dir, config) = empty_config();
        let err = config.loader_options().unwrap_err();
        assert!(err.to_string().contains("proxy host"));
    }

    #[test]
    fn test_options_from_values() -> Result<()> {
        let (_dir, config) = empty_config();
        config.set_value(&["proxy", "host"], "10.0.0.1".into())?;
        config.set_value(&["proxy", "port"], 4022.into())?;
        config.set_value(&["output", "sort_by_name"], true.into())?;
        config.set_value(&["source", "timeout_secs"], 5.into())?;

        let options = config.loader_options()?;
        assert_eq!(options.proxy_address().to_string(), "10.0.0.1:4022");
        assert!(options.sort_by_name);
        assert_eq!(options.fetch_timeout, Duration::from_secs(5));
        assert_eq!(options.unicast_playlist, PathBuf::from(DEFAULT_UNICAST_PLAYLIST));
        Ok(())
    }

    #[test]
    fn test_port_out_of_range() -> Result<()> {
        let (_dir, config) = empty_config();
        config.set_value(&["proxy", "port"], 70000.into())?;
        assert!(config.get_proxy_port().is_err());
        Ok(())
    }
}
