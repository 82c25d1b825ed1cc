//! M3U playlist rendering
//!
//! Each channel is written as an `#EXTINF` line carrying its group, followed
//! by the stream URL:
//!
//! ```text
//! #EXTM3U
//! #EXTINF:0 group-title="News",Channel One
//! udp://@239.1.1.1:1234
//! ```
//!
//! Files are rendered into a temporary file next to the destination and
//! renamed over it on [`StagedPlaylist::commit`], so a destination is either
//! left untouched or fully replaced.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use wbgutils::SocketAddress;

use crate::error::{Error, Result};
use crate::model::ChannelGroup;

/// What each channel entry points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistTarget {
    /// Raw multicast group: `udp://@host:port`
    Multicast,
    /// Multicast group relayed by an HTTP proxy: `http://proxy/udp/host:port`
    Unicast { proxy: SocketAddress },
}

impl PlaylistTarget {
    /// Stream URL for a channel broadcast on `address`
    pub fn stream_url(&self, address: &SocketAddress) -> String {
        match self {
            PlaylistTarget::Multicast => format!("udp://@{}", address),
            PlaylistTarget::Unicast { proxy } => format!("http://{}/udp/{}", proxy, address),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaylistTarget::Multicast => "multicast",
            PlaylistTarget::Unicast { .. } => "unicast",
        }
    }
}

/// Items in input order, or stably sorted by name
fn ordered<'a, T>(items: &'a [T], sort_by_name: bool, name: impl Fn(&T) -> &str) -> Vec<&'a T> {
    let mut view: Vec<&T> = items.iter().collect();
    if sort_by_name {
        view.sort_by(|a, b| name(*a).cmp(name(*b)));
    }
    view
}

/// Writes the playlist to `writer`
///
/// With `sort_by_name`, groups are sorted by name and channels by name within
/// each group. Otherwise the input order is kept. The groups themselves are
/// never modified.
pub fn render<W: Write>(
    writer: &mut W,
    groups: &[ChannelGroup],
    target: &PlaylistTarget,
    sort_by_name: bool,
) -> io::Result<()> {
    writeln!(writer, "#EXTM3U")?;

    for group in ordered(groups, sort_by_name, |g| g.name.as_str()) {
        for channel in ordered(&group.channels, sort_by_name, |c| c.name.as_str()) {
            writeln!(
                writer,
                "#EXTINF:0 group-title=\"{}\",{}",
                group.name, channel.name
            )?;
            writeln!(writer, "{}", target.stream_url(&channel.address))?;
        }
    }

    Ok(())
}

/// A fully rendered playlist waiting to be moved onto its destination
///
/// Dropping it without calling [`commit`](Self::commit) removes the
/// temporary file and leaves the destination untouched.
#[derive(Debug)]
pub struct StagedPlaylist {
    file: NamedTempFile,
    destination: PathBuf,
}

impl StagedPlaylist {
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Atomically replaces the destination with the rendered playlist
    pub fn commit(self) -> Result<PathBuf> {
        let StagedPlaylist { file, destination } = self;
        file.persist(&destination).map_err(|err| Error::Write {
            path: destination.clone(),
            source: err.error,
        })?;
        debug!(path = %destination.display(), "Playlist written");
        Ok(destination)
    }
}

/// Renders the playlist into a temporary file in the destination directory
pub fn stage(
    path: &Path,
    groups: &[ChannelGroup],
    target: &PlaylistTarget,
    sort_by_name: bool,
) -> Result<StagedPlaylist> {
    let write_error = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".wbg-").suffix(".m3u.tmp");
    // Mode de création d'un fichier ordinaire, filtré par l'umask
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder.tempfile_in(dir).map_err(write_error)?;

    fill(file.as_file_mut(), path, groups, target, sort_by_name).map_err(write_error)?;
    debug!(kind = target.label(), path = %path.display(), "Playlist rendered");

    Ok(StagedPlaylist {
        file,
        destination: path.to_path_buf(),
    })
}

fn fill(
    file: &mut File,
    destination: &Path,
    groups: &[ChannelGroup],
    target: &PlaylistTarget,
    sort_by_name: bool,
) -> io::Result<()> {
    // un fichier remplacé garde ses permissions
    if let Ok(existing) = fs::metadata(destination) {
        file.set_permissions(existing.permissions())?;
    }

    let mut writer = BufWriter::new(&mut *file);
    render(&mut writer, groups, target, sort_by_name)?;
    writer.flush()?;
    drop(writer);
    file.sync_all()
}

/// Renders and writes a playlist in one step
pub fn write_playlist(
    path: &Path,
    groups: &[ChannelGroup],
    target: &PlaylistTarget,
    sort_by_name: bool,
) -> Result<PathBuf> {
    stage(path, groups, target, sort_by_name)?.commit()
}
