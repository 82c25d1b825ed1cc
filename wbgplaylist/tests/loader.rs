use std::fs;
use std::path::{Path, PathBuf};

use wbgplaylist::{LoaderOptions, Stage, run};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/weburg.xspf")
}

fn options_in(dir: &Path, source: &Path) -> LoaderOptions {
    let mut options = LoaderOptions::new("192.168.0.10", 4022);
    options.url = format!("file://{}", source.display());
    options.multicast_playlist = dir.join("Playlist (multicast).m3u");
    options.unicast_playlist = dir.join("PlayList (unicast).m3u");
    options
}

#[test]
fn converts_fixture_in_source_order() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let summary = run(options_in(dir.path(), &fixture()))?;

    assert_eq!(summary.channels, 5);
    assert_eq!(summary.groups, 2);

    let multicast = fs::read_to_string(&summary.multicast_playlist)?;
    assert_eq!(
        multicast,
        "#EXTM3U\n\
         #EXTINF:0 group-title=\"Новости\",Euronews\n\
         udp://@239.1.1.2:1234\n\
         #EXTINF:0 group-title=\"Новости\",Bloomberg\n\
         udp://@239.1.1.4:5000\n\
         #EXTINF:0 group-title=\"General\",Eurosport\n\
         udp://@239.1.1.3:5000\n\
         #EXTINF:0 group-title=\"General\",Первый канал\n\
         udp://@239.1.1.1:1234\n"
    );
    assert_eq!(multicast.lines().count(), 1 + 4 * 2);

    let unicast = fs::read_to_string(&summary.unicast_playlist)?;
    let urls: Vec<&str> = unicast.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(
        urls,
        vec![
            "http://192.168.0.10:4022/udp/239.1.1.2:1234",
            "http://192.168.0.10:4022/udp/239.1.1.4:5000",
            "http://192.168.0.10:4022/udp/239.1.1.3:5000",
            "http://192.168.0.10:4022/udp/239.1.1.1:1234",
        ]
    );
    assert_eq!(unicast.lines().count(), 9);

    Ok(())
}

#[test]
fn sort_by_name_orders_groups_and_channels() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut options = options_in(dir.path(), &fixture());
    options.sort_by_name = true;
    let summary = run(options)?;

    let multicast = fs::read_to_string(&summary.multicast_playlist)?;
    let entries: Vec<(&str, &str)> = multicast
        .lines()
        .filter_map(|l| l.strip_prefix("#EXTINF:0 group-title=\""))
        .filter_map(|l| l.split_once("\","))
        .collect();

    assert_eq!(
        entries,
        vec![
            ("General", "Eurosport"),
            ("General", "Первый канал"),
            ("Новости", "Bloomberg"),
            ("Новости", "Euronews"),
        ]
    );

    let mut sorted = entries.clone();
    sorted.sort();
    assert_eq!(entries, sorted);

    Ok(())
}

#[test]
fn repeated_runs_are_byte_identical() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    let first = run(options_in(dir.path(), &fixture()))?;
    let first_multicast = fs::read(&first.multicast_playlist)?;
    let first_unicast = fs::read(&first.unicast_playlist)?;

    let second = run(options_in(dir.path(), &fixture()))?;
    assert_eq!(fs::read(&second.multicast_playlist)?, first_multicast);
    assert_eq!(fs::read(&second.unicast_playlist)?, first_unicast);

    Ok(())
}

#[test]
fn unknown_member_writes_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let broken = fs::read_to_string(fixture())?.replace(r#"tid="3""#, r#"tid="99""#);
    let source = dir.path().join("broken.xspf");
    fs::write(&source, broken)?;

    let options = options_in(dir.path(), &source);
    let err = run(options.clone()).unwrap_err();

    assert_eq!(err.stage, Stage::Groups);
    assert!(err.source.to_string().contains("unknown channel 99"));
    assert!(!options.multicast_playlist.exists());
    assert!(!options.unicast_playlist.exists());
    // seul le document source reste dans le répertoire
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);

    Ok(())
}

#[test]
fn failed_run_keeps_previous_playlists() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let good = run(options_in(dir.path(), &fixture()))?;
    let previous = fs::read(&good.multicast_playlist)?;

    let source = dir.path().join("bad.xspf");
    fs::write(&source, fs::read_to_string(fixture())?.replace("239.1.1.4:5000", "239.1.1.4"))?;

    let err = run(options_in(dir.path(), &source)).unwrap_err();
    assert_eq!(err.stage, Stage::Catalog);
    assert_eq!(fs::read(&good.multicast_playlist)?, previous);

    Ok(())
}

#[test]
fn render_failure_leaves_no_partial_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut options = options_in(dir.path(), &fixture());
    options.unicast_playlist = dir.path().join("missing-dir").join("unicast.m3u");

    let err = run(options.clone()).unwrap_err();
    assert_eq!(err.stage, Stage::Render);
    assert!(!options.multicast_playlist.exists());

    Ok(())
}
