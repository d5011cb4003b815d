use std::{
    fmt,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use base64::prelude::*;
use tracing::{debug, info, instrument};

/// 1x1 PNG used for every icon size.
pub const PLACEHOLDER_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

pub const DEFAULT_SIZES: [u32; 3] = [16, 48, 128];

pub fn decode_placeholder() -> Result<Vec<u8>, Error> {
    BASE64_STANDARD
        .decode(PLACEHOLDER_PNG_BASE64)
        .context("embedded placeholder icon is not valid base64")
}

pub fn icon_file_name(size: u32) -> String {
    format!("icon-{size}.png")
}

/// Writes `bytes` once per size into `dir`, creating the directory first.
///
/// `on_written` runs right after each file is closed, before the next size is
/// attempted. Existing files are overwritten. The first failure aborts the
/// loop and whatever was already written stays on disk.
#[instrument(skip(dir, bytes, on_written), fields(dir = %dir.display(), len = bytes.len()))]
pub fn write_icons(
    dir: &Path,
    sizes: &[u32],
    bytes: &[u8],
    mut on_written: impl FnMut(&Path),
) -> Result<Vec<PathBuf>, Error> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(sizes.len());

    for &size in sizes {
        let path = dir.join(icon_file_name(size));

        {
            let mut file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            file.write_all(bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }

        debug!(size, path = %path.display(), "wrote icon");
        on_written(&path);
        written.push(path);
    }

    info!(count = written.len(), "icons written");

    Ok(written)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconState {
    Ok,
    Missing,
    Mismatch,
}

impl fmt::Display for IconState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IconState::Ok => "ok",
            IconState::Missing => "missing",
            IconState::Mismatch => "mismatch",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconStatus {
    pub path: PathBuf,
    pub state: IconState,
}

#[instrument(skip(dir, bytes), fields(dir = %dir.display()), level = "debug")]
pub fn verify_icons(dir: &Path, sizes: &[u32], bytes: &[u8]) -> Result<Vec<IconStatus>, Error> {
    sizes
        .iter()
        .map(|&size| {
            let path = dir.join(icon_file_name(size));
            let state = match fs::read(&path) {
                Ok(contents) if contents == bytes => IconState::Ok,
                Ok(_) => IconState::Mismatch,
                Err(e) if e.kind() == ErrorKind::NotFound => IconState::Missing,
                Err(e) => {
                    return Err(Error::new(e).context(format!("failed to read {}", path.display())));
                }
            };
            debug!(path = %path.display(), %state, "checked icon");
            Ok(IconStatus { path, state })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn placeholder_decodes_to_png() {
        let bytes = decode_placeholder().unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);

        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (1, 1));
    }

    #[test]
    fn file_names_follow_size() {
        assert_eq!(icon_file_name(16), "icon-16.png");
        assert_eq!(icon_file_name(128), "icon-128.png");
    }

    #[test]
    fn creates_missing_directory_and_writes_every_size() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("icons");
        let bytes = decode_placeholder().unwrap();

        let written = write_icons(&dir, &DEFAULT_SIZES, &bytes, |_| {}).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["icon-16.png", "icon-48.png", "icon-128.png"]);
        for path in &written {
            assert_eq!(fs::read(path).unwrap(), bytes);
        }
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 3);
    }

    #[test]
    fn second_run_overwrites_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = decode_placeholder().unwrap();
        fs::write(tmp.path().join("icon-48.png"), b"stale").unwrap();

        write_icons(tmp.path(), &DEFAULT_SIZES, &bytes, |_| {}).unwrap();
        let again = write_icons(tmp.path(), &DEFAULT_SIZES, &bytes, |_| {}).unwrap();

        for path in &again {
            assert_eq!(fs::read(path).unwrap(), bytes);
        }
    }

    #[test]
    fn fails_when_directory_path_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("icons");
        fs::write(&blocker, b"not a directory").unwrap();

        let err = write_icons(&blocker, &DEFAULT_SIZES, b"x", |_| {}).unwrap_err();
        assert!(err.to_string().contains("failed to create output directory"));
    }

    #[test]
    fn failed_write_keeps_earlier_files_and_reports_them() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = decode_placeholder().unwrap();
        fs::create_dir(tmp.path().join("icon-128.png")).unwrap();

        let mut reported = Vec::new();
        let err = write_icons(tmp.path(), &DEFAULT_SIZES, &bytes, |p| {
            reported.push(p.to_path_buf())
        })
        .unwrap_err();
        assert!(err.to_string().contains("icon-128.png"));

        let kept = [tmp.path().join("icon-16.png"), tmp.path().join("icon-48.png")];
        assert_eq!(reported, kept);
        for path in &kept {
            assert_eq!(fs::read(path).unwrap(), bytes);
        }
    }

    #[test]
    fn verify_reports_missing_and_mismatched_files() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = decode_placeholder().unwrap();
        write_icons(tmp.path(), &DEFAULT_SIZES, &bytes, |_| {}).unwrap();

        fs::remove_file(tmp.path().join("icon-16.png")).unwrap();
        fs::write(tmp.path().join("icon-128.png"), b"changed").unwrap();

        let states: Vec<_> = verify_icons(tmp.path(), &DEFAULT_SIZES, &bytes)
            .unwrap()
            .into_iter()
            .map(|s| s.state)
            .collect();
        assert_eq!(
            states,
            [IconState::Missing, IconState::Ok, IconState::Mismatch]
        );
    }
}
