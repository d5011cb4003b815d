use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};

use crate::configuration::Config;

pub const OUTPUT_DIR_NAME: &str = "icons";

/// Directory holding the running executable.
pub fn program_directory() -> Result<PathBuf, Error> {
    let exe = env::current_exe().context("failed to locate the running executable")?;

    exe.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("executable {} has no parent directory", exe.display()))
}

/// Picks the output directory: `--out-dir`, then the config, then
/// `<program directory>/icons`. The result is always absolute.
pub fn resolve_output_dir(out_dir: Option<&Path>, config: &Config) -> Result<PathBuf, Error> {
    let dir = match out_dir.or(config.output_dir.as_deref()) {
        Some(dir) => dir.to_path_buf(),
        None => program_directory()?.join(OUTPUT_DIR_NAME),
    };

    std::path::absolute(&dir)
        .with_context(|| format!("failed to make {} absolute", dir.display()))
}
