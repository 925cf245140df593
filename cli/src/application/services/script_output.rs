//! Application service: saving rendered scripts to a directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chefboot_common::Group;

use crate::application::ports::{ProgressReporter, ScriptWriter};
use crate::domain::render::RenderedScript;

/// `<out_dir>/<group>.<ext>`, where the extension follows the script's family.
///
/// # Errors
///
/// Returns an error if the group name cannot be used as a file name.
pub fn script_path(out_dir: &Path, group: &Group, script: &RenderedScript) -> Result<PathBuf> {
    let name = group.as_str();
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', ':', '\0'])
    {
        anyhow::bail!("group '{group}' cannot be used as a file name");
    }
    Ok(out_dir.join(format!("{name}.{}", script.family.script_extension())))
}

/// Write each script to its path under `out_dir`.
///
/// Existing files are only replaced when `overwrite` approves the path;
/// declined paths are skipped with a warning.
///
/// # Errors
///
/// Returns an error on the first path that cannot be derived or written.
pub async fn write_scripts(
    writer: &impl ScriptWriter,
    reporter: &impl ProgressReporter,
    out_dir: &Path,
    scripts: &[(Group, RenderedScript)],
    overwrite: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(scripts.len());
    for (group, script) in scripts {
        let path = script_path(out_dir, group, script)?;
        if writer.exists(&path).await && !overwrite(&path) {
            reporter.warn(&format!("kept existing {}", path.display()));
            continue;
        }
        reporter.step(&format!("writing {}", path.display()));
        writer
            .write_script(&path, script.as_str())
            .await
            .with_context(|| format!("failed to write boot script for group '{group}'"))?;
        tracing::debug!(%group, path = %path.display(), "wrote boot script");
        written.push(path);
    }
    Ok(written)
}
