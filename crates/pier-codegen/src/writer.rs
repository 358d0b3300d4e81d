//! Staged writing of generated files.
//!
//! Every changed file is first written to a temporary file next to its
//! target, then all of them are renamed into place. A failure while staging
//! leaves the directory as it was. Files whose content did not change are not
//! touched, so their modification times survive and watchers stay quiet.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tempfile::NamedTempFile;

use crate::error::CodegenError;
use crate::render::GeneratedFile;

/// What a write pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Files created or replaced.
    pub written: usize,
    /// Files left alone because their content matched.
    pub unchanged: usize,
    /// Stale files removed.
    pub removed: usize,
}

struct Staged {
    temp: NamedTempFile,
    target: PathBuf,
}

/// Write `files` under `dir` and remove everything else in it.
///
/// Staged files are renamed into place one at a time. If a rename fails,
/// the files renamed before it keep their new content and the rest keep
/// their old content.
///
/// # Errors
///
/// Returns [`CodegenError::Io`] when a directory or file cannot be created,
/// renamed or removed.
pub fn write_files(dir: &Path, files: &[GeneratedFile]) -> Result<WriteSummary, CodegenError> {
    let start = Instant::now();
    fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;

    let staged: Vec<Option<Staged>> = files
        .par_iter()
        .map(|file| stage(dir, file))
        .collect::<Result<_, _>>()?;

    let mut summary = WriteSummary::default();
    for staged in staged {
        let Some(Staged { temp, target }) = staged else {
            summary.unchanged += 1;
            continue;
        };
        temp.persist(&target)
            .map_err(|err| io_error(&target, err.error))?;
        summary.written += 1;
    }

    let keep: HashSet<PathBuf> = files.iter().map(|f| dir.join(&f.path)).collect();
    summary.removed = remove_stale(dir, &keep)?;

    tracing::info!(
        dir = %dir.display(),
        written = summary.written,
        unchanged = summary.unchanged,
        removed = summary.removed,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Generated files written"
    );
    Ok(summary)
}

/// Prepare a temporary file for `file`, or `None` when the target is current.
fn stage(dir: &Path, file: &GeneratedFile) -> Result<Option<Staged>, CodegenError> {
    let target = dir.join(&file.path);
    if let Ok(existing) = fs::read(&target)
        && existing == file.content.as_bytes()
    {
        return Ok(None);
    }

    let parent = target.parent().unwrap_or(dir);
    fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    let mut temp = NamedTempFile::new_in(parent).map_err(|source| io_error(parent, source))?;
    temp.write_all(file.content.as_bytes())
        .map_err(|source| io_error(&target, source))?;
    // Temporary files are created owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|source| io_error(&target, source))?;
    }
    Ok(Some(Staged { temp, target }))
}

/// Remove files not in `keep`, then directories left empty.
fn remove_stale(dir: &Path, keep: &HashSet<PathBuf>) -> Result<usize, CodegenError> {
    let mut removed = 0;
    let entries = fs::read_dir(dir).map_err(|source| io_error(dir, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| io_error(dir, source))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| io_error(&path, source))?;

        if file_type.is_dir() {
            removed += remove_stale(&path, keep)?;
            let is_empty = fs::read_dir(&path)
                .map_err(|source| io_error(&path, source))?
                .next()
                .is_none();
            if is_empty {
                fs::remove_dir(&path).map_err(|source| io_error(&path, source))?;
            }
        } else if !keep.contains(&path) {
            fs::remove_file(&path).map_err(|source| io_error(&path, source))?;
            tracing::debug!(path = %path.display(), "Removed stale generated file");
            removed += 1;
        }
    }
    Ok(removed)
}

fn io_error(path: &Path, source: std::io::Error) -> CodegenError {
    CodegenError::Io {
        path: path.to_path_buf(),
        source,
    }
}
