//! Saving generated archives to disk.
//!
//! Bytes are staged in a temp file next to the destination and renamed into
//! place. The staged file is owned by [`StagedArchive`], so it is removed on
//! every path that does not end in a successful rename.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

pub const ARCHIVE_EXTENSION: &str = "zip";

/// Used when the project name has no usable characters
pub const FALLBACK_FILE_STEM: &str = "generated_project";

const MAX_FILE_STEM_LEN: usize = 64;

/// Reduce a user-supplied project name to a safe file stem.
///
/// Keeps ASCII letters, digits, `-`, `_` and `.`; everything else becomes `_`.
/// Leading dots/underscores are dropped so the result can never be `..` or a
/// hidden file.
pub fn sanitize_project_name(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = replaced
        .trim_start_matches(['.', '_'])
        .trim_end_matches('.');
    let stem = &trimmed[..trimmed.len().min(MAX_FILE_STEM_LEN)];

    if stem.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// Archive bytes written to a temp file that has not been moved into place.
pub struct StagedArchive {
    file: NamedTempFile,
}

impl StagedArchive {
    pub fn stage(dir: &Path, bytes: &[u8]) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(".codebuddy-")
            .suffix(".part")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Move the staged bytes to `dest`, replacing any existing file.
    /// Consumes the handle; on failure the staged file is deleted.
    pub fn persist(self, dest: &Path) -> io::Result<PathBuf> {
        self.file.persist(dest).map_err(|e| e.error)?;
        Ok(dest.to_path_buf())
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    output_dir: PathBuf,
}

impl ArchiveWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn destination(&self, project_name: &str) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            sanitize_project_name(project_name),
            ARCHIVE_EXTENSION
        ))
    }

    pub fn save(&self, project_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let dest = self.destination(project_name);
        let staged = StagedArchive::stage(&self.output_dir, bytes)?;
        debug!(staged = %staged.path().display(), dest = %dest.display(), bytes = bytes.len(), "Saving archive");
        staged.persist(&dest)
    }
}
