use super::linear::LinearClient;
use super::{Archive, ArchiveService, CommandRunner, ExecOptions};
use crate::error::{ExportError, Result};
use crate::types::ZIP_EXCLUDE_PATTERNS;
use std::path::Path;

const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Zips a directory with the `zip` CLI and uploads the result as a Linear
/// file attachment.
pub struct ZipArchiver<'a, R: CommandRunner> {
    runner: R,
    linear: &'a LinearClient,
}

impl<'a, R: CommandRunner> ZipArchiver<'a, R> {
    pub fn new(runner: R, linear: &'a LinearClient) -> Self {
        Self { runner, linear }
    }

    fn zip(&self, source_dir: &Path, output_path: &Path) -> Result<Archive> {
        // `zip -r` updates an existing archive in place.
        if output_path.exists() {
            std::fs::remove_file(output_path)?;
        }
        let output = output_path.to_string_lossy();
        let mut args = vec!["-r", output.as_ref(), ".", "-x"];
        args.extend_from_slice(ZIP_EXCLUDE_PATTERNS);

        self.runner
            .run("zip", &args, &ExecOptions::in_dir(source_dir))
            .map_err(|e| ExportError::wrap("Failed to create workspace zip", e))?;

        let bytes = std::fs::read(output_path)?;
        let size_bytes = bytes.len() as u64;
        Ok(Archive { bytes, size_bytes })
    }
}

impl<R: CommandRunner> ArchiveService for ZipArchiver<'_, R> {
    fn archive(&self, source_dir: &Path, output_path: &Path) -> Result<Archive> {
        self.zip(source_dir, output_path).map_err(|e| match e {
            ExportError::Io(io) => ExportError::wrap("Failed to create workspace zip", io),
            other => other,
        })
    }

    fn upload(&self, archive: &Archive, filename: &str) -> Result<String> {
        let target = self
            .linear
            .request_upload(ZIP_CONTENT_TYPE, filename, archive.size_bytes)?;
        self.linear
            .put_upload(&target, ZIP_CONTENT_TYPE, &archive.bytes)?;
        Ok(target.asset_url)
    }
}
