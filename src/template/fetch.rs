use std::io::Read;
use std::path::PathBuf;

use flate2::read::GzDecoder;

use crate::error::{Result, SproutError};
use crate::registry::{Registry, TemplateRef};
use crate::template::scratch::ScratchDir;

/// Gunzip and untar `reader` into the scratch directory.
///
/// Entries that would land outside the destination are rejected by `tar`.
pub fn extract_archive<R: Read>(reader: R, scratch: &ScratchDir) -> Result<()> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);
    archive
        .unpack(scratch.path())
        .map_err(|e| SproutError::Extract {
            path: scratch.path().to_path_buf(),
            source: e,
        })
}

/// Fetch a template package and return the root of its extracted content.
///
/// Lookup, download and extraction failures are all fatal; there is no retry.
pub fn fetch_template(
    registry: &dyn Registry,
    template: &TemplateRef,
    scratch: &ScratchDir,
) -> Result<PathBuf> {
    let detail = registry.package_detail(template)?;
    let tarball = detail.tarball()?;
    let body = registry.download(tarball)?;

    scratch.acquire()?;
    extract_archive(body, scratch)?;

    let root = scratch.package_root();
    if !root.is_dir() {
        return Err(SproutError::MalformedArchive { path: root });
    }
    Ok(root)
}
