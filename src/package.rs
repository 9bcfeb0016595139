//! Zip package I/O for OOXML documents.
//!
//! A [`Package`] holds every member of the container in memory, in archive
//! order, so a tool can swap out one or two parts and write an equivalent
//! container back. Members that are not replaced keep their bytes and their
//! compression method.

use crate::error::{Result, ToolkitError};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// One member of a zip package.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
    pub is_dir: bool,
}

/// An unpacked zip package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: Vec<PackageEntry>,
}

impl Package {
    /// Open and fully read a package from disk.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolkitError::InputNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::from_reader(file).map_err(|e| match e {
            ToolkitError::Packaging(msg) => {
                ToolkitError::Packaging(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Read every member of a zip archive, preserving order.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: entry.name().to_string(),
                data,
                compression: entry.compression(),
                is_dir: entry.is_dir(),
            });
        }
        log::debug!("Unpacked {} package members", entries.len());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw bytes of a member, if present.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name && !e.is_dir)
            .map(|e| e.data.as_slice())
    }

    /// A member decoded as UTF-8. `Ok(None)` when the member is absent.
    pub fn part_text(&self, name: &str) -> Result<Option<String>> {
        match self.part(name) {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| ToolkitError::Packaging(format!("{} is not valid UTF-8", name))),
            None => Ok(None),
        }
    }

    /// Replace the bytes of an existing member. Returns false if there is no
    /// member with that name.
    pub fn replace_part(&mut self, name: &str, data: Vec<u8>) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name && !e.is_dir) {
            Some(entry) => {
                entry.data = data;
                true
            }
            None => false,
        }
    }

    /// Write the package as a zip archive. Stored members stay stored,
    /// everything else is deflated.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = zip::ZipWriter::new(writer);
        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let opts = SimpleFileOptions::default().compression_method(method);
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), opts)?;
            } else {
                zip.start_file(entry.name.as_str(), opts)?;
                zip.write_all(&entry.data)?;
            }
        }
        Ok(zip.finish()?)
    }

    /// Repack into a scratch directory next to `path`, then swap the result
    /// over `path`.
    pub fn save_atomic(&self, path: &Path) -> Result<()> {
        replace_file_atomically(path, |staged| {
            let file = File::create(staged)?;
            let mut file = self.write_to(file)?;
            file.flush()?;
            Ok(())
        })
    }
}

/// Produce a replacement for `target` with `write` and move it into place.
///
/// The staging file lives in a temporary directory in the same parent
/// directory as `target`, so the final rename never crosses filesystems. The
/// directory is removed on every exit path, and `target` is only touched once
/// `write` has fully succeeded. A symlinked `target` is followed and the file
/// it points at is replaced; an existing file keeps its permissions.
pub fn replace_file_atomically<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let resolved = std::fs::canonicalize(target).unwrap_or_else(|_| target.to_path_buf());
    let target = resolved.as_path();
    let permissions = std::fs::metadata(target).ok().map(|m| m.permissions());

    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let work_dir = tempfile::Builder::new()
        .prefix(".docsmith-")
        .tempdir_in(parent)?;
    let file_name = target
        .file_name()
        .ok_or_else(|| ToolkitError::Packaging(format!("{} has no file name", target.display())))?;
    let staged = work_dir.path().join(file_name);

    write(&staged)?;
    if let Some(permissions) = permissions {
        std::fs::set_permissions(&staged, permissions)?;
    }
    std::fs::rename(&staged, target)?;
    log::debug!("Replaced {} atomically", target.display());
    Ok(())
}
