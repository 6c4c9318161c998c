//! Zip archive helpers: unpack downloaded bundles, pack directories.

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};

/// Unpack an in-memory zip archive into `dest`, creating it if needed.
///
/// Returns the number of entries in the archive.
pub fn extract_bytes(bytes: &[u8], dest: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::archive_invalid(e.to_string(), Some("open zip".to_string())))?;

    fs::create_dir_all(dest).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", dest.display())))
    })?;

    let count = archive.len();
    archive.extract(dest).map_err(|e| {
        Error::archive_invalid(e.to_string(), Some(format!("extract into {}", dest.display())))
    })?;

    Ok(count)
}

/// Write `dir` into a new zip file at `archive_path`.
///
/// Entries are stored under the directory's own name, matching what
/// `7z a -tzip <archive> <dir>` produces.
pub fn zip_directory(dir: &Path, archive_path: &Path) -> Result<usize> {
    let root_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| {
            Error::validation_invalid_argument(
                "dir",
                format!("Cannot archive path without a name: {}", dir.display()),
                None,
                None,
            )
        })?;

    let file = File::create(archive_path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", archive_path.display())))
    })?;

    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0;
    add_dir(&mut writer, dir, &root_name, options, &mut count)?;

    writer
        .finish()
        .map_err(|e| Error::archive_invalid(e.to_string(), Some("finish zip".to_string())))?;

    Ok(count)
}

fn add_dir(
    writer: &mut ZipWriter<File>,
    dir: &Path,
    prefix: &str,
    options: FileOptions,
    count: &mut usize,
) -> Result<()> {
    writer
        .add_directory(format!("{}/", prefix), options)
        .map_err(|e| Error::archive_invalid(e.to_string(), Some(prefix.to_string())))?;

    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("read {}", dir.display()))))?
        .filter_map(|entry| entry.ok())
        .collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = format!("{}/{}", prefix, entry.file_name().to_string_lossy());

        if path.is_dir() {
            add_dir(writer, &path, &name, options, count)?;
            continue;
        }

        writer
            .start_file(name.as_str(), file_options_for(&path, options))
            .map_err(|e| Error::archive_invalid(e.to_string(), Some(name.clone())))?;
        let mut source = File::open(&path).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("open {}", path.display())))
        })?;
        io::copy(&mut source, writer)
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("write {}", name))))?;
        *count += 1;
    }

    Ok(())
}

#[cfg(unix)]
fn file_options_for(path: &Path, options: FileOptions) -> FileOptions {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(meta) => options.unix_permissions(meta.permissions().mode()),
        Err(_) => options,
    }
}

#[cfg(not(unix))]
fn file_options_for(_path: &Path, options: FileOptions) -> FileOptions {
    options
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Build an in-memory zip holding `files` as (name, contents) pairs.
    pub(crate) fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        for (name, contents) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extract_bytes_unpacks_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("SuperSlicer_2.5.59_win64_240110");
        let bytes = zip_bytes(&[("superslicer.exe", "MZ"), ("resources/a.ini", "x=1")]);

        let count = extract_bytes(&bytes, &dest).unwrap();

        assert_eq!(count, 2);
        assert_eq!(fs::read_to_string(dest.join("superslicer.exe")).unwrap(), "MZ");
        assert!(dest.join("resources").join("a.ini").is_file());
    }

    #[test]
    fn extract_bytes_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let err = extract_bytes(b"not a zip", dir.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "archive.invalid");
    }

    #[test]
    fn zip_directory_nests_entries_under_dir_name() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("bundle");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a.txt"), "a").unwrap();
        fs::write(dir.join("sub").join("b.txt"), "b").unwrap();

        let archive_path = root.path().join("bundle.zip");
        let count = zip_directory(&dir, &archive_path).unwrap();
        assert_eq!(count, 2);

        let mut archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["bundle/", "bundle/a.txt", "bundle/sub/", "bundle/sub/b.txt"]
        );
    }
}
