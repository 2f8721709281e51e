//! Function packaging: one flat zip archive per function directory.

use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Directories with this suffix (`__pycache__`, ...) are never packaged.
const SKIPPED_SUFFIX: &str = "__";

/// A packaged function ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArchive {
    /// Archive file name, `<dir><buildId>.zip`.
    pub file_name: String,
    pub path: PathBuf,
}

/// Sub-directories of `functions_dir` that hold function sources, sorted.
pub fn function_dirs(functions_dir: &Path) -> Result<Vec<PathBuf>> {
    if !functions_dir.is_dir() {
        bail!("functions directory not found: {}", functions_dir.display());
    }

    let mut dirs: Vec<PathBuf> = WalkDir::new(functions_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter(|e| !e.file_name().to_string_lossy().ends_with(SKIPPED_SUFFIX))
        .map(|e| e.into_path())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Remove `.zip` files left in `functions_dir` by earlier runs.
pub fn remove_stale_archives(functions_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(functions_dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "zip") {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
            removed += 1;
        }
    }
    if removed > 0 {
        debug!("Removed {} stale archives", removed);
    }
    Ok(removed)
}

/// Zip every file below `source` into one archive, keyed by base name only.
pub fn zip_directory(source: &Path) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut seen = HashSet::new();

    let mut files = Vec::new();
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", source.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();

    for file in files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !seen.insert(name.clone()) {
            bail!(
                "{} contains more than one file named {}; archives are flat",
                source.display(),
                name
            );
        }

        let content = fs::read(&file).with_context(|| format!("failed to read {}", file.display()))?;
        writer
            .start_file(name.as_str(), options)
            .with_context(|| format!("failed to add {} to archive", name))?;
        writer.write_all(&content)?;
    }

    let finished = writer.finish().context("failed to finish archive")?;
    Ok(finished.into_inner())
}

/// Package every function directory as `<dir><build_id>.zip` inside
/// `functions_dir`, after removing stale archives.
pub fn package_functions(functions_dir: &Path, build_id: &str) -> Result<Vec<FunctionArchive>> {
    let dirs = function_dirs(functions_dir)?;
    remove_stale_archives(functions_dir)?;

    let mut archives = Vec::new();
    for dir in dirs {
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{}{}.zip", dir_name, build_id);
        let path = functions_dir.join(&file_name);

        let bytes = zip_directory(&dir)?;
        fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
        info!("Packaged {} ({} bytes)", file_name, bytes.len());

        archives.push(FunctionArchive { file_name, path });
    }
    Ok(archives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn archive_names(path: &Path) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    fn layout() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("dummyfunction_src")).unwrap();
        fs::write(root.join("dummyfunction_src/app.py"), "def handler(): pass").unwrap();
        fs::create_dir_all(root.join("layer_src/python")).unwrap();
        fs::write(root.join("layer_src/python/helpers.py"), "x = 1").unwrap();
        fs::create_dir_all(root.join("__pycache__")).unwrap();
        fs::write(root.join("__pycache__/app.pyc"), "").unwrap();
        fs::write(root.join("upload_functions.py"), "").unwrap();
        temp
    }

    #[test]
    fn test_function_dirs_skip_dunder_and_files() {
        let temp = layout();
        let dirs = function_dirs(temp.path()).unwrap();

        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["dummyfunction_src", "layer_src"]);
    }

    #[test]
    fn test_package_functions_flattens_paths() {
        let temp = layout();
        let archives = package_functions(temp.path(), "abc123").unwrap();

        assert_eq!(archives.len(), 2);
        assert_eq!(archives[0].file_name, "dummyfunction_srcabc123.zip");
        assert_eq!(archives[1].file_name, "layer_srcabc123.zip");
        assert_eq!(archive_names(&archives[1].path), vec!["helpers.py"]);
    }

    #[test]
    fn test_stale_archives_are_removed() {
        let temp = layout();
        fs::write(temp.path().join("dummyfunction_srcold.zip"), "stale").unwrap();

        package_functions(temp.path(), "new").unwrap();

        assert!(!temp.path().join("dummyfunction_srcold.zip").exists());
        assert!(temp.path().join("dummyfunction_srcnew.zip").exists());
    }

    #[test]
    fn test_duplicate_base_names_are_rejected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("fn_src");
        fs::create_dir_all(dir.join("a")).unwrap();
        fs::create_dir_all(dir.join("b")).unwrap();
        fs::write(dir.join("a/util.py"), "").unwrap();
        fs::write(dir.join("b/util.py"), "").unwrap();

        let err = zip_directory(&dir).unwrap_err();
        assert!(err.to_string().contains("util.py"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_packaged() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("fn_src");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("app.py"), "import shared").unwrap();
        fs::write(temp.path().join("shared.py"), "VALUE = 1").unwrap();
        std::os::unix::fs::symlink("../shared.py", dir.join("shared.py")).unwrap();

        let bytes = zip_directory(&dir).unwrap();
        let archive_path = temp.path().join("fn_src.zip");
        fs::write(&archive_path, bytes).unwrap();

        assert_eq!(archive_names(&archive_path), vec!["app.py", "shared.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_fails_packaging() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("fn_src");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("app.py"), "").unwrap();
        std::os::unix::fs::symlink("../gone.py", dir.join("gone.py")).unwrap();

        assert!(zip_directory(&dir).is_err());
    }

    #[test]
    fn test_missing_functions_dir() {
        let temp = TempDir::new().unwrap();
        assert!(function_dirs(&temp.path().join("missing")).is_err());
    }
}
