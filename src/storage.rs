use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, error};

use crate::error::{Result, SortError};

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| SortError::io("create directory", dir, e))
}

/// Moves `src` into `dest_dir`, keeping its filename. Falls back to copy + remove when
/// a rename cannot cross filesystems.
pub fn move_into(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let name = src
        .file_name()
        .ok_or_else(|| SortError::io("move", src, std::io::Error::other("path has no file name")))?;
    let dest = dest_dir.join(name);
    if fs::rename(src, &dest).is_err() {
        fs::copy(src, &dest).map_err(|e| SortError::io("move", src, e))?;
        if let Err(e) = fs::remove_file(src) {
            if let Err(cleanup) = fs::remove_file(&dest) {
                error!("could not remove {}: {}", dest.display(), cleanup);
            }
            return Err(SortError::io("move", src, e));
        }
    }
    debug!("moved {} -> {}", src.display(), dest.display());
    Ok(dest)
}

pub fn copy_to(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest).map_err(|e| SortError::io("copy", src, e))?;
    debug!("copied {} -> {}", src.display(), dest.display());
    Ok(())
}

/// Appends one line to `path`, creating the file when absent.
pub fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SortError::io("open", path, e))?;
    writeln!(file, "{}", line).map_err(|e| SortError::io("append to", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_relocates_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let src = dir.path().join("a b.jpg");
        fs::write(&src, b"pixels").expect("write src");
        let dest_dir = dir.path().join("cat");
        ensure_dir(&dest_dir).expect("mkdir");
        ensure_dir(&dest_dir).expect("mkdir twice");

        let dest = move_into(&src, &dest_dir).expect("move");
        assert_eq!(dest, dest_dir.join("a b.jpg"));
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).expect("read dest"), b"pixels");
    }

    #[test]
    fn move_of_missing_file_fails() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = move_into(&dir.path().join("gone.jpg"), dir.path()).unwrap_err();
        assert!(matches!(err, SortError::Io { action: "move", .. }));
    }

    #[test]
    fn append_creates_then_accumulates() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("bbox.txt");
        append_line(&path, "a.jpg cat 1 2 3 4").expect("append");
        append_line(&path, "b.jpg cat 5 6 7 8").expect("append");
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "a.jpg cat 1 2 3 4\nb.jpg cat 5 6 7 8\n"
        );
    }

    #[test]
    fn copy_leaves_source() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let src = dir.path().join("a.jpg");
        fs::write(&src, b"x").expect("write");
        copy_to(&src, &dir.path().join("a_1.jpg")).expect("copy");
        assert!(src.exists());
        assert!(dir.path().join("a_1.jpg").exists());
    }
}
