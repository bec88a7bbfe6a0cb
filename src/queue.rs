use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions};
use log::warn;

use crate::error::{Result, SortError};

const PATTERNS: [&str; 3] = ["*.jpg", "*.jpeg", "*.png"];

/// Images to sort, consumed front to back. Never rescanned after startup.
#[derive(Clone, Debug)]
pub struct ImageQueue {
    dir: PathBuf,
    names: Vec<String>,
}

impl ImageQueue {
    /// Lists `.jpg`, `.jpeg` and `.png` files (any case) directly inside `dir`, sorted by name.
    pub fn scan(dir: &Path) -> Result<Self> {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let escaped = glob::Pattern::escape(&dir.to_string_lossy());
        let mut names = vec![];
        for pat in PATTERNS {
            let globpat = Path::new(&escaped).join(pat).to_string_lossy().to_string();
            let entries = glob_with(&globpat, options)
                .map_err(|e| SortError::io("scan", dir, std::io::Error::other(e)))?;
            for entry in entries {
                match entry {
                    Ok(p) if p.is_file() => {
                        if let Some(name) = p.file_name() {
                            names.push(name.to_string_lossy().into_owned());
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!("skipping unreadable entry: {}", e),
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(Self { dir: dir.to_path_buf(), names })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn path(&self, index: usize) -> Option<PathBuf> {
        self.name(index).map(|n| self.dir.join(n))
    }
}
