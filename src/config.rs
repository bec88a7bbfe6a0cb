use std::path::PathBuf;

use clap::Parser;

/// Directory that receives skipped images, under the root.
pub const SKIP_DIR: &str = "skip";
/// Annotation file name, both the input at the root and the per-category output.
pub const CATEGORY_BBOX_FILE: &str = "bbox.txt";
/// Subdirectory holding the source images in the photos layout.
pub const PHOTOS_DIR: &str = "photos";

#[derive(Parser, Debug, Clone)]
#[command(name = "img-sorter", about = "Sort a folder of images into category subfolders")]
pub struct Config {
    /// Working directory holding the inputs; category folders are created here.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Read images from `<root>/photos/` instead of the root itself.
    #[arg(long)]
    pub photos: bool,

    /// Category list, one per line, relative to the root.
    #[arg(long, default_value = "categorias.txt")]
    pub categories: PathBuf,

    /// Bounding-box annotations, relative to the root.
    #[arg(long, default_value = CATEGORY_BBOX_FILE)]
    pub bbox: PathBuf,

    /// Start even if the bounding-box file is missing or empty.
    #[arg(long)]
    pub allow_missing_bbox: bool,

    /// Window icon.
    #[arg(long)]
    pub icon: Option<PathBuf>,

    #[arg(long, default_value_t = 400)]
    pub display_width: u32,

    #[arg(long, default_value_t = 300)]
    pub display_height: u32,

    /// Smallest drawn box kept, in original-image pixels per side.
    #[arg(long, default_value_t = 6)]
    pub min_box: i64,

    /// Zoom panel margin around the box, as a fraction of its size.
    #[arg(long, default_value_t = 0.1)]
    pub zoom_margin: f32,
}

impl Config {
    pub fn categories_path(&self) -> PathBuf {
        self.root.join(&self.categories)
    }

    pub fn bbox_path(&self) -> PathBuf {
        self.root.join(&self.bbox)
    }

    pub fn source_dir(&self) -> PathBuf {
        if self.photos {
            self.root.join(PHOTOS_DIR)
        } else {
            self.root.clone()
        }
    }

    pub fn display_bound(&self) -> (u32, u32) {
        (self.display_width.max(1), self.display_height.max(1))
    }

    pub fn icon_path(&self) -> Option<PathBuf> {
        self.icon.as_ref().map(|p| self.root.join(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_working_directory_layout() {
        let c = Config::parse_from(["img-sorter"]);
        assert_eq!(c.categories_path(), PathBuf::from("./categorias.txt"));
        assert_eq!(c.bbox_path(), PathBuf::from("./bbox.txt"));
        assert_eq!(c.source_dir(), PathBuf::from("."));
        assert_eq!(c.display_bound(), (400, 300));
        assert_eq!(c.min_box, 6);
        assert!(!c.allow_missing_bbox);
    }

    #[test]
    fn photos_layout_reads_subdirectory() {
        let c = Config::parse_from(["img-sorter", "--root", "/data", "--photos", "--icon", "icon.png"]);
        assert_eq!(c.source_dir(), PathBuf::from("/data/photos"));
        assert_eq!(c.icon_path(), Some(PathBuf::from("/data/icon.png")));
    }
}
