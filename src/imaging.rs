use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::bbox::BBox;
use crate::error::{Result, SortError};
use crate::geometry::{thumbnail_size, zoom_region};

/// Decoded pixels for both panels of the current image.
pub struct Preview {
    /// True pixel size of the file on disk.
    pub original_size: (u32, u32),
    pub thumbnail: RgbaImage,
    /// Margin-expanded crop around the box.
    pub zoom: Option<RgbaImage>,
}

pub fn open(path: &Path) -> Result<DynamicImage> {
    let reader = image::io::Reader::open(path)
        .map_err(|e| SortError::io("open", path, e))?
        .with_guessed_format()
        .map_err(|e| SortError::io("read", path, e))?;
    reader
        .decode()
        .map_err(|source| SortError::Image { path: path.to_path_buf(), source })
}

/// Shrinks to fit within `bound`, keeping aspect ratio. Smaller images are left alone.
pub fn thumbnail(img: &DynamicImage, bound: (u32, u32)) -> DynamicImage {
    let (w, h) = thumbnail_size(img.dimensions(), bound);
    if (w, h) == img.dimensions() {
        img.clone()
    } else {
        img.resize_exact(w, h, FilterType::Lanczos3)
    }
}

pub fn zoom(img: &DynamicImage, bbox: BBox, margin: f32, bound: (u32, u32)) -> Option<DynamicImage> {
    let (x, y, w, h) = zoom_region(bbox, img.dimensions(), margin)?;
    Some(thumbnail(&img.crop_imm(x, y, w, h), bound))
}

impl Preview {
    pub fn build(path: &Path, bbox: Option<BBox>, bound: (u32, u32), margin: f32) -> Result<Self> {
        let img = open(path)?;
        Ok(Self {
            original_size: img.dimensions(),
            thumbnail: thumbnail(&img, bound).to_rgba8(),
            zoom: bbox.and_then(|b| zoom(&img, b, margin, bound)).map(|z| z.to_rgba8()),
        })
    }
}

/// RGBA bytes and size for a window icon.
pub fn load_icon(path: &Path) -> Result<(Vec<u8>, u32, u32)> {
    let rgba = open(path)?.to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok((rgba.into_raw(), w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> std::path::PathBuf {
        let img = RgbImage::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
        let path = dir.join(name);
        img.save(&path).expect("save png");
        path
    }

    #[test]
    fn preview_keeps_original_size_and_shrinks() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = write_png(dir.path(), "big.png", 800, 400);
        let p = Preview::build(&path, Some(BBox::new(100, 300, 100, 200)), (400, 300), 0.1).expect("preview");
        assert_eq!(p.original_size, (800, 400));
        assert_eq!(p.thumbnail.dimensions(), (400, 200));
        // crop is 240x120 which already fits
        assert_eq!(p.zoom.expect("zoom").dimensions(), (240, 120));
    }

    #[test]
    fn preview_without_box_has_no_zoom() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = write_png(dir.path(), "small.png", 40, 30);
        let p = Preview::build(&path, None, (400, 300), 0.1).expect("preview");
        assert_eq!(p.thumbnail.dimensions(), (40, 30));
        assert!(p.zoom.is_none());
    }

    #[test]
    fn degenerate_box_has_no_zoom() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = write_png(dir.path(), "img.png", 40, 30);
        let p = Preview::build(&path, Some(BBox::new(5, 5, 5, 5)), (400, 300), 0.1).expect("preview");
        assert!(p.zoom.is_none());
    }

    #[test]
    fn undecodable_file_is_an_image_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").expect("write");
        assert!(matches!(open(&path), Err(SortError::Image { .. })));
        assert!(matches!(open(&dir.path().join("missing.png")), Err(SortError::Io { .. })));
    }

    #[test]
    fn icon_is_rgba() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = write_png(dir.path(), "icon.png", 16, 8);
        let (rgba, w, h) = load_icon(&path).expect("icon");
        assert_eq!((w, h), (16, 8));
        assert_eq!(rgba.len(), 16 * 8 * 4);
    }
}
