//! Conversions between original-image pixels and the letterboxed rectangle an image
//! occupies on screen.

use crate::bbox::BBox;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Size {
    pub fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    pub fn from_pixels((w, h): (u32, u32)) -> Self {
        Self { w: w as f32, h: h as f32 }
    }

    fn is_positive(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen-space rectangle, top-left origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl DisplayRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Scales `content` to fit `container` keeping aspect ratio, then centers it.
    /// Upscales as well as downscales.
    pub fn fit_centered(content: Size, container: DisplayRect) -> Self {
        if !content.is_positive() || container.w <= 0.0 || container.h <= 0.0 {
            return DisplayRect::new(container.x, container.y, 0.0, 0.0);
        }
        let scale = (container.w / content.w).min(container.h / content.h);
        let w = content.w * scale;
        let h = content.h * scale;
        DisplayRect::new(
            container.x + (container.w - w) / 2.0,
            container.y + (container.h - h) / 2.0,
            w,
            h,
        )
    }
}

/// Box edges in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenBox {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Maps between an image of `original` pixels and the rectangle it is drawn into.
/// Each axis scales independently.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateMapper {
    pub rect: DisplayRect,
    pub original: Size,
}

impl CoordinateMapper {
    pub fn new(rect: DisplayRect, original: Size) -> Self {
        Self { rect, original }
    }

    fn scale(&self) -> (f32, f32) {
        (self.rect.w / self.original.w, self.rect.h / self.original.h)
    }

    /// Image pixels to screen, unrounded.
    pub fn to_screen(&self, bbox: BBox) -> ScreenBox {
        let (sx, sy) = self.scale();
        ScreenBox {
            left: self.rect.x + bbox.x1 as f32 * sx,
            right: self.rect.x + bbox.x2 as f32 * sx,
            top: self.rect.y + bbox.y1 as f32 * sy,
            bottom: self.rect.y + bbox.y2 as f32 * sy,
        }
    }

    /// Same as [`to_screen`](Self::to_screen) with each offset rounded to whole pixels,
    /// which is what gets painted.
    pub fn to_screen_px(&self, bbox: BBox) -> ScreenBox {
        let (sx, sy) = self.scale();
        ScreenBox {
            left: self.rect.x + (bbox.x1 as f32 * sx).round(),
            right: self.rect.x + (bbox.x2 as f32 * sx).round(),
            top: self.rect.y + (bbox.y1 as f32 * sy).round(),
            bottom: self.rect.y + (bbox.y2 as f32 * sy).round(),
        }
    }

    /// Pointer position to image pixels; `None` when outside the drawn image.
    pub fn to_image(&self, p: Point) -> Option<Point> {
        if !self.rect.contains(p) || self.rect.w <= 0.0 || self.rect.h <= 0.0 {
            return None;
        }
        Some(Point::new(
            (p.x - self.rect.x) * (self.original.w / self.rect.w),
            (p.y - self.rect.y) * (self.original.h / self.rect.h),
        ))
    }

    /// Inverse of [`to_screen`](Self::to_screen) for a whole box, rounded to pixels.
    pub fn box_to_image(&self, b: ScreenBox) -> BBox {
        let fx = self.original.w / self.rect.w;
        let fy = self.original.h / self.rect.h;
        BBox::new(
            ((b.left - self.rect.x) * fx).round() as i64,
            ((b.right - self.rect.x) * fx).round() as i64,
            ((b.top - self.rect.y) * fy).round() as i64,
            ((b.bottom - self.rect.y) * fy).round() as i64,
        )
    }
}

/// Size an image gets when shrunk to fit within `bound`; never enlarged.
pub fn thumbnail_size((w, h): (u32, u32), (max_w, max_h): (u32, u32)) -> (u32, u32) {
    if w <= max_w && h <= max_h {
        return (w, h);
    }
    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    let tw = ((w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let th = ((h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (tw, th)
}

/// Crop region around `bbox` grown by `margin` of its size on every side, clamped to
/// the image. Returned as `(x, y, width, height)`.
pub fn zoom_region(bbox: BBox, (img_w, img_h): (u32, u32), margin: f32) -> Option<(u32, u32, u32, u32)> {
    let mx = (bbox.width() as f32 * margin) as i64;
    let my = (bbox.height() as f32 * margin) as i64;
    let x1 = (bbox.x1 - mx).max(0);
    let y1 = (bbox.y1 - my).max(0);
    let x2 = (bbox.x2 + mx).min(img_w as i64);
    let y2 = (bbox.y2 + my).min(img_h as i64);
    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    Some((x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn fit_letterboxes_wide_image() {
        let r = DisplayRect::fit_centered(Size::new(400.0, 200.0), DisplayRect::new(0.0, 0.0, 400.0, 300.0));
        assert_eq!(r, DisplayRect::new(0.0, 50.0, 400.0, 200.0));
    }

    #[test]
    fn fit_pillarboxes_and_upscales_tall_image() {
        let r = DisplayRect::fit_centered(Size::new(100.0, 200.0), DisplayRect::new(10.0, 20.0, 400.0, 300.0));
        assert!(approx(r.w, 150.0) && approx(r.h, 300.0));
        assert!(approx(r.x, 10.0 + 125.0) && approx(r.y, 20.0));
    }

    #[test]
    fn forward_scales_each_axis() {
        let m = CoordinateMapper::new(DisplayRect::new(10.0, 20.0, 200.0, 100.0), Size::new(400.0, 400.0));
        let s = m.to_screen(BBox::new(0, 400, 100, 200));
        assert_eq!(s, ScreenBox { left: 10.0, right: 210.0, top: 45.0, bottom: 70.0 });
    }

    #[test]
    fn painted_box_rounds_offsets() {
        let m = CoordinateMapper::new(DisplayRect::new(0.0, 0.0, 100.0, 100.0), Size::new(300.0, 300.0));
        let s = m.to_screen_px(BBox::new(1, 2, 4, 5));
        assert_eq!(s, ScreenBox { left: 0.0, right: 1.0, top: 1.0, bottom: 2.0 });
    }

    #[test]
    fn pointer_outside_rect_is_rejected() {
        let m = CoordinateMapper::new(DisplayRect::new(50.0, 0.0, 300.0, 300.0), Size::new(600.0, 600.0));
        assert_eq!(m.to_image(Point::new(49.0, 10.0)), None);
        assert_eq!(m.to_image(Point::new(100.0, 301.0)), None);
        assert_eq!(m.to_image(Point::new(50.0, 0.0)), Some(Point::new(0.0, 0.0)));
        assert_eq!(m.to_image(Point::new(200.0, 150.0)), Some(Point::new(300.0, 300.0)));
    }

    #[test]
    fn forward_then_inverse_round_trips() {
        let boxes = [
            BBox::new(0, 0, 0, 0),
            BBox::new(1, 2, 3, 4),
            BBox::new(10, 500, 37, 611),
            BBox::new(1999, 2000, 1499, 1500),
        ];
        let rects = [
            DisplayRect::new(0.0, 0.0, 400.0, 300.0),
            DisplayRect::new(13.5, 7.25, 133.0, 101.0),
            DisplayRect::new(100.0, 0.0, 4000.0, 3000.0),
            DisplayRect::new(0.0, 0.0, 1.0, 1.0),
        ];
        let original = Size::new(2000.0, 1500.0);
        for rect in rects {
            let m = CoordinateMapper::new(rect, original);
            for b in boxes {
                let back = m.box_to_image(m.to_screen(b));
                for (got, want) in [(back.x1, b.x1), (back.x2, b.x2), (back.y1, b.y1), (back.y2, b.y2)] {
                    assert!((got - want).abs() <= 1, "{:?} -> {:?} via {:?}", b, back, rect);
                }
            }
        }
    }

    #[test]
    fn thumbnail_only_shrinks() {
        assert_eq!(thumbnail_size((200, 100), (400, 300)), (200, 100));
        assert_eq!(thumbnail_size((4000, 3000), (400, 300)), (400, 300));
        assert_eq!(thumbnail_size((1000, 3000), (400, 300)), (100, 300));
        assert_eq!(thumbnail_size((5000, 10), (400, 300)), (400, 1));
    }

    #[test]
    fn zoom_region_adds_margin_and_clamps() {
        assert_eq!(zoom_region(BBox::new(100, 200, 100, 150), (1000, 1000), 0.1), Some((90, 95, 120, 60)));
        assert_eq!(zoom_region(BBox::new(0, 100, 0, 100), (105, 105), 0.1), Some((0, 0, 105, 105)));
        assert_eq!(zoom_region(BBox::new(5, 5, 5, 5), (100, 100), 0.1), None);
    }
}
