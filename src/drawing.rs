use log::debug;

use crate::bbox::BBox;
use crate::geometry::Point;

/// Press / move / release tracker for drawing a box on the primary display.
/// Points arrive already converted to original-image pixels; `None` means the
/// pointer was outside the image.
#[derive(Clone, Debug)]
pub struct DragTracker {
    start: Option<Point>,
    current: Option<BBox>,
    min_size: i64,
}

impl DragTracker {
    pub fn new(min_size: i64) -> Self {
        Self { start: None, current: None, min_size }
    }

    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    /// Live preview of the box being drawn.
    pub fn preview(&self) -> Option<BBox> {
        self.current
    }

    pub fn press(&mut self, at: Option<Point>) {
        if let Some(p) = at {
            debug!("drag start at ({:.1}, {:.1})", p.x, p.y);
            self.start = Some(p);
            self.current = Some(to_box(p, p));
        }
    }

    pub fn drag(&mut self, at: Option<Point>) {
        if let (Some(start), Some(p)) = (self.start, at) {
            self.current = Some(to_box(start, p));
        }
    }

    /// Ends the drag. Returns the box only if both sides reach the minimum size.
    pub fn release(&mut self) -> Option<BBox> {
        self.start = None;
        let b = self.current.take()?;
        if b.width() >= self.min_size && b.height() >= self.min_size {
            Some(b)
        } else {
            debug!("discarding {}x{} box below minimum {}", b.width(), b.height(), self.min_size);
            None
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
        self.current = None;
    }
}

fn to_box(a: Point, b: Point) -> BBox {
    BBox::from_corners(
        (a.x.round() as i64, a.y.round() as i64),
        (b.x.round() as i64, b.y.round() as i64),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_produces_normalized_box() {
        let mut t = DragTracker::new(6);
        t.press(Some(Point::new(50.0, 40.0)));
        assert!(t.is_dragging());
        t.drag(Some(Point::new(20.0, 90.0)));
        assert_eq!(t.preview(), Some(BBox::new(20, 50, 40, 90)));
        assert_eq!(t.release(), Some(BBox::new(20, 50, 40, 90)));
        assert!(!t.is_dragging());
        assert_eq!(t.preview(), None);
    }

    #[test]
    fn small_boxes_are_discarded() {
        let mut t = DragTracker::new(6);
        t.press(Some(Point::new(10.0, 10.0)));
        t.drag(Some(Point::new(15.0, 100.0)));
        assert_eq!(t.release(), None);

        t.press(Some(Point::new(10.0, 10.0)));
        t.drag(Some(Point::new(16.0, 16.0)));
        assert_eq!(t.release(), Some(BBox::new(10, 16, 10, 16)));
    }

    #[test]
    fn press_outside_image_does_not_start() {
        let mut t = DragTracker::new(6);
        t.press(None);
        t.drag(Some(Point::new(100.0, 100.0)));
        assert!(!t.is_dragging());
        assert_eq!(t.release(), None);
    }

    #[test]
    fn moves_outside_keep_last_inside_box() {
        let mut t = DragTracker::new(6);
        t.press(Some(Point::new(0.0, 0.0)));
        t.drag(Some(Point::new(30.0, 30.0)));
        t.drag(None);
        assert_eq!(t.release(), Some(BBox::new(0, 30, 0, 30)));
    }
}
