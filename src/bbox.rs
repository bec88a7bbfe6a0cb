use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};

/// Axis-aligned box in original-image pixels, stored in annotation-file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BBox {
    pub x1: i64,
    pub x2: i64,
    pub y1: i64,
    pub y2: i64,
}

impl BBox {
    pub fn new(x1: i64, x2: i64, y1: i64, y2: i64) -> Self {
        Self { x1, x2, y1, y2 }
    }

    /// Builds a box from two arbitrary corners, swapping so that x1 <= x2 and y1 <= y2.
    pub fn from_corners(a: (i64, i64), b: (i64, i64)) -> Self {
        Self {
            x1: a.0.min(b.0),
            x2: a.0.max(b.0),
            y1: a.1.min(b.1),
            y2: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> i64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i64 {
        self.y2 - self.y1
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x1, self.x2, self.y1, self.y2)
    }
}

/// Filename -> box, last line wins.
#[derive(Clone, Debug, Default)]
pub struct BBoxRegistry {
    boxes: HashMap<String, BBox>,
}

impl BBoxRegistry {
    pub fn get(&self, filename: &str) -> Option<BBox> {
        self.boxes.get(filename).copied()
    }

    pub fn insert(&mut self, filename: String, bbox: BBox) {
        if let Some(prev) = self.boxes.insert(filename.clone(), bbox) {
            debug!("bbox for {:?} overwritten ({} -> {})", filename, prev, bbox);
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::default();
        for line in lines {
            if let Some((name, bbox)) = parse_line(line.as_ref()) {
                registry.insert(name, bbox);
            }
        }
        registry
    }

    /// Reads an annotation file. A missing or unreadable file yields an empty registry;
    /// callers decide whether that is fatal.
    pub fn load(path: &Path) -> Self {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("cannot open bbox file {}: {}", path.display(), e);
                return Self::default();
            }
        };
        let lines = BufReader::new(file).lines().map_while(|l| l.ok());
        Self::from_lines(lines)
    }
}

/// Parses `<filename with spaces> <label> <x1> <x2> <y1> <y2>`.
///
/// The rightmost run of four integers anchors the split: the token right before it is
/// the label and everything earlier is the filename. A filename that itself ends in
/// numeric tokens is ambiguous and splits at the rightmost parsable run.
pub fn parse_line(line: &str) -> Option<(String, BBox)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 6 {
        return None;
    }
    for i in (0..=parts.len() - 4).rev() {
        let coords: Vec<i64> = parts[i..i + 4]
            .iter()
            .map_while(|t| t.parse::<i64>().ok())
            .collect();
        if coords.len() != 4 {
            continue;
        }
        // a run at token 0 leaves no label; everything but the last token is kept
        let name_end = if i == 0 { parts.len() - 1 } else { i - 1 };
        let name = parts[..name_end].join(" ");
        return Some((name, BBox::new(coords[0], coords[1], coords[2], coords[3])));
    }
    None
}

/// One line of a per-category annotation file, without the trailing newline.
pub fn format_line(filename: &str, category: &str, bbox: BBox) -> String {
    format!("{} {} {}", filename, category, bbox)
}
