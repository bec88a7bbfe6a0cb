//! Per-image classification workflow as an explicit state machine.
//!
//! The UI feeds [`Event`]s in and reads [`Phase`] and [`CurrentImage`] back out; no
//! widget state lives here.

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::bbox::{self, BBox, BBoxRegistry};
use crate::categories::Categories;
use crate::config::{Config, CATEGORY_BBOX_FILE, SKIP_DIR};
use crate::drawing::DragTracker;
use crate::error::{Result, SortError};
use crate::geometry::Point;
use crate::queue::ImageQueue;
use crate::storage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingInput,
    Dragging,
    /// A drawn box waits for its category.
    Prompting(BBox),
    Committing,
    Done,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Submit(String),
    Skip,
    PointerPressed(Option<Point>),
    PointerMoved(Option<Point>),
    PointerReleased,
    PromptAccepted(String),
    PromptRejected,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Unchanged,
    Classified(PathBuf),
    Skipped(PathBuf),
    Drawing,
    PromptOpened(BBox),
    PromptClosed,
    CropSaved(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    NoBBox(String),
}

#[derive(Clone, Debug)]
pub struct CurrentImage {
    pub name: String,
    pub path: PathBuf,
    pub bbox: Option<BBox>,
    pub warning: Option<Warning>,
}

pub struct Session {
    root: PathBuf,
    categories: Categories,
    queue: ImageQueue,
    registry: BBoxRegistry,
    index: usize,
    last_category: Option<String>,
    crop_counter: u32,
    phase: Phase,
    drag: DragTracker,
}

impl Session {
    pub fn new(
        root: PathBuf,
        categories: Categories,
        queue: ImageQueue,
        registry: BBoxRegistry,
        min_box: i64,
    ) -> Self {
        let phase = if queue.is_empty() { Phase::Done } else { Phase::AwaitingInput };
        Self {
            root,
            categories,
            queue,
            registry,
            index: 0,
            last_category: None,
            crop_counter: 1,
            phase,
            drag: DragTracker::new(min_box),
        }
    }

    /// Loads every startup input, failing on anything the session cannot run without.
    pub fn open(config: &Config) -> Result<Self> {
        let categories_path = config.categories_path();
        let categories = Categories::load(&categories_path);
        if categories.is_empty() {
            return Err(SortError::MissingCategories(categories_path));
        }

        let source = config.source_dir();
        if config.photos && !source.is_dir() {
            return Err(SortError::MissingPhotosDir(source));
        }
        let queue = ImageQueue::scan(&source)?;
        if queue.is_empty() {
            return Err(SortError::NoImages(source));
        }

        let bbox_path = config.bbox_path();
        let registry = BBoxRegistry::load(&bbox_path);
        if registry.is_empty() && !config.allow_missing_bbox {
            return Err(SortError::MissingBBoxes(bbox_path));
        }

        info!(
            "loaded {} categories, {} images, {} boxes",
            categories.len(),
            queue.len(),
            registry.len()
        );
        Ok(Self::new(config.root.clone(), categories, queue, registry, config.min_box))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.queue.len()
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    pub fn last_category(&self) -> Option<&str> {
        self.last_category.as_deref()
    }

    pub fn drag_preview(&self) -> Option<BBox> {
        match self.phase {
            Phase::Prompting(b) => Some(b),
            _ => self.drag.preview(),
        }
    }

    /// The image under classification, or `None` once the queue is exhausted.
    pub fn current(&self) -> Option<CurrentImage> {
        if self.is_done() {
            return None;
        }
        let name = self.queue.name(self.index)?.to_owned();
        let bbox = self.registry.get(&name);
        let warning = match bbox {
            Some(_) => None,
            None => {
                warn!("no bounding box for {}", name);
                Some(Warning::NoBBox(name.clone()))
            }
        };
        Some(CurrentImage {
            path: self.queue.dir().join(&name),
            name,
            bbox,
            warning,
        })
    }

    pub fn handle(&mut self, event: Event) -> Result<Outcome> {
        if self.is_done() {
            return Ok(Outcome::Unchanged);
        }
        match event {
            Event::Submit(text) => self.submit(&text),
            Event::Skip => self.skip(),
            Event::PointerPressed(at) => Ok(self.press(at)),
            Event::PointerMoved(at) => Ok(self.pointer_moved(at)),
            Event::PointerReleased => Ok(self.release()),
            Event::PromptAccepted(text) => self.accept_prompt(&text),
            Event::PromptRejected => Ok(self.reject_prompt()),
        }
    }

    fn submit(&mut self, text: &str) -> Result<Outcome> {
        if self.phase != Phase::AwaitingInput {
            return Ok(Outcome::Unchanged);
        }
        let category = text.trim();
        if category.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        if !self.categories.contains(category) {
            warn!("rejected unknown category {:?}", category);
            return Err(SortError::InvalidCategory(category.to_owned()));
        }
        let Some(name) = self.queue.name(self.index).map(str::to_owned) else {
            return Ok(Outcome::Unchanged);
        };

        self.phase = Phase::Committing;
        match self.commit_classification(&name, category) {
            Ok(dest) => {
                info!("{} -> {}", name, category);
                self.last_category = Some(category.to_owned());
                self.advance();
                Ok(Outcome::Classified(dest))
            }
            Err(e) => {
                error!("classifying {} failed: {}", name, e);
                self.phase = Phase::AwaitingInput;
                Err(e)
            }
        }
    }

    fn commit_classification(&self, name: &str, category: &str) -> Result<PathBuf> {
        let dir = self.root.join(category);
        storage::ensure_dir(&dir)?;
        let src = self.queue.dir().join(name);
        let dest = storage::move_into(&src, &dir)?;
        if let Some(b) = self.registry.get(name) {
            let line = bbox::format_line(name, category, b);
            if let Err(e) = storage::append_line(&dir.join(CATEGORY_BBOX_FILE), &line) {
                // put the image back so a retry sees the same state
                if let Err(undo) = storage::move_into(&dest, self.queue.dir()) {
                    error!("could not restore {}: {}", src.display(), undo);
                }
                return Err(e);
            }
        }
        Ok(dest)
    }

    fn skip(&mut self) -> Result<Outcome> {
        if self.phase != Phase::AwaitingInput {
            return Ok(Outcome::Unchanged);
        }
        let Some(src) = self.queue.path(self.index) else {
            return Ok(Outcome::Unchanged);
        };
        self.phase = Phase::Committing;
        let dir = self.root.join(SKIP_DIR);
        let moved = storage::ensure_dir(&dir).and_then(|_| storage::move_into(&src, &dir));
        match moved {
            Ok(dest) => {
                info!("skipped {}", src.display());
                self.advance();
                Ok(Outcome::Skipped(dest))
            }
            Err(e) => {
                error!("skipping {} failed: {}", src.display(), e);
                self.phase = Phase::AwaitingInput;
                Err(e)
            }
        }
    }

    fn advance(&mut self) {
        self.index += 1;
        self.drag.cancel();
        self.phase = if self.index >= self.queue.len() {
            info!("all {} images handled", self.queue.len());
            Phase::Done
        } else {
            Phase::AwaitingInput
        };
    }

    fn press(&mut self, at: Option<Point>) -> Outcome {
        if self.phase != Phase::AwaitingInput {
            return Outcome::Unchanged;
        }
        self.drag.press(at);
        if self.drag.is_dragging() {
            self.phase = Phase::Dragging;
            Outcome::Drawing
        } else {
            Outcome::Unchanged
        }
    }

    fn pointer_moved(&mut self, at: Option<Point>) -> Outcome {
        if self.phase != Phase::Dragging {
            return Outcome::Unchanged;
        }
        self.drag.drag(at);
        Outcome::Drawing
    }

    fn release(&mut self) -> Outcome {
        if self.phase != Phase::Dragging {
            return Outcome::Unchanged;
        }
        match self.drag.release() {
            Some(b) => {
                self.phase = Phase::Prompting(b);
                Outcome::PromptOpened(b)
            }
            None => {
                self.phase = Phase::AwaitingInput;
                Outcome::Unchanged
            }
        }
    }

    fn accept_prompt(&mut self, text: &str) -> Result<Outcome> {
        let Phase::Prompting(b) = self.phase else {
            return Ok(Outcome::Unchanged);
        };
        let category = text.trim();
        if category.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        let Some(name) = self.queue.name(self.index).map(str::to_owned) else {
            return Ok(Outcome::Unchanged);
        };

        self.phase = Phase::Committing;
        match self.commit_crop(&name, category, b) {
            Ok(dest) => {
                info!("{} box {} -> {}", name, b, dest.display());
                self.crop_counter += 1;
                self.last_category = Some(category.to_owned());
                self.phase = Phase::AwaitingInput;
                Ok(Outcome::CropSaved(dest))
            }
            Err(e) => {
                error!("saving box from {} failed: {}", name, e);
                self.phase = Phase::Prompting(b);
                Err(e)
            }
        }
    }

    fn commit_crop(&self, name: &str, category: &str, b: BBox) -> Result<PathBuf> {
        let dir = self.root.join(category);
        storage::ensure_dir(&dir)?;
        let new_name = numbered_name(name, self.crop_counter);
        let dest = dir.join(&new_name);
        storage::copy_to(&self.queue.dir().join(name), &dest)?;
        let line = bbox::format_line(&new_name, category, b);
        if let Err(e) = storage::append_line(&dir.join(CATEGORY_BBOX_FILE), &line) {
            if let Err(cleanup) = std::fs::remove_file(&dest) {
                error!("could not remove {}: {}", dest.display(), cleanup);
            }
            return Err(e);
        }
        Ok(dest)
    }

    fn reject_prompt(&mut self) -> Outcome {
        if !matches!(self.phase, Phase::Prompting(_)) {
            return Outcome::Unchanged;
        }
        self.phase = Phase::AwaitingInput;
        Outcome::PromptClosed
    }
}

/// `photo.jpg`, 3 -> `photo_3.jpg`.
fn numbered_name(name: &str, counter: u32) -> String {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_owned());
    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, counter, ext.to_string_lossy()),
        None => format!("{}_{}", stem, counter),
    }
}
