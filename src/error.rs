use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("categories file {0} is missing or empty")]
    MissingCategories(PathBuf),

    #[error("no images (.jpg, .jpeg, .png) found in {0}")]
    NoImages(PathBuf),

    #[error("bounding box file {0} is missing or empty")]
    MissingBBoxes(PathBuf),

    #[error("photos directory {0} does not exist")]
    MissingPhotosDir(PathBuf),

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl SortError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SortError::Io { action, path: path.into(), source }
    }

    /// Startup errors end the process; everything else leaves the session usable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SortError::MissingCategories(_)
                | SortError::NoImages(_)
                | SortError::MissingBBoxes(_)
                | SortError::MissingPhotosDir(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_errors_are_fatal() {
        assert!(SortError::NoImages(PathBuf::from(".")).is_fatal());
        assert!(SortError::MissingBBoxes(PathBuf::from("bbox.txt")).is_fatal());
        assert!(!SortError::InvalidCategory("x".into()).is_fatal());
        let io = SortError::io(
            "move",
            "a.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(!io.is_fatal());
        assert_eq!(io.to_string(), "failed to move a.jpg: gone");
    }
}
