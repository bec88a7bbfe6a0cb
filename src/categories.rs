use std::fs;
use std::path::Path;

use log::warn;

/// Valid categories, in file order. Each name doubles as a destination directory.
#[derive(Clone, Debug, Default)]
pub struct Categories {
    names: Vec<String>,
}

impl Categories {
    pub fn from_text(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        Self { names }
    }

    /// Missing or unreadable file gives an empty list.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_text(&text),
            Err(e) => {
                warn!("cannot read categories file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Categories containing `text`, ignoring case. Empty input matches nothing.
    pub fn completions(&self, text: &str) -> Vec<&str> {
        if text.is_empty() {
            return vec![];
        }
        let needle = text.to_lowercase();
        self.iter().filter(|c| c.to_lowercase().contains(&needle)).collect()
    }

    /// First completion that also starts with `text`, ignoring case.
    pub fn suggestion(&self, text: &str) -> Option<&str> {
        let needle = text.to_lowercase();
        self.completions(text)
            .into_iter()
            .find(|c| c.to_lowercase().starts_with(&needle))
    }
}

/// Text typed into the category field.
#[derive(Clone, Debug, Default)]
pub struct CategoryInput {
    pub text: String,
}

impl CategoryInput {
    /// Trimmed input, or the sticky category when the field is empty.
    pub fn resolve(&self, sticky: Option<&str>) -> String {
        let typed = self.text.trim();
        if typed.is_empty() {
            sticky.unwrap_or_default().to_owned()
        } else {
            typed.to_owned()
        }
    }

    /// Grey remainder to draw after the typed text, if any.
    pub fn ghost<'a>(&self, categories: &'a Categories) -> Option<&'a str> {
        if self.text.is_empty() {
            return None;
        }
        let suggestion = categories.suggestion(&self.text)?;
        // case-insensitive prefix match may not land on a char boundary
        suggestion
            .get(self.text.len()..)
            .filter(|rest| !rest.is_empty())
    }

    /// Replaces the typed text with the current suggestion.
    pub fn accept_suggestion(&mut self, categories: &Categories) -> bool {
        match categories.suggestion(&self.text) {
            Some(s) if s != self.text => {
                self.text = s.to_owned();
                true
            }
            _ => false,
        }
    }

    /// Fills the field with a picked completion; committing still takes Enter.
    pub fn choose(&mut self, category: &str) {
        self.text = category.to_owned();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats() -> Categories {
        Categories::from_text("  lion \n\nleopard\nSea Lion\n\t\ncheetah\n")
    }

    #[test]
    fn trims_and_skips_blank_lines() {
        let c = cats();
        assert_eq!(c.iter().collect::<Vec<_>>(), vec!["lion", "leopard", "Sea Lion", "cheetah"]);
        assert!(c.contains("lion"));
        assert!(!c.contains(" lion "));
        assert!(!c.contains("Lion"));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("create temp dir");
        assert!(Categories::load(&dir.path().join("categorias.txt")).is_empty());
    }

    #[test]
    fn completions_match_substrings_ignoring_case() {
        let c = cats();
        assert_eq!(c.completions("LION"), vec!["lion", "Sea Lion"]);
        assert_eq!(c.completions("e"), vec!["leopard", "Sea Lion", "cheetah"]);
        assert!(c.completions("").is_empty());
    }

    #[test]
    fn suggestion_requires_prefix() {
        let c = cats();
        assert_eq!(c.suggestion("Le"), Some("leopard"));
        assert_eq!(c.suggestion("sea"), Some("Sea Lion"));
        assert_eq!(c.suggestion("ion"), None);
    }

    #[test]
    fn ghost_shows_remaining_suffix() {
        let c = cats();
        let mut input = CategoryInput::default();
        input.text = "che".into();
        assert_eq!(input.ghost(&c), Some("etah"));
        input.text = "cheetah".into();
        assert_eq!(input.ghost(&c), None);
        assert!(!input.accept_suggestion(&c));
        input.text = "leo".into();
        assert!(input.accept_suggestion(&c));
        assert_eq!(input.text, "leopard");
    }

    #[test]
    fn choosing_a_completion_only_fills_the_field() {
        let c = cats();
        let mut input = CategoryInput::default();
        input.text = "lio".into();
        let picked = c.completions(&input.text)[1].to_owned();
        input.choose(&picked);
        assert_eq!(input.text, "Sea Lion");
        assert_eq!(input.resolve(Some("lion")), "Sea Lion");
    }

    #[test]
    fn empty_input_resolves_to_sticky_category() {
        let mut input = CategoryInput::default();
        assert_eq!(input.resolve(None), "");
        input.text = "   ".into();
        assert_eq!(input.resolve(Some("lion")), "lion");
        input.text = " leopard ".into();
        assert_eq!(input.resolve(Some("lion")), "leopard");
    }
}
