use crate::error::{ChecklistError, Result};
use crate::ident;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Enhancement,
    Bug,
    Idea,
    Question,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Enhancement => "Enhancement",
            Category::Bug => "Bug",
            Category::Idea => "Idea",
            Category::Question => "Question",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = ChecklistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "enhancement" | "" => Ok(Category::Enhancement),
            "bug" => Ok(Category::Bug),
            "idea" => Ok(Category::Idea),
            "question" => Ok(Category::Question),
            other => Err(ChecklistError::Validation(format!(
                "unknown category '{other}' (expected enhancement, bug, idea, or question)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Enhancement
// ---------------------------------------------------------------------------

/// Free-standing note captured while working a checklist, unrelated to any
/// step's execution history. Stored most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enhancement {
    pub main: String,
    pub category: Category,
    pub notes: String,
    pub ts: String,
}

impl Default for Enhancement {
    fn default() -> Self {
        Self {
            main: String::new(),
            category: Category::Enhancement,
            notes: String::new(),
            ts: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Insert a new entry at the head of the list (most-recent-first).
/// Rejects an empty `main` text.
pub fn add_enhancement(
    enhancements: &mut Vec<Enhancement>,
    main: &str,
    category: Category,
    notes: &str,
) -> Result<()> {
    if main.trim().is_empty() {
        return Err(ChecklistError::Validation(
            "enhancement text is required".to_string(),
        ));
    }
    enhancements.insert(
        0,
        Enhancement {
            main: main.to_string(),
            category,
            notes: notes.to_string(),
            ts: ident::run_stamp(Utc::now()),
        },
    );
    Ok(())
}

/// Remove the entry at `index` permanently.
pub fn remove_enhancement(enhancements: &mut Vec<Enhancement>, index: usize) -> Result<Enhancement> {
    if index >= enhancements.len() {
        return Err(ChecklistError::EnhancementNotFound(index));
    }
    Ok(enhancements.remove(index))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_inserts_at_head() {
        let mut list: Vec<Enhancement> = Vec::new();
        add_enhancement(&mut list, "first", Category::Enhancement, "").unwrap();
        add_enhancement(&mut list, "second", Category::Bug, "details").unwrap();
        assert_eq!(list[0].main, "second");
        assert_eq!(list[0].category, Category::Bug);
        assert_eq!(list[1].main, "first");
        assert!(!list[0].ts.is_empty());
    }

    #[test]
    fn add_rejects_empty_main() {
        let mut list: Vec<Enhancement> = Vec::new();
        assert!(add_enhancement(&mut list, "  ", Category::Idea, "").is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn remove_by_index() {
        let mut list: Vec<Enhancement> = Vec::new();
        add_enhancement(&mut list, "a", Category::Enhancement, "").unwrap();
        add_enhancement(&mut list, "b", Category::Enhancement, "").unwrap();
        let removed = remove_enhancement(&mut list, 1).unwrap();
        assert_eq!(removed.main, "a");
        assert_eq!(list.len(), 1);
        assert!(remove_enhancement(&mut list, 5).is_err());
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Bug".parse::<Category>().unwrap(), Category::Bug);
        assert_eq!("".parse::<Category>().unwrap(), Category::Enhancement);
        assert!("severe".parse::<Category>().is_err());
    }
}
