//! Shared types for the classification pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Category ────────────────────────────────────────────────────────

/// Life-log domain a message is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Steps,
    Workout,
    Alcohol,
    Meal,
    Ingredients,
    Finance,
    Wardrobe,
    Travel,
    Journal,
}

impl Category {
    /// Every category, in rule priority order (journal last).
    pub const ALL: [Category; 9] = [
        Category::Steps,
        Category::Workout,
        Category::Alcohol,
        Category::Meal,
        Category::Ingredients,
        Category::Finance,
        Category::Wardrobe,
        Category::Travel,
        Category::Journal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Steps => "steps",
            Category::Workout => "workout",
            Category::Alcohol => "alcohol",
            Category::Meal => "meal",
            Category::Ingredients => "ingredients",
            Category::Finance => "finance",
            Category::Wardrobe => "wardrobe",
            Category::Travel => "travel",
            Category::Journal => "journal",
        }
    }

    /// Title prefix, rendered as `[PREFIX]`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Steps => "STEPS",
            Category::Workout => "WORKOUT",
            Category::Alcohol => "ALCOHOL",
            Category::Meal => "MEAL",
            Category::Ingredients => "INGREDIENTS",
            Category::Finance => "FINANCE",
            Category::Wardrobe => "WARDROBE",
            Category::Travel => "TRAVEL",
            Category::Journal => "JOURNAL",
        }
    }

    /// Notebook section this category's pages land in.
    ///
    /// Names use the ASCII hyphen; the resolver also accepts the en-dash
    /// spelling.
    pub fn section_name(&self) -> &'static str {
        match self {
            Category::Steps => "Fitness - Steps",
            Category::Workout => "Fitness - Workouts",
            Category::Alcohol => "Food - Alcohol",
            Category::Meal => "Food - Meals",
            Category::Ingredients => "Food - Ingredients",
            Category::Finance => "Finance",
            Category::Wardrobe => "Wardrobe",
            Category::Travel => "Travel",
            Category::Journal => "Journal - Inbox",
        }
    }

    /// Human label used in the page body.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Steps => "Steps",
            Category::Workout => "Workout",
            Category::Alcohol => "Drinks",
            Category::Meal => "Meal",
            Category::Ingredients => "Ingredients",
            Category::Finance => "Expense",
            Category::Wardrobe => "Wardrobe",
            Category::Travel => "Travel",
            Category::Journal => "Journal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

// ── Routed message ──────────────────────────────────────────────────

/// Classifier output, consumed immediately by the page-creation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedMessage {
    pub category: Category,
    /// `STEPS`, `MEAL`, …
    pub title_prefix: String,
    /// `[PREFIX] payload (YYYY-MM-DD HH:MM:SS)`, HTML-escaped.
    pub title: String,
    /// Page body fragment, HTML-escaped.
    pub html: String,
    /// Target section name (ASCII-hyphen spelling).
    pub section: String,
    /// Extracted magnitude (steps) or the trimmed original text, unescaped.
    pub payload: String,
    /// Classification time in the configured zone (RFC 3339).
    pub classified_at: String,
}
