//! The decision being made: a title plus ordered options and criteria.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the two lists an item belongs to.
///
/// Serializes to the plural wire names `"options"` / `"criteria"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// An alternative being decided among.
    Options,
    /// A dimension every option is evaluated on.
    Criteria,
}

impl ItemKind {
    /// Plural wire name.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Options => "options",
            Self::Criteria => "criteria",
        }
    }

    /// Singular noun for messages.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Options => "option",
            Self::Criteria => "criterion",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

/// Title and lists of a decision.
///
/// Options and criteria are positional: ledgers refer to them by index, and
/// removing an entry shifts every later index down by one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// What is being decided.
    pub title: String,
    /// Alternatives in insertion order. Duplicates are allowed.
    pub options: Vec<String>,
    /// Criteria in insertion order. Duplicates are allowed.
    pub criteria: Vec<String>,
}

impl Decision {
    /// The list for `kind`.
    #[must_use]
    pub fn items(&self, kind: ItemKind) -> &[String] {
        match kind {
            ItemKind::Options => &self.options,
            ItemKind::Criteria => &self.criteria,
        }
    }

    pub(crate) fn items_mut(&mut self, kind: ItemKind) -> &mut Vec<String> {
        match kind {
            ItemKind::Options => &mut self.options,
            ItemKind::Criteria => &mut self.criteria,
        }
    }

    /// Whether `candidate` already appears in the list for `kind`,
    /// ignoring case and surrounding whitespace.
    #[must_use]
    pub fn contains(&self, kind: ItemKind, candidate: &str) -> bool {
        let needle = candidate.trim().to_lowercase();
        self.items(kind)
            .iter()
            .any(|item| item.trim().to_lowercase() == needle)
    }

    /// Number of `(option, criterion)` pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.options.len() * self.criteria.len()
    }
}
