//! The reserved key table owned by the navigation core.
//!
//! Built once and handed to [`crate::summary::DisplayerContext`]
//! construction; custom action tables are validated against it and the
//! summary list dispatches its own keys through it.

/// Behaviour bound to a reserved key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedAction {
    Search,
    Top,
    Bottom,
    DeleteItem,
    DeleteAll,
    Quit,
    Help,
    OpenDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedKey {
    pub key: &'static str,
    pub action: ReservedAction,
    pub description: &'static str,
}

/// Immutable reserved key table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedKeys {
    entries: Vec<ReservedKey>,
}

const STANDARD: [(&str, ReservedAction, &str); 8] = [
    ("/", ReservedAction::Search, "search"),
    ("g", ReservedAction::Top, "top"),
    ("G", ReservedAction::Bottom, "bottom"),
    ("x", ReservedAction::DeleteItem, "clear current item"),
    ("X", ReservedAction::DeleteAll, "clear all items"),
    ("q", ReservedAction::Quit, "quit / back / clear filter"),
    ("?", ReservedAction::Help, "help"),
    ("enter", ReservedAction::OpenDetail, "open detail"),
];

impl ReservedKeys {
    /// The fixed table: `/ g G x X q ? enter`.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            entries: STANDARD
                .iter()
                .map(|&(key, action, description)| ReservedKey {
                    key,
                    action,
                    description,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    #[must_use]
    pub fn action_for(&self, key: &str) -> Option<ReservedAction> {
        self.lookup(key).map(|entry| entry.action)
    }

    #[must_use]
    pub fn describe(&self, key: &str) -> Option<&'static str> {
        self.lookup(key).map(|entry| entry.description)
    }

    #[must_use]
    pub fn entries(&self) -> &[ReservedKey] {
        &self.entries
    }

    fn lookup(&self, key: &str) -> Option<&ReservedKey> {
        self.entries.iter().find(|entry| entry.key == key)
    }
}

impl Default for ReservedKeys {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_snapshot() {
        let keys: Vec<&str> = ReservedKeys::standard()
            .entries()
            .iter()
            .map(|entry| entry.key)
            .collect();
        assert_eq!(keys.join(" "), "/ g G x X q ? enter");
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let keys = ReservedKeys::standard();
        assert_eq!(keys.action_for("g"), Some(ReservedAction::Top));
        assert_eq!(keys.action_for("G"), Some(ReservedAction::Bottom));
        assert_eq!(keys.action_for("Q"), None);
        assert!(keys.contains("enter"));
        assert!(!keys.contains("a"));
        assert_eq!(keys.describe("x"), Some("clear current item"));
    }
}
