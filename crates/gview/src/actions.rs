//! Per-context custom key actions.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::controller::Controller;
use crate::error::ContextError;
use crate::keys::ReservedKeys;

pub type ActionHandler<M> = Rc<dyn Fn(&mut Controller<M>, &M) -> Result<(), String>>;

pub struct Action<M> {
    key: String,
    description: String,
    handler: ActionHandler<M>,
}

impl<M> Action<M> {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn handler(&self) -> ActionHandler<M> {
        Rc::clone(&self.handler)
    }
}

impl<M> fmt::Debug for Action<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("key", &self.key)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered key bindings. Validated once, when the owning
/// [`crate::summary::DisplayerContext`] is built.
pub struct Actions<M> {
    entries: Vec<Action<M>>,
}

impl<M> Default for Actions<M> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<M> fmt::Debug for Actions<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.entries).finish()
    }
}

impl<M> Actions<M> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding. `key` uses the names produced by
    /// [`gview_adapter::input::KeyEvent::name`].
    #[must_use]
    pub fn with<F>(mut self, key: &str, description: &str, handler: F) -> Self
    where
        F: Fn(&mut Controller<M>, &M) -> Result<(), String> + 'static,
    {
        self.entries.push(Action {
            key: key.to_owned(),
            description: description.to_owned(),
            handler: Rc::new(handler),
        });
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[Action<M>] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Action<M>> {
        self.entries.iter().find(|action| action.key == key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject empty keys, reserved keys, and duplicates.
    pub fn validate(&self, reserved: &ReservedKeys) -> Result<(), ContextError> {
        let mut seen = HashSet::new();
        for action in &self.entries {
            if action.key.is_empty() {
                return Err(ContextError::EmptyKey {
                    description: action.description.clone(),
                });
            }
            if let Some(description) = reserved.describe(&action.key) {
                return Err(ContextError::ReservedKey {
                    key: action.key.clone(),
                    reserved: description,
                });
            }
            if !seen.insert(action.key.as_str()) {
                return Err(ContextError::DuplicateAction {
                    key: action.key.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Controller<String>, _: &String) -> Result<(), String> {
        Ok(())
    }

    #[test]
    fn order_is_preserved() {
        let actions = Actions::new()
            .with("b", "second letter", noop)
            .with("a", "first letter", noop);
        let keys: Vec<&str> = actions.entries().iter().map(Action::key).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(
            actions.get("a").map(Action::description),
            Some("first letter")
        );
    }

    #[test]
    fn every_reserved_key_is_rejected() {
        let reserved = ReservedKeys::standard();
        for entry in reserved.entries() {
            let actions = Actions::new().with(entry.key, "clash", noop);
            assert_eq!(
                actions.validate(&reserved),
                Err(ContextError::ReservedKey {
                    key: entry.key.to_owned(),
                    reserved: entry.description,
                }),
                "{}",
                entry.key
            );
        }
    }

    #[test]
    fn duplicates_are_rejected() {
        let actions = Actions::new().with("a", "one", noop).with("a", "two", noop);
        assert_eq!(
            actions.validate(&ReservedKeys::standard()),
            Err(ContextError::DuplicateAction { key: "a".into() })
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        let actions = Actions::new().with("", "nameless", noop);
        assert!(matches!(
            actions.validate(&ReservedKeys::standard()),
            Err(ContextError::EmptyKey { .. })
        ));
    }

    #[test]
    fn non_reserved_keys_validate() {
        let actions = Actions::new()
            .with("a", "archive", noop)
            .with("ctrl x", "export", noop);
        assert!(actions.validate(&ReservedKeys::standard()).is_ok());
        assert_eq!(actions.len(), 2);
    }
}
