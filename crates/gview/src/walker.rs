//! Walkers: ordered, rendered views of the message stream.

use std::rc::Rc;

use crate::displayer::Displayer;
use crate::fault::{contain, DisplayFault};
use crate::source::{Listener, ListenerId};

/// A message with the summary it was rendered to on acceptance.
pub struct Item<M> {
    message: Rc<M>,
    summary: String,
}

impl<M> Clone for Item<M> {
    fn clone(&self) -> Self {
        Self {
            message: Rc::clone(&self.message),
            summary: self.summary.clone(),
        }
    }
}

impl<M> Item<M> {
    #[must_use]
    pub fn message(&self) -> &M {
        &self.message
    }

    #[must_use]
    pub fn shared(&self) -> Rc<M> {
        Rc::clone(&self.message)
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

impl<M> AsRef<str> for Item<M> {
    fn as_ref(&self) -> &str {
        &self.summary
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkerKind {
    /// Permanent; holds every message that rendered.
    Base,
    /// Derived read view over `parent` restricted to `keyword` matches.
    Filtered { keyword: String, parent: ListenerId },
}

/// Result of a mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Removed(usize),
    Rejected,
}

pub struct Walker<M> {
    kind: WalkerKind,
    items: Vec<Item<M>>,
    displayer: Rc<dyn Displayer<M>>,
}

impl<M> Walker<M> {
    pub fn base(displayer: Rc<dyn Displayer<M>>) -> Self {
        Self {
            kind: WalkerKind::Base,
            items: Vec::new(),
            displayer,
        }
    }

    /// Snapshot the items of `base` matching `keyword`.
    ///
    /// Items whose match check fails are left out and their faults returned.
    pub fn filtered_from(
        base: &Walker<M>,
        keyword: &str,
        parent: ListenerId,
    ) -> (Self, Vec<DisplayFault>) {
        let mut items = Vec::new();
        let mut faults = Vec::new();
        for item in &base.items {
            match check_match(base.displayer.as_ref(), keyword, &item.message, &item.summary) {
                Ok(true) => items.push(item.clone()),
                Ok(false) => {}
                Err(fault) => faults.push(fault),
            }
        }
        let walker = Self {
            kind: WalkerKind::Filtered {
                keyword: keyword.to_owned(),
                parent,
            },
            items,
            displayer: Rc::clone(&base.displayer),
        };
        (walker, faults)
    }

    #[must_use]
    pub fn kind(&self) -> &WalkerKind {
        &self.kind
    }

    #[must_use]
    pub fn is_filtered(&self) -> bool {
        matches!(self.kind, WalkerKind::Filtered { .. })
    }

    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        match &self.kind {
            WalkerKind::Base => None,
            WalkerKind::Filtered { keyword, .. } => Some(keyword),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Item<M>] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item<M>> {
        self.items.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<&str> {
        self.items.iter().map(Item::summary).collect()
    }

    /// Render and append `message`.
    ///
    /// A filtered walker silently skips non-matching messages. Render and
    /// match failures drop the message from this walker only.
    pub fn accept(&mut self, message: Rc<M>) -> Result<(), DisplayFault> {
        let displayer = self.displayer.as_ref();
        let summary =
            contain(|| displayer.summary(&message)).map_err(DisplayFault::Summary)?;
        if let WalkerKind::Filtered { keyword, .. } = &self.kind {
            if !check_match(displayer, keyword, &message, &summary)? {
                return Ok(());
            }
        }
        self.items.push(Item { message, summary });
        Ok(())
    }

    /// Remove one item. Base walkers only.
    pub fn remove(&mut self, index: usize) -> Mutation {
        if self.is_filtered() || index >= self.items.len() {
            return Mutation::Rejected;
        }
        self.items.remove(index);
        Mutation::Removed(1)
    }

    /// Remove every item. Base walkers only.
    pub fn clear(&mut self) -> Mutation {
        if self.is_filtered() {
            return Mutation::Rejected;
        }
        let removed = self.items.len();
        self.items.clear();
        Mutation::Removed(removed)
    }
}

impl<M> Listener for Walker<M> {
    type Message = M;

    fn recv(&mut self, message: &Rc<M>) -> Result<(), DisplayFault> {
        self.accept(Rc::clone(message))
    }
}

fn check_match<M>(
    displayer: &dyn Displayer<M>,
    keyword: &str,
    message: &M,
    summary: &str,
) -> Result<bool, DisplayFault> {
    contain(|| displayer.matches(keyword, message, summary)).map_err(|reason| {
        DisplayFault::Match {
            keyword: keyword.to_owned(),
            reason,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::displayer::FnDisplayer;
    use crate::source::DataSource;

    fn identity() -> Rc<dyn Displayer<String>> {
        Rc::new(FnDisplayer::new(|m: &String| Ok(m.clone())))
    }

    fn strict() -> Rc<dyn Displayer<String>> {
        Rc::new(
            FnDisplayer::new(|m: &String| {
                if m.starts_with('!') {
                    Err(format!("cannot render {m}"))
                } else {
                    Ok(m.clone())
                }
            })
            .with_matcher(|kw, m: &String, summary| {
                if m == "boom" {
                    panic!("matcher exploded");
                }
                Ok(summary.contains(kw))
            }),
        )
    }

    fn fill(walker: &mut Walker<String>, messages: &[&str]) {
        for message in messages {
            let _ = walker.accept(Rc::new((*message).to_owned()));
        }
    }

    #[test]
    fn base_accepts_in_order() {
        let mut walker = Walker::base(identity());
        fill(&mut walker, &["aaa", "bbb", "ccc"]);
        assert_eq!(walker.summaries(), vec!["aaa", "bbb", "ccc"]);
        assert!(!walker.is_filtered());
        assert_eq!(walker.keyword(), None);
    }

    #[test]
    fn render_failure_drops_message() {
        let mut walker = Walker::base(strict());
        let result = walker.accept(Rc::new("!bad".to_owned()));
        assert_eq!(
            result,
            Err(DisplayFault::Summary("cannot render !bad".to_owned()))
        );
        assert!(walker.is_empty());
        assert!(walker.accept(Rc::new("good".to_owned())).is_ok());
        assert_eq!(walker.summaries(), vec!["good"]);
    }

    #[test]
    fn filtered_snapshot_then_live_append() {
        let mut base = Walker::base(identity());
        fill(&mut base, &["aaa", "bbb", "ccc"]);
        let mut source: DataSource<Walker<String>> = DataSource::new();
        let parent = source.register(Walker::base(identity()));
        let (mut filtered, faults) = Walker::filtered_from(&base, "b", parent);
        assert!(faults.is_empty());
        assert_eq!(filtered.summaries(), vec!["bbb"]);
        assert_eq!(
            filtered.kind(),
            &WalkerKind::Filtered {
                keyword: "b".into(),
                parent
            }
        );
        fill(&mut filtered, &["bcd", "xyz"]);
        assert_eq!(filtered.summaries(), vec!["bbb", "bcd"]);
    }

    #[test]
    fn snapshot_skips_items_whose_match_faults() {
        let mut base = Walker::base(strict());
        fill(&mut base, &["abc", "boom", "ab"]);
        let mut source: DataSource<Walker<String>> = DataSource::new();
        let parent = source.register(Walker::base(strict()));
        let (filtered, faults) = Walker::filtered_from(&base, "b", parent);
        assert_eq!(filtered.summaries(), vec!["abc", "ab"]);
        assert_eq!(faults.len(), 1);
        assert!(matches!(
            &faults[0],
            DisplayFault::Match { keyword, reason }
                if keyword == "b" && reason.contains("matcher exploded")
        ));
    }

    #[test]
    fn filtered_rejects_mutation() {
        let mut base = Walker::base(identity());
        fill(&mut base, &["ab", "abc"]);
        let mut source: DataSource<Walker<String>> = DataSource::new();
        let parent = source.register(Walker::base(identity()));
        let (mut filtered, _) = Walker::filtered_from(&base, "a", parent);
        assert_eq!(filtered.remove(0), Mutation::Rejected);
        assert_eq!(filtered.clear(), Mutation::Rejected);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn base_remove_and_clear() {
        let mut base = Walker::base(identity());
        fill(&mut base, &["a", "b", "c"]);
        assert_eq!(base.remove(1), Mutation::Removed(1));
        assert_eq!(base.summaries(), vec!["a", "c"]);
        assert_eq!(base.remove(9), Mutation::Rejected);
        assert_eq!(base.clear(), Mutation::Removed(2));
        assert!(base.is_empty());
    }

    #[test]
    fn items_share_the_message_allocation() {
        let mut base = Walker::base(identity());
        let message = Rc::new("shared".to_owned());
        assert!(base.recv(&message).is_ok());
        let Some(item) = base.get(0) else {
            panic!("missing item");
        };
        assert!(Rc::ptr_eq(&item.shared(), &message));
    }
}
