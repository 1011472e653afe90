//! The summary list: displayer context, filter state machine and focus.

use std::rc::Rc;

use gview_adapter::input::{translate_input, InputEvent, Key, KeyEvent, UiAction};
use gview_adapter::render::{FrameSize, RenderFrame, TextRole};
use gview_adapter::style::ThemeSpec;
use gview_core::logging::Logger;

use crate::actions::Actions;
use crate::controller::Command;
use crate::displayer::Displayer;
use crate::error::ContextError;
use crate::fault::DisplayFault;
use crate::keys::{ReservedAction, ReservedKeys};
use crate::search::{Direction, InPageSearch};
use crate::source::{DataSource, ListenerId, PushReport};
use crate::walker::{Item, Mutation, Walker};

// ---------------------------------------------------------------------------
// DisplayerContext
// ---------------------------------------------------------------------------

/// One browsable list: its source, render capability and actions.
///
/// The base walker is registered first at construction and is never
/// unregistered.
pub struct DisplayerContext<M> {
    source: DataSource<Walker<M>>,
    displayer: Rc<dyn Displayer<M>>,
    actions: Actions<M>,
    reserved: ReservedKeys,
    base: ListenerId,
}

impl<M> DisplayerContext<M> {
    /// Validate `actions` against `reserved` and register the base walker.
    pub fn new<D>(
        displayer: D,
        actions: Actions<M>,
        reserved: ReservedKeys,
    ) -> Result<Self, ContextError>
    where
        D: Displayer<M> + 'static,
    {
        Self::from_shared(Rc::new(displayer), actions, reserved)
    }

    pub fn from_shared(
        displayer: Rc<dyn Displayer<M>>,
        actions: Actions<M>,
        reserved: ReservedKeys,
    ) -> Result<Self, ContextError> {
        actions.validate(&reserved)?;
        let mut source = DataSource::new();
        let base = source.register(Walker::base(Rc::clone(&displayer)));
        Ok(Self {
            source,
            displayer,
            actions,
            reserved,
            base,
        })
    }

    #[must_use]
    pub fn displayer(&self) -> &Rc<dyn Displayer<M>> {
        &self.displayer
    }

    #[must_use]
    pub fn actions(&self) -> &Actions<M> {
        &self.actions
    }

    #[must_use]
    pub fn reserved(&self) -> &ReservedKeys {
        &self.reserved
    }

    #[must_use]
    pub fn base_id(&self) -> ListenerId {
        self.base
    }

    #[must_use]
    pub fn base(&self) -> Option<&Walker<M>> {
        self.source.get(self.base)
    }

    #[must_use]
    pub fn walker(&self, id: ListenerId) -> Option<&Walker<M>> {
        self.source.get(id)
    }

    #[must_use]
    pub fn listener_ids(&self) -> Vec<ListenerId> {
        self.source.ids()
    }

    pub fn push(&mut self, message: impl Into<Rc<M>>) -> PushReport {
        self.source.push(message)
    }

    fn register_filter(&mut self, walker: Walker<M>) -> ListenerId {
        self.source.register(walker)
    }

    /// Unregister a filtered walker. The base walker is refused.
    fn unregister_filter(&mut self, id: ListenerId) -> bool {
        id != self.base && self.source.unregister(id).is_some()
    }

    fn base_mut(&mut self) -> Option<&mut Walker<M>> {
        self.source.get_mut(self.base)
    }
}

// ---------------------------------------------------------------------------
// Search state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter {
    pub keyword: String,
    pub walker: ListenerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Browsing,
    /// Keyword being typed. `filter` is the filter active when editing began.
    Editing {
        buffer: String,
        filter: Option<ActiveFilter>,
    },
    Filtered(ActiveFilter),
}

impl SearchState {
    fn active_filter(&self) -> Option<&ActiveFilter> {
        match self {
            Self::Browsing => None,
            Self::Editing { filter, .. } => filter.as_ref(),
            Self::Filtered(filter) => Some(filter),
        }
    }
}

// ---------------------------------------------------------------------------
// SummaryList
// ---------------------------------------------------------------------------

pub struct SummaryList<M> {
    context: DisplayerContext<M>,
    state: SearchState,
    cursor: usize,
    search: InPageSearch,
    default_view: usize,
    viewport: usize,
    logger: Logger,
}

impl<M> SummaryList<M> {
    pub fn new(context: DisplayerContext<M>) -> Self {
        Self {
            context,
            state: SearchState::Browsing,
            cursor: 0,
            search: InPageSearch::new(),
            default_view: 0,
            viewport: 20,
            logger: Logger::discard(),
        }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: &Logger) -> Self {
        self.logger = logger.component("summary");
        self
    }

    #[must_use]
    pub fn with_default_view(mut self, index: usize) -> Self {
        self.default_view = index;
        self
    }

    #[must_use]
    pub fn context(&self) -> &DisplayerContext<M> {
        &self.context
    }

    #[must_use]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self.state, SearchState::Editing { .. })
    }

    #[must_use]
    pub fn editing_buffer(&self) -> Option<&str> {
        match &self.state {
            SearchState::Editing { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    /// Keyword of the filter currently shown, if any.
    #[must_use]
    pub fn filter_keyword(&self) -> Option<&str> {
        self.state.active_filter().map(|f| f.keyword.as_str())
    }

    #[must_use]
    pub fn displayed_id(&self) -> ListenerId {
        self.state
            .active_filter()
            .map_or(self.context.base, |f| f.walker)
    }

    #[must_use]
    pub fn displays_base(&self) -> bool {
        self.displayed_id() == self.context.base
    }

    #[must_use]
    pub fn displayed(&self) -> Option<&Walker<M>> {
        self.context.walker(self.displayed_id())
    }

    fn displayed_items(&self) -> &[Item<M>] {
        self.displayed().map_or(&[][..], Walker::items)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.displayed_items().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Focused index, clamped to the displayed walker; `None` when empty.
    #[must_use]
    pub fn focus(&self) -> Option<usize> {
        let len = self.len();
        (len > 0).then(|| self.cursor.min(len - 1))
    }

    #[must_use]
    pub fn focused_item(&self) -> Option<&Item<M>> {
        self.focus().and_then(|i| self.displayed_items().get(i))
    }

    pub fn set_focus(&mut self, index: usize) {
        self.cursor = index;
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows.max(1);
    }

    pub fn push(&mut self, message: impl Into<Rc<M>>) -> PushReport {
        self.context.push(message)
    }

    // -- filter state machine ------------------------------------------------

    /// Enter keyword editing. The displayed walker does not change.
    pub fn open_search(&mut self) {
        let filter = self.state.active_filter().cloned();
        self.state = SearchState::Editing {
            buffer: String::new(),
            filter,
        };
    }

    /// Leave editing without touching the walkers.
    pub fn cancel_search(&mut self) {
        if let SearchState::Editing { filter, .. } = std::mem::take(&mut self.state) {
            self.state = filter.map_or(SearchState::Browsing, SearchState::Filtered);
        }
    }

    /// Show the walker for `keyword`; an empty keyword shows the base.
    ///
    /// Returns the match faults hit while building the snapshot; those items
    /// are left out of the filtered view.
    pub fn filter(&mut self, keyword: &str) -> Vec<DisplayFault> {
        let previous = std::mem::take(&mut self.state);
        let previous = match previous {
            SearchState::Browsing => None,
            SearchState::Editing { filter, .. } => filter,
            SearchState::Filtered(filter) => Some(filter),
        };
        if let Some(old) = &previous {
            self.context.unregister_filter(old.walker);
        }
        self.cursor = 0;
        self.search.reset();

        if keyword.is_empty() {
            if previous.is_some() {
                self.logger.debug("filter cleared");
            }
            return Vec::new();
        }

        let base_id = self.context.base;
        let Some(base) = self.context.base() else {
            return Vec::new();
        };
        let (walker, faults) = Walker::filtered_from(base, keyword, base_id);
        let matched = walker.len();
        let id = self.context.register_filter(walker);
        self.state = SearchState::Filtered(ActiveFilter {
            keyword: keyword.to_owned(),
            walker: id,
        });
        self.logger.debug_with(
            "filter committed",
            &[
                ("keyword", keyword),
                ("matched", &matched.to_string()),
                ("listener", &id.to_string()),
            ],
        );
        faults
    }

    pub fn clear_filter(&mut self) {
        self.filter("");
    }

    // -- in-page search ------------------------------------------------------

    pub fn search_next(&mut self, keyword: &str) -> bool {
        self.search_step(keyword, Direction::Forward)
    }

    pub fn search_prev(&mut self, keyword: &str) -> bool {
        self.search_step(keyword, Direction::Backward)
    }

    fn search_step(&mut self, keyword: &str, direction: Direction) -> bool {
        let focus = self.focus();
        let hit = {
            let items = self.context.walker(self.displayed_id()).map_or(&[][..], Walker::items);
            self.search.step(keyword, items, focus, direction)
        };
        match hit {
            Some(index) => {
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    // -- mutations -----------------------------------------------------------

    /// Delete the focused item. Only the base walker can be mutated.
    pub fn delete_focused(&mut self) -> Mutation {
        let Some(index) = self.focus() else {
            return Mutation::Rejected;
        };
        if !self.displays_base() {
            self.logger.debug("delete rejected on filtered view");
            return Mutation::Rejected;
        }
        let outcome = self
            .context
            .base_mut()
            .map_or(Mutation::Rejected, |base| base.remove(index));
        if outcome != Mutation::Rejected {
            self.search.reset();
        }
        outcome
    }

    pub fn delete_all(&mut self) -> Mutation {
        if !self.displays_base() {
            self.logger.debug("delete-all rejected on filtered view");
            return Mutation::Rejected;
        }
        self.cursor = 0;
        self.search.reset();
        self.context
            .base_mut()
            .map_or(Mutation::Rejected, Walker::clear)
    }

    // -- input ---------------------------------------------------------------

    pub fn update(&mut self, event: InputEvent) -> Command<M> {
        match event {
            InputEvent::Key(key) if self.is_editing() => self.handle_edit_key(key),
            InputEvent::Key(key) => self.handle_key(key),
            other => {
                self.apply(translate_input(&other));
                Command::None
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command<M> {
        let name = key.name();
        if let Some(action) = self.context.reserved.action_for(&name) {
            return self.run_reserved(action);
        }
        if self.context.actions.contains(&name) {
            return match self.focused_item() {
                Some(item) => Command::RunAction {
                    key: name,
                    message: item.shared(),
                },
                None => Command::None,
            };
        }
        self.apply(translate_input(&InputEvent::Key(key)));
        Command::None
    }

    fn run_reserved(&mut self, action: ReservedAction) -> Command<M> {
        match action {
            ReservedAction::Search => self.open_search(),
            ReservedAction::Top => self.apply(UiAction::Top),
            ReservedAction::Bottom => self.apply(UiAction::Bottom),
            ReservedAction::DeleteItem => {
                self.delete_focused();
            }
            ReservedAction::DeleteAll => {
                self.delete_all();
            }
            ReservedAction::Quit => {
                if self.filter_keyword().is_some() {
                    self.clear_filter();
                } else {
                    return Command::Quit;
                }
            }
            ReservedAction::Help => return Command::OpenHelp,
            ReservedAction::OpenDetail => {
                if let Some(item) = self.focused_item() {
                    return Command::OpenDetail {
                        message: item.shared(),
                        view: self.default_view,
                    };
                }
            }
        }
        Command::None
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Command<M> {
        let SearchState::Editing { buffer, .. } = &mut self.state else {
            return Command::None;
        };
        if let Some(c) = key.text() {
            buffer.push(c);
            return Command::None;
        }
        match key.key {
            Key::Backspace => {
                buffer.pop();
            }
            Key::Escape => self.cancel_search(),
            Key::Enter => {
                let keyword = buffer.clone();
                let mut faults = self.filter(&keyword).into_iter();
                if let Some(first) = faults.next() {
                    for extra in faults {
                        self.logger.warn_with("match fault", &[("fault", &extra.to_string())]);
                    }
                    return Command::Fault(first);
                }
            }
            _ => {}
        }
        Command::None
    }

    fn apply(&mut self, action: UiAction) {
        let Some(focus) = self.focus() else {
            self.cursor = 0;
            return;
        };
        let last = self.len() - 1;
        self.cursor = match action {
            UiAction::MoveUp => focus.saturating_sub(1),
            UiAction::MoveDown => (focus + 1).min(last),
            UiAction::PageUp => focus.saturating_sub(self.viewport),
            UiAction::PageDown => (focus + self.viewport).min(last),
            UiAction::Top => 0,
            UiAction::Bottom => last,
            UiAction::Noop | UiAction::Refresh => focus,
        };
    }

    // -- rendering -----------------------------------------------------------

    /// Status text for the header: item counts and the active filter.
    #[must_use]
    pub fn status(&self) -> String {
        let base = self.context.base().map_or(0, Walker::len);
        match self.filter_keyword() {
            Some(keyword) => format!("filter {keyword:?}: {} of {base}", self.len()),
            None => format!("{base} items"),
        }
    }

    #[must_use]
    pub fn render(&self, size: FrameSize, theme: ThemeSpec) -> RenderFrame {
        let mut frame = RenderFrame::new(size, theme);
        let Some(focus) = self.focus() else {
            frame.draw_text(0, 0, "(no messages)", TextRole::Muted);
            return frame;
        };
        let offset = (focus + 1).saturating_sub(size.height);
        let items = self.displayed_items();
        for (row, item) in items.iter().skip(offset).take(size.height).enumerate() {
            if offset + row == focus {
                frame.fill_row(row, item.summary(), TextRole::Focus);
            } else {
                frame.draw_text(0, row, item.summary(), TextRole::Primary);
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use gview_adapter::snapshot::assert_render_frame_snapshot;

    use super::*;
    use crate::displayer::FnDisplayer;

    fn context() -> DisplayerContext<String> {
        let built = DisplayerContext::new(
            FnDisplayer::new(|m: &String| Ok(m.clone())),
            Actions::new().with("a", "archive", |_, _| Ok(())),
            ReservedKeys::standard(),
        );
        match built {
            Ok(context) => context,
            Err(err) => panic!("context: {err}"),
        }
    }

    fn list_with(messages: &[&str]) -> SummaryList<String> {
        let mut list = SummaryList::new(context());
        for m in messages {
            list.push((*m).to_owned());
        }
        list
    }

    fn key(c: char) -> InputEvent {
        InputEvent::Key(KeyEvent::char(c))
    }

    fn special(k: Key) -> InputEvent {
        InputEvent::Key(KeyEvent::plain(k))
    }

    fn type_filter(list: &mut SummaryList<String>, keyword: &str) -> Command<String> {
        list.update(key('/'));
        for c in keyword.chars() {
            list.update(key(c));
        }
        list.update(special(Key::Enter))
    }

    fn shown(list: &SummaryList<String>) -> Vec<String> {
        list.displayed()
            .map(|w| w.summaries().iter().map(|s| (*s).to_owned()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn reserved_key_in_actions_fails_construction() {
        let built = DisplayerContext::new(
            FnDisplayer::new(|m: &String| Ok(m.clone())),
            Actions::new().with("G", "grab", |_, _| Ok(())),
            ReservedKeys::standard(),
        );
        assert!(matches!(built, Err(ContextError::ReservedKey { .. })));
    }

    #[test]
    fn base_walker_is_registered_first() {
        let context = context();
        assert_eq!(context.listener_ids(), vec![context.base_id()]);
    }

    #[test]
    fn editing_does_not_change_walker_until_commit() {
        let mut list = list_with(&["aaa", "bbb"]);
        list.update(key('/'));
        list.update(key('b'));
        assert_eq!(list.editing_buffer(), Some("b"));
        assert!(list.displays_base());
        assert_eq!(list.update(special(Key::Enter)), Command::None);
        assert_eq!(shown(&list), vec!["bbb"]);
        assert_eq!(list.filter_keyword(), Some("b"));
    }

    #[test]
    fn reserved_characters_are_typed_while_editing() {
        let mut list = list_with(&["q/x"]);
        list.update(key('/'));
        for c in ['q', '/', 'x'] {
            assert_eq!(list.update(key(c)), Command::None);
        }
        assert_eq!(list.editing_buffer(), Some("q/x"));
    }

    #[test]
    fn backspace_and_escape() {
        let mut list = list_with(&["aaa"]);
        type_filter(&mut list, "a");
        let filtered = list.displayed_id();
        list.update(key('/'));
        list.update(key('z'));
        list.update(special(Key::Backspace));
        assert_eq!(list.editing_buffer(), Some(""));
        list.update(special(Key::Escape));
        assert!(!list.is_editing());
        assert_eq!(list.displayed_id(), filtered);
        assert_eq!(list.filter_keyword(), Some("a"));
    }

    #[test]
    fn new_filter_replaces_previous_registration() {
        let mut list = list_with(&["ab", "bc", "cd"]);
        type_filter(&mut list, "b");
        let first = list.displayed_id();
        type_filter(&mut list, "c");
        let second = list.displayed_id();
        assert_ne!(first, second);
        let ids = list.context().listener_ids();
        assert_eq!(ids, vec![list.context().base_id(), second]);
        assert_eq!(shown(&list), vec!["bc", "cd"]);
    }

    #[test]
    fn empty_commit_returns_to_base_and_unregisters() {
        let mut list = list_with(&["ab", "cd"]);
        type_filter(&mut list, "a");
        type_filter(&mut list, "");
        assert!(list.displays_base());
        assert_eq!(list.state(), &SearchState::Browsing);
        assert_eq!(list.context().listener_ids().len(), 1);
    }

    #[test]
    fn q_clears_filter_then_quits() {
        let mut list = list_with(&["ab"]);
        type_filter(&mut list, "a");
        assert_eq!(list.update(key('q')), Command::None);
        assert!(list.displays_base());
        assert_eq!(list.update(key('q')), Command::Quit);
    }

    #[test]
    fn delete_only_affects_base() {
        let mut list = list_with(&["ab", "ac", "b"]);
        type_filter(&mut list, "a");
        assert_eq!(list.delete_focused(), Mutation::Rejected);
        assert_eq!(list.delete_all(), Mutation::Rejected);
        list.update(key('x'));
        list.update(key('X'));
        assert_eq!(shown(&list), vec!["ab", "ac"]);
        list.clear_filter();
        list.update(key('x'));
        assert_eq!(shown(&list), vec!["ac", "b"]);
        list.update(key('X'));
        assert!(list.is_empty());
        assert_eq!(list.focus(), None);
    }

    #[test]
    fn focus_is_clamped_and_moves() {
        let mut list = list_with(&["a", "b", "c"]);
        assert_eq!(list.focus(), Some(0));
        list.update(key('G'));
        assert_eq!(list.focus(), Some(2));
        list.update(key('j'));
        assert_eq!(list.focus(), Some(2));
        list.update(special(Key::Up));
        assert_eq!(list.focus(), Some(1));
        list.update(key('g'));
        assert_eq!(list.focus(), Some(0));
        list.set_focus(99);
        assert_eq!(list.focus(), Some(2));
    }

    #[test]
    fn enter_opens_default_view_for_focused_item() {
        let mut list = list_with(&["a", "b"]).with_default_view(1);
        list.update(key('j'));
        let Command::OpenDetail { message, view } = list.update(special(Key::Enter)) else {
            panic!("expected open detail");
        };
        assert_eq!(message.as_str(), "b");
        assert_eq!(view, 1);
    }

    #[test]
    fn custom_action_needs_focus() {
        let mut empty = list_with(&[]);
        assert_eq!(empty.update(key('a')), Command::None);
        let mut list = list_with(&["m"]);
        let Command::RunAction { key: bound, message } = list.update(key('a')) else {
            panic!("expected action");
        };
        assert_eq!(bound, "a");
        assert_eq!(message.as_str(), "m");
    }

    #[test]
    fn help_key_opens_help() {
        let mut list = list_with(&[]);
        assert_eq!(list.update(key('?')), Command::OpenHelp);
    }

    #[test]
    fn in_page_search_moves_focus_without_wrap() {
        let mut list = list_with(&["x1", "y", "x2", "z"]);
        assert!(list.search_next("x"));
        assert_eq!(list.focus(), Some(0));
        assert!(list.search_next("x"));
        assert_eq!(list.focus(), Some(2));
        assert!(!list.search_next("x"));
        assert_eq!(list.focus(), Some(2));
        assert_eq!(list.len(), 4);
        assert!(list.search_prev("x"));
        assert_eq!(list.focus(), Some(0));
    }

    #[test]
    fn search_restarts_from_focus_after_delete() {
        let mut list = list_with(&["x1", "x2", "x3"]);
        assert!(list.search_next("x"));
        assert!(list.search_next("x"));
        assert_eq!(list.focus(), Some(1));
        assert_eq!(list.delete_focused(), Mutation::Removed(1));
        assert!(list.search_next("x"));
        assert_eq!(list.focus(), Some(1));
        assert_eq!(list.focused_item().map(|i| i.summary()), Some("x3"));

        assert_eq!(list.delete_all(), Mutation::Removed(2));
        list.push("x4".to_owned());
        list.push("y".to_owned());
        assert!(list.search_next("x"));
        assert_eq!(list.focus(), Some(0));
    }

    #[test]
    fn render_scrolls_to_focus() {
        let mut list = list_with(&["one", "two", "three", "four"]);
        list.update(key('G'));
        let frame = list.render(
            FrameSize {
                width: 8,
                height: 2,
            },
            ThemeSpec::default(),
        );
        assert_render_frame_snapshot("summary", &frame, "three\nfour");
        assert_eq!(list.status(), "4 items");
    }

    #[test]
    fn status_names_filter() {
        let mut list = list_with(&["ab", "cd"]);
        type_filter(&mut list, "a");
        assert_eq!(list.status(), "filter \"a\": 1 of 2");
    }
}
