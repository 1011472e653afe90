//! Detail content and the frame that browses it.

use std::rc::Rc;

use gview_adapter::input::{translate_input, InputEvent, Key, KeyEvent, UiAction};
use gview_adapter::render::{FrameSize, RenderFrame, TextRole};
use gview_adapter::style::ThemeSpec;

use crate::controller::Command;
use crate::displayer::DetailView;
use crate::fault::{contain, DisplayFault};
use crate::search::{Direction, InPageSearch};

// ---------------------------------------------------------------------------
// Content model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Line(String),
    Prop { key: String, value: String },
}

impl Element {
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }

    pub fn prop(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Prop {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Titled run of elements. Props groups pad keys to the widest key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub title: String,
    pub items: Vec<Element>,
    pub show_title: bool,
    pub align_keys: bool,
}

impl Group {
    pub fn new(title: impl Into<String>, items: Vec<Element>) -> Self {
        Self {
            title: title.into(),
            items,
            show_title: true,
            align_keys: false,
        }
    }

    pub fn props<K, V>(title: impl Into<String>, props: Vec<(K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            title: title.into(),
            items: props
                .into_iter()
                .map(|(k, v)| Element::prop(k, v))
                .collect(),
            show_title: true,
            align_keys: true,
        }
    }

    #[must_use]
    pub fn untitled(mut self) -> Self {
        self.show_title = false;
        self
    }

    fn key_width(&self) -> usize {
        if !self.align_keys {
            return 0;
        }
        self.items
            .iter()
            .filter_map(|item| match item {
                Element::Prop { key, .. } => Some(key.chars().count()),
                Element::Line(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detail {
    groups: Vec<Group>,
}

impl Detail {
    #[must_use]
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Flatten into display lines: title, items, then a blank separator per
    /// group. Empty content yields one blank line.
    #[must_use]
    pub fn lines(&self) -> Vec<DetailLine> {
        let mut lines = Vec::new();
        for group in &self.groups {
            if group.show_title {
                lines.push(DetailLine::new(group.title.clone(), LineKind::Title));
            }
            let width = group.key_width();
            for item in &group.items {
                lines.push(match item {
                    Element::Line(text) => DetailLine::new(text.clone(), LineKind::Text),
                    Element::Prop { key, value } => {
                        let key = format!("{key:<width$}");
                        let key_len = key.chars().count() + 1;
                        DetailLine::new(format!("{key}: {value}"), LineKind::Prop { key_len })
                    }
                });
            }
            lines.push(DetailLine::new(String::new(), LineKind::Blank));
        }
        if lines.is_empty() {
            lines.push(DetailLine::new(String::new(), LineKind::Blank));
        }
        lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Title,
    Text,
    /// `key_len` covers the padded key and its colon.
    Prop { key_len: usize },
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub text: String,
    pub kind: LineKind,
}

impl DetailLine {
    fn new(text: String, kind: LineKind) -> Self {
        Self { text, kind }
    }
}

impl AsRef<str> for DetailLine {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

// ---------------------------------------------------------------------------
// DetailFrame
// ---------------------------------------------------------------------------

/// One message shown through one of its detail views.
pub struct DetailFrame<M> {
    message: Rc<M>,
    views: Vec<DetailView<M>>,
    index: usize,
    lines: Vec<DetailLine>,
    cursor: usize,
    search: InPageSearch,
    keyword: String,
    editing: Option<String>,
    viewport: usize,
}

impl<M> DetailFrame<M> {
    /// Render view `index` of `views` for `message`.
    pub fn open(
        message: Rc<M>,
        views: Vec<DetailView<M>>,
        index: usize,
    ) -> Result<Self, DisplayFault> {
        let lines = render_view(&views, index, &message)?;
        Ok(Self {
            message,
            views,
            index,
            lines,
            cursor: 0,
            search: InPageSearch::new(),
            keyword: String::new(),
            editing: None,
            viewport: 20,
        })
    }

    #[must_use]
    pub fn message(&self) -> &M {
        &self.message
    }

    #[must_use]
    pub fn view_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn view_name(&self) -> &str {
        self.views.get(self.index).map_or("", DetailView::name)
    }

    #[must_use]
    pub fn view_names(&self) -> Vec<&str> {
        self.views.iter().map(DetailView::name).collect()
    }

    #[must_use]
    pub fn lines(&self) -> &[DetailLine] {
        &self.lines
    }

    #[must_use]
    pub fn focus(&self) -> usize {
        self.cursor.min(self.lines.len().saturating_sub(1))
    }

    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Keyword being typed, while the search line is open.
    #[must_use]
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows.max(1);
    }

    /// Switch to another view. On failure the current view stays.
    pub fn switch_view(&mut self, index: usize) -> Result<(), DisplayFault> {
        let lines = render_view(&self.views, index, &self.message)?;
        self.index = index;
        self.lines = lines;
        self.cursor = 0;
        self.search.reset();
        Ok(())
    }

    pub fn search_next(&mut self, keyword: &str) -> bool {
        self.search_step(keyword, Direction::Forward)
    }

    pub fn search_prev(&mut self, keyword: &str) -> bool {
        self.search_step(keyword, Direction::Backward)
    }

    fn search_step(&mut self, keyword: &str, direction: Direction) -> bool {
        let focus = Some(self.focus());
        match self.search.step(keyword, &self.lines, focus, direction) {
            Some(index) => {
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    pub fn update(&mut self, event: InputEvent) -> Command<M> {
        let InputEvent::Key(key) = event else {
            self.apply(translate_input(&event));
            return Command::None;
        };
        if self.editing.is_some() {
            return self.handle_edit_key(key);
        }
        match key.name().as_str() {
            "q" | "esc" => return Command::Back,
            "/" => self.editing = Some(String::new()),
            "n" => {
                let keyword = self.keyword.clone();
                if !self.search_next(&keyword) && !keyword.is_empty() {
                    return Command::Notify(format!("no further match for {keyword:?}"));
                }
            }
            "N" => {
                let keyword = self.keyword.clone();
                if !self.search_prev(&keyword) && !keyword.is_empty() {
                    return Command::Notify(format!("no earlier match for {keyword:?}"));
                }
            }
            "tab" | "shift tab" if self.views.len() > 1 => {
                let count = self.views.len();
                let next = if key.key == Key::Tab && !key.modifiers.shift {
                    (self.index + 1) % count
                } else {
                    (self.index + count - 1) % count
                };
                if let Err(fault) = self.switch_view(next) {
                    return Command::Fault(fault);
                }
            }
            "g" => self.apply(UiAction::Top),
            "G" => self.apply(UiAction::Bottom),
            _ => self.apply(translate_input(&event)),
        }
        Command::None
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Command<M> {
        let Some(buffer) = self.editing.as_mut() else {
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
            Key::Escape => self.editing = None,
            Key::Enter => {
                let keyword = self.editing.take().unwrap_or_default();
                self.keyword = keyword.clone();
                if !keyword.is_empty() && !self.search_next(&keyword) {
                    return Command::Notify(format!("no match for {keyword:?}"));
                }
            }
            _ => {}
        }
        Command::None
    }

    fn apply(&mut self, action: UiAction) {
        let last = self.lines.len().saturating_sub(1);
        let focus = self.focus();
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

    /// Body rendering: a tab strip of view names, then the lines.
    #[must_use]
    pub fn render(&self, size: FrameSize, theme: ThemeSpec) -> RenderFrame {
        let mut frame = RenderFrame::new(size, theme);
        if size.height == 0 {
            return frame;
        }
        let mut col = 0;
        for (i, name) in self.views.iter().map(DetailView::name).enumerate() {
            let role = if i == self.index {
                TextRole::Header
            } else {
                TextRole::Muted
            };
            col = frame.draw_text(col, 0, &format!(" {name} "), role) + 1;
        }

        let rows = size.height.saturating_sub(1);
        let focus = self.focus();
        let offset = (focus + 1).saturating_sub(rows);
        for (row, line) in self.lines.iter().skip(offset).take(rows).enumerate() {
            let y = row + 1;
            let index = offset + row;
            if index == focus && line.kind != LineKind::Blank {
                frame.fill_row(y, &line.text, TextRole::Focus);
                continue;
            }
            match line.kind {
                LineKind::Title => {
                    frame.draw_text(0, y, &line.text, TextRole::Title);
                }
                LineKind::Prop { key_len } => {
                    let key: String = line.text.chars().take(key_len).collect();
                    let value: String = line.text.chars().skip(key_len).collect();
                    let end = frame.draw_text(0, y, &key, TextRole::PropKey);
                    frame.draw_text(end, y, &value, TextRole::Primary);
                }
                LineKind::Text | LineKind::Blank => {
                    let role = if !self.keyword.is_empty() && line.text.contains(&self.keyword)
                    {
                        TextRole::Match
                    } else {
                        TextRole::Primary
                    };
                    frame.draw_text(0, y, &line.text, role);
                }
            }
        }
        frame
    }
}

fn render_view<M>(
    views: &[DetailView<M>],
    index: usize,
    message: &M,
) -> Result<Vec<DetailLine>, DisplayFault> {
    let Some(view) = views.get(index) else {
        return Err(DisplayFault::Detail {
            view: format!("#{index}"),
            reason: format!("only {} detail views defined", views.len()),
        });
    };
    let detail = contain(|| view.render(message)).map_err(|reason| DisplayFault::Detail {
        view: view.name().to_owned(),
        reason,
    })?;
    Ok(detail.lines())
}

#[cfg(test)]
mod tests {
    use gview_adapter::input::Modifiers;
    use gview_adapter::snapshot::assert_render_frame_snapshot;

    use super::*;

    fn views() -> Vec<DetailView<String>> {
        vec![
            DetailView::new("Props", |m: &String| {
                Ok(Detail::new(vec![
                    Group::props("Message", vec![("id", "7"), ("body", m.as_str())]),
                    Group::new(
                        "Notes",
                        vec![Element::line("first note"), Element::line("second note")],
                    ),
                ]))
            }),
            DetailView::new("Raw", |m: &String| {
                Ok(Detail::new(vec![
                    Group::new("raw", vec![Element::line(m.as_str())]).untitled()
                ]))
            }),
            DetailView::new("Broken", |_: &String| Err("no raw form".to_owned())),
        ]
    }

    fn open(index: usize) -> DetailFrame<String> {
        match DetailFrame::open(Rc::new("hello".to_owned()), views(), index) {
            Ok(frame) => frame,
            Err(fault) => panic!("open failed: {fault}"),
        }
    }

    fn key(c: char) -> InputEvent {
        InputEvent::Key(KeyEvent::char(c))
    }

    fn special(k: Key) -> InputEvent {
        InputEvent::Key(KeyEvent::plain(k))
    }

    fn texts(frame: &DetailFrame<String>) -> Vec<&str> {
        frame.lines().iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn props_group_aligns_keys() {
        let frame = open(0);
        assert_eq!(
            texts(&frame),
            vec![
                "Message",
                "id  : 7",
                "body: hello",
                "",
                "Notes",
                "first note",
                "second note",
                "",
            ]
        );
        assert_eq!(frame.lines()[1].kind, LineKind::Prop { key_len: 5 });
    }

    #[test]
    fn empty_detail_renders_one_blank_line() {
        assert_eq!(Detail::default().lines().len(), 1);
    }

    #[test]
    fn untitled_group_skips_title() {
        let frame = open(1);
        assert_eq!(texts(&frame), vec!["hello", ""]);
    }

    #[test]
    fn opening_a_broken_view_is_a_detail_fault() {
        let result = DetailFrame::open(Rc::new("m".to_owned()), views(), 2);
        let Err(DisplayFault::Detail { view, reason }) = result else {
            panic!("expected detail fault");
        };
        assert_eq!(view, "Broken");
        assert_eq!(reason, "no raw form");
    }

    #[test]
    fn missing_view_index_is_a_detail_fault() {
        let result = DetailFrame::open(Rc::new("m".to_owned()), views(), 9);
        assert!(matches!(result, Err(DisplayFault::Detail { .. })));
    }

    #[test]
    fn tab_cycles_views_and_faults_keep_current_view() {
        let mut frame = open(0);
        assert_eq!(frame.update(special(Key::Tab)), Command::None);
        assert_eq!(frame.view_name(), "Raw");
        let cmd = frame.update(special(Key::Tab));
        assert!(matches!(cmd, Command::Fault(DisplayFault::Detail { .. })));
        assert_eq!(frame.view_name(), "Raw");
        let back_tab = InputEvent::Key(KeyEvent {
            key: Key::Tab,
            modifiers: Modifiers {
                shift: true,
                ..Modifiers::none()
            },
        });
        assert_eq!(frame.update(back_tab), Command::None);
        assert_eq!(frame.view_name(), "Props");
    }

    #[test]
    fn slash_search_then_n_and_no_wrap() {
        let mut frame = open(0);
        frame.update(key('/'));
        assert_eq!(frame.editing(), Some(""));
        for c in "note".chars() {
            frame.update(key(c));
        }
        assert_eq!(frame.update(special(Key::Enter)), Command::None);
        assert_eq!(frame.focus(), 5);
        assert_eq!(frame.update(key('n')), Command::None);
        assert_eq!(frame.focus(), 6);
        let cmd = frame.update(key('n'));
        assert!(matches!(cmd, Command::Notify(_)));
        assert_eq!(frame.focus(), 6);
        frame.update(key('N'));
        assert_eq!(frame.focus(), 5);
    }

    #[test]
    fn q_while_editing_is_typed() {
        let mut frame = open(0);
        frame.update(key('/'));
        assert_eq!(frame.update(key('q')), Command::None);
        assert_eq!(frame.editing(), Some("q"));
        frame.update(special(Key::Backspace));
        assert_eq!(frame.editing(), Some(""));
        frame.update(special(Key::Escape));
        assert_eq!(frame.editing(), None);
        assert_eq!(frame.update(key('q')), Command::Back);
    }

    #[test]
    fn movement_is_clamped() {
        let mut frame = open(1);
        frame.update(key('k'));
        assert_eq!(frame.focus(), 0);
        frame.update(key('G'));
        assert_eq!(frame.focus(), 1);
        frame.update(key('j'));
        assert_eq!(frame.focus(), 1);
        frame.update(key('g'));
        assert_eq!(frame.focus(), 0);
    }

    #[test]
    fn render_snapshot() {
        let frame = open(0);
        let rendered = frame.render(
            FrameSize {
                width: 24,
                height: 5,
            },
            ThemeSpec::default(),
        );
        assert_render_frame_snapshot(
            "detail",
            &rendered,
            " Props   Raw   Broken\nMessage\nid  : 7\nbody: hello\n",
        );
    }
}
