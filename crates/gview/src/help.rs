//! Help overlay listing basic, reserved and custom keys.

use gview_adapter::input::{translate_input, InputEvent, UiAction};
use gview_adapter::render::{FrameSize, RenderFrame, TextRole};
use gview_adapter::style::ThemeSpec;

use crate::actions::Actions;
use crate::controller::Command;
use crate::keys::ReservedKeys;

const BASIC_KEYS: [(&str, &str); 6] = [
    ("j / down", "next item"),
    ("k / up", "previous item"),
    ("page down", "next page"),
    ("page up", "previous page"),
    ("esc", "back"),
    ("ctrl c", "exit"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpCategory {
    pub title: String,
    pub entries: Vec<(String, String)>,
}

impl HelpCategory {
    fn new<K: Into<String>, D: Into<String>>(title: &str, entries: Vec<(K, D)>) -> Self {
        Self {
            title: title.to_owned(),
            entries: entries
                .into_iter()
                .map(|(k, d)| (k.into(), d.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpFrame {
    categories: Vec<HelpCategory>,
    offset: usize,
}

impl HelpFrame {
    pub fn build<M>(reserved: &ReservedKeys, actions: &Actions<M>) -> Self {
        let advanced: Vec<(&str, &str)> = reserved
            .entries()
            .iter()
            .map(|entry| (entry.key, entry.description))
            .collect();
        let custom: Vec<(String, String)> = actions
            .entries()
            .iter()
            .map(|action| (action.key().to_owned(), action.description().to_owned()))
            .collect();
        Self {
            categories: vec![
                HelpCategory::new("Basic", BASIC_KEYS.to_vec()),
                HelpCategory::new("Advanced", advanced),
                HelpCategory::new("Custom", custom),
            ],
            offset: 0,
        }
    }

    #[must_use]
    pub fn categories(&self) -> &[HelpCategory] {
        &self.categories
    }

    /// Plain text lines with the role each is drawn in. Empty categories
    /// are left out.
    #[must_use]
    pub fn lines(&self) -> Vec<(String, TextRole)> {
        let width = self
            .categories
            .iter()
            .flat_map(|c| c.entries.iter().map(|(k, _)| k.chars().count()))
            .max()
            .unwrap_or(0);
        let mut lines = Vec::new();
        for category in self.categories.iter().filter(|c| !c.entries.is_empty()) {
            lines.push((category.title.clone(), TextRole::Title));
            for (key, description) in &category.entries {
                lines.push((format!("  {key:<width$}  {description}"), TextRole::Primary));
            }
            lines.push((String::new(), TextRole::Primary));
        }
        lines
    }

    pub fn update<M>(&mut self, event: InputEvent) -> Command<M> {
        if let InputEvent::Key(key) = event {
            if matches!(key.name().as_str(), "q" | "esc" | "?") {
                return Command::Back;
            }
        }
        let last = self.lines().len().saturating_sub(1);
        self.offset = match translate_input(&event) {
            UiAction::MoveUp => self.offset.saturating_sub(1),
            UiAction::MoveDown => (self.offset + 1).min(last),
            UiAction::PageUp => self.offset.saturating_sub(10),
            UiAction::PageDown => (self.offset + 10).min(last),
            UiAction::Top => 0,
            UiAction::Bottom => last,
            UiAction::Noop | UiAction::Refresh => self.offset,
        };
        Command::None
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn render(&self, size: FrameSize, theme: ThemeSpec) -> RenderFrame {
        let mut frame = RenderFrame::new(size, theme);
        for (y, (text, role)) in self
            .lines()
            .iter()
            .skip(self.offset)
            .take(size.height)
            .enumerate()
        {
            frame.draw_text(0, y, text, *role);
        }
        frame
    }
}
