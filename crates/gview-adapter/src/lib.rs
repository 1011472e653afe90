//! gview-adapter: render/input boundary for the gview engine.
//!
//! The engine draws into a [`render::RenderFrame`] and consumes
//! [`input::InputEvent`]s; only the terminal runtime knows about the real
//! terminal backend. Keeping this boundary small lets every view be tested
//! with plain text snapshots.

/// Style and theme primitives.
pub mod style {
    /// Logical theme choices supported by the adapter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ThemeKind {
        Dark,
        Light,
        HighContrast,
    }

    impl ThemeKind {
        /// Parse a configured theme name (`dark`, `light`, `high-contrast`).
        #[must_use]
        pub fn parse(name: &str) -> Option<Self> {
            match name.trim().to_ascii_lowercase().as_str() {
                "dark" => Some(Self::Dark),
                "light" => Some(Self::Light),
                "high-contrast" | "high_contrast" => Some(Self::HighContrast),
                _ => None,
            }
        }
    }

    /// Stable style tokens exposed to the engine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum StyleToken {
        Background,
        Surface,
        Foreground,
        Muted,
        Accent,
        Danger,
        Warning,
        Info,
        Focus,
    }

    /// Palette of terminal 256-color indexes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Palette {
        pub background: u8,
        pub surface: u8,
        pub foreground: u8,
        pub muted: u8,
        pub accent: u8,
        pub danger: u8,
        pub warning: u8,
        pub info: u8,
        pub focus: u8,
    }

    /// Typography emphasis policy per theme.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypographySpec {
        pub accent_bold: bool,
        pub danger_bold: bool,
        pub match_bold: bool,
        pub muted_dim: bool,
        pub title_underline: bool,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ThemeSpec {
        pub kind: ThemeKind,
        pub palette: Palette,
        pub typography: TypographySpec,
    }

    impl Default for ThemeSpec {
        fn default() -> Self {
            Self::for_kind(ThemeKind::Dark)
        }
    }

    impl ThemeSpec {
        /// Returns the color index for a style token.
        #[must_use]
        pub fn color(self, token: StyleToken) -> u8 {
            match token {
                StyleToken::Background => self.palette.background,
                StyleToken::Surface => self.palette.surface,
                StyleToken::Foreground => self.palette.foreground,
                StyleToken::Muted => self.palette.muted,
                StyleToken::Accent => self.palette.accent,
                StyleToken::Danger => self.palette.danger,
                StyleToken::Warning => self.palette.warning,
                StyleToken::Info => self.palette.info,
                StyleToken::Focus => self.palette.focus,
            }
        }

        /// Theme for a configured name; unknown names fall back to dark.
        #[must_use]
        pub fn named(name: &str) -> Self {
            Self::for_kind(ThemeKind::parse(name).unwrap_or(ThemeKind::Dark))
        }

        #[must_use]
        pub fn for_kind(kind: ThemeKind) -> Self {
            let palette = match kind {
                ThemeKind::Dark => Palette {
                    background: 16,
                    surface: 236,
                    foreground: 252,
                    muted: 244,
                    accent: 45,
                    danger: 197,
                    warning: 220,
                    info: 117,
                    focus: 231,
                },
                ThemeKind::Light => Palette {
                    background: 255,
                    surface: 250,
                    foreground: 234,
                    muted: 243,
                    accent: 25,
                    danger: 160,
                    warning: 130,
                    info: 31,
                    focus: 16,
                },
                ThemeKind::HighContrast => Palette {
                    background: 16,
                    surface: 21,
                    foreground: 231,
                    muted: 250,
                    accent: 51,
                    danger: 203,
                    warning: 226,
                    info: 159,
                    focus: 226,
                },
            };
            let typography = TypographySpec {
                accent_bold: true,
                danger_bold: true,
                match_bold: kind != ThemeKind::Light,
                muted_dim: kind == ThemeKind::Dark,
                title_underline: true,
            };
            Self {
                kind,
                palette,
                typography,
            }
        }
    }
}

/// Cell grid that views draw into.
pub mod render {
    use super::style::{StyleToken, ThemeSpec};

    /// Frame dimensions in terminal cells.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FrameSize {
        pub width: usize,
        pub height: usize,
    }

    /// Cell style as 256-color indexes plus text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellStyle {
        pub fg: u8,
        pub bg: u8,
        pub bold: bool,
        pub dim: bool,
        pub underline: bool,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FrameCell {
        pub glyph: char,
        pub style: CellStyle,
    }

    /// Semantic role for rendered text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TextRole {
        Primary,
        Muted,
        /// Top bar.
        Header,
        /// Bottom bar and hints.
        Footer,
        /// Focused row in a list.
        Focus,
        /// Keyword hit while searching.
        Match,
        /// Group titles in detail and help views.
        Title,
        /// Property names in detail views.
        PropKey,
        /// Transient status text.
        Notice,
        Error,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RenderFrame {
        size: FrameSize,
        cells: Vec<FrameCell>,
        theme: ThemeSpec,
    }

    impl RenderFrame {
        /// Create a blank frame using the provided theme.
        #[must_use]
        pub fn new(size: FrameSize, theme: ThemeSpec) -> Self {
            let blank = FrameCell {
                glyph: ' ',
                style: CellStyle {
                    fg: theme.color(StyleToken::Foreground),
                    bg: theme.color(StyleToken::Background),
                    bold: false,
                    dim: false,
                    underline: false,
                },
            };
            Self {
                size,
                cells: vec![blank; size.width.saturating_mul(size.height)],
                theme,
            }
        }

        #[must_use]
        pub fn theme(&self) -> ThemeSpec {
            self.theme
        }

        #[must_use]
        pub fn size(&self) -> FrameSize {
            self.size
        }

        #[must_use]
        pub fn cell(&self, x: usize, y: usize) -> Option<FrameCell> {
            if x >= self.size.width || y >= self.size.height {
                return None;
            }
            self.cells.get(y * self.size.width + x).copied()
        }

        /// Write a single cell, clipped to frame bounds.
        pub fn set_cell(&mut self, x: usize, y: usize, cell: FrameCell) {
            if x >= self.size.width || y >= self.size.height {
                return;
            }
            if let Some(slot) = self.cells.get_mut(y * self.size.width + x) {
                *slot = cell;
            }
        }

        /// Draw text on a single row, clipped to frame width.
        ///
        /// Returns the column just past the last glyph written.
        pub fn draw_text(&mut self, x: usize, y: usize, text: &str, role: TextRole) -> usize {
            let style = self.style_for_role(role);
            let mut col = x;
            for glyph in text.chars() {
                if col >= self.size.width {
                    break;
                }
                self.set_cell(col, y, FrameCell { glyph, style });
                col += 1;
            }
            col
        }

        /// Paint a whole row with the background of `role` and draw `text`.
        pub fn fill_row(&mut self, y: usize, text: &str, role: TextRole) {
            let style = self.style_for_role(role);
            for col in 0..self.size.width {
                self.set_cell(col, y, FrameCell { glyph: ' ', style });
            }
            self.draw_text(0, y, text, role);
        }

        /// Copy `other` into this frame with its top-left corner at (x, y).
        pub fn blit(&mut self, other: &RenderFrame, x: usize, y: usize) {
            for row in 0..other.size.height {
                for col in 0..other.size.width {
                    if let Some(cell) = other.cell(col, row) {
                        self.set_cell(x + col, y + row, cell);
                    }
                }
            }
        }

        #[must_use]
        pub fn row_text(&self, y: usize) -> String {
            if y >= self.size.height {
                return String::new();
            }
            let start = y * self.size.width;
            self.cells[start..start + self.size.width]
                .iter()
                .map(|cell| cell.glyph)
                .collect()
        }

        /// Text-only snapshot for lightweight regression tests.
        #[must_use]
        pub fn snapshot(&self) -> String {
            (0..self.size.height)
                .map(|row| self.row_text(row))
                .collect::<Vec<_>>()
                .join("\n")
        }

        /// Resolved cell style for a semantic role.
        #[must_use]
        pub fn style_for_role(&self, role: TextRole) -> CellStyle {
            let theme = self.theme;
            let typo = theme.typography;
            let plain = CellStyle {
                fg: theme.color(StyleToken::Foreground),
                bg: theme.color(StyleToken::Background),
                bold: false,
                dim: false,
                underline: false,
            };
            match role {
                TextRole::Primary => plain,
                TextRole::Muted => CellStyle {
                    fg: theme.color(StyleToken::Muted),
                    dim: typo.muted_dim,
                    ..plain
                },
                TextRole::Header => CellStyle {
                    fg: theme.color(StyleToken::Accent),
                    bg: theme.color(StyleToken::Surface),
                    bold: typo.accent_bold,
                    ..plain
                },
                TextRole::Footer => CellStyle {
                    fg: theme.color(StyleToken::Muted),
                    bg: theme.color(StyleToken::Surface),
                    ..plain
                },
                TextRole::Focus => CellStyle {
                    fg: theme.color(StyleToken::Focus),
                    bg: theme.color(StyleToken::Surface),
                    bold: true,
                    ..plain
                },
                TextRole::Match => CellStyle {
                    fg: theme.color(StyleToken::Warning),
                    bold: typo.match_bold,
                    ..plain
                },
                TextRole::Title => CellStyle {
                    fg: theme.color(StyleToken::Accent),
                    bold: typo.accent_bold,
                    underline: typo.title_underline,
                    ..plain
                },
                TextRole::PropKey => CellStyle {
                    fg: theme.color(StyleToken::Info),
                    ..plain
                },
                TextRole::Notice => CellStyle {
                    fg: theme.color(StyleToken::Info),
                    bg: theme.color(StyleToken::Surface),
                    bold: true,
                    ..plain
                },
                TextRole::Error => CellStyle {
                    fg: theme.color(StyleToken::Danger),
                    bold: typo.danger_bold,
                    ..plain
                },
            }
        }
    }
}

pub mod snapshot;

/// Canonical input/event model.
pub mod input {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Key {
        Char(char),
        Enter,
        Escape,
        Tab,
        Backspace,
        Up,
        Down,
        Left,
        Right,
        PageUp,
        PageDown,
        Home,
        End,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers {
        pub shift: bool,
        pub ctrl: bool,
        pub alt: bool,
    }

    impl Modifiers {
        #[must_use]
        pub const fn none() -> Self {
            Self {
                shift: false,
                ctrl: false,
                alt: false,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyEvent {
        pub key: Key,
        pub modifiers: Modifiers,
    }

    impl KeyEvent {
        #[must_use]
        pub const fn plain(key: Key) -> Self {
            Self {
                key,
                modifiers: Modifiers::none(),
            }
        }

        #[must_use]
        pub const fn char(c: char) -> Self {
            Self::plain(Key::Char(c))
        }

        #[must_use]
        pub const fn ctrl(c: char) -> Self {
            Self {
                key: Key::Char(c),
                modifiers: Modifiers {
                    shift: false,
                    ctrl: true,
                    alt: false,
                },
            }
        }

        /// Printable character typed without ctrl/alt, if any.
        #[must_use]
        pub fn text(&self) -> Option<char> {
            match self.key {
                Key::Char(c) if !self.modifiers.ctrl && !self.modifiers.alt => Some(c),
                _ => None,
            }
        }

        /// Stable key name used by key tables: `"enter"`, `"shift tab"`,
        /// `"ctrl c"`, or the character itself.
        #[must_use]
        pub fn name(&self) -> String {
            let base = match self.key {
                Key::Char(c) => c.to_string(),
                Key::Enter => "enter".into(),
                Key::Escape => "esc".into(),
                Key::Tab => "tab".into(),
                Key::Backspace => "backspace".into(),
                Key::Up => "up".into(),
                Key::Down => "down".into(),
                Key::Left => "left".into(),
                Key::Right => "right".into(),
                Key::PageUp => "page up".into(),
                Key::PageDown => "page down".into(),
                Key::Home => "home".into(),
                Key::End => "end".into(),
            };
            let mut prefix = String::new();
            if self.modifiers.ctrl {
                prefix.push_str("ctrl ");
            }
            if self.modifiers.alt {
                prefix.push_str("meta ");
            }
            // Shifted characters already carry their case.
            if self.modifiers.shift && !matches!(self.key, Key::Char(_)) {
                prefix.push_str("shift ");
            }
            prefix + &base
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MouseWheelDirection {
        Up,
        Down,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MouseEvent {
        pub wheel: Option<MouseWheelDirection>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResizeEvent {
        pub width: usize,
        pub height: usize,
    }

    /// Input stream event consumed by the engine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum InputEvent {
        Key(KeyEvent),
        Mouse(MouseEvent),
        Resize(ResizeEvent),
    }

    /// Movement actions shared by every scrollable view.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum UiAction {
        Noop,
        MoveUp,
        MoveDown,
        PageUp,
        PageDown,
        Top,
        Bottom,
        Refresh,
    }

    /// Translator trait allowing alternate movement keymaps.
    pub trait InputTranslator {
        fn translate(&self, event: &InputEvent) -> UiAction;
    }

    /// Default movement keymap: arrows, `j`/`k`, paging keys, mouse wheel.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct DefaultInputTranslator;

    impl InputTranslator for DefaultInputTranslator {
        fn translate(&self, event: &InputEvent) -> UiAction {
            match event {
                InputEvent::Key(key) => match (key.key, key.modifiers.ctrl) {
                    (Key::Up, _) | (Key::Char('k'), false) => UiAction::MoveUp,
                    (Key::Down, _) | (Key::Char('j'), false) => UiAction::MoveDown,
                    (Key::PageUp, _) | (Key::Char('b'), true) => UiAction::PageUp,
                    (Key::PageDown, _) | (Key::Char('f'), true) => UiAction::PageDown,
                    (Key::Home, _) => UiAction::Top,
                    (Key::End, _) => UiAction::Bottom,
                    (Key::Char('l'), true) => UiAction::Refresh,
                    _ => UiAction::Noop,
                },
                InputEvent::Mouse(MouseEvent {
                    wheel: Some(MouseWheelDirection::Up),
                }) => UiAction::MoveUp,
                InputEvent::Mouse(MouseEvent {
                    wheel: Some(MouseWheelDirection::Down),
                }) => UiAction::MoveDown,
                InputEvent::Mouse(_) => UiAction::Noop,
                InputEvent::Resize(_) => UiAction::Refresh,
            }
        }
    }

    #[must_use]
    pub fn translate_input(event: &InputEvent) -> UiAction {
        DefaultInputTranslator.translate(event)
    }
}

#[cfg(test)]
mod tests {
    use super::input::{
        translate_input, InputEvent, Key, KeyEvent, Modifiers, MouseEvent, MouseWheelDirection,
        ResizeEvent, UiAction,
    };
    use super::render::{FrameSize, RenderFrame, TextRole};
    use super::snapshot::assert_render_frame_snapshot;
    use super::style::{StyleToken, ThemeKind, ThemeSpec};

    fn frame(width: usize, height: usize) -> RenderFrame {
        RenderFrame::new(FrameSize { width, height }, ThemeSpec::default())
    }

    #[test]
    fn default_theme_is_dark() {
        let theme = ThemeSpec::default();
        assert_eq!(theme.kind, ThemeKind::Dark);
        assert_eq!(theme.color(StyleToken::Accent), 45);
    }

    #[test]
    fn theme_names_parse() {
        assert_eq!(ThemeKind::parse("Light"), Some(ThemeKind::Light));
        assert_eq!(
            ThemeKind::parse("high-contrast"),
            Some(ThemeKind::HighContrast)
        );
        assert_eq!(ThemeKind::parse("solarized"), None);
        assert_eq!(ThemeSpec::named("solarized").kind, ThemeKind::Dark);
    }

    #[test]
    fn draw_text_clips_and_snapshots() {
        let mut f = frame(6, 2);
        let end = f.draw_text(1, 0, "abcdefgh", TextRole::Primary);
        assert_eq!(end, 6);
        f.draw_text(0, 1, "xy", TextRole::Muted);
        assert_render_frame_snapshot("clip", &f, " abcde\nxy");
    }

    #[test]
    fn fill_row_paints_whole_width() {
        let mut f = frame(5, 1);
        f.fill_row(0, "hi", TextRole::Focus);
        let surface = f.theme().color(StyleToken::Surface);
        for col in 0..5 {
            let Some(cell) = f.cell(col, 0) else {
                panic!("missing cell {col}");
            };
            assert_eq!(cell.style.bg, surface);
        }
        assert_eq!(f.row_text(0), "hi   ");
    }

    #[test]
    fn blit_copies_clipped() {
        let mut inner = frame(3, 2);
        inner.draw_text(0, 0, "abc", TextRole::Primary);
        inner.draw_text(0, 1, "def", TextRole::Error);
        let mut outer = frame(4, 3);
        outer.blit(&inner, 2, 1);
        assert_render_frame_snapshot("blit", &outer, "\n  ab\n  de");
        let Some(cell) = outer.cell(2, 2) else {
            panic!("missing cell");
        };
        assert_eq!(cell.style.fg, outer.theme().color(StyleToken::Danger));
    }

    #[test]
    fn muted_role_uses_dim_in_dark_theme() {
        let f = frame(1, 1);
        assert!(f.style_for_role(TextRole::Muted).dim);
        let light = RenderFrame::new(
            FrameSize {
                width: 1,
                height: 1,
            },
            ThemeSpec::for_kind(ThemeKind::Light),
        );
        assert!(!light.style_for_role(TextRole::Muted).dim);
    }

    #[test]
    fn key_names() {
        assert_eq!(KeyEvent::plain(Key::Enter).name(), "enter");
        assert_eq!(KeyEvent::char('G').name(), "G");
        assert_eq!(KeyEvent::ctrl('c').name(), "ctrl c");
        let back_tab = KeyEvent {
            key: Key::Tab,
            modifiers: Modifiers {
                shift: true,
                ..Modifiers::none()
            },
        };
        assert_eq!(back_tab.name(), "shift tab");
        assert_eq!(KeyEvent::plain(Key::PageDown).name(), "page down");
    }

    #[test]
    fn text_ignores_control_chords() {
        assert_eq!(KeyEvent::char('q').text(), Some('q'));
        assert_eq!(KeyEvent::ctrl('q').text(), None);
        assert_eq!(KeyEvent::plain(Key::Enter).text(), None);
    }

    #[test]
    fn movement_keymap() {
        let cases = [
            (KeyEvent::char('j'), UiAction::MoveDown),
            (KeyEvent::plain(Key::Up), UiAction::MoveUp),
            (KeyEvent::plain(Key::PageDown), UiAction::PageDown),
            (KeyEvent::ctrl('b'), UiAction::PageUp),
            (KeyEvent::plain(Key::Home), UiAction::Top),
            (KeyEvent::char('z'), UiAction::Noop),
        ];
        for (key, want) in cases {
            assert_eq!(translate_input(&InputEvent::Key(key)), want, "{key:?}");
        }
    }

    #[test]
    fn mouse_and_resize_translate() {
        assert_eq!(
            translate_input(&InputEvent::Mouse(MouseEvent {
                wheel: Some(MouseWheelDirection::Down)
            })),
            UiAction::MoveDown
        );
        assert_eq!(
            translate_input(&InputEvent::Resize(ResizeEvent {
                width: 80,
                height: 24
            })),
            UiAction::Refresh
        );
    }
}
