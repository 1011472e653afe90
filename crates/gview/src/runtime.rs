//! crossterm terminal loop driving a [`Controller`].

use std::io::{self, Write};
use std::panic;
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, Event as TerminalEvent, KeyCode as TerminalKeyCode, KeyEventKind, KeyModifiers,
    MouseEventKind,
};
use crossterm::style::{
    Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use gview_adapter::input::{
    InputEvent, Key, KeyEvent, Modifiers, MouseEvent, MouseWheelDirection, ResizeEvent,
};
use gview_adapter::render::{CellStyle, RenderFrame};
use gview_core::logging::Logger;
use thiserror::Error;

use crate::controller::Controller;
use crate::feed::{Feed, FeedStatus};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("enter terminal mode: {0}")]
    Terminal(#[source] io::Error),
    #[error("read terminal input: {0}")]
    Input(#[source] io::Error),
    #[error("render frame: {0}")]
    Render(#[source] io::Error),
}

/// Run the UI until the controller quits or ctrl-c is pressed.
///
/// Each turn drains `feed` into the controller, repaints if anything changed,
/// then waits up to `tick` for input.
pub fn run<M, F>(
    controller: &mut Controller<M>,
    feed: &mut F,
    tick: Duration,
    logger: &Logger,
) -> Result<(), RuntimeError>
where
    F: Feed<M>,
{
    let logger = logger.component("runtime");
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(log_panic(logger.clone())));
    let result = run_session(controller, feed, tick, &logger);
    panic::set_hook(previous_hook);
    result
}

fn run_session<M, F>(
    controller: &mut Controller<M>,
    feed: &mut F,
    tick: Duration,
    logger: &Logger,
) -> Result<(), RuntimeError>
where
    F: Feed<M>,
{
    let mut session = TerminalSession::enter().map_err(RuntimeError::Terminal)?;
    let (width, height) = terminal_size().map_err(RuntimeError::Terminal)?;
    controller.update(InputEvent::Resize(ResizeEvent { width, height }));
    logger.info_with(
        "session started",
        &[("width", &width.to_string()), ("height", &height.to_string())],
    );

    let mut dirty = true;
    let mut feed_open = true;
    loop {
        if feed_open {
            let mut delivered = 0usize;
            let status = feed.drain(&mut |message| {
                controller.push(message);
                delivered += 1;
            });
            dirty |= delivered > 0;
            if status == FeedStatus::Closed {
                feed_open = false;
                logger.debug("feed closed");
            }
        }

        if dirty {
            let frame = controller.render();
            render_frame(&mut session.stdout, &frame).map_err(RuntimeError::Render)?;
            dirty = false;
        }

        if controller.quitting() {
            break;
        }

        if !event::poll(tick).map_err(RuntimeError::Input)? {
            continue;
        }
        let event = event::read().map_err(RuntimeError::Input)?;
        if is_interrupt(&event) {
            break;
        }
        if let Some(input) = map_terminal_event(event) {
            controller.update(input);
            dirty = true;
        }
    }
    logger.info("session ended");
    Ok(())
}

/// Panic hook that reports to the log. While the terminal is in raw mode
/// the default hook would print over the alternate screen.
fn log_panic(logger: Logger) -> impl Fn(&panic::PanicHookInfo<'_>) + Send + Sync + 'static {
    move |info: &panic::PanicHookInfo<'_>| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        logger.error_with("panic", &[("location", &location), ("message", &message)]);
    }
}

fn terminal_size() -> io::Result<(usize, usize)> {
    let (width, height) = terminal::size()?;
    Ok((usize::from(width), usize::from(height)))
}

fn map_terminal_event(event: TerminalEvent) -> Option<InputEvent> {
    match event {
        TerminalEvent::Resize(width, height) => Some(InputEvent::Resize(ResizeEvent {
            width: usize::from(width),
            height: usize::from(height),
        })),
        TerminalEvent::Mouse(mouse) => {
            let wheel = match mouse.kind {
                MouseEventKind::ScrollUp => MouseWheelDirection::Up,
                MouseEventKind::ScrollDown => MouseWheelDirection::Down,
                _ => return None,
            };
            Some(InputEvent::Mouse(MouseEvent { wheel: Some(wheel) }))
        }
        TerminalEvent::Key(key_event) => {
            if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                return None;
            }

            let key = match key_event.code {
                TerminalKeyCode::Char(ch) => Key::Char(ch),
                TerminalKeyCode::Enter => Key::Enter,
                TerminalKeyCode::Esc => Key::Escape,
                TerminalKeyCode::Tab | TerminalKeyCode::BackTab => Key::Tab,
                TerminalKeyCode::Backspace => Key::Backspace,
                TerminalKeyCode::Up => Key::Up,
                TerminalKeyCode::Down => Key::Down,
                TerminalKeyCode::Left => Key::Left,
                TerminalKeyCode::Right => Key::Right,
                TerminalKeyCode::PageUp => Key::PageUp,
                TerminalKeyCode::PageDown => Key::PageDown,
                TerminalKeyCode::Home => Key::Home,
                TerminalKeyCode::End => Key::End,
                _ => return None,
            };

            let mut modifiers = Modifiers {
                shift: key_event.modifiers.contains(KeyModifiers::SHIFT),
                ctrl: key_event.modifiers.contains(KeyModifiers::CONTROL),
                alt: key_event.modifiers.contains(KeyModifiers::ALT),
            };
            if matches!(key_event.code, TerminalKeyCode::BackTab) {
                modifiers.shift = true;
            }

            Some(InputEvent::Key(KeyEvent { key, modifiers }))
        }
        _ => None,
    }
}

fn is_interrupt(event: &TerminalEvent) -> bool {
    let TerminalEvent::Key(key_event) = event else {
        return false;
    };

    if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return false;
    }

    matches!(key_event.code, TerminalKeyCode::Char('c'))
        && key_event.modifiers.contains(KeyModifiers::CONTROL)
}

fn render_frame<W: Write>(out: &mut W, frame: &RenderFrame) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    let size = frame.size();

    for y in 0..size.height {
        queue!(out, MoveTo(0, to_u16(y)))?;
        let mut style = None;
        for x in 0..size.width {
            if let Some(cell) = frame.cell(x, y) {
                if style != Some(cell.style) {
                    queue_style(out, cell.style)?;
                    style = Some(cell.style);
                }
                queue!(out, Print(cell.glyph))?;
            }
        }
    }

    queue!(out, SetAttribute(Attribute::Reset))?;
    out.flush()
}

fn queue_style<W: Write>(out: &mut W, style: CellStyle) -> io::Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Reset),
        SetForegroundColor(Color::AnsiValue(style.fg)),
        SetBackgroundColor(Color::AnsiValue(style.bg)),
    )?;
    if style.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    } else if style.dim {
        queue!(out, SetAttribute(Attribute::Dim))?;
    }
    if style.underline {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    Ok(())
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

struct TerminalSession {
    stdout: io::Stdout,
}

impl TerminalSession {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            Hide,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            SetAttribute(Attribute::Reset),
            LeaveAlternateScreen,
            Show,
            MoveTo(0, 0)
        );
        let _ = terminal::disable_raw_mode();
    }
}
