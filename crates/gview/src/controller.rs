//! Navigation stack and top-level event routing.
//!
//! The bottom frame is always the summary list. Detail, help, error and child
//! list frames are pushed on top and popped with `back`. Keys go to the top frame; the
//! [`Command`] it returns is resolved here.

use std::rc::Rc;

use gview_adapter::input::{InputEvent, Key};
use gview_adapter::render::{FrameSize, RenderFrame, TextRole};
use gview_adapter::style::ThemeSpec;
use gview_core::config::Config;
use gview_core::logging::Logger;

use crate::actions::Action;
use crate::detail::DetailFrame;
use crate::fault::{contain, DisplayFault};
use crate::help::HelpFrame;
use crate::source::PushReport;
use crate::summary::{DisplayerContext, SummaryList};

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// What a frame asks the controller to do after handling an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<M> {
    None,
    Back,
    Quit,
    OpenDetail { message: Rc<M>, view: usize },
    OpenHelp,
    RunAction { key: String, message: Rc<M> },
    Fault(DisplayFault),
    Notify(String),
}

impl<M> Command<M> {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Shows one fault until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFrame {
    fault: DisplayFault,
}

impl ErrorFrame {
    #[must_use]
    pub fn new(fault: DisplayFault) -> Self {
        Self { fault }
    }

    #[must_use]
    pub fn fault(&self) -> &DisplayFault {
        &self.fault
    }

    pub fn update<M>(&mut self, event: InputEvent) -> Command<M> {
        match event {
            InputEvent::Key(key) if matches!(key.name().as_str(), "q" | "esc") => Command::Back,
            _ => Command::None,
        }
    }

    #[must_use]
    pub fn render(&self, size: FrameSize, theme: ThemeSpec) -> RenderFrame {
        let mut frame = RenderFrame::new(size, theme);
        frame.draw_text(0, 0, self.fault.title(), TextRole::Title);
        frame.draw_text(0, 1, &self.fault.to_string(), TextRole::Error);
        frame.draw_text(0, 3, "press q to go back", TextRole::Muted);
        frame
    }
}

pub enum Frame<M> {
    Summary,
    /// An auxiliary list with its own context, opened by an action.
    List(Box<SummaryList<M>>),
    Detail(DetailFrame<M>),
    Error(ErrorFrame),
    Help(HelpFrame),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Summary,
    List,
    Detail,
    Error,
    Help,
}

impl<M> Frame<M> {
    #[must_use]
    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Summary => FrameKind::Summary,
            Self::List(_) => FrameKind::List,
            Self::Detail(_) => FrameKind::Detail,
            Self::Error(_) => FrameKind::Error,
            Self::Help(_) => FrameKind::Help,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Controller<M> {
    summary: SummaryList<M>,
    frames: Vec<Frame<M>>,
    header: String,
    theme: ThemeSpec,
    width: usize,
    height: usize,
    notice: Option<String>,
    quitting: bool,
    logger: Logger,
}

impl<M> Controller<M> {
    pub fn new(context: DisplayerContext<M>) -> Self {
        let mut controller = Self {
            summary: SummaryList::new(context),
            frames: vec![Frame::Summary],
            header: "General Viewer".to_owned(),
            theme: ThemeSpec::default(),
            width: 80,
            height: 24,
            notice: None,
            quitting: false,
            logger: Logger::discard(),
        };
        controller.sync_viewports();
        controller
    }

    /// Build from loaded configuration: header, theme and default detail view.
    pub fn from_config(context: DisplayerContext<M>, config: &Config, logger: &Logger) -> Self {
        Self::new(context)
            .with_header(&config.header)
            .with_theme(ThemeSpec::named(&config.theme))
            .with_default_view(config.display.default_view)
            .with_logger(logger)
    }

    #[must_use]
    pub fn with_header(mut self, header: &str) -> Self {
        self.header = header.to_owned();
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: ThemeSpec) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: &Logger) -> Self {
        self.logger = logger.component("controller");
        self.summary = self.summary.with_logger(logger);
        self
    }

    #[must_use]
    pub fn with_default_view(mut self, index: usize) -> Self {
        self.summary = self.summary.with_default_view(index);
        self
    }

    // -- accessors -----------------------------------------------------------

    #[must_use]
    pub fn summary(&self) -> &SummaryList<M> {
        &self.summary
    }

    pub fn summary_mut(&mut self) -> &mut SummaryList<M> {
        &mut self.summary
    }

    /// The list that detail, help and action lookups refer to: the topmost
    /// child list, or the primary summary when none is open.
    #[must_use]
    pub fn active_list(&self) -> &SummaryList<M> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::List(list) => Some(list.as_ref()),
                _ => None,
            })
            .unwrap_or(&self.summary)
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame<M>] {
        &self.frames
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Kind of the frame receiving input.
    #[must_use]
    pub fn top(&self) -> FrameKind {
        self.frames.last().map_or(FrameKind::Summary, Frame::kind)
    }

    #[must_use]
    pub fn top_frame(&self) -> Option<&Frame<M>> {
        self.frames.last()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[must_use]
    pub fn quitting(&self) -> bool {
        self.quitting
    }

    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    #[must_use]
    pub fn size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.sync_viewports();
    }

    // -- navigation ----------------------------------------------------------

    /// Push a frame above the summary. A `Summary` frame is ignored.
    pub fn open_view(&mut self, frame: Frame<M>) {
        if matches!(frame, Frame::Summary) {
            return;
        }
        self.frames.push(frame);
        self.sync_viewports();
    }

    /// Open view `view` of `message`; a failing view opens an error frame
    /// instead.
    pub fn open_detail(&mut self, message: Rc<M>, view: usize) {
        let displayer = Rc::clone(self.active_list().context().displayer());
        let views = contain(|| Ok(displayer.detail_views())).map_err(|reason| {
            DisplayFault::Detail {
                view: format!("#{view}"),
                reason,
            }
        });
        match views.and_then(|views| DetailFrame::open(message, views, view)) {
            Ok(frame) => self.open_view(Frame::Detail(frame)),
            Err(fault) => self.open_error(fault),
        }
    }

    pub fn open_error(&mut self, fault: DisplayFault) {
        self.logger.warn_with(
            "fault",
            &[("kind", fault.title()), ("reason", &fault.to_string())],
        );
        self.open_view(Frame::Error(ErrorFrame::new(fault)));
    }

    pub fn open_help(&mut self) {
        let context = self.active_list().context();
        let help = HelpFrame::build(context.reserved(), context.actions());
        self.open_view(Frame::Help(help));
    }

    /// Open an auxiliary list over the current frame. `q` on it goes back
    /// instead of quitting.
    pub fn open_list(&mut self, context: DisplayerContext<M>) {
        let items = context.base().map_or(0, |base| base.len());
        self.logger.debug_with("open list", &[("items", &items.to_string())]);
        let list = SummaryList::new(context).with_logger(&self.logger);
        self.open_view(Frame::List(Box::new(list)));
    }

    /// Pop the top frame. The summary frame is never removed.
    pub fn back(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Footer status text, cleared by the next keypress.
    pub fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(text.into());
    }

    /// Broadcast `message`. The first listener fault opens an error frame;
    /// any further faults from the same push are only logged.
    pub fn push(&mut self, message: impl Into<Rc<M>>) -> PushReport {
        let report = self.summary.push(message);
        let mut faults = report.faults.iter();
        if let Some((_, first)) = faults.next() {
            self.open_error(first.clone());
        }
        for (listener, fault) in faults {
            self.logger.warn_with(
                "additional push fault",
                &[("listener", &listener.to_string()), ("reason", &fault.to_string())],
            );
        }
        report
    }

    // -- main update loop ----------------------------------------------------

    /// Route an event to the top frame and resolve the command it returns.
    /// Whatever is left unresolved (`Quit` or `None`) is handed back.
    pub fn update(&mut self, event: InputEvent) -> Command<M> {
        if let InputEvent::Resize(resize) = event {
            self.set_size(resize.width, resize.height);
            return Command::None;
        }

        if let InputEvent::Key(key) = event {
            if key.modifiers.ctrl && key.key == Key::Char('c') {
                return self.resolve_command(Command::Quit);
            }
            // The key that dismisses a notice is not passed on.
            if self.notice.take().is_some() {
                return Command::None;
            }
        }

        let command = match self.frames.last_mut() {
            Some(Frame::Detail(detail)) => detail.update(event),
            Some(Frame::Error(error)) => error.update(event),
            Some(Frame::Help(help)) => help.update(event),
            Some(Frame::List(list)) => match list.update(event) {
                Command::Quit => Command::Back,
                other => other,
            },
            Some(Frame::Summary) | None => self.summary.update(event),
        };
        let residual = self.resolve_command(command);
        // Opening or closing a search line changes the body height.
        self.sync_viewports();
        residual
    }

    fn resolve_command(&mut self, command: Command<M>) -> Command<M> {
        match command {
            Command::None => Command::None,
            Command::Back => {
                self.back();
                Command::None
            }
            Command::Quit => {
                self.quitting = true;
                self.logger.debug("quit requested");
                Command::Quit
            }
            Command::OpenDetail { message, view } => {
                self.open_detail(message, view);
                Command::None
            }
            Command::OpenHelp => {
                self.open_help();
                Command::None
            }
            Command::RunAction { key, message } => {
                self.run_action(&key, &message);
                Command::None
            }
            Command::Fault(fault) => {
                self.open_error(fault);
                Command::None
            }
            Command::Notify(text) => {
                self.notify(text);
                Command::None
            }
        }
    }

    fn run_action(&mut self, key: &str, message: &M) {
        let Some(handler) = self.active_list().context().actions().get(key).map(Action::handler)
        else {
            return;
        };
        self.logger.info_with("action", &[("key", key)]);
        if let Err(reason) = contain(|| handler(self, message)) {
            self.open_error(DisplayFault::Action {
                key: key.to_owned(),
                reason,
            });
        }
    }

    // -- rendering -----------------------------------------------------------

    fn editing_line(&self) -> Option<&str> {
        match self.frames.last() {
            Some(Frame::Detail(detail)) => detail.editing(),
            Some(Frame::List(list)) => list.editing_buffer(),
            Some(Frame::Summary) => self.summary.editing_buffer(),
            _ => None,
        }
    }

    fn body_height(&self) -> usize {
        let search_line = usize::from(self.editing_line().is_some());
        self.height.saturating_sub(2 + search_line).max(1)
    }

    fn sync_viewports(&mut self) {
        let rows = self.body_height();
        self.summary.set_viewport(rows);
        for frame in &mut self.frames {
            match frame {
                Frame::Detail(detail) => detail.set_viewport(rows.saturating_sub(1)),
                Frame::List(list) => list.set_viewport(rows),
                _ => {}
            }
        }
    }

    fn crumb(&self) -> String {
        match self.frames.last() {
            Some(Frame::Detail(detail)) => format!("detail: {}", detail.view_name()),
            Some(Frame::Error(error)) => error.fault().title().to_owned(),
            Some(Frame::Help(_)) => "help".to_owned(),
            Some(Frame::List(list)) => format!("list: {}", list.status()),
            Some(Frame::Summary) | None => self.summary.status(),
        }
    }

    fn hints(&self) -> &'static str {
        match self.frames.last() {
            Some(Frame::Detail(_)) => "tab view  / search  n/N next/prev  q back",
            Some(Frame::Error(_) | Frame::Help(_)) => "q back",
            Some(Frame::List(list)) => {
                if list.filter_keyword().is_some() {
                    "? help  / filter  enter open  q clear filter"
                } else {
                    "? help  / filter  enter open  q back"
                }
            }
            Some(Frame::Summary) | None => {
                if self.summary.filter_keyword().is_some() {
                    "? help  / filter  enter open  q clear filter"
                } else {
                    "? help  / filter  enter open  q quit"
                }
            }
        }
    }

    /// Header row, top frame body, search line while editing, footer row.
    #[must_use]
    pub fn render(&self) -> RenderFrame {
        let width = self.width.max(1);
        let height = self.height.max(3);
        let mut frame = RenderFrame::new(FrameSize { width, height }, self.theme);

        frame.fill_row(
            0,
            &format!(" {}  {}", self.header, self.crumb()),
            TextRole::Header,
        );

        let body_size = FrameSize {
            width,
            height: self.body_height().min(height - 2),
        };
        let body = match self.frames.last() {
            Some(Frame::Detail(detail)) => detail.render(body_size, self.theme),
            Some(Frame::Error(error)) => error.render(body_size, self.theme),
            Some(Frame::Help(help)) => help.render(body_size, self.theme),
            Some(Frame::List(list)) => list.render(body_size, self.theme),
            Some(Frame::Summary) | None => self.summary.render(body_size, self.theme),
        };
        frame.blit(&body, 0, 1);

        if let Some(buffer) = self.editing_line() {
            frame.draw_text(0, height - 2, &format!("/{buffer}"), TextRole::Primary);
        }
        match &self.notice {
            Some(notice) => frame.fill_row(height - 1, notice, TextRole::Notice),
            None => frame.fill_row(height - 1, self.hints(), TextRole::Footer),
        }
        frame
    }
}
