//! gview: a live message browser engine.
//!
//! Producers push opaque messages into a [`summary::DisplayerContext`]; every
//! registered [`walker::Walker`] renders and keeps its own ordered view of the
//! stream. The [`controller::Controller`] owns the navigation stack (summary,
//! detail, error and help frames), the filter/search state machine, and the
//! custom action bindings. The [`runtime`] module drives it all from a
//! crossterm terminal.

pub mod actions;
pub mod controller;
pub mod detail;
pub mod displayer;
pub mod error;
pub mod fault;
pub mod feed;
pub mod help;
pub mod json;
pub mod keys;
pub mod runtime;
pub mod search;
pub mod source;
pub mod summary;
pub mod walker;

pub use actions::Actions;
pub use controller::{Command, Controller, Frame};
pub use detail::{Detail, Element, Group};
pub use displayer::{DetailView, Displayer, FnDisplayer};
pub use error::ContextError;
pub use fault::DisplayFault;
pub use keys::ReservedKeys;
pub use source::{DataSource, ListenerId, PushReport};
pub use summary::{DisplayerContext, SearchState, SummaryList};
pub use walker::{Item, Walker};

