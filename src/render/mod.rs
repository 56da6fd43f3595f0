// src/render/mod.rs

//! Presentation of the current build/test status.
//!
//! [`style`] maps a result to text (stateless); [`terminal`] clears the
//! screen and prints it. The aggregator talks to a [`Renderer`] so tests can
//! record frames instead of drawing them.

pub mod style;
pub mod terminal;

pub use style::{icon, plain_line, styled_line};
pub use terminal::TerminalRenderer;

use crate::errors::Result;
use crate::types::CommandResult;

/// Draws the two status lines.
pub trait Renderer: Send {
    /// Replace whatever is displayed with `build` followed by `test`.
    fn render(&mut self, build: &CommandResult, test: &CommandResult) -> Result<()>;
}
