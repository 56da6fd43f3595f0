// src/render/terminal.rs

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::errors::Result;
use crate::render::Renderer;
use crate::render::style::styled_line;
use crate::types::CommandResult;

/// Renders to a terminal: clear, home the cursor, print two styled lines.
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    clear: bool,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), true)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// `clear = false` appends frames instead of redrawing in place.
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&mut self, build: &CommandResult, test: &CommandResult) -> Result<()> {
        if self.clear {
            queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        writeln!(self.out, "{}", styled_line(build))?;
        writeln!(self.out, "{}", styled_line(test))?;
        self.out.flush()?;
        Ok(())
    }
}
