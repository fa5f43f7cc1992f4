//! Terminal output for rendered frames.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

/// Writes each frame over the previous one.
#[derive(Debug)]
pub struct Dashboard<W: Write> {
    out: W,
    clear: bool,
}

impl Dashboard<io::Stdout> {
    /// Dashboard on standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Dashboard<W> {
    pub fn new(out: W) -> Self {
        Self { out, clear: true }
    }

    /// Append frames instead of clearing the screen between them.
    pub fn without_clear(mut self) -> Self {
        self.clear = false;
        self
    }

    /// Clear the screen and write `frame`.
    pub fn draw(&mut self, frame: &str) -> io::Result<()> {
        if self.clear {
            queue!(self.out, MoveTo(0, 0), Clear(ClearType::All))?;
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }

    /// Consume the dashboard, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
