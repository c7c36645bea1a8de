//! Turns [`ScanEvent`]s into console output
//!
//! The scan itself never writes anything, it only emits events.
//! The [`Renderer`] chosen on the command line decides how they look.

use crossterm::cursor::{Hide, MoveToColumn, Show};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use serde::Serialize;
use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::gitlab::{Interruption, Project};

/// Progress of a scan, in the order they are emitted
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent<'scan> {
    /// We are about to list the projects
    ListingStarted,
    /// All the projects we could get have been listed
    ListingFinished {
        /// Number of projects that will be checked
        total: usize,
        /// Set if the listing stopped on an error
        interrupted: Option<&'scan Interruption>,
    },
    /// Emitted once, before the first [`ScanEvent::Checking`]
    ScanStarted {
        /// The branch we are looking for
        branch: &'scan str,
    },
    /// We are checking `project`
    Checking {
        /// Position of `project`, starting at 1
        index: usize,
        /// Number of projects to check
        total: usize,
        /// The project being checked
        project: &'scan Project,
    },
    /// The branch exists in `project`
    Found {
        /// Position of `project`, starting at 1
        index: usize,
        /// The project containing the branch
        project: &'scan Project,
    },
    /// The branch doesn't exist in `project` (or we couldn't tell)
    NotFound {
        /// Position of `project`, starting at 1
        index: usize,
        /// The project not containing the branch
        project: &'scan Project,
    },
    /// Every project has been checked
    Finished {
        /// Number of projects checked
        total: usize,
        /// Number of projects containing the branch
        found: usize,
    },
}

/// Consumes [`ScanEvent`]s
pub trait Renderer {
    /// Renders a single event
    fn render(&mut self, event: &ScanEvent<'_>) -> io::Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, event: &ScanEvent<'_>) -> io::Result<()> {
        (**self).render(event)
    }
}

/// Creates the renderer matching `format`, writing to `out`
pub fn boxed<W: Write + 'static>(format: OutputFormat, out: W) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Terminal => Box::new(TerminalRenderer::new(out)),
        OutputFormat::Plain => Box::new(PlainRenderer::new(out)),
        OutputFormat::Json => Box::new(JsonRenderer::new(out)),
    }
}

/// Redraws a single status line in place, only matches stay on screen
pub struct TerminalRenderer<W: Write> {
    /// Where we write
    out: W,
    /// Set while the cursor is hidden, so that it can be restored on drop
    cursor_hidden: bool,
}

impl<W: Write> TerminalRenderer<W> {
    /// Creates a new [`TerminalRenderer`]
    pub const fn new(out: W) -> Self {
        Self {
            out,
            cursor_hidden: false,
        }
    }

    /// Moves back to the start of the status line and erases it
    fn clear_line(&mut self) -> io::Result<()> {
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, event: &ScanEvent<'_>) -> io::Result<()> {
        match *event {
            ScanEvent::ListingStarted => {
                queue!(self.out, Hide, Print("Getting projects..."))?;
                self.cursor_hidden = true;
            }
            ScanEvent::ListingFinished { total, interrupted } => {
                writeln!(self.out, " {total} found")?;
                if let Some(interruption) = interrupted {
                    writeln!(
                        self.out,
                        "Warning: the listing stopped at page {} ({}), some projects are missing",
                        interruption.page, interruption.reason
                    )?;
                }
            }
            ScanEvent::ScanStarted { branch } => {
                writeln!(self.out, "Looking for branch '{branch}':")?;
            }
            ScanEvent::Checking { index, project, .. } => {
                self.clear_line()?;
                write!(self.out, "{index} | {} (ID: {})", project.name, project.id)?;
            }
            ScanEvent::Found { project, .. } => {
                self.clear_line()?;
                writeln!(
                    self.out,
                    "Found in project: {} (ID: {})",
                    project.name, project.id
                )?;
            }
            ScanEvent::NotFound { .. } => self.clear_line()?,
            ScanEvent::Finished { total, found } => {
                self.clear_line()?;
                writeln!(self.out, "Branch found in {found} of {total} projects")?;
                queue!(self.out, Show)?;
                self.cursor_hidden = false;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> Drop for TerminalRenderer<W> {
    fn drop(&mut self) {
        if self.cursor_hidden {
            // Nothing more we can do if the terminal is gone
            let _ignored = self
                .clear_line()
                .and_then(|()| queue!(self.out, Show))
                .and_then(|()| self.out.flush());
        }
    }
}

/// One line per event, for logs and pipes
pub struct PlainRenderer<W: Write> {
    /// Where we write
    out: W,
}

impl<W: Write> PlainRenderer<W> {
    /// Creates a new [`PlainRenderer`]
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for PlainRenderer<W> {
    fn render(&mut self, event: &ScanEvent<'_>) -> io::Result<()> {
        match *event {
            ScanEvent::ListingStarted => writeln!(self.out, "Getting projects..."),
            ScanEvent::ListingFinished {
                total,
                interrupted: None,
            } => writeln!(self.out, "{total} projects found"),
            ScanEvent::ListingFinished {
                total,
                interrupted: Some(interruption),
            } => writeln!(
                self.out,
                "{total} projects found, listing stopped at page {} ({})",
                interruption.page, interruption.reason
            ),
            ScanEvent::ScanStarted { branch } => {
                writeln!(self.out, "Looking for branch '{branch}'")
            }
            ScanEvent::Checking {
                index,
                total,
                project,
            } => writeln!(
                self.out,
                "{index}/{total} | {} (ID: {})",
                project.name, project.id
            ),
            ScanEvent::Found { project, .. } => writeln!(
                self.out,
                "Found in project: {} (ID: {})",
                project.name, project.id
            ),
            ScanEvent::NotFound { project, .. } => writeln!(
                self.out,
                "Not found in project: {} (ID: {})",
                project.name, project.id
            ),
            ScanEvent::Finished { total, found } => {
                writeln!(self.out, "Branch found in {found} of {total} projects")
            }
        }
    }
}

/// One JSON object per line and per event
pub struct JsonRenderer<W: Write> {
    /// Where we write
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    /// Creates a new [`JsonRenderer`]
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, event: &ScanEvent<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

//-------------------------------------------
//
// Unit tests
//
// ------------------------------------------
