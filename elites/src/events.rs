//! Run events and the sinks that record them.
//!
//! The orchestrator reports everything it does through an [`EventSink`]
//! handed to it at construction. The default sink forwards to `tracing`; a
//! [`LogFile`] keeps a plain-text record inside the run directory.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::map_elites::Statistics;
use crate::Genome;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    RunStarted {
        shape: Vec<usize>,
        iterations: usize,
    },
    Seeded {
        count: usize,
        occupied: usize,
    },
    Iteration {
        index: usize,
    },
    Placed {
        genome: Genome,
        cell: Vec<usize>,
        performance: f64,
        replaced: Option<f64>,
    },
    Rejected {
        genome: Genome,
        cell: Vec<usize>,
        performance: f64,
        incumbent: f64,
    },
    Discarded {
        genome: Genome,
        cell: Vec<usize>,
        performance: f64,
    },
    Stopped {
        iteration: usize,
    },
    Finished {
        statistics: Statistics,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::RunStarted { shape, iterations } => {
                write!(f, "START: archive shape {shape:?}, {iterations} iterations")
            }
            Event::Seeded { count, occupied } => {
                write!(f, "SEED: {count} random solutions, {occupied} cells occupied")
            }
            Event::Iteration { index } => write!(f, "ITERATION {index}"),
            Event::Placed {
                genome,
                cell,
                performance,
                replaced: Some(replaced),
            } => write!(
                f,
                "PLACE: Placing individual {genome:?} at {cell:?} with perf: {performance} replacing {replaced}"
            ),
            Event::Placed {
                genome,
                cell,
                performance,
                replaced: None,
            } => write!(f, "PLACE: Placing individual {genome:?} at {cell:?} with perf: {performance}"),
            Event::Rejected {
                genome,
                cell,
                performance,
                incumbent,
            } => write!(
                f,
                "PLACE: Individual {genome:?} rejected at {cell:?} with perf: {performance} in favor of {incumbent}"
            ),
            Event::Discarded {
                genome,
                cell,
                performance,
            } => write!(
                f,
                "PLACE: Individual {genome:?} discarded at {cell:?}, perf {performance} is not finite"
            ),
            Event::Stopped { iteration } => write!(f, "STOP: stopping criteria met at iteration {iteration}"),
            Event::Finished { statistics } => {
                write!(
                    f,
                    "FINISH: {} iterations, {} solutions, coverage {:.3}, ",
                    statistics.iterations, statistics.num_solutions, statistics.coverage
                )?;
                match statistics.best_fitness {
                    Some(best) => write!(f, "best {best}, ")?,
                    None => write!(f, "no elites, ")?,
                }
                write!(f, "{} improvements", statistics.improvements)
            }
        }
    }
}

/// Destination for run events.
pub trait EventSink {
    fn record(&mut self, event: &Event);

    /// Flush anything buffered. Called once at the end of a run.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Forwards events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: &Event) {
        match event {
            Event::RunStarted { .. } | Event::Seeded { .. } | Event::Stopped { .. } | Event::Finished { .. } => {
                tracing::info!("{event}")
            }
            Event::Discarded { .. } => tracing::warn!("{event}"),
            Event::Iteration { .. } => tracing::trace!("{event}"),
            Event::Placed { .. } | Event::Rejected { .. } => tracing::debug!("{event}"),
        }
    }
}

/// Keeps every event in memory.
impl EventSink for Vec<Event> {
    fn record(&mut self, event: &Event) {
        self.push(event.clone());
    }
}

/// Sends every event to both sinks.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn record(&mut self, event: &Event) {
        self.0.record(event);
        self.1.record(event);
    }

    fn finish(&mut self) -> io::Result<()> {
        self.0.finish()?;
        self.1.finish()
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn record(&mut self, event: &Event) {
        (**self).record(event);
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// Plain-text event log, one line per event.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    writer: BufWriter<File>,
    failed: bool,
}

impl LogFile {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            failed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for LogFile {
    fn record(&mut self, event: &Event) {
        if self.failed {
            return;
        }
        if let Err(err) = writeln!(self.writer, "{event}") {
            tracing::error!(path = ?self.path, error = %err, "failed to write run log, disabling it");
            self.failed = true;
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
