//! Process-wide logging for the armlet workspace.
//!
//! The logger is opt-in: until [`init`] is called every log call is a no-op,
//! so embedding hosts get a silent library by default. Messages carry a
//! severity and a timestamp relative to logger start-up.

use std::{
    fs::File,
    io::{self, Write},
    sync::Mutex,
    time::Instant,
};

use chrono::Utc;
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<Logger> = OnceCell::new();

/// Message severity, lowest to highest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
        }
    }
}

/// Where log lines end up.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum Sink {
    /// Log to console.
    Stdout,

    /// Log to a file in the temp directory, named `armlet-<timestamp>.log`.
    TempFile,
}

struct Inner {
    sink: Box<dyn Write + Send>,
    started: Instant,
}

impl Inner {
    fn new(sink: Sink) -> Self {
        let started = Instant::now();
        match sink {
            Sink::Stdout => Self {
                sink: Box::new(io::stdout()),
                started,
            },
            Sink::TempFile => {
                let filename = format!("armlet-{}.log", Utc::now().timestamp());
                let path = std::env::temp_dir().join(filename);
                Self {
                    sink: Box::new(File::create(path).unwrap()),
                    started,
                }
            }
        }
    }

    fn write<T>(&mut self, level: Level, message: T)
    where
        T: std::fmt::Display,
    {
        let elapsed = self.started.elapsed();
        let seconds = elapsed.as_secs();
        let hours = seconds / 3600;
        let minutes = (seconds / 60) % 60;
        let seconds = seconds % 60;
        let millis = elapsed.subsec_millis();

        writeln!(
            self.sink,
            "[{hours:02}:{minutes:02}:{seconds:02}.{millis:03}] {} {message}",
            level.label()
        )
        .unwrap();
    }
}

struct Logger {
    min_level: Level,
    inner: Mutex<Inner>,
}

impl Logger {
    fn new(sink: Sink, min_level: Level) -> Self {
        Self {
            min_level,
            inner: Mutex::new(Inner::new(sink)),
        }
    }

    fn log<T>(&self, level: Level, message: T)
    where
        T: std::fmt::Display,
    {
        if level < self.min_level {
            return;
        }

        if let Ok(ref mut inner) = self.inner.lock() {
            inner.write(level, message);
        }
    }
}

/// Installs the process-wide logger. Later calls have no effect.
pub fn init(sink: Sink, min_level: Level) {
    LOGGER.set(Logger::new(sink, min_level)).ok();
}

pub fn log<T>(level: Level, message: T)
where
    T: std::fmt::Display,
{
    LOGGER.get().map_or((), |logger| logger.log(level, message));
}

pub fn debug<T: std::fmt::Display>(message: T) {
    log(Level::Debug, message);
}

pub fn info<T: std::fmt::Display>(message: T) {
    log(Level::Info, message);
}

pub fn warn<T: std::fmt::Display>(message: T) {
    log(Level::Warn, message);
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{info, init, warn, Level, Sink};

    #[test]
    fn level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
    }

    #[test]
    fn logger_filters_below_min_level() {
        init(Sink::TempFile, Level::Info);
        crate::debug("dropped".to_string());
        info("kept");
        warn("kept too");

        let dir = std::env::temp_dir();
        let files = fs::read_dir(dir).unwrap();
        for f in files.flatten() {
            let p = f.path();
            if let Some(ext) = p.extension() {
                let s = p.to_str().unwrap();
                if ext == "log" && s.contains("armlet") {
                    let content = fs::read_to_string(p.clone()).unwrap();
                    fs::remove_file(p).unwrap();
                    assert!(!content.contains("dropped"));
                    assert!(content.contains("INFO kept"));
                    assert!(content.contains("WARN kept too"));
                }
            }
        }
    }
}
