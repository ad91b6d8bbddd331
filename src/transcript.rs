//! Conversation transcript.
//!
//! Every entry goes to the log file as `<timestamp> - <LEVEL> - <message>`.
//! Entries marked for the console are echoed there as the bare message.

use chrono::Local;
use std::fmt;
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Debug => f.write_str("DEBUG"),
            Level::Info => f.write_str("INFO"),
        }
    }
}

pub struct Transcript<C: Write> {
    path: PathBuf,
    file: LineWriter<File>,
    console: C,
}

impl<C: Write> Transcript<C> {
    /// Opens `path` for writing, discarding anything a previous run left there.
    pub fn create<P: AsRef<Path>>(path: P, console: C) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file: LineWriter::new(file),
            console,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn debug(&mut self, message: &str) -> io::Result<()> {
        self.entry(Level::Debug, message, true)
    }

    pub fn info(&mut self, message: &str) -> io::Result<()> {
        self.entry(Level::Info, message, true)
    }

    /// Logs to the file without echoing, for text the operator already sees.
    pub fn info_quiet(&mut self, message: &str) -> io::Result<()> {
        self.entry(Level::Info, message, false)
    }

    /// Writes `marker` to the console with no newline and flushes it.
    pub fn prompt(&mut self, marker: &str) -> io::Result<()> {
        self.console.write_all(marker.as_bytes())?;
        self.console.flush()
    }

    pub fn console_line(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.console, "{}", message)?;
        self.console.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.console.flush()
    }

    fn entry(&mut self, level: Level, message: &str, echo: bool) -> io::Result<()> {
        let ts = Local::now().format(TIMESTAMP_FORMAT);
        writeln!(self.file, "{} - {} - {}", ts, level, message)?;
        if echo {
            self.console_line(message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_entry(line: &str) -> (String, String, String) {
        let mut parts = line.splitn(3, " - ");
        let ts = parts.next().unwrap_or_default().to_string();
        let level = parts.next().unwrap_or_default().to_string();
        let msg = parts.next().unwrap_or_default().to_string();
        (ts, level, msg)
    }

    #[test]
    fn file_entries_carry_timestamp_and_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        let mut t = Transcript::create(&path, Vec::<u8>::new()).unwrap();
        t.debug("").unwrap();
        t.info("hello").unwrap();
        drop(t);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let (ts, level, msg) = split_entry(lines[1]);
        let parsed = chrono::NaiveDateTime::parse_from_str(&ts.replace(',', "."), "%Y-%m-%d %H:%M:%S%.f");
        assert!(parsed.is_ok(), "{}", ts);
        assert_eq!(level, "INFO");
        assert_eq!(msg, "hello");
        assert_eq!(split_entry(lines[0]).1, "DEBUG");
    }

    #[test]
    fn console_gets_bare_messages_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = Transcript::create(dir.path().join("chat.log"), Vec::<u8>::new()).unwrap();
        t.info("shown").unwrap();
        t.info_quiet("hidden").unwrap();
        t.prompt("> ").unwrap();

        let console = String::from_utf8(t.console().clone()).unwrap();
        assert_eq!(console, "shown\n> ");
    }

    #[test]
    fn create_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        std::fs::write(&path, "stale line\nanother\n").unwrap();

        let mut t = Transcript::create(&path, io::sink()).unwrap();
        t.info("fresh").unwrap();
        t.flush().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale"));
        assert_eq!(text.lines().count(), 1);
        assert_eq!(t.path(), path.as_path());
    }

    #[test]
    fn create_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/chat.log");
        assert!(Transcript::create(path, io::sink()).is_err());
    }
}
