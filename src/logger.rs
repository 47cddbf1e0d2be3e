use colored::Colorize;
use std::{cell::RefCell, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Success,
    Log,
}

/// Receives user-facing messages.
///
/// A logger is handed to every operation that reports progress; nothing in the crate keeps a
/// global one. Messages are printf-style, built with [`format_args!`]:
///
/// ```
/// use seed::logger::{Logger, RecordingLogger};
///
/// let logger = RecordingLogger::default();
/// logger.info(format_args!("Planted file: {}", "root/a.txt"));
///
/// assert_eq!(logger.messages(), vec!["Planted file: root/a.txt"]);
/// ```
pub trait Logger {
    fn write(&self, level: Level, args: fmt::Arguments<'_>);

    fn info(&self, args: fmt::Arguments<'_>) {
        self.write(Level::Info, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.write(Level::Warn, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.write(Level::Error, args);
    }

    fn success(&self, args: fmt::Arguments<'_>) {
        self.write(Level::Success, args);
    }

    fn log(&self, args: fmt::Arguments<'_>) {
        self.write(Level::Log, args);
    }
}

/// Colored terminal output. Errors go to stderr, everything else to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger {
    /// Suppresses everything but errors.
    pub silent: bool,
}
impl ConsoleLogger {
    pub fn new(silent: bool) -> Self {
        Self { silent }
    }
}
impl Logger for ConsoleLogger {
    fn write(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.silent && level != Level::Error {
            return;
        }

        let msg = args.to_string();

        match level {
            Level::Info => println!("{}", msg.blue()),
            Level::Warn => println!("{}", msg.yellow()),
            Level::Error => eprintln!("{}", msg.red()),
            Level::Success => println!("{}", msg.green()),
            Level::Log => println!("{}", msg),
        }
    }
}

/// Keeps every message in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: RefCell<Vec<(Level, String)>>,
}
impl RecordingLogger {
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}
impl Logger for RecordingLogger {
    fn write(&self, level: Level, args: fmt::Arguments<'_>) {
        self.entries.borrow_mut().push((level, args.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_logger_keeps_levels_in_order() {
        let logger = RecordingLogger::default();

        logger.log(format_args!("Sprouting directories from seed: {}", "root"));
        logger.info(format_args!("Planted directory: {}", "root"));
        logger.success(format_args!("done"));

        assert_eq!(
            logger.entries(),
            vec![
                (Level::Log, "Sprouting directories from seed: root".to_string()),
                (Level::Info, "Planted directory: root".to_string()),
                (Level::Success, "done".to_string()),
            ]
        );
    }
}
