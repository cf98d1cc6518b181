//! Terminal streams, colors and the progress indicator.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use colored::Colorize;

/// Colors and status icons. Produces plain text when disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    enabled: bool,
}

impl ColorScheme {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(s, |s| s.bold().to_string())
    }

    pub fn cyan(&self, s: &str) -> String {
        self.paint(s, |s| s.cyan().to_string())
    }

    pub fn gray(&self, s: &str) -> String {
        self.paint(s, |s| s.bright_black().to_string())
    }

    pub fn success_icon(&self) -> String {
        self.paint("✓", |s| s.green().to_string())
    }

    pub fn failure_icon(&self) -> String {
        self.paint("X", |s| s.red().to_string())
    }

    pub fn warning_icon(&self) -> String {
        self.paint("!", |s| s.yellow().to_string())
    }

    pub fn neutral_icon(&self) -> String {
        self.gray("-")
    }

    pub fn pending_icon(&self) -> String {
        self.paint("*", |s| s.yellow().to_string())
    }

    fn paint(&self, s: &str, f: impl Fn(&str) -> String) -> String {
        if self.enabled { f(s) } else { s.to_string() }
    }
}

/// Something that signals work in progress while the user waits.
pub trait ProgressIndicator: Send {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Braille spinner drawn on stderr from a background thread.
pub struct Spinner {
    message: String,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl ProgressIndicator for Spinner {
    fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        self.running.store(true, Ordering::Relaxed);
        let running = self.running.clone();
        let message = self.message.clone();

        let _ = crossterm::execute!(io::stderr(), crossterm::cursor::Hide);

        self.handle = Some(thread::spawn(move || {
            let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            let mut i = 0;
            let mut stderr = io::stderr();
            while running.load(Ordering::Relaxed) {
                let _ = write!(stderr, "\r{} {}", frames[i], message);
                let _ = stderr.flush();
                i = (i + 1) % frames.len();
                thread::sleep(Duration::from_millis(80));
            }
            let _ = crossterm::execute!(
                stderr,
                crossterm::terminal::Clear(crossterm::terminal::ClearType::CurrentLine)
            );
            let _ = write!(stderr, "\r");
            let _ = stderr.flush();
        }));
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            let _ = crossterm::execute!(io::stderr(), crossterm::cursor::Show);
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Stops the progress indicator when dropped.
pub struct ProgressGuard<'a> {
    indicator: Option<&'a mut Box<dyn ProgressIndicator>>,
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        if let Some(indicator) = self.indicator.take() {
            indicator.stop();
        }
    }
}

/// The streams a command reads from and writes to.
pub struct IoStreams {
    pub out: Box<dyn Write + Send>,
    stdin_tty: bool,
    stdout_tty: bool,
    color: ColorScheme,
    progress: Box<dyn ProgressIndicator>,
}

impl IoStreams {
    /// Streams attached to the process's stdin and stdout.
    ///
    /// Color is on when stdout is a terminal, unless `no_color` is set or
    /// `NO_COLOR` is present in the environment.
    pub fn system(no_color: bool) -> Self {
        let stdin_tty = io::stdin().is_terminal();
        let stdout_tty = io::stdout().is_terminal();
        let color = stdout_tty && !no_color && std::env::var_os("NO_COLOR").is_none();
        colored::control::set_override(color);

        Self {
            out: Box::new(io::stdout()),
            stdin_tty,
            stdout_tty,
            color: ColorScheme::new(color),
            progress: Box::new(Spinner::new("Fetching run details")),
        }
    }

    /// Both stdin and stdout are attached to a terminal.
    pub fn is_interactive(&self) -> bool {
        self.stdin_tty && self.stdout_tty
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.color
    }

    /// Start the progress indicator if `enabled`. It stops when the guard drops.
    pub fn start_progress(&mut self, enabled: bool) -> ProgressGuard<'_> {
        if !enabled {
            return ProgressGuard { indicator: None };
        }
        self.progress.start();
        ProgressGuard {
            indicator: Some(&mut self.progress),
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory streams for command tests.

    use super::*;
    use std::sync::Mutex;

    /// Output buffer shared between a test and the streams it hands out.
    #[derive(Debug, Clone, Default)]
    pub struct TestBuffer(Arc<Mutex<Vec<u8>>>);

    impl TestBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for TestBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct ProgressLog {
        pub starts: usize,
        pub stops: usize,
        pub active: bool,
    }

    /// Records start/stop calls instead of drawing anything.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingProgress(pub Arc<Mutex<ProgressLog>>);

    impl ProgressIndicator for RecordingProgress {
        fn start(&mut self) {
            let mut log = self.0.lock().unwrap();
            log.starts += 1;
            log.active = true;
        }

        fn stop(&mut self) {
            let mut log = self.0.lock().unwrap();
            log.stops += 1;
            log.active = false;
        }
    }

    pub struct TestStreams {
        pub io: IoStreams,
        pub out: TestBuffer,
        pub progress: Arc<Mutex<ProgressLog>>,
    }

    impl IoStreams {
        /// Uncolored in-memory streams. `tty` sets both terminal flags.
        pub fn test(tty: bool) -> TestStreams {
            let out = TestBuffer::default();
            let progress = RecordingProgress::default();
            let log = progress.0.clone();
            let io = IoStreams {
                out: Box::new(out.clone()),
                stdin_tty: tty,
                stdout_tty: tty,
                color: ColorScheme::new(false),
                progress: Box::new(progress),
            };
            TestStreams {
                io,
                out,
                progress: log,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_scheme_disabled_is_plain() {
        let cs = ColorScheme::new(false);
        assert_eq!(cs.bold("JOBS"), "JOBS");
        assert_eq!(cs.cyan("123"), "123");
        assert_eq!(cs.success_icon(), "✓");
        assert_eq!(cs.failure_icon(), "X");
        assert_eq!(cs.warning_icon(), "!");
        assert_eq!(cs.neutral_icon(), "-");
        assert_eq!(cs.pending_icon(), "*");
    }

    #[test]
    fn test_color_scheme_enabled_wraps_text() {
        colored::control::set_override(true);
        let cs = ColorScheme::new(true);
        let bold = cs.bold("JOBS");
        assert!(bold.contains("JOBS"));
        assert_ne!(bold, "JOBS");
    }

    #[test]
    fn test_interactive_needs_both_terminals() {
        let mut streams = IoStreams::test(true);
        assert!(streams.io.is_interactive());
        streams.io.stdout_tty = false;
        assert!(!streams.io.is_interactive());
        let streams = IoStreams::test(false);
        assert!(!streams.io.is_interactive());
    }

    #[test]
    fn test_progress_guard_stops_on_drop() {
        let mut streams = IoStreams::test(true);
        {
            let _guard = streams.io.start_progress(true);
            assert!(streams.progress.lock().unwrap().active);
        }
        let log = streams.progress.lock().unwrap();
        assert!(!log.active);
        assert_eq!(log.starts, 1);
        assert_eq!(log.stops, 1);
    }

    #[test]
    fn test_progress_guard_disabled_never_starts() {
        let mut streams = IoStreams::test(false);
        drop(streams.io.start_progress(false));
        let log = streams.progress.lock().unwrap();
        assert_eq!(log.starts, 0);
        assert_eq!(log.stops, 0);
    }
}
