//! The interactive read-loop.

use std::io::{self, BufRead};

use tracing::{debug, info, warn};

use crate::{App, DispatchError, ExitStatus};

/// Result of asking a [`LineReader`] for the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line of input, without its trailing newline.
    Line(String),
    /// Input is exhausted.
    Eof,
    /// The user interrupted the read (for example with Ctrl-C).
    Interrupted,
}

/// Source of input lines for [`App::run_with`].
///
/// Line-editing libraries plug in here; [`App::run`] uses a plain reader
/// over the app's input stream.
pub trait LineReader {
    /// Shows `prompt` and reads one line.
    ///
    /// # Errors
    ///
    /// Any I/O failure; the read-loop treats it as end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome>;
}

impl<F> LineReader for F
where
    F: FnMut(&str) -> io::Result<ReadOutcome>,
{
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        self(prompt)
    }
}

struct StreamReader<'a> {
    app: &'a App,
}

impl LineReader for StreamReader<'_> {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        self.app.print(prompt);

        let mut buf = Vec::new();
        if self.app.input().read_until(b'\n', &mut buf)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(ReadOutcome::Line(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

impl App {
    /// Runs the read-loop over the app's own input stream.
    ///
    /// See [`run_with`](Self::run_with).
    pub fn run(&self) -> ExitStatus {
        self.run_with(&mut StreamReader { app: self })
    }

    /// Prints the banner, then reads and dispatches lines until a command
    /// returns something other than [`ExitStatus::Cmd`] or input ends.
    ///
    /// Blank lines are skipped. Dispatch errors are written to the error
    /// stream and the loop carries on. End of input, an interrupt or a read
    /// error ends the loop with [`ExitStatus::Shell`].
    ///
    /// # Examples
    ///
    /// ```
    /// use shellkit_core::{App, ExitStatus, ReadOutcome, SharedBuffer};
    ///
    /// let out = SharedBuffer::new();
    /// let app = App::builder("demo").output(out.clone()).banner("").build().unwrap();
    ///
    /// let mut lines = vec!["exit -shell-only", ""].into_iter();
    /// let mut reader = |_: &str| {
    ///     Ok::<_, std::io::Error>(
    ///         lines.next().map_or(ReadOutcome::Eof, |l| ReadOutcome::Line(l.into())),
    ///     )
    /// };
    /// assert_eq!(app.run_with(&mut reader), ExitStatus::Shell);
    /// ```
    pub fn run_with(&self, reader: &mut dyn LineReader) -> ExitStatus {
        if !self.banner().is_empty() {
            self.println(self.banner());
        }
        info!(app = %self.name(), "shell started");

        let status = loop {
            let line = match reader.read_line(self.prompt()) {
                Ok(ReadOutcome::Line(line)) => line,
                Ok(ReadOutcome::Eof) => {
                    debug!("end of input");
                    break ExitStatus::Shell;
                }
                Ok(ReadOutcome::Interrupted) => {
                    debug!("read interrupted");
                    break ExitStatus::Shell;
                }
                Err(err) => {
                    warn!(error = %err, "failed to read input, closing shell");
                    break ExitStatus::Shell;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match self.execute_line(&line) {
                Ok(ExitStatus::Cmd) => {}
                Ok(status) => break status,
                Err(err) => self.report(&err),
            }
        };

        info!(app = %self.name(), ?status, "shell stopped");
        status
    }

    fn report(&self, err: &DispatchError) {
        debug!(error = %err, "dispatch failed");
        self.eprintln(err);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use crate::{Command, SharedBuffer};

    use super::*;

    struct Scripted(VecDeque<io::Result<ReadOutcome>>);

    impl Scripted {
        fn lines(lines: &[&str]) -> Self {
            Self(
                lines
                    .iter()
                    .map(|l| Ok(ReadOutcome::Line((*l).to_string())))
                    .collect(),
            )
        }

        fn then(mut self, outcome: io::Result<ReadOutcome>) -> Self {
            self.0.push_back(outcome);
            self
        }
    }

    impl LineReader for Scripted {
        fn read_line(&mut self, _prompt: &str) -> io::Result<ReadOutcome> {
            self.0.pop_front().unwrap_or(Ok(ReadOutcome::Eof))
        }
    }

    fn app(out: &SharedBuffer, err: &SharedBuffer) -> App {
        let mut app = App::builder("loop")
            .output(out.clone())
            .err_output(err.clone())
            .banner("")
            .build()
            .unwrap();
        app.add_command(Command::new("ping").with_main(|ctx| {
            ctx.app().println("pong");
            ExitStatus::Cmd
        }))
        .unwrap();
        app
    }

    #[test]
    fn test_exit_statuses_end_loop() {
        let (out, err) = (SharedBuffer::new(), SharedBuffer::new());
        let app = app(&out, &err);

        assert_eq!(app.run_with(&mut Scripted::lines(&["ping", "exit"])), ExitStatus::All);
        assert_eq!(
            app.run_with(&mut Scripted::lines(&["exit -shell-only", "ping"])),
            ExitStatus::Shell
        );
        assert_eq!(out.contents(), "pong\n");
    }

    #[test]
    fn test_errors_keep_loop_running() {
        let (out, err) = (SharedBuffer::new(), SharedBuffer::new());
        let app = app(&out, &err);

        let mut reader = Scripted::lines(&["", "   ", "nothing", "ping -x", "ping"]);
        assert_eq!(app.run_with(&mut reader), ExitStatus::Shell);
        assert_eq!(out.contents(), "pong\n");
        assert_eq!(
            err.contents(),
            "nothing: command not found\n\
             Usage of ping:\n\
             ping: failed to parse flags:\nflag provided but not defined: -x\n"
        );
    }

    #[test]
    fn test_invalid_utf8_line_does_not_end_loop() {
        let out = SharedBuffer::new();
        let err = SharedBuffer::new();
        let mut app = App::builder("bytes")
            .output(out.clone())
            .err_output(err.clone())
            .input(Cursor::new(b"ping\n\xff\xfe\nping\nexit\n".to_vec()))
            .banner("")
            .prompt("")
            .build()
            .unwrap();
        app.add_command(Command::new("ping").with_main(|ctx| {
            ctx.app().println("pong");
            ExitStatus::Cmd
        }))
        .unwrap();

        assert_eq!(app.run(), ExitStatus::All);
        assert_eq!(out.contents(), "pong\npong\n");
        assert_eq!(err.contents(), "\u{fffd}\u{fffd}: command not found\n");
    }

    #[test]
    fn test_interrupt_and_read_error() {
        let (out, err) = (SharedBuffer::new(), SharedBuffer::new());
        let app = app(&out, &err);

        let mut reader = Scripted::lines(&[]).then(Ok(ReadOutcome::Interrupted));
        assert_eq!(app.run_with(&mut reader), ExitStatus::Shell);

        let mut reader = Scripted::lines(&["ping"])
            .then(Err(io::Error::other("broken pipe")))
            .then(Ok(ReadOutcome::Line("ping".into())));
        assert_eq!(app.run_with(&mut reader), ExitStatus::Shell);
        assert_eq!(out.contents(), "pong\n");
    }

    #[test]
    fn test_run_over_input_stream() {
        let out = SharedBuffer::new();
        let app = App::builder("stream")
            .output(out.clone())
            .input(Cursor::new("help\r\nexit -shell-only\n"))
            .prompt("$ ")
            .build()
            .unwrap();

        assert_eq!(app.run(), ExitStatus::Shell);
        let printed = out.contents();
        assert!(printed.starts_with(crate::config::DEFAULT_BANNER));
        assert!(printed.contains("$ Available commands:\n\texit\t\texit shell\n"));
        assert!(printed.ends_with("$ "));
    }

    #[test]
    fn test_run_until_eof() {
        let out = SharedBuffer::new();
        let app = App::builder("eof")
            .output(out.clone())
            .input(Cursor::new(""))
            .banner("hi")
            .build()
            .unwrap();
        assert_eq!(app.run(), ExitStatus::Shell);
        assert_eq!(out.contents(), "hi\n> ");
    }
}
