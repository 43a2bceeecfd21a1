//! Matching input tokens to commands and running them.

use tracing::debug;

use crate::{App, CommandRef, Context, DispatchError, ExitStatus};

/// Splits an input line on whitespace.
///
/// ```
/// assert_eq!(shellkit_core::tokenize("  test  -top 19\tx "), vec!["test", "-top", "19", "x"]);
/// assert!(shellkit_core::tokenize(" \t ").is_empty());
/// ```
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

impl App {
    /// Finds the command addressed by `tokens` and the slice to hand to its
    /// flag parser.
    ///
    /// The first token names a top-level command. When that command has
    /// sub-commands and the second token exists and does not start with `-`,
    /// a sub-command of that exact name is tried; on a hit the returned
    /// slice starts at the sub-command token. Otherwise the top-level command
    /// is returned with `tokens` unchanged. Matching is exact at both levels.
    ///
    /// # Errors
    ///
    /// [`DispatchError::EmptyInput`] for an empty slice and
    /// [`DispatchError::NoSuchCommand`] for an unknown first token.
    ///
    /// # Examples
    ///
    /// ```
    /// use shellkit_core::{App, Command, ExitStatus};
    ///
    /// let mut app = App::builder("demo").without_defaults().build().unwrap();
    /// app.add_command(
    ///     Command::new("foo")
    ///         .with_main(|_| ExitStatus::Cmd)
    ///         .with_sub_command(Command::new("bar").with_main(|_| ExitStatus::Cmd)),
    /// )
    /// .unwrap();
    ///
    /// let (cmd, rest) = app.resolve(&["foo", "bar", "x"]).unwrap();
    /// assert_eq!((cmd.full_name().as_str(), rest), ("foo bar", &["bar", "x"][..]));
    ///
    /// let (cmd, rest) = app.resolve(&["foo", "-bar"]).unwrap();
    /// assert_eq!((cmd.name(), rest), ("foo", &["foo", "-bar"][..]));
    /// ```
    pub fn resolve<'t, S: AsRef<str>>(
        &self,
        tokens: &'t [S],
    ) -> Result<(CommandRef<'_>, &'t [S]), DispatchError> {
        let Some(first) = tokens.first() else {
            return Err(DispatchError::EmptyInput(String::new()));
        };
        let name = first.as_ref();
        let cmd = self
            .get_by_name(name)
            .ok_or_else(|| DispatchError::NoSuchCommand(name.to_string()))?;

        let sub = tokens
            .get(1)
            .map(AsRef::as_ref)
            .filter(|second| !second.starts_with('-'))
            .and_then(|second| cmd.sub_command(second));

        Ok(match sub {
            Some(sub) => (sub, &tokens[1..]),
            None => (cmd, tokens),
        })
    }

    /// Runs `command` with `args`, whose first token is the command's own
    /// name and is skipped by the flag parser.
    ///
    /// A fresh [`Context`] is built, the command's flags are registered on
    /// it, the remaining arguments are parsed and the handler is invoked.
    /// When parsing fails, `Usage of <name>:` and the flag defaults are
    /// written to the error stream.
    ///
    /// # Errors
    ///
    /// [`DispatchError::FlagParse`] if parsing fails; the handler is not run.
    /// [`DispatchError::ForeignCommand`] if `command` belongs to another app.
    pub fn execute<S: AsRef<str>>(
        &self,
        command: CommandRef<'_>,
        args: &[S],
    ) -> Result<ExitStatus, DispatchError> {
        if !std::ptr::eq(command.app(), self) {
            return Err(DispatchError::ForeignCommand(command.name().to_string()));
        }

        let mut ctx = Context::new(command);
        if let Some(set_flags) = command.set_flags_fn() {
            set_flags(&mut ctx);
        }

        let rest = args.get(1..).unwrap_or_default();
        if let Err(source) = ctx.flags_mut().parse(rest) {
            debug!(command = %command.full_name(), error = %source, "flag parsing failed");
            self.eprintln(format_args!("Usage of {}:", command.name()));
            self.eprint(ctx.flags().defaults());
            return Err(DispatchError::FlagParse {
                name: command.name().to_string(),
                source,
            });
        }

        debug!(command = %command.full_name(), args = ctx.args().len(), "executing command");
        let status = (command.main_fn())(&mut ctx);
        debug!(command = %command.full_name(), ?status, "command finished");
        Ok(status)
    }

    /// Tokenizes, resolves and executes one input line.
    ///
    /// # Errors
    ///
    /// [`DispatchError::EmptyInput`] carrying `line` when it holds no
    /// tokens, otherwise whatever [`resolve`](Self::resolve) or
    /// [`execute`](Self::execute) return.
    pub fn execute_line(&self, line: &str) -> Result<ExitStatus, DispatchError> {
        let tokens = tokenize(line);
        if tokens.is_empty() {
            return Err(DispatchError::EmptyInput(line.to_string()));
        }

        let (command, args) = self.resolve(&tokens)?;
        self.execute(command, args)
    }
}
