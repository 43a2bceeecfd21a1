//! Command trees, dispatch and a read-loop for interactive line-oriented
//! shells.
//!
//! An embedding program builds an [`App`], registers [`Command`]s on it and
//! hands control to [`App::run`]:
//!
//! - [`Command`]: a named handler with optional flags and one level of
//!   sub-commands.
//! - [`App::add_command`]: validates a command tree, injects the default
//!   sub-commands from [`Defaults`] and renders usage templates, all or
//!   nothing.
//! - [`App::resolve`] / [`App::execute`]: map input tokens to a command and
//!   run it with a fresh [`Context`].
//! - [`App::run`]: the read-loop; it ends when a handler returns something
//!   other than [`ExitStatus::Cmd`] or input is exhausted.
//!
//! Flags are parsed by [`shellkit_flags`], re-exported here.
//!
//! # Example
//!
//! ```
//! use shellkit_core::{App, Command, ExitStatus, SharedBuffer};
//!
//! let out = SharedBuffer::new();
//! let mut app = App::builder("demo").output(out.clone()).build().unwrap();
//!
//! app.add_command(
//!     Command::new("test")
//!         .with_synopsis("run the test command")
//!         .with_usage("${name} ${shortFlags}\n\n${flags}")
//!         .with_flags(|ctx| {
//!             let top = ctx.flags_mut().int("top", 12, "example top-level flag");
//!             ctx.set("top", top);
//!         })
//!         .with_main(|ctx| {
//!             let top: i64 = ctx.must_get("top");
//!             ctx.app().println(format_args!("Hello world! {top}"));
//!             ExitStatus::Cmd
//!         })
//!         .with_sub_command(Command::new("secondary").with_main(|_| ExitStatus::Cmd)),
//! )
//! .unwrap();
//!
//! app.execute_line("test -top 19").unwrap();
//! assert_eq!(out.contents(), "Hello world! 19\n");
//!
//! let test = app.get_by_name("test").unwrap();
//! let subs: Vec<_> = test.sub_commands().map(|c| c.name()).collect();
//! assert_eq!(subs, vec!["secondary", "commands", "flags", "help"]);
//! assert!(test.usage().starts_with("test [-top]"));
//! ```

mod app;
mod command;
mod config;
mod context;
mod defaults;
mod dispatch;
mod error;
mod io;
mod shell;
mod validate;

pub use app::{App, AppBuilder};
pub use command::{Command, CommandId, CommandRef, ExitStatus, MainFn, SetFlagsFn};
pub use config::{DEFAULT_BANNER, DEFAULT_PROMPT, ShellConfig};
pub use context::{Context, FromValue, Value};
pub use defaults::{
    DefaultSubCommand, Defaults, commands_sub_command, exit_command, flags_sub_command,
    help_command, help_sub_command,
};
pub use dispatch::tokenize;
pub use error::{ConfigError, ContextError, DispatchError, RegistrationError, Result, ShellError};
pub use io::SharedBuffer;
pub use shell::{LineReader, ReadOutcome};
pub use shellkit_flags::{Flag, FlagError, FlagRef, FlagSet, FlagValue};
