//! Command definitions and registered-command views.
//!
//! A [`Command`] is the value an application builds and hands to
//! [`App::add_command`](crate::App::add_command). Registration validates it,
//! injects default sub-commands, renders its usage template and stores the
//! result in the application's command arena. From then on the command is
//! addressed through a [`CommandId`] and read through a [`CommandRef`].

use std::fmt;
use std::rc::Rc;

use shellkit_flags::FlagSet;

use crate::{App, Context, DispatchError};

/// Handler run when a command is executed.
pub type MainFn = Rc<dyn Fn(&mut Context<'_>) -> ExitStatus>;

/// Callback that registers a command's flags on a fresh [`Context`].
pub type SetFlagsFn = Rc<dyn Fn(&mut Context<'_>)>;

/// Returned by command handlers to tell the read-loop what to do next.
///
/// # Examples
///
/// ```
/// use shellkit_core::ExitStatus;
///
/// assert!(!ExitStatus::Cmd.ends_loop());
/// assert!(ExitStatus::Shell.ends_loop());
/// assert_eq!(ExitStatus::default(), ExitStatus::Cmd);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExitStatus {
    /// Finish this command only; the read-loop keeps reading.
    #[default]
    Cmd,
    /// Leave the read-loop; the embedding program carries on.
    Shell,
    /// Leave the read-loop and ask the embedding program to exit as well.
    All,
}

impl ExitStatus {
    /// Returns `true` for every status except [`ExitStatus::Cmd`].
    pub fn ends_loop(self) -> bool {
        self != Self::Cmd
    }
}

/// Definition of a command and, optionally, its sub-commands.
///
/// Only `name` and `main` are required. `usage` may contain the
/// placeholders `${name}`, `${fullName}`, `${flags}` and `${shortFlags}`,
/// which are substituted once at registration.
///
/// # Examples
///
/// ```
/// use shellkit_core::{Command, ExitStatus};
///
/// let cmd = Command::new("test")
///     .with_synopsis("run some tests")
///     .with_usage("${name} ${shortFlags}\n\n${flags}")
///     .with_flags(|ctx| {
///         let top = ctx.flags_mut().int("top", 12, "example top-level flag");
///         ctx.set("top", top);
///     })
///     .with_main(|ctx| {
///         let top: i64 = ctx.must_get("top");
///         ctx.app().println(format_args!("Hello world! {top}"));
///         ExitStatus::Cmd
///     })
///     .with_sub_command(Command::new("secondary").with_main(|_| ExitStatus::Cmd));
///
/// assert_eq!(cmd.sub_commands.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Command {
    /// Name matched against the first (or second) input token. Must not be
    /// empty or contain whitespace; sub-command names must not start with
    /// `-`.
    pub name: String,
    /// One-line description.
    pub synopsis: String,
    /// Detailed description; template placeholders are expanded at
    /// registration.
    pub usage: String,
    /// Registers flags on the context. Must not parse.
    pub set_flags: Option<SetFlagsFn>,
    /// Command logic.
    pub main: Option<MainFn>,
    /// Sub-commands, one level deep only.
    pub sub_commands: Vec<Command>,
    /// Skip injection of the default sub-commands.
    pub prevent_default_sub_commands: bool,
}

impl Command {
    /// Creates a command with the given name and nothing else set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the synopsis.
    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.synopsis = synopsis.into();
        self
    }

    /// Sets the usage template.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Sets the flag-registration callback.
    pub fn with_flags<F>(mut self, set_flags: F) -> Self
    where
        F: Fn(&mut Context<'_>) + 'static,
    {
        self.set_flags = Some(Rc::new(set_flags));
        self
    }

    /// Sets the handler.
    pub fn with_main<F>(mut self, main: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> ExitStatus + 'static,
    {
        self.main = Some(Rc::new(main));
        self
    }

    /// Appends a sub-command.
    pub fn with_sub_command(mut self, sub: Command) -> Self {
        self.sub_commands.push(sub);
        self
    }

    /// Disables default sub-command injection.
    pub fn without_default_sub_commands(mut self) -> Self {
        self.prevent_default_sub_commands = true;
        self
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("synopsis", &self.synopsis)
            .field("usage", &self.usage)
            .field("set_flags", &self.set_flags.is_some())
            .field("main", &self.main.is_some())
            .field("sub_commands", &self.sub_commands)
            .field(
                "prevent_default_sub_commands",
                &self.prevent_default_sub_commands,
            )
            .finish()
    }
}

/// Stable index of a registered command inside its [`App`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub(crate) usize);

/// Arena slot for a registered command.
pub(crate) struct CommandNode {
    pub(crate) name: String,
    pub(crate) synopsis: String,
    pub(crate) usage: String,
    pub(crate) set_flags: Option<SetFlagsFn>,
    pub(crate) main: MainFn,
    pub(crate) parent: Option<CommandId>,
    pub(crate) sub_commands: Vec<CommandId>,
}

/// Borrowed view of a registered command.
#[derive(Clone, Copy)]
pub struct CommandRef<'a> {
    app: &'a App,
    id: CommandId,
}

impl<'a> CommandRef<'a> {
    pub(crate) fn new(app: &'a App, id: CommandId) -> Self {
        Self { app, id }
    }

    fn node(&self) -> &'a CommandNode {
        self.app.node(self.id)
    }

    /// Arena index of this command.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Application that owns this command.
    pub fn app(&self) -> &'a App {
        self.app
    }

    /// Command name.
    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    /// One-line description.
    pub fn synopsis(&self) -> &'a str {
        &self.node().synopsis
    }

    /// Usage text with templates already expanded.
    pub fn usage(&self) -> &'a str {
        &self.node().usage
    }

    /// `"<parent> <name>"` for sub-commands, otherwise just the name.
    pub fn full_name(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{} {}", parent.name(), self.name()),
            None => self.name().to_string(),
        }
    }

    /// Enclosing command, if this is a sub-command.
    pub fn parent(&self) -> Option<CommandRef<'a>> {
        self.node().parent.map(|id| CommandRef::new(self.app, id))
    }

    /// Returns `true` if this command was registered directly on the app.
    pub fn is_top_level(&self) -> bool {
        self.node().parent.is_none()
    }

    /// Sub-commands in registration order, defaults last.
    pub fn sub_commands(self) -> impl Iterator<Item = CommandRef<'a>> {
        let app = self.app;
        self.node()
            .sub_commands
            .iter()
            .map(move |id| CommandRef::new(app, *id))
    }

    /// Number of sub-commands.
    pub fn sub_command_count(&self) -> usize {
        self.node().sub_commands.len()
    }

    /// Finds a sub-command by exact name.
    pub fn sub_command(self, name: &str) -> Option<CommandRef<'a>> {
        self.sub_commands().find(|sub| sub.name() == name)
    }

    /// Returns `true` if the command registers flags.
    pub fn has_flags(&self) -> bool {
        self.node().set_flags.is_some()
    }

    pub(crate) fn set_flags_fn(&self) -> Option<&'a SetFlagsFn> {
        self.node().set_flags.as_ref()
    }

    pub(crate) fn main_fn(&self) -> &'a MainFn {
        &self.node().main
    }

    /// Creates an empty context bound to this command.
    pub fn new_context(&self) -> Context<'a> {
        Context::new(*self)
    }

    /// Runs the flag-registration callback against a scratch context and
    /// returns the resulting, unparsed flag set.
    pub fn inspect_flags(&self) -> FlagSet {
        let mut ctx = self.new_context();
        if let Some(set_flags) = self.set_flags_fn() {
            set_flags(&mut ctx);
        }
        ctx.into_flags()
    }

    /// Executes this command with `args`, whose first token is the command
    /// name itself. See [`App::execute`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::FlagParse`] when flag parsing fails.
    pub fn execute<S: AsRef<str>>(&self, args: &[S]) -> Result<ExitStatus, DispatchError> {
        self.app.execute(*self, args)
    }
}

impl PartialEq for CommandRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.app, other.app) && self.id == other.id
    }
}

impl Eq for CommandRef<'_> {}

impl fmt::Debug for CommandRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("parent", &self.node().parent)
            .finish()
    }
}
