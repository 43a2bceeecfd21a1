//! The shell application: command arena, streams and registration.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::command::CommandNode;
use crate::config::{DEFAULT_BANNER, DEFAULT_PROMPT};
use crate::validate::{self, Prepared};
use crate::{
    Command, CommandId, CommandRef, DefaultSubCommand, Defaults, RegistrationError, ShellConfig,
};

/// An interactive shell: registered commands plus the streams they talk to.
///
/// Commands are stored in an arena and addressed by [`CommandId`]; the tree
/// is read-only once registration is done. Output and input streams sit
/// behind [`RefCell`]s so that handlers, which only see `&App`, can print.
/// Holding the guard from [`output`](App::output) while calling one of the
/// `print` helpers panics.
///
/// # Examples
///
/// ```
/// use shellkit_core::{App, Command, ExitStatus, SharedBuffer};
///
/// let out = SharedBuffer::new();
/// let mut app = App::builder("demo").output(out.clone()).build().unwrap();
/// app.add_command(
///     Command::new("hello")
///         .with_synopsis("say hello")
///         .with_main(|ctx| {
///             ctx.app().println("hello!");
///             ExitStatus::Cmd
///         }),
/// )
/// .unwrap();
///
/// assert_eq!(app.execute_line("hello"), Ok(ExitStatus::Cmd));
/// assert_eq!(app.execute_line("exit"), Ok(ExitStatus::All));
/// assert_eq!(out.contents(), "hello!\n");
/// ```
pub struct App {
    name: String,
    prompt: String,
    banner: String,
    nodes: Vec<CommandNode>,
    commands: Vec<CommandId>,
    default_sub_commands: Vec<DefaultSubCommand>,
    output: RefCell<Box<dyn Write>>,
    err_output: RefCell<Box<dyn Write>>,
    input: RefCell<Box<dyn BufRead>>,
}

impl App {
    /// Builds an app with the standard default commands over stdio.
    ///
    /// # Errors
    ///
    /// Only fails if a default command is itself invalid.
    pub fn new(name: impl Into<String>) -> Result<Self, RegistrationError> {
        Self::builder(name).build()
    }

    /// Starts building an app. A blank name falls back to the executable's
    /// file name.
    pub fn builder(name: impl Into<String>) -> AppBuilder {
        AppBuilder::new(name.into())
    }

    /// Application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prompt written before each line is read.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Banner printed when the read-loop starts.
    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// Validates `cmd`, injects default sub-commands, renders usage
    /// templates and registers the result as a top-level command.
    ///
    /// Either the whole tree is registered or nothing is.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistrationError`] found.
    pub fn add_command(&mut self, cmd: Command) -> Result<CommandId, RegistrationError> {
        let name = cmd.name.clone();
        let prepared = validate::prepare(cmd, &self.default_sub_commands, |name| {
            self.get_by_name(name).is_some()
        })
        .inspect_err(|err| warn!(command = %name, error = %err, "command rejected"))?;

        let root = self.commit(prepared);
        self.render_usages(root);

        debug!(
            command = %name,
            sub_commands = self.node(root).sub_commands.len(),
            "command registered"
        );
        Ok(root)
    }

    fn commit(&mut self, prepared: Prepared) -> CommandId {
        let Prepared {
            name,
            synopsis,
            usage,
            set_flags,
            main,
            sub_commands,
        } = prepared;

        let root = self.push_node(CommandNode {
            name,
            synopsis,
            usage,
            set_flags,
            main,
            parent: None,
            sub_commands: Vec::new(),
        });

        for sub in sub_commands {
            let id = self.push_node(CommandNode {
                name: sub.name,
                synopsis: sub.synopsis,
                usage: sub.usage,
                set_flags: sub.set_flags,
                main: sub.main,
                parent: Some(root),
                sub_commands: Vec::new(),
            });
            self.nodes[root.0].sub_commands.push(id);
        }

        self.commands.push(root);
        root
    }

    fn push_node(&mut self, node: CommandNode) -> CommandId {
        self.nodes.push(node);
        CommandId(self.nodes.len() - 1)
    }

    fn render_usages(&mut self, root: CommandId) {
        let ids: Vec<CommandId> = std::iter::once(root)
            .chain(self.node(root).sub_commands.iter().copied())
            .collect();

        let rendered: Vec<(CommandId, String)> = ids
            .into_iter()
            .map(|id| (id, render_usage(CommandRef::new(self, id))))
            .collect();

        for (id, usage) in rendered {
            self.nodes[id.0].usage = usage;
        }
    }

    pub(crate) fn node(&self, id: CommandId) -> &CommandNode {
        &self.nodes[id.0]
    }

    /// Looks up a top-level command by exact name.
    pub fn get_by_name(&self, name: &str) -> Option<CommandRef<'_>> {
        self.commands().find(|cmd| cmd.name() == name)
    }

    /// Looks up any registered command, top-level or not, by id.
    pub fn command(&self, id: CommandId) -> Option<CommandRef<'_>> {
        (id.0 < self.nodes.len()).then(|| CommandRef::new(self, id))
    }

    /// Top-level commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = CommandRef<'_>> {
        self.commands.iter().map(|id| CommandRef::new(self, *id))
    }

    /// Writes to the output stream.
    pub fn print(&self, msg: impl fmt::Display) {
        write_stream(&self.output, format_args!("{msg}"));
    }

    /// Writes a line to the output stream.
    pub fn println(&self, msg: impl fmt::Display) {
        write_stream(&self.output, format_args!("{msg}\n"));
    }

    /// Writes to the error stream.
    pub fn eprint(&self, msg: impl fmt::Display) {
        write_stream(&self.err_output, format_args!("{msg}"));
    }

    /// Writes a line to the error stream.
    pub fn eprintln(&self, msg: impl fmt::Display) {
        write_stream(&self.err_output, format_args!("{msg}\n"));
    }

    /// Output stream, for use with `write!`.
    pub fn output(&self) -> RefMut<'_, Box<dyn Write>> {
        self.output.borrow_mut()
    }

    /// Error stream, for use with `write!`.
    pub fn err_output(&self) -> RefMut<'_, Box<dyn Write>> {
        self.err_output.borrow_mut()
    }

    pub(crate) fn input(&self) -> RefMut<'_, Box<dyn BufRead>> {
        self.input.borrow_mut()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("prompt", &self.prompt)
            .field("commands", &self.commands().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn write_stream(stream: &RefCell<Box<dyn Write>>, args: fmt::Arguments<'_>) {
    let mut writer = stream.borrow_mut();
    if let Err(err) = writer.write_fmt(args).and_then(|()| writer.flush()) {
        warn!(error = %err, "failed to write to shell stream");
    }
}

fn render_usage(cmd: CommandRef<'_>) -> String {
    let usage = cmd
        .usage()
        .replace("${name}", cmd.name())
        .replace("${fullName}", &cmd.full_name());

    let flags = cmd.inspect_flags();
    if flags.is_empty() {
        usage
            .replace("${flags}", "")
            .replace("${shortFlags}", "")
            .trim()
            .to_string()
    } else {
        usage
            .replace("${flags}", &flags.defaults())
            .replace("${shortFlags}", &flags.short_usage())
    }
}

/// Builder for [`App`].
pub struct AppBuilder {
    name: String,
    prompt: String,
    banner: String,
    defaults: Defaults,
    output: Option<Box<dyn Write>>,
    err_output: Option<Box<dyn Write>>,
    input: Option<Box<dyn BufRead>>,
}

impl AppBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            prompt: DEFAULT_PROMPT.to_string(),
            banner: DEFAULT_BANNER.to_string(),
            defaults: Defaults::standard(),
            output: None,
            err_output: None,
            input: None,
        }
    }

    /// Replaces the default command tables.
    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Registers no default commands at either level.
    pub fn without_defaults(self) -> Self {
        self.defaults(Defaults::none())
    }

    /// Output stream (default: stdout).
    pub fn output(mut self, output: impl Write + 'static) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    /// Error stream (default: stderr).
    pub fn err_output(mut self, err_output: impl Write + 'static) -> Self {
        self.err_output = Some(Box::new(err_output));
        self
    }

    /// Input stream (default: stdin).
    pub fn input(mut self, input: impl BufRead + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Prompt written before each line is read.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Banner printed when the read-loop starts. Empty disables it.
    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Applies a loaded [`ShellConfig`].
    pub fn config(mut self, config: &ShellConfig) -> Self {
        if let Some(name) = config.name.as_deref().filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        self.prompt = config.prompt.clone();
        self.banner = config.banner.clone();
        if !config.default_commands {
            self.defaults.commands.clear();
        }
        if !config.default_sub_commands {
            self.defaults.sub_commands.clear();
        }
        self
    }

    /// Builds the app and registers the default top-level commands.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] if a default command is invalid or
    /// two defaults share a name.
    pub fn build(self) -> Result<App, RegistrationError> {
        let name = if self.name.is_empty() {
            program_name()
        } else {
            self.name
        };

        let mut app = App {
            name,
            prompt: self.prompt,
            banner: self.banner,
            nodes: Vec::new(),
            commands: Vec::new(),
            default_sub_commands: self.defaults.sub_commands,
            output: RefCell::new(self.output.unwrap_or_else(|| Box::new(io::stdout()))),
            err_output: RefCell::new(self.err_output.unwrap_or_else(|| Box::new(io::stderr()))),
            input: RefCell::new(
                self.input
                    .unwrap_or_else(|| Box::new(BufReader::new(io::stdin()))),
            ),
        };

        for cmd in self.defaults.commands {
            app.add_command(cmd)?;
        }

        debug!(app = %app.name, commands = app.commands.len(), "shell created");
        Ok(app)
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("name", &self.name)
            .field("prompt", &self.prompt)
            .field("banner", &self.banner)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg| Path::new(arg).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "shell".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExitStatus, SharedBuffer};

    fn noop(name: &str) -> Command {
        Command::new(name).with_main(|_| ExitStatus::Cmd)
    }

    fn flagged(name: &str) -> Command {
        noop(name).with_flags(|ctx| {
            ctx.flags_mut().bool("test", true, "testing bool");
        })
    }

    #[test]
    fn test_new_app_defaults() {
        let app = App::builder("TestNewApp").build().unwrap();
        let names: Vec<_> = app.commands().map(|c| c.name()).collect();
        assert_eq!(names, vec!["exit", "help"]);
        assert_eq!(app.get_by_name("help").unwrap().name(), "help");
        assert_eq!(app.prompt(), DEFAULT_PROMPT);
        assert_eq!(app.banner(), DEFAULT_BANNER);

        let bare = App::builder("NoDefaults").without_defaults().build().unwrap();
        assert_eq!(bare.commands().count(), 0);
    }

    #[test]
    fn test_blank_name_falls_back_to_program() {
        let app = App::builder("").without_defaults().build().unwrap();
        assert!(!app.name().is_empty());
    }

    #[test]
    fn test_print_helpers() {
        let out = SharedBuffer::new();
        let err = SharedBuffer::new();
        let app = App::builder("TestAppPrint")
            .without_defaults()
            .output(out.clone())
            .err_output(err.clone())
            .build()
            .unwrap();

        app.print("Hello from print!\n");
        app.println(format_args!("Hello from {}!", "println"));
        app.eprintln("oops");
        writeln!(app.output(), "raw").unwrap();

        assert_eq!(out.contents(), "Hello from print!\nHello from println!\nraw\n");
        assert_eq!(err.contents(), "oops\n");
    }

    #[test]
    fn test_rejected_command_leaves_app_untouched() {
        let mut app = App::builder("atomic").build().unwrap();
        let before = app.commands().count();

        let err = app
            .add_command(noop("broken").with_sub_command(noop("-bad")))
            .unwrap_err();
        assert_eq!(err, RegistrationError::InvalidName("-bad".into()));
        assert_eq!(app.commands().count(), before);
        assert!(app.get_by_name("broken").is_none());
    }

    #[test]
    fn test_duplicate_help_rejected() {
        let mut app = App::builder("dup").build().unwrap();
        assert_eq!(
            app.add_command(noop("help")),
            Err(RegistrationError::DuplicateCommand("help".into()))
        );
    }

    #[test]
    fn test_sub_command_counts() {
        let mut app = App::builder("TestWorkingCommand")
            .without_defaults()
            .defaults(Defaults {
                commands: Vec::new(),
                sub_commands: Defaults::standard().sub_commands,
            })
            .build()
            .unwrap();

        app.add_command(
            flagged("no-defaults")
                .with_sub_command(noop("second"))
                .without_default_sub_commands(),
        )
        .unwrap();
        app.add_command(flagged("with-defaults").with_sub_command(noop("second")))
            .unwrap();
        app.add_command(noop("no-setflags").with_sub_command(noop("second")))
            .unwrap();
        app.add_command(flagged("leaf")).unwrap();

        let count = |name: &str| app.get_by_name(name).unwrap().sub_command_count();
        assert_eq!(count("no-defaults"), 1);
        assert_eq!(count("with-defaults"), 4);
        assert_eq!(count("no-setflags"), 3);
        assert_eq!(count("leaf"), 0);

        let no_flags = app.get_by_name("no-setflags").unwrap();
        assert!(no_flags.sub_command("flags").is_none());
    }

    #[test]
    fn test_parent_and_owner_links() {
        let mut app = App::builder("links").build().unwrap();
        let id = app
            .add_command(flagged("test").with_sub_command(noop("secondary")))
            .unwrap();

        let test = app.command(id).unwrap();
        assert!(test.is_top_level());
        assert_eq!(test.full_name(), "test");

        let secondary = test.sub_command("secondary").unwrap();
        assert_eq!(secondary.parent(), Some(test));
        assert_eq!(secondary.full_name(), "test secondary");
        assert!(std::ptr::eq(secondary.app(), &app));

        for sub in test.sub_commands() {
            assert_eq!(sub.parent().map(|p| p.id()), Some(id));
        }
    }

    #[test]
    fn test_usage_templates() {
        let mut app = App::builder("TestTemplateReplacement")
            .without_defaults()
            .build()
            .unwrap();
        app.add_command(
            noop("test")
                .with_usage("${name} ${shortFlags}:\n\nExecute primary test command.\n\n${flags}")
                .with_flags(|ctx| {
                    let top = ctx.flags_mut().int("top", 12, "example top-level flag");
                    ctx.set("top", top);
                })
                .with_sub_command(
                    noop("secondary")
                        .with_usage("${fullName} ${shortFlags}")
                        .with_flags(|ctx| {
                            ctx.flags_mut().int("second", 21, "example second-level flag");
                        }),
                )
                .with_sub_command(
                    noop("plain").with_usage("  ${name} ${shortFlags}\n${flags}  "),
                ),
        )
        .unwrap();

        let test = app.get_by_name("test").unwrap();
        assert!(test.usage().starts_with("test [-top]:\n\nExecute"));
        assert!(test.usage().contains("example top-level flag (default 12)"));

        let secondary = test.sub_command("secondary").unwrap();
        assert_eq!(secondary.usage(), "test secondary [-second]");

        let plain = test.sub_command("plain").unwrap();
        assert_eq!(plain.usage(), "plain");
    }

    #[test]
    fn test_config_applied() {
        let config = ShellConfig {
            name: Some("configured".into()),
            prompt: "$ ".into(),
            banner: String::new(),
            default_commands: false,
            default_sub_commands: true,
        };
        let app = App::builder("ignored").config(&config).build().unwrap();
        assert_eq!(app.name(), "configured");
        assert_eq!(app.prompt(), "$ ");
        assert!(app.banner().is_empty());
        assert!(app.get_by_name("exit").is_none());
    }
}
