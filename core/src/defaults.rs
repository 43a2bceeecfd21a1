//! Built-in commands injected at construction and registration.
//!
//! Top-level defaults (`exit`, `help`) are registered when an
//! [`App`](crate::App) is built. Sub-command defaults (`commands`, `flags`,
//! `help`) are appended to every command that declares sub-commands, unless
//! it opts out. Both tables are plain data carried by [`Defaults`], so an
//! application can drop, replace or extend them.

use crate::{Command, CommandRef, Context, ExitStatus};

const SHELL_ONLY: &str = "flagShellOnly";

/// A default sub-command and its injection rule.
#[derive(Debug, Clone)]
pub struct DefaultSubCommand {
    /// Command appended to the parent's sub-commands.
    pub command: Command,
    /// Only inject when the parent or one of its sub-commands has flags.
    pub requires_flags: bool,
}

/// Default command tables supplied when building an [`App`](crate::App).
///
/// # Examples
///
/// ```
/// use shellkit_core::Defaults;
///
/// let defaults = Defaults::standard();
/// let names: Vec<_> = defaults.commands.iter().map(|c| c.name.as_str()).collect();
/// assert_eq!(names, vec!["exit", "help"]);
/// assert_eq!(defaults.sub_commands.len(), 3);
///
/// assert!(Defaults::none().commands.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Defaults {
    /// Top-level commands registered at construction.
    pub commands: Vec<Command>,
    /// Sub-commands appended to commands that have sub-commands.
    pub sub_commands: Vec<DefaultSubCommand>,
}

impl Defaults {
    /// `exit` and `help` at the top level; `commands`, `flags` and `help`
    /// as sub-commands.
    pub fn standard() -> Self {
        Self {
            commands: vec![exit_command(), help_command()],
            sub_commands: vec![
                DefaultSubCommand {
                    command: commands_sub_command(),
                    requires_flags: false,
                },
                DefaultSubCommand {
                    command: flags_sub_command(),
                    requires_flags: true,
                },
                DefaultSubCommand {
                    command: help_sub_command(),
                    requires_flags: false,
                },
            ],
        }
    }

    /// No default commands at either level.
    pub fn none() -> Self {
        Self {
            commands: Vec::new(),
            sub_commands: Vec::new(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::standard()
    }
}

/// `exit [-shell-only]`: leaves the shell.
///
/// Returns [`ExitStatus::All`], or [`ExitStatus::Shell`] with `-shell-only`.
/// Stray arguments print usage and keep the shell running.
pub fn exit_command() -> Command {
    Command::new("exit")
        .with_synopsis("exit shell")
        .with_usage("${name} ${shortFlags}\n\n${flags}")
        .with_flags(|ctx| {
            let flag = ctx.flags_mut().bool(
                "shell-only",
                false,
                "exit only the shell, returning to the main program",
            );
            ctx.set(SHELL_ONLY, flag);
        })
        .with_main(|ctx| {
            let app = ctx.app();
            if ctx.flags().n_arg() > 0 {
                app.println("Usage: exit [OPTIONS]");
                app.print(ctx.flags().defaults());
                return ExitStatus::Cmd;
            }

            if ctx.should_get::<bool>(SHELL_ONLY).unwrap_or(false) {
                ExitStatus::Shell
            } else {
                ExitStatus::All
            }
        })
}

/// `help [<command>]`: lists top-level commands or describes one.
pub fn help_command() -> Command {
    Command::new("help")
        .with_synopsis("list existing commands and their synopsis")
        .with_usage(
            "${name} [<command>]:\n\
             With an argument, print the synopsis and usage of <command>. With no\n\
             argument, list every command with its synopsis.",
        )
        .with_main(|ctx| {
            let app = ctx.app();
            match ctx.args() {
                [] => {
                    let own = ctx.command().id();
                    let mut list: Vec<CommandRef<'_>> =
                        app.commands().filter(|cmd| cmd.id() != own).collect();
                    list.sort_by(|a, b| a.name().cmp(b.name()));

                    app.println("Available commands:");
                    for cmd in list {
                        app.println(format_args!("\t{}\t\t{}", cmd.name(), cmd.synopsis()));
                    }
                }
                [name] => match app.get_by_name(name) {
                    Some(cmd) => {
                        app.println(format_args!("{}\t{}", cmd.name(), cmd.synopsis()));
                        if !cmd.usage().is_empty() {
                            app.println(format_args!("\n{}", cmd.usage()));
                        }
                    }
                    None => app.println(format_args!("{name}: command not found")),
                },
                _ => {
                    app.println("Usage: help [OPTIONS]");
                    app.print(ctx.flags().defaults());
                }
            }
            ExitStatus::Cmd
        })
}

/// `commands`: lists the names of all sibling sub-commands.
pub fn commands_sub_command() -> Command {
    Command::new("commands")
        .with_synopsis("list all sub-command names")
        .with_usage("${name}:\nPrint a list of all sub-commands.")
        .with_main(|ctx| {
            let app = ctx.app();
            if !ctx.args().is_empty() {
                app.println(ctx.command().usage());
                return ExitStatus::Cmd;
            }

            if let Some(parent) = ctx.parent() {
                for sub in parent.sub_commands() {
                    app.println(sub.name());
                }
            }
            ExitStatus::Cmd
        })
}

/// `flags [<sub-command>]`: prints the flags of the parent command or of a
/// named sibling.
pub fn flags_sub_command() -> Command {
    Command::new("flags")
        .with_synopsis("describe all known top-level flags")
        .with_usage(
            "${name} [<sub-command>]:\n\
             With an argument, print all flags of <sub-command>. Else, print a\n\
             description of all known top-level flags.",
        )
        .with_main(|ctx| {
            let app = ctx.app();
            let Some(parent) = ctx.parent() else {
                return ExitStatus::Cmd;
            };

            let target = match ctx.args() {
                [] => parent,
                [name] => match parent.sub_command(name) {
                    Some(sub) => sub,
                    None => {
                        report_missing_sibling(ctx, parent, name);
                        return ExitStatus::Cmd;
                    }
                },
                _ => {
                    app.println(ctx.command().usage());
                    return ExitStatus::Cmd;
                }
            };

            app.print(target.inspect_flags().defaults());
            ExitStatus::Cmd
        })
}

/// `help [<sub-command>]`: lists sibling sub-commands or prints the usage
/// of one.
pub fn help_sub_command() -> Command {
    Command::new("help")
        .with_synopsis("describe sub-commands and their syntax")
        .with_usage(
            "${name} [<sub-command>]:\n\
             With an argument, prints detailed information on the use of the specified\n\
             sub-command. With no argument, prints a list of all commands and a brief\n\
             description of each.",
        )
        .with_main(|ctx| {
            let app = ctx.app();
            let Some(parent) = ctx.parent() else {
                return ExitStatus::Cmd;
            };

            match ctx.args() {
                [] => {
                    let own = ctx.command().id();
                    let mut list: Vec<CommandRef<'_>> =
                        parent.sub_commands().filter(|sub| sub.id() != own).collect();
                    list.sort_by(|a, b| a.name().cmp(b.name()));

                    app.println(format_args!(
                        "Usage: {} <sub-command> <sub-command args>\n\nSub-commands:",
                        parent.name()
                    ));
                    for sub in list {
                        app.println(format_args!("\t{}\t\t{}", sub.name(), sub.synopsis()));
                    }
                }
                [name] => match parent.sub_command(name) {
                    Some(sub) => app.println(sub.usage()),
                    None => report_missing_sibling(ctx, parent, name),
                },
                _ => app.println(ctx.command().usage()),
            }
            ExitStatus::Cmd
        })
}

fn report_missing_sibling(ctx: &Context<'_>, parent: CommandRef<'_>, name: &str) {
    ctx.app().println(format_args!(
        "{} {name}: sub-command not found",
        parent.name()
    ));
}
