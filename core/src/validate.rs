//! Registration-time validation of command trees.
//!
//! [`prepare`] works on an owned copy of the definition: it injects the
//! default sub-commands, checks every structural rule and only then yields a
//! [`Prepared`] tree ready to be committed to the arena. Nothing is written
//! to the application until the whole tree has passed.

use std::collections::HashSet;

use crate::command::{MainFn, SetFlagsFn};
use crate::{Command, DefaultSubCommand, RegistrationError};

/// Validated command with its handler extracted.
pub(crate) struct Prepared {
    pub(crate) name: String,
    pub(crate) synopsis: String,
    pub(crate) usage: String,
    pub(crate) set_flags: Option<SetFlagsFn>,
    pub(crate) main: MainFn,
    pub(crate) sub_commands: Vec<Prepared>,
}

/// Validates `cmd` for registration.
///
/// `exists` reports whether a top-level command name is already taken.
pub(crate) fn prepare(
    mut cmd: Command,
    defaults: &[DefaultSubCommand],
    exists: impl Fn(&str) -> bool,
) -> Result<Prepared, RegistrationError> {
    if exists(&cmd.name) {
        return Err(RegistrationError::DuplicateCommand(cmd.name));
    }

    if !cmd.sub_commands.is_empty() && !cmd.prevent_default_sub_commands {
        let any_flags = cmd.set_flags.is_some()
            || cmd.sub_commands.iter().any(|sub| sub.set_flags.is_some());
        for default in defaults {
            if default.requires_flags && !any_flags {
                continue;
            }
            cmd.sub_commands.push(default.command.clone());
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for sub in &cmd.sub_commands {
        if sub.name.starts_with('-') {
            return Err(RegistrationError::InvalidName(sub.name.clone()));
        }
        if !sub.sub_commands.is_empty() {
            return Err(RegistrationError::TooDeep(cmd.name.clone()));
        }
        if !sub.name.is_empty() && !seen.insert(sub.name.as_str()) {
            return Err(RegistrationError::DuplicateSubCommand {
                parent: cmd.name.clone(),
                name: sub.name.clone(),
            });
        }
    }

    let subs = std::mem::take(&mut cmd.sub_commands);
    let mut root = prepare_one(cmd)?;
    root.sub_commands = subs
        .into_iter()
        .map(prepare_one)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(root)
}

fn prepare_one(cmd: Command) -> Result<Prepared, RegistrationError> {
    if cmd.name.is_empty() {
        return Err(RegistrationError::BlankName);
    }

    let count = cmd.name.chars().filter(|c| c.is_whitespace()).count();
    if count > 0 {
        return Err(RegistrationError::WhitespaceInName {
            name: cmd.name,
            count,
        });
    }

    let Some(main) = cmd.main else {
        return Err(RegistrationError::MissingHandler(cmd.name));
    };

    Ok(Prepared {
        name: cmd.name,
        synopsis: cmd.synopsis,
        usage: cmd.usage,
        set_flags: cmd.set_flags,
        main,
        sub_commands: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Defaults, ExitStatus};

    fn noop(name: &str) -> Command {
        Command::new(name).with_main(|_| ExitStatus::Cmd)
    }

    fn defaults() -> Vec<DefaultSubCommand> {
        Defaults::standard().sub_commands
    }

    fn names(prepared: &Prepared) -> Vec<&str> {
        prepared
            .sub_commands
            .iter()
            .map(|sub| sub.name.as_str())
            .collect()
    }

    #[test]
    fn test_injects_defaults_without_flags_entry() {
        let cmd = noop("test").with_sub_command(noop("second"));
        let prepared = prepare(cmd, &defaults(), |_| false).unwrap();
        assert_eq!(names(&prepared), vec!["second", "commands", "help"]);
    }

    #[test]
    fn test_injects_flags_entry_once_when_any_flags() {
        let cmd = noop("test")
            .with_flags(|ctx| {
                ctx.flags_mut().bool("a", false, "");
            })
            .with_sub_command(noop("one").with_flags(|_| {}))
            .with_sub_command(noop("two").with_flags(|_| {}));
        let prepared = prepare(cmd, &defaults(), |_| false).unwrap();
        assert_eq!(
            names(&prepared),
            vec!["one", "two", "commands", "flags", "help"]
        );
    }

    #[test]
    fn test_no_sub_commands_means_no_defaults() {
        let prepared = prepare(noop("plain"), &defaults(), |_| false).unwrap();
        assert!(prepared.sub_commands.is_empty());
    }

    #[test]
    fn test_prevent_defaults() {
        let cmd = noop("test")
            .with_sub_command(noop("second"))
            .without_default_sub_commands();
        let prepared = prepare(cmd, &defaults(), |_| false).unwrap();
        assert_eq!(names(&prepared), vec!["second"]);
    }

    #[test]
    fn test_duplicate_top_level() {
        let err = prepare(noop("help"), &defaults(), |name| name == "help").err();
        assert_eq!(
            err,
            Some(RegistrationError::DuplicateCommand("help".into()))
        );
    }

    #[test]
    fn test_sub_command_colliding_with_default() {
        let cmd = noop("test").with_sub_command(noop("help"));
        let err = prepare(cmd, &defaults(), |_| false).err();
        assert_eq!(
            err,
            Some(RegistrationError::DuplicateSubCommand {
                parent: "test".into(),
                name: "help".into(),
            })
        );
    }

    #[test]
    fn test_structural_errors() {
        let cases = [
            (Command::new(""), RegistrationError::BlankName),
            (
                Command::new("a b"),
                RegistrationError::WhitespaceInName {
                    name: "a b".into(),
                    count: 1,
                },
            ),
            (
                Command::new("test"),
                RegistrationError::MissingHandler("test".into()),
            ),
            (
                noop("test").with_sub_command(Command::new("")),
                RegistrationError::BlankName,
            ),
            (
                noop("test").with_sub_command(noop("-x")),
                RegistrationError::InvalidName("-x".into()),
            ),
            (
                noop("test").with_sub_command(noop("second").with_sub_command(noop("third"))),
                RegistrationError::TooDeep("test".into()),
            ),
            (
                noop("test").with_sub_command(Command::new("second")),
                RegistrationError::MissingHandler("second".into()),
            ),
        ];

        for (cmd, expected) in cases {
            let label = format!("{cmd:?}");
            assert_eq!(
                prepare(cmd, &defaults(), |_| false).err(),
                Some(expected),
                "{label}"
            );
        }
    }

    #[test]
    fn test_whitespace_counts_every_character() {
        let err = prepare(noop("a\tb c"), &[], |_| false).err();
        assert_eq!(
            err,
            Some(RegistrationError::WhitespaceInName {
                name: "a\tb c".into(),
                count: 2,
            })
        );
    }
}
