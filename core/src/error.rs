//! Error types for registration, dispatch, context access and configuration.
//!
//! Registration errors are raised by [`App::add_command`](crate::App::add_command)
//! and abort that call. Dispatch errors are raised while resolving and
//! executing an input line; the read-loop reports them and keeps going.

use shellkit_flags::FlagError;
use thiserror::Error;

/// Errors raised while registering a command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A top-level command with the same name is already registered.
    #[error("command '{0}' already exists")]
    DuplicateCommand(String),
    /// Two sub-commands of the same parent share a name.
    #[error("sub-command '{name}' of '{parent}' already exists")]
    DuplicateSubCommand {
        /// Enclosing command name.
        parent: String,
        /// Repeated sub-command name.
        name: String,
    },
    /// Command or sub-command name is empty.
    #[error("(sub-)command name cannot be blank")]
    BlankName,
    /// Command or sub-command name contains whitespace.
    #[error("(sub-)command name '{name}' contains {count} disallowed whitespace characters")]
    WhitespaceInName {
        /// Offending name.
        name: String,
        /// Number of whitespace characters found.
        count: usize,
    },
    /// Sub-command name starts with `-`, which is reserved for flags.
    #[error("sub-command '{0}' must not begin with the character '-'")]
    InvalidName(String),
    /// A sub-command declares sub-commands of its own.
    #[error("'{0}' contains more than one level of sub-commands")]
    TooDeep(String),
    /// Command or sub-command has no `main` handler.
    #[error("main handler for (sub-)command '{0}' is missing")]
    MissingHandler(String),
}

/// Errors raised while resolving or executing an input line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No top-level command matches the first token.
    #[error("{0}: command not found")]
    NoSuchCommand(String),
    /// The input contained no tokens.
    #[error("failed to parse input '{0}'")]
    EmptyInput(String),
    /// The command passed to [`App::execute`](crate::App::execute) is
    /// registered on a different app.
    #[error("{0}: command belongs to another shell")]
    ForeignCommand(String),
    /// The matched command's flag parser rejected the arguments.
    #[error("{name}: failed to parse flags:\n{source}")]
    FlagParse {
        /// Name of the command whose flags failed to parse.
        name: String,
        /// Underlying parser failure.
        #[source]
        source: FlagError,
    },
}

/// Errors raised by checked [`Context`](crate::Context) lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// Nothing is stored under the key.
    #[error("value '{0}' does not exist")]
    Missing(String),
    /// A value exists but has a different type.
    #[error("value '{key}' is {found}, not {expected}")]
    TypeMismatch {
        /// Requested key.
        key: String,
        /// Requested type.
        expected: &'static str,
        /// Stored type.
        found: &'static str,
    },
    /// The key holds a flag handle that is not registered on the context's
    /// flag set.
    #[error("value '{key}' refers to unregistered flag -{flag}")]
    UnknownFlag {
        /// Requested key.
        key: String,
        /// Flag name carried by the handle.
        flag: String,
    },
}

/// Errors raised while loading or saving a [`ShellConfig`](crate::ShellConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any error surfaced by this crate.
#[derive(Debug, Error)]
pub enum ShellError {
    /// See [`RegistrationError`].
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    /// See [`DispatchError`].
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// See [`ContextError`].
    #[error(transparent)]
    Context(#[from] ContextError),
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience alias for results with [`ShellError`].
pub type Result<T> = std::result::Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_messages() {
        assert_eq!(
            DispatchError::NoSuchCommand("nothing".into()).to_string(),
            "nothing: command not found"
        );
        let err = DispatchError::FlagParse {
            name: "test".into(),
            source: FlagError::BadSyntax("---hello".into()),
        };
        assert_eq!(
            err.to_string(),
            "test: failed to parse flags:\nbad flag syntax: ---hello"
        );
    }

    #[test]
    fn test_whitespace_message_reports_count() {
        let err = RegistrationError::WhitespaceInName {
            name: "a b".into(),
            count: 1,
        };
        assert!(err.to_string().contains("contains 1 disallowed whitespace"));
    }
}
