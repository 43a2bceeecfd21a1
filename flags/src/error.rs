//! Flag parsing errors.

use thiserror::Error;

/// Errors produced while parsing input tokens against a
/// [`FlagSet`](crate::FlagSet).
///
/// The `Display` impl produces the message shown to the shell user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// Token looks like a flag but has no usable name (e.g. `---x`, `-=1`).
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
    /// Flag name is not registered.
    #[error("flag provided but not defined: -{0}")]
    NotDefined(String),
    /// `-h` or `-help` was given and no such flag is registered.
    #[error("flag: help requested")]
    HelpRequested,
    /// Non-boolean flag was the last token and received no value.
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    /// Supplied text could not be converted to the flag's type.
    #[error("invalid value \"{value}\" for flag -{name}: {reason}")]
    InvalidValue {
        /// Raw text that failed to convert.
        value: String,
        /// Flag name without the leading dash.
        name: String,
        /// Conversion failure description.
        reason: String,
    },
}
