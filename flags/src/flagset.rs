//! Flag registry and single-dash parser.
//!
//! Flags are written `-name` or `--name`; values follow either as
//! `-name=value` or as the next token. Boolean flags only take a value
//! through the `=` form so that `-verbose file` leaves `file` positional.
//! Parsing stops at the first token that is not a flag, or right after a
//! bare `--`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use tracing::{trace, warn};

use crate::{FlagError, FlagValue};

/// A registered flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    /// Name without the leading dash.
    pub name: String,
    /// One-line (or multi-line) description shown in help text.
    pub usage: String,
    /// Value the flag holds until it is set.
    pub default: FlagValue,
    /// Current value.
    pub value: FlagValue,
}

/// Handle naming a registered flag.
///
/// Returned by the registration methods on [`FlagSet`]. A handle carries no
/// value itself; it is resolved against the set after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagRef(String);

impl FlagRef {
    /// Name of the referenced flag.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Named set of flags together with the positional arguments left over
/// after parsing.
///
/// Flags are kept in name order, which is the order used by
/// [`defaults`](FlagSet::defaults), [`short_usage`](FlagSet::short_usage)
/// and [`iter`](FlagSet::iter).
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    name: String,
    flags: BTreeMap<String, Flag>,
    actual: BTreeSet<String>,
    args: Vec<String>,
    parsed: bool,
}

impl FlagSet {
    /// Creates an empty set. `name` is usually the owning command's name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a boolean flag.
    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> FlagRef {
        self.define(name, FlagValue::Bool(default), usage)
    }

    /// Registers a signed integer flag.
    pub fn int(&mut self, name: &str, default: i64, usage: &str) -> FlagRef {
        self.define(name, FlagValue::Int(default), usage)
    }

    /// Registers an unsigned integer flag.
    pub fn uint(&mut self, name: &str, default: u64, usage: &str) -> FlagRef {
        self.define(name, FlagValue::Uint(default), usage)
    }

    /// Registers a floating point flag.
    pub fn float(&mut self, name: &str, default: f64, usage: &str) -> FlagRef {
        self.define(name, FlagValue::Float(default), usage)
    }

    /// Registers a string flag.
    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> FlagRef {
        self.define(name, FlagValue::Str(default.to_string()), usage)
    }

    /// Registers a flag with an explicit default value.
    ///
    /// Registering a name twice replaces the earlier definition.
    pub fn define(&mut self, name: &str, default: FlagValue, usage: &str) -> FlagRef {
        let flag = Flag {
            name: name.to_string(),
            usage: usage.to_string(),
            value: default.clone(),
            default,
        };
        if self.flags.insert(name.to_string(), flag).is_some() {
            warn!(set = %self.name, flag = name, "flag redefined");
        }
        FlagRef(name.to_string())
    }

    /// Parses `args`, which must not include the command name.
    ///
    /// On success the tokens after the last flag are available through
    /// [`args`](FlagSet::args).
    ///
    /// # Errors
    ///
    /// Returns the first [`FlagError`] encountered; flags before the failing
    /// token keep the values they were assigned.
    ///
    /// # Examples
    ///
    /// ```
    /// use shellkit_flags::{FlagError, FlagSet};
    ///
    /// let mut flags = FlagSet::new("test");
    /// flags.int("top", 12, "example");
    /// assert_eq!(
    ///     flags.parse(["---bogus"]),
    ///     Err(FlagError::BadSyntax("---bogus".into()))
    /// );
    /// ```
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), FlagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.parsed = true;
        let mut rest: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        rest.reverse();

        while let Some(token) = rest.pop() {
            if token.len() < 2 || !token.starts_with('-') {
                rest.push(token);
                break;
            }

            let body = if let Some(long) = token.strip_prefix("--") {
                if long.is_empty() {
                    break;
                }
                long
            } else {
                &token[1..]
            };

            if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
                return Err(FlagError::BadSyntax(token.clone()));
            }

            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (body, None),
            };

            let is_bool = match self.flags.get(name) {
                Some(flag) => flag.default.is_bool(),
                None if name == "help" || name == "h" => return Err(FlagError::HelpRequested),
                None => return Err(FlagError::NotDefined(name.to_string())),
            };

            let text = match inline {
                Some(value) => value,
                None if is_bool => "true".to_string(),
                None => rest
                    .pop()
                    .ok_or_else(|| FlagError::MissingValue(name.to_string()))?,
            };

            self.set(name, &text)?;
            trace!(set = %self.name, flag = name, value = %text, "flag parsed");
        }

        rest.reverse();
        self.args = rest;
        Ok(())
    }

    /// Assigns `text` to the named flag, converting it to the flag's type.
    ///
    /// # Errors
    ///
    /// [`FlagError::NotDefined`] for unknown names and
    /// [`FlagError::InvalidValue`] when conversion fails.
    pub fn set(&mut self, name: &str, text: &str) -> Result<(), FlagError> {
        let flag = self
            .flags
            .get_mut(name)
            .ok_or_else(|| FlagError::NotDefined(name.to_string()))?;
        flag.value = flag
            .default
            .parse_same(text)
            .map_err(|reason| FlagError::InvalidValue {
                value: text.to_string(),
                name: name.to_string(),
                reason,
            })?;
        self.actual.insert(name.to_string());
        Ok(())
    }

    /// Returns `true` once [`parse`](FlagSet::parse) has been called.
    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Positional arguments remaining after the flags.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Number of positional arguments.
    pub fn n_arg(&self) -> usize {
        self.args.len()
    }

    /// The `i`-th positional argument.
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.args.get(i).map(String::as_str)
    }

    /// Looks up a registered flag.
    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name)
    }

    /// Current value of a registered flag.
    pub fn value(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name).map(|flag| &flag.value)
    }

    /// Returns `true` if the flag was explicitly assigned.
    pub fn is_set(&self, name: &str) -> bool {
        self.actual.contains(name)
    }

    /// Registered flags in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values()
    }

    /// Number of registered flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns `true` when no flags are registered.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Multi-line help text describing every registered flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use shellkit_flags::FlagSet;
    ///
    /// let mut flags = FlagSet::new("test");
    /// flags.int("top", 12, "example top-level flag");
    /// flags.bool("v", false, "verbose");
    /// assert_eq!(
    ///     flags.defaults(),
    ///     "  -top int\n    \texample top-level flag (default 12)\n  -v\tverbose\n"
    /// );
    /// ```
    pub fn defaults(&self) -> String {
        let mut out = String::new();
        for flag in self.flags.values() {
            let mut line = format!("  -{}", flag.name);
            let type_name = flag.default.type_name();
            if !type_name.is_empty() {
                line.push(' ');
                line.push_str(type_name);
            }
            if line.len() <= 4 {
                line.push('\t');
            } else {
                line.push_str("\n    \t");
            }
            line.push_str(&flag.usage.replace('\n', "\n    \t"));
            if !flag.default.is_zero() {
                match &flag.default {
                    FlagValue::Str(s) => {
                        let _ = write!(line, " (default {s:?})");
                    }
                    other => {
                        let _ = write!(line, " (default {other})");
                    }
                }
            }
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Space-separated `[-name]` list of every registered flag.
    pub fn short_usage(&self) -> String {
        self.flags
            .keys()
            .map(|name| format!("[-{name}]"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
