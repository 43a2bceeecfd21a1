//! Per-invocation context passed to flag registration and command handlers.
//!
//! A fresh [`Context`] is built for every dispatch. `set_flags` registers
//! flags on it and typically stores the returned [`FlagRef`] handles under
//! string keys; after parsing, `main` reads them back through the typed
//! accessors, which resolve flag handles to their parsed values.
//!
//! # Examples
//!
//! ```
//! use shellkit_core::{App, Command, ExitStatus};
//!
//! let mut app = App::builder("demo").without_defaults().build().unwrap();
//! app.add_command(
//!     Command::new("greet")
//!         .with_flags(|ctx| {
//!             let times = ctx.flags_mut().int("times", 1, "repeat count");
//!             ctx.set("times", times);
//!         })
//!         .with_main(|ctx| {
//!             let times: i64 = ctx.must_get("times");
//!             assert_eq!(times, 3);
//!             assert_eq!(ctx.args(), ["bob"]);
//!             ExitStatus::Cmd
//!         }),
//! )
//! .unwrap();
//!
//! app.execute_line("greet -times 3 bob").unwrap();
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use shellkit_flags::{FlagRef, FlagSet, FlagValue};

use crate::{App, CommandRef, ContextError};

/// Value stored in a [`Context`].
#[derive(Clone)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// Handle to a registered flag, resolved against the context's flag set
    /// on access.
    Flag(FlagRef),
    /// Arbitrary shared value, see [`Context::handle`].
    Handle(Rc<dyn Any>),
}

impl Value {
    /// Wraps an arbitrary value as an opaque handle.
    pub fn handle<T: Any>(value: T) -> Self {
        Self::Handle(Rc::new(value))
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Flag(_) => "flag",
            Self::Handle(_) => "handle",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Uint(n) => f.debug_tuple("Uint").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Flag(r) => f.debug_tuple("Flag").field(r).finish(),
            Self::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<FlagRef> for Value {
    fn from(value: FlagRef) -> Self {
        Self::Flag(value)
    }
}

impl From<FlagValue> for Value {
    fn from(value: FlagValue) -> Self {
        match value {
            FlagValue::Bool(b) => Self::Bool(b),
            FlagValue::Int(n) => Self::Int(n),
            FlagValue::Uint(n) => Self::Uint(n),
            FlagValue::Float(n) => Self::Float(n),
            FlagValue::Str(s) => Self::Str(s),
        }
    }
}

/// Types that can be read out of a [`Context`].
pub trait FromValue: Sized {
    /// Type name used in [`ContextError::TypeMismatch`].
    const KIND: &'static str;

    /// Converts a stored value.
    fn from_value(value: &Value) -> Option<Self>;

    /// Converts the parsed value of a flag referenced by [`Value::Flag`].
    fn from_flag(value: &FlagValue) -> Option<Self>;
}

impl FromValue for bool {
    const KIND: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn from_flag(value: &FlagValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    const KIND: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    fn from_flag(value: &FlagValue) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for u64 {
    const KIND: &'static str = "uint";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uint(n) => Some(*n),
            _ => None,
        }
    }

    fn from_flag(value: &FlagValue) -> Option<Self> {
        value.as_uint()
    }
}

impl FromValue for f64 {
    const KIND: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    fn from_flag(value: &FlagValue) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue for String {
    const KIND: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn from_flag(value: &FlagValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for Value {
    const KIND: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn from_flag(value: &FlagValue) -> Option<Self> {
        Some(value.clone().into())
    }
}

fn flag_kind(value: &FlagValue) -> &'static str {
    match value {
        FlagValue::Bool(_) => "bool",
        FlagValue::Int(_) => "int",
        FlagValue::Uint(_) => "uint",
        FlagValue::Float(_) => "float",
        FlagValue::Str(_) => "string",
    }
}

/// Identity and scratch state for one command invocation.
pub struct Context<'a> {
    command: CommandRef<'a>,
    flags: FlagSet,
    values: HashMap<String, Value>,
}

impl<'a> Context<'a> {
    /// Creates an empty context for `command` with an empty flag set named
    /// after it.
    pub fn new(command: CommandRef<'a>) -> Self {
        Self::with_flags(command, FlagSet::new(command.name()))
    }

    /// Creates a context around an existing flag set.
    pub fn with_flags(command: CommandRef<'a>, flags: FlagSet) -> Self {
        Self {
            command,
            flags,
            values: HashMap::new(),
        }
    }

    /// Application that owns the command.
    pub fn app(&self) -> &'a App {
        self.command.app()
    }

    /// Command this context serves.
    pub fn command(&self) -> CommandRef<'a> {
        self.command
    }

    /// Parent command when serving a sub-command.
    pub fn parent(&self) -> Option<CommandRef<'a>> {
        self.command.parent()
    }

    /// Flag set of this invocation.
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Mutable flag set, used by `set_flags` to register flags.
    pub fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    /// Consumes the context, keeping only its flag set.
    pub fn into_flags(self) -> FlagSet {
        self.flags
    }

    /// Positional arguments left after flag parsing.
    pub fn args(&self) -> &[String] {
        self.flags.args()
    }

    /// The `i`-th positional argument.
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.flags.arg(i)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes the value under `key`, returning it if present.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns `true` if something is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Raw stored value, without resolving flag handles.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Typed lookup.
    ///
    /// Flag handles are resolved to the flag's current value.
    ///
    /// # Errors
    ///
    /// [`ContextError::Missing`] if nothing is stored under `key`,
    /// [`ContextError::TypeMismatch`] if the value has another type and
    /// [`ContextError::UnknownFlag`] for handles to unregistered flags.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T, ContextError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ContextError::Missing(key.to_string()))?;

        match value {
            Value::Flag(flag) => {
                let current = self.flags.value(flag.name()).ok_or_else(|| {
                    ContextError::UnknownFlag {
                        key: key.to_string(),
                        flag: flag.name().to_string(),
                    }
                })?;
                T::from_flag(current).ok_or_else(|| ContextError::TypeMismatch {
                    key: key.to_string(),
                    expected: T::KIND,
                    found: flag_kind(current),
                })
            }
            other => T::from_value(other).ok_or_else(|| ContextError::TypeMismatch {
                key: key.to_string(),
                expected: T::KIND,
                found: other.kind(),
            }),
        }
    }

    /// Like [`get`](Context::get) but returns `None` on any failure.
    pub fn should_get<T: FromValue>(&self, key: &str) -> Option<T> {
        self.get(key).ok()
    }

    /// Like [`get`](Context::get) for values whose absence is a bug.
    ///
    /// # Panics
    ///
    /// Panics with the [`ContextError`] message when the lookup fails.
    #[track_caller]
    pub fn must_get<T: FromValue>(&self, key: &str) -> T {
        match self.get(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fetches an opaque handle stored with [`Value::handle`].
    ///
    /// # Errors
    ///
    /// [`ContextError::Missing`] if nothing is stored under `key`, otherwise
    /// [`ContextError::TypeMismatch`] if the value is not a handle to `T`.
    pub fn handle<T: Any>(&self, key: &str) -> Result<Rc<T>, ContextError> {
        let mismatch = |found: &'static str| ContextError::TypeMismatch {
            key: key.to_string(),
            expected: type_name::<T>(),
            found,
        };
        match self.values.get(key) {
            None => Err(ContextError::Missing(key.to_string())),
            Some(Value::Handle(handle)) => Rc::clone(handle)
                .downcast::<T>()
                .map_err(|_| mismatch("handle")),
            Some(other) => Err(mismatch(other.kind())),
        }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("command", &self.command)
            .field("flags", &self.flags)
            .field("values", &self.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Command, ExitStatus};

    fn app_with(cmd: Command) -> App {
        let mut app = App::builder("context_test")
            .without_defaults()
            .build()
            .unwrap();
        app.add_command(cmd).unwrap();
        app
    }

    fn noop(name: &str) -> Command {
        Command::new(name).with_main(|_| ExitStatus::Cmd)
    }

    #[test]
    fn test_new_context_identity() {
        let app = app_with(noop("parent").with_sub_command(noop("child")));
        let parent = app.get_by_name("parent").unwrap();
        let child = parent.sub_command("child").unwrap();

        let ctx = child.new_context();
        assert_eq!(ctx.app().name(), "context_test");
        assert_eq!(ctx.command().name(), "child");
        assert_eq!(ctx.flags().name(), "child");
        assert_eq!(ctx.parent().map(|p| p.name()), Some("parent"));

        let top = parent.new_context();
        assert!(top.parent().is_none());
    }

    #[test]
    fn test_store_access_modes() {
        let app = app_with(noop("store"));
        let mut ctx = app.get_by_name("store").unwrap().new_context();

        assert_eq!(
            ctx.get::<String>("foo"),
            Err(ContextError::Missing("foo".into()))
        );
        assert_eq!(ctx.should_get::<String>("foo"), None);

        ctx.set("foo", "bar");
        assert_eq!(ctx.get::<String>("foo").as_deref(), Ok("bar"));
        assert_eq!(ctx.should_get::<String>("foo").as_deref(), Some("bar"));
        assert_eq!(ctx.must_get::<String>("foo"), "bar");

        assert_eq!(
            ctx.get::<i64>("foo"),
            Err(ContextError::TypeMismatch {
                key: "foo".into(),
                expected: "int",
                found: "string",
            })
        );

        assert!(ctx.delete("foo").is_some());
        assert!(!ctx.contains("foo"));
        assert_eq!(ctx.should_get::<String>("foo"), None);
    }

    #[test]
    #[should_panic(expected = "value 'missing' does not exist")]
    fn test_must_get_panics_on_missing() {
        let app = app_with(noop("store"));
        let ctx = app.get_by_name("store").unwrap().new_context();
        let _: bool = ctx.must_get("missing");
    }

    #[test]
    fn test_flag_handle_resolves_after_parse() {
        let app = app_with(noop("flagged"));
        let mut ctx = app.get_by_name("flagged").unwrap().new_context();
        let top = ctx.flags_mut().int("top", 12, "example");
        ctx.set("top", top);
        assert_eq!(ctx.get::<i64>("top"), Ok(12));

        ctx.flags_mut().parse(["-top", "19", "rest"]).unwrap();
        assert_eq!(ctx.get::<i64>("top"), Ok(19));
        assert_eq!(ctx.arg(0), Some("rest"));
        assert!(matches!(ctx.get::<Value>("top"), Ok(Value::Int(19))));
    }

    #[test]
    fn test_unknown_flag_handle() {
        let app = app_with(noop("flagged"));
        let mut other = FlagSet::new("other");
        let stray = other.bool("stray", false, "");

        let mut ctx = app.get_by_name("flagged").unwrap().new_context();
        ctx.set("stray", stray);
        assert_eq!(
            ctx.get::<bool>("stray"),
            Err(ContextError::UnknownFlag {
                key: "stray".into(),
                flag: "stray".into(),
            })
        );
    }

    #[test]
    fn test_handles() {
        let app = app_with(noop("handles"));
        let mut ctx = app.get_by_name("handles").unwrap().new_context();
        ctx.set("list", Value::handle(vec![1u8, 2, 3]));
        ctx.set("n", 5);

        assert_eq!(*ctx.handle::<Vec<u8>>("list").unwrap(), vec![1, 2, 3]);
        assert!(ctx.handle::<String>("list").is_err());
        assert!(matches!(
            ctx.handle::<Vec<u8>>("n"),
            Err(ContextError::TypeMismatch { found: "int", .. })
        ));
        assert!(matches!(
            ctx.handle::<Vec<u8>>("none"),
            Err(ContextError::Missing(_))
        ));
    }
}
