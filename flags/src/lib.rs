//! Single-dash flag registry and parser.
//!
//! This crate is the argument-parsing half of a shellkit command shell. A
//! command registers typed flags on a [`FlagSet`] before any input is seen,
//! the dispatcher then hands the remaining input tokens to
//! [`FlagSet::parse`], and the command handler reads back the parsed values
//! together with the positional arguments that followed the flags.
//!
//! - [`FlagSet`]: named registry of flags plus the positional remainder.
//! - [`FlagValue`]: typed flag value (`bool`, `int`, `uint`, `float`,
//!   `string`).
//! - [`FlagRef`]: handle returned at registration, used to look the parsed
//!   value up later.
//! - [`FlagError`]: structured parse failure.
//!
//! # Example
//!
//! ```
//! use shellkit_flags::{FlagSet, FlagValue};
//!
//! let mut flags = FlagSet::new("test");
//! let top = flags.int("top", 12, "example top-level flag");
//! flags.bool("verbose", false, "print more");
//!
//! flags.parse(["-top", "19", "-verbose", "rest"]).unwrap();
//!
//! assert_eq!(flags.value(top.name()), Some(&FlagValue::Int(19)));
//! assert_eq!(flags.args(), ["rest"]);
//! assert_eq!(flags.short_usage(), "[-top] [-verbose]");
//! ```

mod error;
mod flagset;
mod value;

pub use error::FlagError;
pub use flagset::{Flag, FlagRef, FlagSet};
pub use value::FlagValue;
