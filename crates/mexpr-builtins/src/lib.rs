//! Builtin registry consulted by root scopes and compiled evaluators.
//!
//! A root scope falls back to the registry when a name resolves to neither a
//! definition nor an update anywhere in the scope chain.

mod registry;
mod units;

pub use registry::{BuiltinRegistry, StdRegistry};
pub use units::is_plain_unit;
