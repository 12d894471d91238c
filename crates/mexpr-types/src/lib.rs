//! Shared types for the mexpr expression engine.
//!
//! This crate defines the runtime value model, the error taxonomy shared by
//! the scope table and the node compiler, and the math configuration that
//! forms part of every execution environment.

mod config;
mod error;
mod value;

pub use config::MathConfig;
pub use error::{Diagnostic, ErrorCategory, ErrorCode, ExprError};
pub use value::{BuiltinFn, NativeFn, Unit, Value};

/// Result type used throughout the mexpr crates.
pub type ExprResult<T> = std::result::Result<T, ExprError>;
