use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// A default node operation was reached on a variant that does not provide it.
    Interface,
    /// The execution environment handed to `compile` is malformed.
    Configuration,
    /// A name could not be resolved at evaluation time.
    Resolution,
    /// A symbol reference chain broke its acyclic invariant.
    Structure,
    /// A builtin rejected its operands.
    Runtime,
}

/// Numeric error code (E100–E599).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Interface errors (E100–E199) ──
    pub const UNSUPPORTED_OPERATION: Self = Self(100);
    pub const CANNOT_COMPILE: Self = Self(101);

    // ── Configuration errors (E200–E299) ──
    pub const TYPE_CONFIGURATION: Self = Self(200);

    // ── Resolution errors (E300–E399) ──
    pub const UNRESOLVED_SYMBOL: Self = Self(300);

    // ── Structure errors (E400–E499) ──
    pub const REFERENCE_CYCLE: Self = Self(400);

    // ── Runtime errors (E500–E599) ──
    pub const TYPE_MISMATCH: Self = Self(500);
    pub const WRONG_ARITY: Self = Self(501);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Interface,
            200..=299 => ErrorCategory::Configuration,
            300..=399 => ErrorCategory::Resolution,
            400..=499 => ErrorCategory::Structure,
            _ => ErrorCategory::Runtime,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interface => write!(f, "interface"),
            Self::Configuration => write!(f, "configuration"),
            Self::Resolution => write!(f, "resolution"),
            Self::Structure => write!(f, "structure"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// Errors raised while evaluating or compiling an expression tree.
///
/// Scope-table mutations never produce these; only evaluation, compilation
/// and symbol dereferencing do.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// `eval` was called on a node variant without a direct evaluator.
    #[error("{0} has no direct evaluator")]
    UnsupportedOperation(String),

    /// `emit` was called on a node variant that cannot be compiled.
    #[error("{0} cannot be compiled")]
    CannotCompile(String),

    /// The environment passed to `compile` is not a valid execution context.
    #[error("invalid execution environment: {0}")]
    TypeConfiguration(String),

    /// A symbol is still unset after scope initialisation.
    #[error("undefined symbol {0}")]
    UnresolvedSymbol(String),

    /// A symbol reference chain would loop back on itself.
    #[error("reference cycle through symbol {0}")]
    StructuralInvariant(String),

    /// A value had the wrong type for the operation.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A function was called with the wrong number of arguments.
    #[error("{name} expects {expected} argument(s), got {found}")]
    WrongArity {
        name: String,
        expected: String,
        found: usize,
    },
}

impl ExprError {
    /// The stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedOperation(_) => ErrorCode::UNSUPPORTED_OPERATION,
            Self::CannotCompile(_) => ErrorCode::CANNOT_COMPILE,
            Self::TypeConfiguration(_) => ErrorCode::TYPE_CONFIGURATION,
            Self::UnresolvedSymbol(_) => ErrorCode::UNRESOLVED_SYMBOL,
            Self::StructuralInvariant(_) => ErrorCode::REFERENCE_CYCLE,
            Self::TypeMismatch(_) => ErrorCode::TYPE_MISMATCH,
            Self::WrongArity { .. } => ErrorCode::WRONG_ARITY,
        }
    }

    /// The category derived from [`ExprError::code`].
    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Build the serialisable report for this error.
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::from(self)
    }
}

/// A structured, serialisable report of an [`ExprError`].
///
/// Hosts render these; they must not parse the free-form `Display` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error code (e.g., E300).
    pub code: ErrorCode,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// The symbol the error is about, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Diagnostic {
    /// Serialise to compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<&ExprError> for Diagnostic {
    fn from(err: &ExprError) -> Self {
        let symbol = match err {
            ExprError::UnresolvedSymbol(name) | ExprError::StructuralInvariant(name) => {
                Some(name.clone())
            }
            ExprError::WrongArity { name, .. } => Some(name.clone()),
            _ => None,
        };
        let code = err.code();
        Self {
            code,
            category: code.category(),
            message: err.to_string(),
            symbol,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.code, self.category, self.message)
    }
}
