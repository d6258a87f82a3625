// jester-core - Error types for the Jester evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for Jester analysis and evaluation.
//!
//! The taxonomy has three user-visible kinds. Parse errors come from the
//! reader or the analyzer and carry a position. Eval errors come from
//! evaluation and carry a position plus a snapshot of the diagnostic call
//! stack taken when the error was raised. Thrown errors carry the value
//! given to `throw` and unwind to the nearest matching `catch`.
//!
//! The user-visible format is `<filename>:<line>:<col>: <kind>: <message>`
//! with an optional `Stacktrace:` section.

use std::fmt;
use std::rc::Rc;

use jester_reader::{
    EvalErrorVal, ExInfo, JesterVal, ParseErrorVal, SourceInfo, Symbol, TraceFrame,
};

use crate::runtime::with_runtime;

/// Result type for Jester analysis and evaluation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while analysing or evaluating.
#[derive(Debug, Clone)]
pub enum Error {
    /// Syntactic or semantic problem found before evaluation.
    Parse {
        message: String,
        info: Option<SourceInfo>,
    },
    /// Failure during evaluation, with the active call stack at raise
    /// time.
    Eval {
        message: String,
        info: Option<SourceInfo>,
        stack: Vec<TraceFrame>,
    },
    /// A value signalled by `throw`, travelling to the nearest matching
    /// catch clause.
    Thrown {
        value: JesterVal,
        info: Option<SourceInfo>,
        stack: Vec<TraceFrame>,
    },
    /// Invariant violation inside the interpreter.
    Internal(String),
}

impl Error {
    /// A parse error at an explicit position.
    pub fn parse(message: impl Into<String>, info: Option<SourceInfo>) -> Self {
        Error::Parse {
            message: message.into(),
            info,
        }
    }

    /// An eval error; position and stack come from the ambient runtime.
    pub fn eval(message: impl Into<String>) -> Self {
        with_runtime(|rt| Error::Eval {
            message: message.into(),
            info: rt.current_info(),
            stack: rt.stack_snapshot(),
        })
    }

    /// An eval error at an explicit position.
    pub fn eval_at(message: impl Into<String>, info: Option<SourceInfo>) -> Self {
        Error::Eval {
            message: message.into(),
            info: info.or_else(|| with_runtime(|rt| rt.current_info())),
            stack: with_runtime(|rt| rt.stack_snapshot()),
        }
    }

    /// Wrong number of arguments passed to a callable.
    pub fn arity(name: Option<&str>, got: usize) -> Self {
        match name {
            Some(name) => Error::eval(format!(
                "Wrong number of args ({}) passed to {}",
                got, name
            )),
            None => Error::eval(format!("Wrong number of args ({})", got)),
        }
    }

    /// A type error without surrounding context.
    pub fn type_error(expected: &str, got: &str) -> Self {
        Error::eval(format!("Type error: expected {}, got {}", expected, got))
    }

    /// A type error naming the operation it occurred in.
    pub fn type_error_in(context: &str, expected: &str, got: &str) -> Self {
        Error::eval(format!("{}: expected {}, got {}", context, expected, got))
    }

    /// Attempted to call something that is not callable.
    pub fn not_callable(type_name: &str) -> Self {
        Error::eval(format!("Cannot call value of type {}", type_name))
    }

    pub fn division_by_zero() -> Self {
        Error::eval("Division by zero")
    }

    pub fn integer_overflow(operation: &str) -> Self {
        Error::eval(format!("Integer overflow in '{}'", operation))
    }

    pub fn index_out_of_bounds(index: i64, length: usize) -> Self {
        Error::eval(format!(
            "Index {} out of bounds for collection of length {}",
            index, length
        ))
    }

    pub fn undefined_symbol(sym: &Symbol, info: Option<SourceInfo>) -> Self {
        Error::parse(format!("Unable to resolve symbol: {}", sym), info)
    }

    pub fn unbound_var(qualified_name: &str) -> Self {
        Error::eval(format!("Unbound var: #'{}", qualified_name))
    }

    /// Invalid special-form syntax, reported at the form's position.
    pub fn syntax(form: &str, message: impl fmt::Display, info: Option<SourceInfo>) -> Self {
        Error::parse(format!("Invalid '{}' syntax: {}", form, message), info)
    }

    /// Signal a thrown value; position and stack come from the runtime.
    pub fn thrown(value: JesterVal) -> Self {
        with_runtime(|rt| Error::Thrown {
            info: value.get_info().or_else(|| rt.current_info()),
            stack: rt.stack_snapshot(),
            value,
        })
    }

    /// The position this error points at, if any.
    #[must_use]
    pub fn info(&self) -> Option<&SourceInfo> {
        match self {
            Error::Parse { info, .. } | Error::Eval { info, .. } | Error::Thrown { info, .. } => {
                info.as_ref()
            }
            Error::Internal(_) => None,
        }
    }

    /// Reify this error as a value for a catch clause binding.
    #[must_use]
    pub fn to_value(&self) -> JesterVal {
        match self {
            Error::Thrown { value, .. } => value.clone(),
            Error::Parse { message, info } => JesterVal::ParseError(Rc::new(ParseErrorVal {
                message: Rc::from(message.as_str()),
                info: info.clone(),
            })),
            Error::Eval {
                message,
                info,
                stack,
            } => JesterVal::EvalError(Rc::new(EvalErrorVal {
                message: Rc::from(message.as_str()),
                info: info.clone(),
                stack: stack.clone(),
            })),
            Error::Internal(message) => JesterVal::EvalError(Rc::new(EvalErrorVal {
                message: Rc::from(message.as_str()),
                info: None,
                stack: Vec::new(),
            })),
        }
    }
}

impl From<jester_reader::num::NumError> for Error {
    fn from(e: jester_reader::num::NumError) -> Self {
        use jester_reader::num::NumError;
        match e {
            NumError::DivisionByZero => Error::division_by_zero(),
            NumError::IntegerOverflow { operation } => Error::integer_overflow(operation),
            NumError::NotANumber { type_name } => Error::type_error("number", type_name),
        }
    }
}

impl From<jester_reader::ReadError> for Error {
    fn from(e: jester_reader::ReadError) -> Self {
        Error::Parse {
            info: Some(SourceInfo {
                file: e.file,
                start_line: e.line,
                start_column: e.column,
                end_line: e.line,
                end_column: e.column,
            }),
            message: e.message,
        }
    }
}

fn write_positioned(
    f: &mut fmt::Formatter<'_>,
    info: Option<&SourceInfo>,
    kind: &str,
    message: &str,
) -> fmt::Result {
    match info {
        Some(info) => write!(f, "{}: {}: {}", info, kind, message),
        None => write!(f, "{}: {}", kind, message),
    }
}

fn write_stacktrace(f: &mut fmt::Formatter<'_>, stack: &[TraceFrame]) -> fmt::Result {
    if stack.is_empty() {
        return Ok(());
    }
    write!(f, "\nStacktrace:")?;
    for frame in stack.iter().rev() {
        write!(f, "\n{}", frame)?;
    }
    Ok(())
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse { message, info } => {
                write_positioned(f, info.as_ref(), "Parse error", message)
            }
            Error::Eval {
                message,
                info,
                stack,
            } => {
                write_positioned(f, info.as_ref(), "Eval error", message)?;
                write_stacktrace(f, stack)
            }
            Error::Thrown { value, info, stack } => {
                let message = match value {
                    JesterVal::ExInfo(e) => e.message.to_string(),
                    other => other.to_readable_string(),
                };
                write_positioned(f, info.as_ref(), "Exception", &message)?;
                write_stacktrace(f, stack)
            }
            Error::Internal(message) => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for Error {}

/// Build an ex-info exception value, capturing position and stack from the
/// ambient runtime.
#[must_use]
pub fn make_ex_info(
    message: &str,
    data: JesterVal,
    cause: Option<JesterVal>,
) -> JesterVal {
    with_runtime(|rt| {
        JesterVal::ExInfo(Rc::new(ExInfo {
            message: Rc::from(message),
            data,
            cause,
            info: rt.current_info(),
            stack: rt.stack_snapshot(),
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message_format() {
        let err = Error::arity(Some("inc"), 3);
        assert_eq!(
            err.to_string().lines().next().unwrap(),
            "Eval error: Wrong number of args (3) passed to inc"
        );
    }

    #[test]
    fn test_positioned_display() {
        let info = SourceInfo {
            file: Some(jester_reader::intern("a.clj")),
            start_line: 3,
            start_column: 7,
            end_line: 3,
            end_column: 9,
        };
        let err = Error::parse("boom", Some(info));
        assert_eq!(err.to_string(), "a.clj:3:7: Parse error: boom");
    }

    #[test]
    fn test_thrown_reifies_to_value() {
        let err = Error::thrown(JesterVal::Int(5));
        assert_eq!(err.to_value(), JesterVal::Int(5));
    }
}
