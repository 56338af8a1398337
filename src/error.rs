//! VM-surfaced error kinds.
//!
//! Every fallible VM operation returns [`Result<T>`]; a non-success status
//! aborts the current execution up to the outermost driver loop (out of
//! scope), which decides whether to resume at top level. `Quit` and
//! `Signal` are not failures in the usual sense -- they are ordinary
//! `Error` variants so they can ride the same `?`-propagating code paths,
//! but [`Error::is_quit`]/[`Error::is_signal`] let a driver tell them apart
//! from genuine errors.

use std::error::Error as StdError;
use std::fmt::{self, Display};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// Allocation failed; fatal.
  MallocFail,
  /// A write or read failed; fatal for the current execution.
  IoErr,

  /// Scalar/array kind mismatch at a name reference.
  ExecBadType,
  /// `read()`'s body was not a single expression.
  ExecBadReadExpr,
  /// Call to a function whose body is empty.
  ExecUndefinedFunc,
  /// Arity mismatch at a call site.
  ExecMismatchedParams,
  /// Array index exceeds `dim_max`.
  ExecArrayLen,
  /// `ibase` assigned a value outside `[2, MAX_INPUT_BASE]`.
  ExecBadIbase,
  /// `obase` assigned a value outside `[2, base_max]`.
  ExecBadObase,
  /// `scale` assigned a value outside `[0, scale_max]`.
  ExecBadScale,

  /// `/`, `%`, `/=`, `%=` with a zero right-hand side.
  MathDivideByZero,
  /// `sqrt` of a negative number.
  MathNegativeSqrt,

  /// Assignment left-hand side is not an lvalue.
  ParseBadAssign,

  /// `HALT` executed; not an error in batch mode.
  Quit,
  /// Asynchronous interrupt (`sig_int`) observed at an opcode boundary.
  Signal,
}

impl Error {
  pub fn is_quit(&self) -> bool {
    matches!(self, Error::Quit)
  }

  pub fn is_signal(&self) -> bool {
    matches!(self, Error::Signal)
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::MallocFail => write!(f, "memory allocation failed"),
      Error::IoErr => write!(f, "I/O error"),
      Error::ExecBadType => write!(f, "variable has wrong type (scalar/array mismatch)"),
      Error::ExecBadReadExpr => write!(f, "read() expression is not a single value"),
      Error::ExecUndefinedFunc => write!(f, "call to undefined function"),
      Error::ExecMismatchedParams => write!(f, "wrong number of arguments to function"),
      Error::ExecArrayLen => write!(f, "array index out of bounds"),
      Error::ExecBadIbase => write!(f, "ibase out of range"),
      Error::ExecBadObase => write!(f, "obase out of range"),
      Error::ExecBadScale => write!(f, "scale out of range"),
      Error::MathDivideByZero => write!(f, "divide by zero"),
      Error::MathNegativeSqrt => write!(f, "square root of a negative number"),
      Error::ParseBadAssign => write!(f, "left-hand side of assignment is not an lvalue"),
      Error::Quit => write!(f, "quit"),
      Error::Signal => write!(f, "interrupted"),
    }
  }
}

impl StdError for Error {}
