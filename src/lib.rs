//! A bytecode virtual machine for the POSIX `bc` arbitrary-precision
//! calculator language.
//!
//! This crate has no lexer or parser: callers assemble bytecode directly
//! with [`builder::FunctionBuilder`] (or generate it from their own front
//! end) and drive execution with [`Program::run`]. See the module docs
//! for the runtime model.

pub mod arith;
pub mod builder;
pub mod error;
pub mod function;
pub mod io;
pub mod limits;
pub mod number;
pub mod op;
pub mod program;
pub mod symtab;
pub mod value;
pub mod vm;

pub use error::{Error, Result};
pub use function::Function;
pub use limits::Limits;
pub use number::Number;
pub use program::Program;
pub use value::Value;

use io::{Stdin, Stdout};

/// Builds a [`Program`] with non-default limits and/or I/O sinks.
pub struct VmBuilder {
  limits: Limits,
  stdout: Box<dyn Stdout>,
  stdin: Box<dyn Stdin>,
}

impl Default for VmBuilder {
  fn default() -> Self {
    VmBuilder {
      limits: Limits::default(),
      stdout: Box::new(std::io::stdout()),
      stdin: Box::new(std::io::BufReader::new(std::io::stdin())),
    }
  }
}

impl VmBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Lowers `base_max`. Values above the compiled-in default are ignored
  /// -- limits may only ever be lowered, never raised.
  pub fn base_max(mut self, v: u32) -> Self {
    self.limits.base_max = self.limits.base_max.min(v);
    self
  }

  pub fn dim_max(mut self, v: u64) -> Self {
    self.limits.dim_max = self.limits.dim_max.min(v);
    self
  }

  pub fn scale_max(mut self, v: u32) -> Self {
    self.limits.scale_max = self.limits.scale_max.min(v);
    self
  }

  pub fn string_max(mut self, v: usize) -> Self {
    self.limits.string_max = self.limits.string_max.min(v);
    self
  }

  pub fn line_length(mut self, v: usize) -> Self {
    self.limits.line_length = self.limits.line_length.min(v);
    self
  }

  pub fn stdout(mut self, stdout: impl Stdout + 'static) -> Self {
    self.stdout = Box::new(stdout);
    self
  }

  pub fn stdin(mut self, stdin: impl Stdin + 'static) -> Self {
    self.stdin = Box::new(stdin);
    self
  }

  pub fn build(self) -> Program {
    Program::with_parts(self.limits, self.stdout, self.stdin)
  }
}
