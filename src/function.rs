//! Function table and call-frame model.

/// A single parameter or local ("auto") declared by a function. The first
/// `nparams` entries of `Function::autos` are parameters; the rest are
/// plain locals, freshly zeroed on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auto {
  pub name: String,
  pub is_scalar: bool,
}

/// A function's bytecode, its auto/parameter descriptors, and its label
/// table. `main` (id 0) and `read` (id 1) are reserved, always present,
/// and `read`'s body is replaced wholesale on every `READ` instruction.
#[derive(Debug, Clone, Default)]
pub struct Function {
  pub nparams: usize,
  pub autos: Vec<Auto>,
  pub code: Vec<u8>,
  pub labels: Vec<usize>,
}

impl Function {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clears everything but keeps the `Function` value (and therefore its
  /// slot index) alive -- used when a parser redefines a function by name.
  pub fn reset(&mut self) {
    self.nparams = 0;
    self.autos.clear();
    self.code.clear();
    self.labels.clear();
  }

  pub fn auto_index(&self, name: &str) -> Option<usize> {
    self.autos.iter().position(|a| a.name == name)
  }
}

pub const MAIN_FUNC: usize = 0;
pub const READ_FUNC: usize = 1;

/// `{func_id, program_counter, result_stack_base}`. `base` demarcates
/// this call's parameters/autos on the result stack: auto slot `k` lives
/// at `results[base + k]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstPtr {
  pub func: usize,
  pub idx: usize,
  pub base: usize,
}

impl InstPtr {
  pub fn new(func: usize, idx: usize, base: usize) -> Self {
    InstPtr { func, idx, base }
  }
}
