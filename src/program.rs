//! Runtime program image and symbol resolution.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::function::{Function, InstPtr, MAIN_FUNC, READ_FUNC};
use crate::io::{Stdin, Stdout};
use crate::limits::{Limits, MAX_INPUT_BASE, MIN_BASE};
use crate::number::Number;
use crate::symtab::SymbolTable;
use crate::value::Value;

/// Where a resolved scalar variable actually lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarLoc {
  Global(usize),
  /// An absolute index into `Program::results`.
  Stack(usize),
}

/// Where a resolved array variable actually lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLoc {
  Global(usize),
  Stack(usize),
}

pub struct Program {
  pub(crate) functions: Vec<Function>,
  pub(crate) function_names: SymbolTable,

  pub(crate) globals_scalar_names: SymbolTable,
  pub(crate) globals_scalar: Vec<Number>,
  pub(crate) globals_array_names: SymbolTable,
  pub(crate) globals_array: Vec<Vec<Number>>,

  pub(crate) consts: Vec<String>,
  pub(crate) strings: Vec<String>,

  pub(crate) results: Vec<Value>,
  pub(crate) frames: Vec<InstPtr>,

  pub(crate) ibase: u32,
  pub(crate) obase: u32,
  pub(crate) scale: u32,
  pub(crate) last: Number,

  pub(crate) limits: Limits,
  pub(crate) nchars: usize,

  pub(crate) sig_int: Arc<AtomicBool>,
  pub(crate) stdout: Box<dyn Stdout>,
  pub(crate) stdin: Box<dyn Stdin>,
}

impl Program {
  pub fn new() -> Self {
    crate::VmBuilder::default().build()
  }

  pub(crate) fn with_parts(limits: Limits, stdout: Box<dyn Stdout>, stdin: Box<dyn Stdin>) -> Self {
    let mut function_names = SymbolTable::new();
    function_names.insert_or_get("main", || 0);
    function_names.insert_or_get("read", || 1);

    Program {
      functions: vec![Function::new(), Function::new()],
      function_names,
      globals_scalar_names: SymbolTable::new(),
      globals_scalar: Vec::new(),
      globals_array_names: SymbolTable::new(),
      globals_array: Vec::new(),
      consts: Vec::new(),
      strings: Vec::new(),
      results: Vec::new(),
      frames: vec![InstPtr::new(MAIN_FUNC, 0, 0)],
      ibase: 10,
      obase: 10,
      scale: 0,
      last: Number::zero(),
      limits,
      nchars: 0,
      sig_int: Arc::new(AtomicBool::new(false)),
      stdout,
      stdin,
    }
  }

  pub fn sig_int_flag(&self) -> Arc<AtomicBool> {
    self.sig_int.clone()
  }

  pub fn limits(&self) -> Limits {
    self.limits
  }

  pub fn ibase(&self) -> u32 {
    self.ibase
  }

  pub fn obase(&self) -> u32 {
    self.obase
  }

  pub fn scale(&self) -> u32 {
    self.scale
  }

  pub fn last(&self) -> &Number {
    &self.last
  }

  /// Adds a function by name, or resets its existing slot if the name is
  /// already registered. Indices are stable across redefinition.
  pub fn add_function(&mut self, name: &str) -> usize {
    let len = self.functions.len();
    let (idx, is_new) = self.function_names.insert_or_get(name, || len);
    if is_new {
      self.functions.push(Function::new());
    } else {
      self.functions[idx].reset();
    }
    idx
  }

  pub fn function_id(&self, name: &str) -> Option<usize> {
    self.function_names.lookup(name)
  }

  pub fn function(&self, id: usize) -> &Function {
    &self.functions[id]
  }

  pub fn function_mut(&mut self, id: usize) -> &mut Function {
    &mut self.functions[id]
  }

  pub fn intern_const(&mut self, digits: &str) -> usize {
    self.consts.push(digits.to_string());
    self.consts.len() - 1
  }

  pub fn intern_string(&mut self, s: &str) -> usize {
    self.strings.push(s.to_string());
    self.strings.len() - 1
  }

  /// Walks the call stack from innermost to outermost, skipping the
  /// reserved `main` (always the bottom frame) and any `read` frame,
  /// looking for a matching auto by name.
  fn find_auto(&self, name: &str, want_scalar: bool) -> Result<Option<usize>> {
    for frame in self.frames[1..].iter().rev() {
      if frame.func == MAIN_FUNC || frame.func == READ_FUNC {
        continue;
      }
      if let Some(auto_idx) = self.functions[frame.func].auto_index(name) {
        let auto = &self.functions[frame.func].autos[auto_idx];
        if auto.is_scalar != want_scalar {
          return Err(Error::ExecBadType);
        }
        return Ok(Some(frame.base + auto_idx));
      }
    }
    Ok(None)
  }

  pub(crate) fn resolve_scalar(&mut self, name: &str) -> Result<ScalarLoc> {
    if let Some(stack_idx) = self.find_auto(name, true)? {
      return Ok(ScalarLoc::Stack(stack_idx));
    }
    let len = self.globals_scalar.len();
    let (idx, is_new) = self.globals_scalar_names.insert_or_get(name, || len);
    if is_new {
      self.globals_scalar.push(Number::zero());
    }
    Ok(ScalarLoc::Global(idx))
  }

  pub(crate) fn resolve_array(&mut self, name: &str) -> Result<ArrayLoc> {
    if let Some(stack_idx) = self.find_auto(name, false)? {
      return Ok(ArrayLoc::Stack(stack_idx));
    }
    let len = self.globals_array.len();
    let (idx, is_new) = self.globals_array_names.insert_or_get(name, || len);
    if is_new {
      self.globals_array.push(Vec::new());
    }
    Ok(ArrayLoc::Global(idx))
  }

  pub(crate) fn scalar_ref(&mut self, loc: ScalarLoc) -> Result<&mut Number> {
    match loc {
      ScalarLoc::Global(idx) => Ok(&mut self.globals_scalar[idx]),
      ScalarLoc::Stack(idx) => match &mut self.results[idx] {
        Value::AutoVar(n) => Ok(n),
        _ => Err(Error::ExecBadType),
      },
    }
  }

  fn array_storage_mut(&mut self, loc: ArrayLoc) -> Result<&mut Vec<Number>> {
    match loc {
      ArrayLoc::Global(idx) => Ok(&mut self.globals_array[idx]),
      ArrayLoc::Stack(idx) => match &mut self.results[idx] {
        Value::AutoArray(v) => Ok(v),
        _ => Err(Error::ExecBadType),
      },
    }
  }

  pub(crate) fn array_elem_mut(&mut self, loc: ArrayLoc, elem_idx: u64) -> Result<&mut Number> {
    if elem_idx >= self.limits.dim_max {
      return Err(Error::ExecArrayLen);
    }
    let arr = self.array_storage_mut(loc)?;
    let need = elem_idx as usize + 1;
    if arr.len() < need {
      arr.resize(need, Number::zero());
    }
    Ok(&mut arr[elem_idx as usize])
  }

  pub(crate) fn array_snapshot(&self, loc: ArrayLoc) -> Result<Vec<Number>> {
    match loc {
      ArrayLoc::Global(idx) => Ok(self.globals_array[idx].clone()),
      ArrayLoc::Stack(idx) => match &self.results[idx] {
        Value::AutoArray(v) => Ok(v.clone()),
        _ => Err(Error::ExecBadType),
      },
    }
  }

  /// Materializes a result-stack [`Value`] into an owned [`Number`].
  pub(crate) fn materialize(&mut self, value: Value) -> Result<Number> {
    self.materialize_hex(value, false)
  }

  /// Materializes a result-stack [`Value`], optionally forcing a
  /// single-character constant to be read in base 16 regardless of
  /// `ibase`. `hex` is true only when this value is the right operand of
  /// a binary op whose left operand is `ibase`/`obase` -- real `bc`
  /// computes the same flag from the left operand's shape before
  /// resolving either side (`bc_program_binaryOpPrep`, which both plain
  /// binary ops and the assignment family route through).
  pub(crate) fn materialize_hex(&mut self, value: Value, hex: bool) -> Result<Number> {
    match value {
      Value::Intermediate(n) => Ok(n),
      Value::Constant(idx) => {
        let digits = self.consts[idx].clone();
        let base = if hex && digits.chars().count() == 1 { MAX_INPUT_BASE } else { self.ibase };
        Ok(Number::parse(&digits, base))
      }
      Value::NamedVar(name) => {
        let loc = self.resolve_scalar(&name)?;
        Ok(self.scalar_ref(loc)?.clone())
      }
      Value::NamedArrayElem(name, idx) => {
        let loc = self.resolve_array(&name)?;
        Ok(self.array_elem_mut(loc, idx)?.clone())
      }
      Value::NamedArray(_) => Err(Error::ExecBadType),
      Value::AutoVar(n) => Ok(n),
      Value::AutoArray(_) => Err(Error::ExecBadType),
      Value::Scale => Ok(Number::from_i64(self.scale as i64)),
      Value::IBase => Ok(Number::from_i64(self.ibase as i64)),
      Value::OBase => Ok(Number::from_i64(self.obase as i64)),
      Value::Last => Ok(self.last.clone()),
      Value::One => Ok(Number::one()),
    }
  }

  /// Writes `value` into the storage addressed by `target`, which must be
  /// one of the lvalue-shaped variants.
  pub(crate) fn store_lvalue(&mut self, target: &Value, value: Number) -> Result<()> {
    match target {
      Value::NamedVar(name) => {
        let loc = self.resolve_scalar(name)?;
        *self.scalar_ref(loc)? = value;
        Ok(())
      }
      Value::NamedArrayElem(name, idx) => {
        let loc = self.resolve_array(name)?;
        *self.array_elem_mut(loc, *idx)? = value;
        Ok(())
      }
      Value::Scale => {
        let v = value.to_u64().map_err(|_| Error::ExecBadScale)?;
        if v > self.limits.scale_max as u64 {
          return Err(Error::ExecBadScale);
        }
        self.scale = v as u32;
        Ok(())
      }
      Value::IBase => {
        let v = value.to_u64().map_err(|_| Error::ExecBadIbase)?;
        if !(MIN_BASE as u64..=MAX_INPUT_BASE as u64).contains(&v) {
          return Err(Error::ExecBadIbase);
        }
        self.ibase = v as u32;
        Ok(())
      }
      Value::OBase => {
        let v = value.to_u64().map_err(|_| Error::ExecBadObase)?;
        if !(MIN_BASE as u64..=self.limits.base_max as u64).contains(&v) {
          return Err(Error::ExecBadObase);
        }
        self.obase = v as u32;
        Ok(())
      }
      _ => Err(Error::ParseBadAssign),
    }
  }

  pub fn output(&self) -> &dyn Stdout {
    self.stdout.as_ref()
  }
}

#[cfg(test)]
mod tests;
