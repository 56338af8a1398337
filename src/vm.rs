//! Fetch-decode-dispatch loop, call/return protocol, and the output path.

use std::io::Write;
use std::sync::atomic::Ordering;

use crate::arith::{self, AssignOp};
use crate::builder::FunctionBuilder;
use crate::error::{Error, Result};
use crate::function::{InstPtr, READ_FUNC};
use crate::number::Number;
use crate::op::Opcode;
use crate::program::Program;
use crate::value::Value;

impl Program {
  /// Runs from the current top-level program counter to the end of
  /// `main`'s code.
  pub fn run(&mut self) -> Result<()> {
    while self.frames.len() > 1 || self.frames[0].idx < self.functions[self.frames[0].func].code.len() {
      self.step()?;
    }
    Ok(())
  }

  fn decode_uint(&self, func: usize, pos: &mut usize) -> u64 {
    crate::op::read_uint(&self.functions[func].code, pos)
  }

  fn decode_name(&self, func: usize, pos: &mut usize) -> String {
    crate::op::read_name(&self.functions[func].code, pos)
  }

  fn pop_value(&mut self) -> Result<Value> {
    self.results.pop().ok_or(Error::ExecBadType)
  }

  /// Executes exactly one instruction, or -- if the current frame's
  /// program counter has run off the end of its function's code without
  /// an explicit `RETURN` -- performs an implicit `return 0`.
  pub fn step(&mut self) -> Result<()> {
    if self.sig_int.swap(false, Ordering::Acquire) {
      return Err(Error::Signal);
    }

    let depth = self.frames.len() - 1;
    let func = self.frames[depth].func;
    let mut pc = self.frames[depth].idx;
    let code_len = self.functions[func].code.len();

    if pc >= code_len {
      if depth == 0 {
        return Ok(());
      }
      return self.do_return(Number::zero());
    }

    let opcode_byte = self.functions[func].code[pc];
    let opcode = Opcode::from_byte(opcode_byte).ok_or(Error::ExecBadType)?;
    pc += 1;

    match opcode {
      Opcode::PushNum => {
        let idx = self.decode_uint(func, &mut pc) as usize;
        self.frames[depth].idx = pc;
        self.results.push(Value::Constant(idx));
      }
      Opcode::PushVar => {
        let name = self.decode_name(func, &mut pc);
        self.frames[depth].idx = pc;
        self.results.push(Value::NamedVar(name));
      }
      Opcode::PushArray => {
        let name = self.decode_name(func, &mut pc);
        self.frames[depth].idx = pc;
        let index_val = self.pop_value()?;
        let idx_num = self.materialize(index_val)?;
        let idx = idx_num.to_u64().map_err(|_| Error::ExecArrayLen)?;
        self.results.push(Value::NamedArrayElem(name, idx));
      }
      Opcode::PushArrayRef => {
        let name = self.decode_name(func, &mut pc);
        self.frames[depth].idx = pc;
        self.results.push(Value::NamedArray(name));
      }
      Opcode::PushLast => {
        self.frames[depth].idx = pc;
        self.results.push(Value::Last);
      }
      Opcode::PushScale => {
        self.frames[depth].idx = pc;
        self.results.push(Value::Scale);
      }
      Opcode::PushIBase => {
        self.frames[depth].idx = pc;
        self.results.push(Value::IBase);
      }
      Opcode::PushOBase => {
        self.frames[depth].idx = pc;
        self.results.push(Value::OBase);
      }
      Opcode::Pop => {
        self.frames[depth].idx = pc;
        self.pop_value()?;
      }
      Opcode::Jump => {
        let label = self.decode_uint(func, &mut pc) as usize;
        self.frames[depth].idx = self.functions[func].labels[label];
      }
      Opcode::JumpZero => {
        let label = self.decode_uint(func, &mut pc) as usize;
        self.frames[depth].idx = pc;
        let v = self.pop_value()?;
        let n = self.materialize(v)?;
        if n.is_zero() {
          self.frames[depth].idx = self.functions[func].labels[label];
        }
      }
      Opcode::Call => {
        let nparams = self.decode_uint(func, &mut pc) as usize;
        let func_idx = self.decode_uint(func, &mut pc) as usize;
        self.frames[depth].idx = pc;
        self.do_call(nparams, func_idx)?;
      }
      Opcode::Return => {
        self.frames[depth].idx = pc;
        let v = self.pop_value()?;
        let n = self.materialize(v)?;
        self.do_return(n)?;
      }
      Opcode::ReturnZero => {
        self.frames[depth].idx = pc;
        self.do_return(Number::zero())?;
      }
      Opcode::Read => {
        self.frames[depth].idx = pc;
        self.do_read()?;
      }
      Opcode::Print => {
        self.frames[depth].idx = pc;
        let v = self.pop_value()?;
        let n = self.materialize(v)?;
        self.emit_number(&n)?;
        self.emit_char('\n')?;
        self.last = n;
      }
      Opcode::PrintExpr => {
        self.frames[depth].idx = pc;
        let v = self.pop_value()?;
        let n = self.materialize(v)?;
        self.emit_number(&n)?;
        self.last = n;
      }
      Opcode::Str => {
        let idx = self.decode_uint(func, &mut pc) as usize;
        self.frames[depth].idx = pc;
        let s = self.strings[idx].clone();
        for c in s.chars() {
          self.emit_char(c)?;
        }
      }
      Opcode::PrintStr => {
        let idx = self.decode_uint(func, &mut pc) as usize;
        self.frames[depth].idx = pc;
        let s = self.strings[idx].clone();
        self.emit_escaped(&s)?;
      }
      Opcode::Halt => {
        self.frames[depth].idx = pc;
        return Err(Error::Quit);
      }

      Opcode::Power | Opcode::Multiply | Opcode::Divide | Opcode::Modulus | Opcode::Plus | Opcode::Minus => {
        self.frames[depth].idx = pc;
        let rhs_v = self.pop_value()?;
        let lhs_v = self.pop_value()?;
        let hex = matches!(lhs_v, Value::IBase | Value::OBase);
        let lhs = self.materialize(lhs_v)?;
        let rhs = self.materialize_hex(rhs_v, hex)?;
        let r = arith::binary_math(opcode, &lhs, &rhs, self.scale)?;
        self.results.push(Value::Intermediate(r));
      }
      Opcode::Eq | Opcode::Le | Opcode::Ge | Opcode::Ne | Opcode::Lt | Opcode::Gt => {
        self.frames[depth].idx = pc;
        let rhs_v = self.pop_value()?;
        let lhs_v = self.pop_value()?;
        let hex = matches!(lhs_v, Value::IBase | Value::OBase);
        let lhs = self.materialize(lhs_v)?;
        let rhs = self.materialize_hex(rhs_v, hex)?;
        let r = arith::relational(opcode, &lhs, &rhs)?;
        self.results.push(Value::Intermediate(r));
      }
      Opcode::And | Opcode::Or => {
        self.frames[depth].idx = pc;
        let rhs_v = self.pop_value()?;
        let lhs_v = self.pop_value()?;
        let hex = matches!(lhs_v, Value::IBase | Value::OBase);
        let lhs = self.materialize(lhs_v)?;
        let rhs = self.materialize_hex(rhs_v, hex)?;
        let r = if opcode == Opcode::And { arith::and(&lhs, &rhs) } else { arith::or(&lhs, &rhs) };
        self.results.push(Value::Intermediate(r));
      }
      Opcode::Not => {
        self.frames[depth].idx = pc;
        let v = self.pop_value()?;
        let n = self.materialize(v)?;
        self.results.push(Value::Intermediate(arith::not(&n)));
      }
      Opcode::Negate => {
        self.frames[depth].idx = pc;
        let v = self.pop_value()?;
        let n = self.materialize(v)?;
        self.results.push(Value::Intermediate(arith::negate(&n)));
      }
      Opcode::Length => {
        self.frames[depth].idx = pc;
        let v = self.pop_value()?;
        let len = match v {
          Value::NamedArray(name) => {
            let loc = self.resolve_array(&name)?;
            self.array_snapshot(loc)?.len()
          }
          other => self.materialize(other)?.length(),
        };
        self.results.push(Value::Intermediate(Number::from_i64(len as i64)));
      }
      Opcode::BuiltinScale => {
        self.frames[depth].idx = pc;
        let v = self.pop_value()?;
        let n = self.materialize(v)?;
        self.results.push(Value::Intermediate(Number::from_i64(n.scale() as i64)));
      }
      Opcode::Sqrt => {
        self.frames[depth].idx = pc;
        let v = self.pop_value()?;
        let n = self.materialize(v)?;
        let r = n.sqrt(self.scale)?;
        self.results.push(Value::Intermediate(r));
      }

      Opcode::Assign | Opcode::AssignAdd | Opcode::AssignSub | Opcode::AssignMul | Opcode::AssignDiv | Opcode::AssignMod | Opcode::AssignPow => {
        self.frames[depth].idx = pc;
        let rhs_v = self.pop_value()?;
        let target = self.pop_value()?;
        let hex = matches!(target, Value::IBase | Value::OBase);
        let rhs = self.materialize_hex(rhs_v, hex)?;
        let op = AssignOp::from_opcode(opcode).expect("assign opcode");
        let new_val = self.compound_assign(target, op, rhs)?;
        self.results.push(Value::Intermediate(new_val));
      }

      Opcode::IncPre | Opcode::DecPre => {
        self.frames[depth].idx = pc;
        let target = self.pop_value()?;
        let op = if opcode == Opcode::IncPre { AssignOp::Add } else { AssignOp::Sub };
        let new_val = self.compound_assign(target, op, Number::one())?;
        self.results.push(Value::Intermediate(new_val));
      }
      Opcode::IncPost | Opcode::DecPost => {
        self.frames[depth].idx = pc;
        let target = self.pop_value()?;
        let pre = self.materialize(target.clone())?;
        let op = if opcode == Opcode::IncPost { AssignOp::Add } else { AssignOp::Sub };
        self.compound_assign(target, op, Number::one())?;
        self.results.push(Value::Intermediate(pre));
      }
    }
    Ok(())
  }

  fn compound_assign(&mut self, target: Value, op: AssignOp, rhs: Number) -> Result<Number> {
    if !target.is_lvalue_shape() {
      return Err(Error::ParseBadAssign);
    }
    let old = self.materialize(target.clone())?;
    let new_val = arith::apply_assign(op, &old, &rhs, self.scale)?;
    self.store_lvalue(&target, new_val.clone())?;
    Ok(new_val)
  }

  fn do_call(&mut self, nparams: usize, func_idx: usize) -> Result<()> {
    if func_idx >= self.functions.len() || self.functions[func_idx].code.is_empty() {
      return Err(Error::ExecUndefinedFunc);
    }
    if self.functions[func_idx].nparams != nparams {
      return Err(Error::ExecMismatchedParams);
    }

    let base = self.results.len() - nparams;
    let autos = self.functions[func_idx].autos.clone();

    for (i, auto) in autos.iter().enumerate().take(nparams) {
      let arg = std::mem::replace(&mut self.results[base + i], Value::One);
      let bound = if auto.is_scalar {
        Value::AutoVar(self.materialize(arg)?)
      } else {
        match arg {
          Value::NamedArray(name) => {
            let loc = self.resolve_array(&name)?;
            Value::AutoArray(self.array_snapshot(loc)?)
          }
          _ => return Err(Error::ExecBadType),
        }
      };
      self.results[base + i] = bound;
    }
    for auto in &autos[nparams..] {
      if auto.is_scalar {
        self.results.push(Value::AutoVar(Number::zero()));
      } else {
        self.results.push(Value::AutoArray(Vec::new()));
      }
    }

    self.frames.push(InstPtr::new(func_idx, 0, base));
    Ok(())
  }

  fn do_return(&mut self, value: Number) -> Result<()> {
    if self.frames.len() <= 1 {
      return Err(Error::ExecBadType);
    }
    let frame = self.frames.pop().unwrap();
    self.results.truncate(frame.base);
    self.results.push(Value::Intermediate(value));
    Ok(())
  }

  /// Reads one line, accepts it only if it is a single numeric literal
  /// (a full expression grammar is out of scope for this crate, which
  /// ships no lexer), and runs it as a one-instruction `read` function
  /// body.
  fn do_read(&mut self) -> Result<()> {
    let mut line = String::new();
    let n = self.stdin.read_line(&mut line).map_err(|_| Error::IoErr)?;
    if n == 0 {
      return Err(Error::IoErr);
    }
    let trimmed = line.trim();
    if !is_single_number_literal(trimmed) {
      return Err(Error::ExecBadReadExpr);
    }
    let const_idx = self.intern_const(trimmed);

    self.functions[READ_FUNC].reset();
    {
      let mut fb = FunctionBuilder::new(&mut self.functions[READ_FUNC]);
      fb.push_num(const_idx);
      fb.ret();
    }

    let base = self.results.len();
    let depth_before = self.frames.len();
    self.frames.push(InstPtr::new(READ_FUNC, 0, base));
    while self.frames.len() > depth_before {
      self.step()?;
    }
    Ok(())
  }

  fn emit_char(&mut self, c: char) -> Result<()> {
    if c == '\n' {
      write!(self.stdout, "\n").map_err(|_| Error::IoErr)?;
      self.nchars = 0;
      return Ok(());
    }
    if self.limits.line_length > 1 && self.nchars >= self.limits.line_length - 1 {
      write!(self.stdout, "\\\n").map_err(|_| Error::IoErr)?;
      self.nchars = 0;
    }
    write!(self.stdout, "{c}").map_err(|_| Error::IoErr)?;
    self.nchars += 1;
    Ok(())
  }

  fn emit_number(&mut self, n: &Number) -> Result<()> {
    let s = n.format(self.obase);
    for c in s.chars() {
      self.emit_char(c)?;
    }
    Ok(())
  }

  /// Processes backslash escapes in a `PRINT_STR` literal: `\n \t \a \b
  /// \f \r` map to their control characters, `\e` to a literal backslash,
  /// `\q` to a double quote, and anything else (including a trailing lone
  /// backslash) is dropped.
  fn emit_escaped(&mut self, s: &str) -> Result<()> {
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
      if c != '\\' {
        self.emit_char(c)?;
        continue;
      }
      match chars.next() {
        Some('n') => self.emit_char('\n')?,
        Some('t') => self.emit_char('\t')?,
        Some('a') => self.emit_char('\u{7}')?,
        Some('b') => self.emit_char('\u{8}')?,
        Some('e') => self.emit_char('\\')?,
        Some('f') => self.emit_char('\u{c}')?,
        Some('r') => self.emit_char('\r')?,
        Some('q') => self.emit_char('"')?,
        _ => {}
      }
    }
    Ok(())
  }
}

fn is_single_number_literal(s: &str) -> bool {
  let mut chars = s.chars().peekable();
  if matches!(chars.peek(), Some('+') | Some('-')) {
    chars.next();
  }
  let mut seen_digit = false;
  let mut seen_dot = false;
  for c in chars {
    match c {
      '0'..='9' | 'A'..='F' => seen_digit = true,
      '.' if !seen_dot => seen_dot = true,
      _ => return false,
    }
  }
  seen_digit
}

#[cfg(test)]
mod tests;
