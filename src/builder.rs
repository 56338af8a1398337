//! Bytecode assembler: a method-per-opcode builder over a function's code
//! buffer. There is no lexer or parser in this crate -- callers (tests, or
//! an embedder's own front end) build functions directly against this API.

use crate::function::{Auto, Function};
use crate::op::{self, Opcode};

pub struct FunctionBuilder<'f> {
  function: &'f mut Function,
}

impl<'f> FunctionBuilder<'f> {
  pub fn new(function: &'f mut Function) -> Self {
    FunctionBuilder { function }
  }

  pub fn declare_param(&mut self, name: &str, is_scalar: bool) -> &mut Self {
    debug_assert_eq!(self.function.nparams, self.function.autos.len(), "params must be declared before autos");
    self.function.autos.push(Auto { name: name.to_string(), is_scalar });
    self.function.nparams += 1;
    self
  }

  pub fn declare_auto(&mut self, name: &str, is_scalar: bool) -> &mut Self {
    self.function.autos.push(Auto { name: name.to_string(), is_scalar });
    self
  }

  /// Allocates a forward-reference label; its target is fixed later with
  /// [`Self::place_label`].
  pub fn new_label(&mut self) -> usize {
    self.function.labels.push(usize::MAX);
    self.function.labels.len() - 1
  }

  /// Binds `label` to the current end of the code stream.
  pub fn place_label(&mut self, label: usize) -> &mut Self {
    let here = self.function.code.len();
    self.function.labels[label] = here;
    self
  }

  fn op(&mut self, opcode: Opcode) -> &mut Self {
    self.function.code.push(opcode as u8);
    self
  }

  fn uint(&mut self, v: u64) -> &mut Self {
    op::write_uint(&mut self.function.code, v);
    self
  }

  fn name(&mut self, name: &str) -> &mut Self {
    op::write_name(&mut self.function.code, name);
    self
  }

  pub fn push_num(&mut self, const_idx: usize) -> &mut Self {
    self.op(Opcode::PushNum).uint(const_idx as u64)
  }

  pub fn push_var(&mut self, name: &str) -> &mut Self {
    self.op(Opcode::PushVar).name(name)
  }

  pub fn push_array_elem(&mut self, name: &str) -> &mut Self {
    self.op(Opcode::PushArray).name(name)
  }

  pub fn push_array_ref(&mut self, name: &str) -> &mut Self {
    self.op(Opcode::PushArrayRef).name(name)
  }

  pub fn push_last(&mut self) -> &mut Self {
    self.op(Opcode::PushLast)
  }

  pub fn push_scale(&mut self) -> &mut Self {
    self.op(Opcode::PushScale)
  }

  pub fn push_ibase(&mut self) -> &mut Self {
    self.op(Opcode::PushIBase)
  }

  pub fn push_obase(&mut self) -> &mut Self {
    self.op(Opcode::PushOBase)
  }

  pub fn pop(&mut self) -> &mut Self {
    self.op(Opcode::Pop)
  }

  pub fn jump(&mut self, label: usize) -> &mut Self {
    self.op(Opcode::Jump).uint(label as u64)
  }

  pub fn jump_zero(&mut self, label: usize) -> &mut Self {
    self.op(Opcode::JumpZero).uint(label as u64)
  }

  pub fn call(&mut self, func_idx: usize, nparams: usize) -> &mut Self {
    self.op(Opcode::Call).uint(nparams as u64).uint(func_idx as u64)
  }

  pub fn ret(&mut self) -> &mut Self {
    self.op(Opcode::Return)
  }

  pub fn ret_zero(&mut self) -> &mut Self {
    self.op(Opcode::ReturnZero)
  }

  pub fn read(&mut self) -> &mut Self {
    self.op(Opcode::Read)
  }

  pub fn print(&mut self) -> &mut Self {
    self.op(Opcode::Print)
  }

  pub fn print_expr(&mut self) -> &mut Self {
    self.op(Opcode::PrintExpr)
  }

  pub fn str_lit(&mut self, string_idx: usize) -> &mut Self {
    self.op(Opcode::Str).uint(string_idx as u64)
  }

  pub fn print_str(&mut self, string_idx: usize) -> &mut Self {
    self.op(Opcode::PrintStr).uint(string_idx as u64)
  }

  pub fn halt(&mut self) -> &mut Self {
    self.op(Opcode::Halt)
  }

  pub fn power(&mut self) -> &mut Self {
    self.op(Opcode::Power)
  }
  pub fn multiply(&mut self) -> &mut Self {
    self.op(Opcode::Multiply)
  }
  pub fn divide(&mut self) -> &mut Self {
    self.op(Opcode::Divide)
  }
  pub fn modulus(&mut self) -> &mut Self {
    self.op(Opcode::Modulus)
  }
  pub fn plus(&mut self) -> &mut Self {
    self.op(Opcode::Plus)
  }
  pub fn minus(&mut self) -> &mut Self {
    self.op(Opcode::Minus)
  }

  pub fn eq(&mut self) -> &mut Self {
    self.op(Opcode::Eq)
  }
  pub fn le(&mut self) -> &mut Self {
    self.op(Opcode::Le)
  }
  pub fn ge(&mut self) -> &mut Self {
    self.op(Opcode::Ge)
  }
  pub fn ne(&mut self) -> &mut Self {
    self.op(Opcode::Ne)
  }
  pub fn lt(&mut self) -> &mut Self {
    self.op(Opcode::Lt)
  }
  pub fn gt(&mut self) -> &mut Self {
    self.op(Opcode::Gt)
  }

  pub fn and(&mut self) -> &mut Self {
    self.op(Opcode::And)
  }
  pub fn or(&mut self) -> &mut Self {
    self.op(Opcode::Or)
  }
  pub fn not(&mut self) -> &mut Self {
    self.op(Opcode::Not)
  }

  pub fn negate(&mut self) -> &mut Self {
    self.op(Opcode::Negate)
  }

  pub fn length(&mut self) -> &mut Self {
    self.op(Opcode::Length)
  }
  pub fn builtin_scale(&mut self) -> &mut Self {
    self.op(Opcode::BuiltinScale)
  }
  pub fn sqrt(&mut self) -> &mut Self {
    self.op(Opcode::Sqrt)
  }

  pub fn assign(&mut self) -> &mut Self {
    self.op(Opcode::Assign)
  }
  pub fn assign_add(&mut self) -> &mut Self {
    self.op(Opcode::AssignAdd)
  }
  pub fn assign_sub(&mut self) -> &mut Self {
    self.op(Opcode::AssignSub)
  }
  pub fn assign_mul(&mut self) -> &mut Self {
    self.op(Opcode::AssignMul)
  }
  pub fn assign_div(&mut self) -> &mut Self {
    self.op(Opcode::AssignDiv)
  }
  pub fn assign_mod(&mut self) -> &mut Self {
    self.op(Opcode::AssignMod)
  }
  pub fn assign_pow(&mut self) -> &mut Self {
    self.op(Opcode::AssignPow)
  }

  pub fn inc_pre(&mut self) -> &mut Self {
    self.op(Opcode::IncPre)
  }
  pub fn dec_pre(&mut self) -> &mut Self {
    self.op(Opcode::DecPre)
  }
  pub fn inc_post(&mut self) -> &mut Self {
    self.op(Opcode::IncPost)
  }
  pub fn dec_post(&mut self) -> &mut Self {
    self.op(Opcode::DecPost)
  }
}
