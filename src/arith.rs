//! Binary/unary arithmetic and comparison dispatch.
//!
//! These are pure functions over [`Number`]s; they know nothing about the
//! result stack or variable resolution, which live in [`crate::program`]
//! and [`crate::vm`].

use crate::error::{Error, Result};
use crate::number::Number;
use crate::op::Opcode;

/// The seven assignment-family operators (`=`, `+=`, ..., `^=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
  Set,
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Pow,
}

impl AssignOp {
  pub fn from_opcode(op: Opcode) -> Option<AssignOp> {
    Some(match op {
      Opcode::Assign => AssignOp::Set,
      Opcode::AssignAdd => AssignOp::Add,
      Opcode::AssignSub => AssignOp::Sub,
      Opcode::AssignMul => AssignOp::Mul,
      Opcode::AssignDiv => AssignOp::Div,
      Opcode::AssignMod => AssignOp::Mod,
      Opcode::AssignPow => AssignOp::Pow,
      _ => return None,
    })
  }
}

/// Applies `op` to `old` (the current value of the lvalue) and `rhs`,
/// yielding the value that gets written back and pushed as the
/// expression's result.
pub fn apply_assign(op: AssignOp, old: &Number, rhs: &Number, scale: u32) -> Result<Number> {
  match op {
    AssignOp::Set => Ok(rhs.clone()),
    AssignOp::Add => Ok(old.add(rhs)),
    AssignOp::Sub => Ok(old.sub(rhs)),
    AssignOp::Mul => Ok(old.mul(rhs)),
    AssignOp::Div => old.div(rhs, scale),
    AssignOp::Mod => old.modulus(rhs, scale),
    AssignOp::Pow => {
      let exponent = rhs.to_i64()?;
      old.pow(exponent, scale)
    }
  }
}

/// Plain binary math: `^ * / % + -`.
pub fn binary_math(op: Opcode, lhs: &Number, rhs: &Number, scale: u32) -> Result<Number> {
  match op {
    Opcode::Plus => Ok(lhs.add(rhs)),
    Opcode::Minus => Ok(lhs.sub(rhs)),
    Opcode::Multiply => Ok(lhs.mul(rhs)),
    Opcode::Divide => lhs.div(rhs, scale),
    Opcode::Modulus => lhs.modulus(rhs, scale),
    Opcode::Power => {
      let exponent = rhs.to_i64()?;
      lhs.pow(exponent, scale)
    }
    _ => Err(Error::ExecBadType),
  }
}

fn bool_num(b: bool) -> Number {
  if b {
    Number::one()
  } else {
    Number::zero()
  }
}

/// `== <= >= != < >`.
pub fn relational(op: Opcode, lhs: &Number, rhs: &Number) -> Result<Number> {
  use std::cmp::Ordering::*;
  let ord = lhs.cmp_value(rhs);
  let truth = match op {
    Opcode::Eq => ord == Equal,
    Opcode::Ne => ord != Equal,
    Opcode::Lt => ord == Less,
    Opcode::Gt => ord == Greater,
    Opcode::Le => ord != Greater,
    Opcode::Ge => ord != Less,
    _ => return Err(Error::ExecBadType),
  };
  Ok(bool_num(truth))
}

/// `&& || !`.
pub fn and(lhs: &Number, rhs: &Number) -> Number {
  bool_num(!lhs.is_zero() && !rhs.is_zero())
}

pub fn or(lhs: &Number, rhs: &Number) -> Number {
  bool_num(!lhs.is_zero() || !rhs.is_zero())
}

pub fn not(v: &Number) -> Number {
  bool_num(v.is_zero())
}

pub fn negate(v: &Number) -> Number {
  v.negated()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn relational_lt() {
    let a = Number::from_i64(1);
    let b = Number::from_i64(2);
    assert_eq!(relational(Opcode::Lt, &a, &b).unwrap(), Number::one());
    assert_eq!(relational(Opcode::Lt, &b, &a).unwrap(), Number::zero());
  }

  #[test]
  fn boolean_ops() {
    let one = Number::one();
    let zero = Number::zero();
    assert_eq!(and(&one, &one), Number::one());
    assert_eq!(and(&one, &zero), Number::zero());
    assert_eq!(or(&zero, &one), Number::one());
    assert_eq!(not(&zero), Number::one());
    assert_eq!(not(&one), Number::zero());
  }

  #[test]
  fn assign_add_applies_to_old_value() {
    let old = Number::from_i64(3);
    let rhs = Number::from_i64(4);
    let r = apply_assign(AssignOp::Add, &old, &rhs, 0).unwrap();
    assert_eq!(r.to_u64().unwrap(), 7);
  }

  #[test]
  fn assign_div_by_zero_propagates() {
    let old = Number::from_i64(3);
    let zero = Number::zero();
    assert_eq!(apply_assign(AssignOp::Div, &old, &zero, 0).unwrap_err(), Error::MathDivideByZero);
  }
}
