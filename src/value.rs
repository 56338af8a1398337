//! Result-stack value representation.
//!
//! Every push creates exactly one [`Value`]; every consuming opcode pops
//! the exact number it declares and pushes at most one. Only
//! [`Value::Intermediate`], [`Value::AutoVar`] and [`Value::AutoArray`]
//! own their storage outright -- `AutoVar`/`AutoArray`
//! are what a parameter or local's home slot actually holds on the result
//! stack (the caller's value, copied in at call time); `NamedVar` and
//! `NamedArrayElem` are unresolved references that still own their name
//! string until something materializes or frees them.

use crate::number::Number;

#[derive(Debug, Clone)]
pub enum Value {
  /// An owned temporary produced by an expression.
  Intermediate(Number),
  /// A literal-number constant, not yet parsed.
  Constant(usize),
  /// An unresolved reference to a scalar variable, by name.
  NamedVar(String),
  /// An unresolved reference to one array element, by name and index.
  NamedArrayElem(String, u64),
  /// An unresolved reference to a whole array, by name -- only produced as
  /// a call argument (arrays are always passed by value; see
  /// `Opcode::PushArrayRef`).
  NamedArray(String),
  /// The home storage of an auto (or parameter) scalar, living at a fixed
  /// offset from the current frame's result-stack base.
  AutoVar(Number),
  /// The home storage of an auto (or parameter) array.
  AutoArray(Vec<Number>),
  /// `scale` special register.
  Scale,
  /// `ibase` special register.
  IBase,
  /// `obase` special register.
  OBase,
  /// Last value printed.
  Last,
  /// Read-only handle to the numeric constant `1`, used by the
  /// increment/decrement desugaring.
  One,
}

impl Value {
  /// Whether this value is a legal assignment target *before* name
  /// resolution. `Intermediate`, `Constant`, `Last` and `One` can never
  /// be assigned to.
  pub fn is_lvalue_shape(&self) -> bool {
    matches!(
      self,
      Value::NamedVar(_) | Value::NamedArrayElem(_, _) | Value::Scale | Value::IBase | Value::OBase
    )
  }

  pub fn truthy_number(n: &Number) -> bool {
    !n.is_zero()
  }
}
