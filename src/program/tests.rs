use super::*;
use crate::limits::Limits;

fn fresh() -> Program {
  Program::with_parts(Limits::default(), Box::new(Vec::<u8>::new()), Box::new(std::io::empty()))
}

#[test]
fn reserved_functions_are_preregistered() {
  let p = fresh();
  assert_eq!(p.function_id("main"), Some(MAIN_FUNC));
  assert_eq!(p.function_id("read"), Some(READ_FUNC));
  assert_eq!(p.functions.len(), 2);
}

#[test]
fn add_function_resets_on_redefinition() {
  let mut p = fresh();
  let f = p.add_function("f");
  p.function_mut(f).nparams = 1;
  p.function_mut(f).code.push(0);
  let f2 = p.add_function("f");
  assert_eq!(f, f2);
  assert_eq!(p.function(f2).nparams, 0);
  assert!(p.function(f2).code.is_empty());
}

#[test]
fn global_scalar_vivifies_on_first_use() {
  let mut p = fresh();
  let loc = p.resolve_scalar("x").unwrap();
  assert_eq!(loc, ScalarLoc::Global(0));
  *p.scalar_ref(loc).unwrap() = Number::from_i64(5);
  let loc2 = p.resolve_scalar("x").unwrap();
  assert_eq!(loc2, ScalarLoc::Global(0));
  assert_eq!(p.scalar_ref(loc2).unwrap().to_u64().unwrap(), 5);
}

#[test]
fn auto_shadows_global_of_same_name() {
  let mut p = fresh();
  // global `x` already exists with value 5
  let loc = p.resolve_scalar("x").unwrap();
  *p.scalar_ref(loc).unwrap() = Number::from_i64(5);

  // push a fake frame whose function declares an auto named `x`
  let f = p.add_function("f");
  p.function_mut(f).nparams = 0;
  p.function_mut(f).autos.push(crate::function::Auto { name: "x".into(), is_scalar: true });
  let base = p.results.len();
  p.results.push(Value::AutoVar(Number::from_i64(9)));
  p.frames.push(InstPtr::new(f, 0, base));

  let inner_loc = p.resolve_scalar("x").unwrap();
  assert_eq!(inner_loc, ScalarLoc::Stack(base));
  assert_eq!(p.scalar_ref(inner_loc).unwrap().to_u64().unwrap(), 9);

  p.frames.pop();
  let outer_loc = p.resolve_scalar("x").unwrap();
  assert_eq!(outer_loc, ScalarLoc::Global(0));
}

#[test]
fn array_index_beyond_dim_max_errors() {
  let mut p = fresh();
  p.limits.dim_max = 4;
  let loc = p.resolve_array("a").unwrap();
  assert!(p.array_elem_mut(loc, 4).is_err());
  assert!(p.array_elem_mut(loc, 3).is_ok());
}

#[test]
fn plain_materialize_never_forces_hex() {
  // A bare `materialize` (no binary-op context) always reads a
  // single-character constant in the current `ibase`, never base 16.
  let mut p = fresh();
  p.ibase = 2;
  let idx = p.intern_const("A");
  let n = p.materialize(Value::Constant(idx)).unwrap();
  assert_eq!(n.to_u64().unwrap(), 1);
}

#[test]
fn materialize_hex_forces_base_16_only_when_flagged() {
  let mut p = fresh();
  p.ibase = 2;
  let idx = p.intern_const("A");
  let hex = p.materialize_hex(Value::Constant(idx), true).unwrap();
  assert_eq!(hex.to_u64().unwrap(), 10);
  let idx2 = p.intern_const("A");
  let no_hex = p.materialize_hex(Value::Constant(idx2), false).unwrap();
  assert_eq!(no_hex.to_u64().unwrap(), 1);
}

#[test]
fn store_lvalue_rejects_out_of_range_ibase() {
  let mut p = fresh();
  let err = p.store_lvalue(&Value::IBase, Number::from_i64(1)).unwrap_err();
  assert_eq!(err, Error::ExecBadIbase);
  let err = p.store_lvalue(&Value::IBase, Number::from_i64(17)).unwrap_err();
  assert_eq!(err, Error::ExecBadIbase);
  p.store_lvalue(&Value::IBase, Number::from_i64(8)).unwrap();
  assert_eq!(p.ibase, 8);
}
