use super::*;
use crate::builder::FunctionBuilder;
use crate::function::MAIN_FUNC;
use crate::limits::Limits;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    self.0.lock().unwrap().write(buf)
  }
  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

fn harness() -> (Program, Arc<Mutex<Vec<u8>>>) {
  let out = Arc::new(Mutex::new(Vec::new()));
  let p = Program::with_parts(Limits::default(), Box::new(SharedBuf(out.clone())), Box::new(std::io::empty()));
  (p, out)
}

fn output_of(out: &Arc<Mutex<Vec<u8>>>) -> String {
  String::from_utf8(out.lock().unwrap().clone()).unwrap()
}

#[test]
fn while_loop_prints_each_iteration() {
  // i = 0; while (i < 3) { i; i = i + 1; }
  let (mut p, out) = harness();
  let zero = p.intern_const("0");
  let one = p.intern_const("1");
  let three = p.intern_const("3");
  let mut fb = FunctionBuilder::new(p.function_mut(MAIN_FUNC));
  fb.push_var("i");
  fb.push_num(zero);
  fb.assign();
  fb.pop();
  let top = fb.new_label();
  fb.place_label(top);
  fb.push_var("i");
  fb.push_num(three);
  fb.lt();
  let out_label = fb.new_label();
  fb.jump_zero(out_label);
  fb.push_var("i");
  fb.print();
  fb.push_var("i");
  fb.push_var("i");
  fb.push_num(one);
  fb.plus();
  fb.assign();
  fb.pop();
  fb.jump(top);
  fb.place_label(out_label);

  p.run().unwrap();
  assert_eq!(output_of(&out), "0\n1\n2\n");
}

#[test]
fn function_call_returns_square() {
  // define f(x) { return (x * x); } f(12)
  let (mut p, out) = harness();
  let twelve = p.intern_const("12");
  let f = p.add_function("f");
  {
    let mut fb = FunctionBuilder::new(p.function_mut(f));
    fb.declare_param("x", true);
    fb.push_var("x");
    fb.push_var("x");
    fb.multiply();
    fb.ret();
  }
  {
    let mut fb = FunctionBuilder::new(p.function_mut(MAIN_FUNC));
    fb.push_num(twelve);
    fb.call(f, 1);
    fb.print();
  }
  p.run().unwrap();
  assert_eq!(output_of(&out), "144\n");
}

#[test]
fn array_parameter_passes_by_value() {
  // define g(a[]) { return (a[3]); } a[3] = 7; g(a[])
  let (mut p, out) = harness();
  let seven = p.intern_const("7");
  let three_idx = p.intern_const("3");
  let g = p.add_function("g");
  {
    let mut fb = FunctionBuilder::new(p.function_mut(g));
    fb.declare_param("a", false);
    fb.push_num(three_idx);
    fb.push_array_elem("a");
    fb.ret();
  }
  {
    let mut fb = FunctionBuilder::new(p.function_mut(MAIN_FUNC));
    fb.push_num(three_idx);
    fb.push_array_elem("a");
    fb.push_num(seven);
    fb.assign();
    fb.pop();
    fb.push_array_ref("a");
    fb.call(g, 1);
    fb.print();
  }
  p.run().unwrap();
  assert_eq!(output_of(&out), "7\n");
}

#[test]
fn post_increment_returns_pre_value() {
  // a = 5; b = a++; a; b
  let (mut p, out) = harness();
  let five = p.intern_const("5");
  let mut fb = FunctionBuilder::new(p.function_mut(MAIN_FUNC));
  fb.push_var("a");
  fb.push_num(five);
  fb.assign();
  fb.pop();
  fb.push_var("b");
  fb.push_var("a");
  fb.inc_post();
  fb.assign();
  fb.pop();
  fb.push_var("a");
  fb.print();
  fb.push_var("b");
  fb.print();
  p.run().unwrap();
  assert_eq!(output_of(&out), "6\n5\n");
}

#[test]
fn division_by_zero_is_reported() {
  let (mut p, _out) = harness();
  let one = p.intern_const("1");
  let zero = p.intern_const("0");
  let mut fb = FunctionBuilder::new(p.function_mut(MAIN_FUNC));
  fb.push_num(one);
  fb.push_num(zero);
  fb.divide();
  fb.pop();
  assert_eq!(p.run().unwrap_err(), Error::MathDivideByZero);
}

#[test]
fn array_index_over_dim_max_is_reported() {
  let (mut p, _out) = harness();
  p.limits.dim_max = 10;
  let one = p.intern_const("1");
  let big = p.intern_const("65536");
  let mut fb = FunctionBuilder::new(p.function_mut(MAIN_FUNC));
  fb.push_num(big);
  fb.push_array_elem("a");
  fb.push_num(one);
  fb.assign();
  fb.pop();
  assert_eq!(p.run().unwrap_err(), Error::ExecArrayLen);
}

#[test]
fn bad_ibase_assignment_is_reported() {
  let (mut p, _out) = harness();
  let one = p.intern_const("1");
  let mut fb = FunctionBuilder::new(p.function_mut(MAIN_FUNC));
  fb.push_ibase();
  fb.push_num(one);
  fb.assign();
  fb.pop();
  assert_eq!(p.run().unwrap_err(), Error::ExecBadIbase);
}

#[test]
fn call_to_undeclared_function_is_reported() {
  let (mut p, _out) = harness();
  let mut fb = FunctionBuilder::new(p.function_mut(MAIN_FUNC));
  fb.call(17, 0);
  assert_eq!(p.run().unwrap_err(), Error::ExecUndefinedFunc);
}

#[test]
fn halt_reports_quit() {
  let (mut p, _out) = harness();
  let mut fb = FunctionBuilder::new(p.function_mut(MAIN_FUNC));
  fb.halt();
  let err = p.run().unwrap_err();
  assert!(err.is_quit());
}
