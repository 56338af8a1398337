use super::*;

#[test]
fn uint_roundtrip_zero() {
  let mut buf = Vec::new();
  write_uint(&mut buf, 0);
  let mut pos = 0;
  assert_eq!(read_uint(&buf, &mut pos), 0);
  assert_eq!(pos, buf.len());
}

#[test]
fn uint_roundtrip_large() {
  let mut buf = Vec::new();
  write_uint(&mut buf, 0x1234_5678_9abc);
  let mut pos = 0;
  assert_eq!(read_uint(&buf, &mut pos), 0x1234_5678_9abc);
  assert_eq!(pos, buf.len());
}

#[test]
fn name_roundtrip() {
  let mut buf = Vec::new();
  write_name(&mut buf, "foo");
  let mut pos = 0;
  assert_eq!(read_name(&buf, &mut pos), "foo");
  assert_eq!(pos, buf.len());
}

#[test]
fn opcode_byte_roundtrip() {
  assert_eq!(Opcode::from_byte(Opcode::PushNum as u8), Some(Opcode::PushNum));
  assert_eq!(Opcode::from_byte(Opcode::DecPost as u8), Some(Opcode::DecPost));
  assert_eq!(Opcode::from_byte(250), None);
}
