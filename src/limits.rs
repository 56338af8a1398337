//! Compiled-in limits.
//!
//! Defaults match the values real `bc` implementations ship; a host may
//! only ever lower them (never raise them above the compiled-in ceiling),
//! matching "overridable by platform constants if lower".

pub const DEFAULT_BASE_MAX: u32 = 99;
pub const DEFAULT_DIM_MAX: u64 = 65_535;
pub const DEFAULT_SCALE_MAX: u32 = 65_535;
pub const DEFAULT_STRING_MAX: usize = 65_535;
pub const MAX_INPUT_BASE: u32 = 16;
pub const MIN_BASE: u32 = 2;

/// Column width at which the number printer wraps output, mirroring the
/// `BC_LINE_LENGTH` environment variable referenced by real `bc`'s
/// `bc_vm_run` (`examples/original_source/src/bc/bc.c`).
pub const DEFAULT_LINE_LENGTH: usize = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
  pub base_max: u32,
  pub dim_max: u64,
  pub scale_max: u32,
  pub string_max: usize,
  pub line_length: usize,
}

impl Default for Limits {
  fn default() -> Self {
    Limits {
      base_max: DEFAULT_BASE_MAX,
      dim_max: DEFAULT_DIM_MAX,
      scale_max: DEFAULT_SCALE_MAX,
      string_max: DEFAULT_STRING_MAX,
      line_length: DEFAULT_LINE_LENGTH,
    }
  }
}
