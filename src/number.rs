//! Arbitrary-precision decimal numbers.
//!
//! A [`Number`] is a signed integer `mantissa` together with a `scale`: the
//! value it represents is `mantissa / 10^scale`. This is the representation
//! real `bc` implementations use internally (see
//! `examples/original_source/src/bc/program.c`), and it makes every
//! arithmetic operation an operation on plain big integers.

use std::cmp::Ordering;
use std::fmt::Write as _;

use num_bigint::{BigInt, Sign};
use num_integer::Roots;
use num_traits::{ToPrimitive, Zero};

use crate::error::{Error, Result};

fn ten_pow(exp: u32) -> BigInt {
  num_traits::pow(BigInt::from(10), exp as usize)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Number {
  mantissa: BigInt,
  scale: u32,
}

impl Number {
  pub fn zero() -> Self {
    Number { mantissa: BigInt::zero(), scale: 0 }
  }

  pub fn one() -> Self {
    Number { mantissa: BigInt::from(1), scale: 0 }
  }

  pub fn ten() -> Self {
    Number { mantissa: BigInt::from(10), scale: 0 }
  }

  pub fn from_i64(v: i64) -> Self {
    Number { mantissa: BigInt::from(v), scale: 0 }
  }

  pub fn is_zero(&self) -> bool {
    self.mantissa.is_zero()
  }

  pub fn is_negative(&self) -> bool {
    self.mantissa.sign() == Sign::Minus
  }

  pub fn scale(&self) -> u32 {
    self.scale
  }

  pub fn negated(&self) -> Self {
    Number { mantissa: -&self.mantissa, scale: self.scale }
  }

  /// Rescale `mantissa` so it represents the same value at `new_scale`
  /// fractional digits, truncating towards zero when shrinking.
  fn rescaled(&self, new_scale: u32) -> BigInt {
    match new_scale.cmp(&self.scale) {
      Ordering::Equal => self.mantissa.clone(),
      Ordering::Greater => &self.mantissa * ten_pow(new_scale - self.scale),
      Ordering::Less => &self.mantissa / ten_pow(self.scale - new_scale),
    }
  }

  pub fn cmp_value(&self, other: &Number) -> Ordering {
    let scale = self.scale.max(other.scale);
    self.rescaled(scale).cmp(&other.rescaled(scale))
  }

  pub fn add(&self, other: &Number) -> Self {
    let scale = self.scale.max(other.scale);
    Number { mantissa: self.rescaled(scale) + other.rescaled(scale), scale }
  }

  pub fn sub(&self, other: &Number) -> Self {
    let scale = self.scale.max(other.scale);
    Number { mantissa: self.rescaled(scale) - other.rescaled(scale), scale }
  }

  /// `a.scale + b.scale` exactly: the stored mantissas already encode both
  /// operands' scales, so the product mantissa is exact with no rescale.
  pub fn mul(&self, other: &Number) -> Self {
    Number { mantissa: &self.mantissa * &other.mantissa, scale: self.scale + other.scale }
  }

  /// Truncating division to `scale` fractional digits.
  pub fn div(&self, other: &Number, scale: u32) -> Result<Self> {
    if other.is_zero() {
      return Err(Error::MathDivideByZero);
    }
    let numerator = &self.mantissa * ten_pow(other.scale + scale);
    let denominator = &other.mantissa * ten_pow(self.scale);
    Ok(Number { mantissa: numerator / denominator, scale })
  }

  /// `a % b` defined as `a - (a/b truncated to `scale` digits) * b`, the
  /// usual `bc` definition.
  pub fn modulus(&self, other: &Number, scale: u32) -> Result<Self> {
    if other.is_zero() {
      return Err(Error::MathDivideByZero);
    }
    let quotient = self.div(other, scale)?;
    Ok(self.sub(&quotient.mul(other)))
  }

  /// Integer exponentiation; `exponent` must itself be an integer value
  /// (callers materialize and range-check it via [`Number::to_u64`] before
  /// calling this, negating separately for negative exponents).
  pub fn pow(&self, exponent: i64, scale: u32) -> Result<Self> {
    if exponent >= 0 {
      let mantissa = num_traits::pow(self.mantissa.clone(), exponent as usize);
      Ok(Number { mantissa, scale: self.scale.saturating_mul(exponent as u32) })
    } else {
      if self.is_zero() {
        return Err(Error::MathDivideByZero);
      }
      let positive = self.pow(-exponent, scale)?;
      Number::one().div(&positive, scale)
    }
  }

  /// Integer square root truncated to `scale` fractional digits; negative
  /// operands are rejected.
  pub fn sqrt(&self, scale: u32) -> Result<Self> {
    if self.is_negative() {
      return Err(Error::MathNegativeSqrt);
    }
    // sqrt(mantissa / 10^self.scale) at `scale` fractional digits is
    // floor(sqrt(mantissa * 10^(2*scale - self.scale))).
    let shift = 2 * scale as i64 - self.scale as i64;
    let radicand = if shift >= 0 {
      self.mantissa.magnitude() * ten_pow(shift as u32).magnitude()
    } else {
      self.mantissa.magnitude() / ten_pow((-shift) as u32).magnitude()
    };
    let root = radicand.sqrt();
    Ok(Number { mantissa: BigInt::from(root), scale })
  }

  /// Number of significant decimal digits, ignoring the sign. `0` has
  /// length `0`, matching real `bc`. A value with no integer part (its
  /// digits are entirely fractional, e.g. `.500`) has its trailing
  /// fractional zeros trimmed before counting, so `.500` has length `1`.
  pub fn length(&self) -> usize {
    if self.is_zero() {
      return 0;
    }
    let digits = self.mantissa.magnitude().to_str_radix(10);
    let len = digits.len().max(self.scale as usize);
    if self.scale as usize == len {
      let padded = format!("{digits:0>len$}");
      padded.trim_end_matches('0').len()
    } else {
      len
    }
  }

  /// Converts to an unsigned integer, failing if the value is negative,
  /// has a nonzero fractional part, or does not fit in a `u64`.
  pub fn to_u64(&self) -> Result<u64> {
    if self.is_negative() {
      return Err(Error::ExecBadType);
    }
    let divisor = ten_pow(self.scale);
    let remainder = &self.mantissa % &divisor;
    if !remainder.is_zero() {
      return Err(Error::ExecBadType);
    }
    let whole = &self.mantissa / &divisor;
    whole.to_biguint().and_then(|u| u64::try_from(u).ok()).ok_or(Error::ExecBadType)
  }

  /// Converts to a signed integer, failing on a nonzero fractional part or
  /// on overflow. Used for exponents, which may be negative.
  pub fn to_i64(&self) -> Result<i64> {
    let divisor = ten_pow(self.scale);
    let remainder = &self.mantissa % &divisor;
    if !remainder.is_zero() {
      return Err(Error::ExecBadType);
    }
    let whole = &self.mantissa / &divisor;
    whole.to_i64().ok_or(Error::ExecBadType)
  }

  /// Parses a digit string (optional leading `+`/`-`, digits `0`-`9`/`A`-`F`,
  /// optional `.` fraction) in the given input base.
  pub fn parse(src: &str, ibase: u32) -> Self {
    let mut chars = src.chars().peekable();
    let mut negative = false;
    match chars.peek() {
      Some('+') => {
        chars.next();
      }
      Some('-') => {
        negative = true;
        chars.next();
      }
      _ => {}
    }

    let mut mantissa = BigInt::zero();
    let mut scale = 0u32;
    let mut seen_dot = false;
    for c in chars {
      if c == '.' {
        seen_dot = true;
        continue;
      }
      let digit = match c {
        '0'..='9' => c as u32 - '0' as u32,
        'A'..='F' => c as u32 - 'A' as u32 + 10,
        _ => continue,
      };
      let digit = digit.min(ibase.saturating_sub(1));
      mantissa = mantissa * ibase + digit;
      if seen_dot {
        scale += 1;
      }
    }

    if negative && !mantissa.is_zero() {
      mantissa = -mantissa;
    }
    Number { mantissa, scale }
  }

  /// Renders the number in `obase`, printing exactly `self.scale`
  /// fractional digits. Bases above 16 print each "digit" as a
  /// space-separated decimal group, matching real `bc`'s behaviour for
  /// `obase > 16`.
  pub fn format(&self, obase: u32) -> String {
    debug_assert!(obase >= 2);
    let mut out = String::new();
    if self.is_negative() {
      out.push('-');
    }

    let magnitude = self.mantissa.magnitude().clone();
    let scale_div = ten_pow(self.scale).magnitude().clone();
    let integer_part = &magnitude / &scale_div;
    let mut frac_remainder = &magnitude % &scale_div;

    write_digits_in_base(&mut out, &integer_part, obase);

    if self.scale > 0 {
      out.push('.');
      let mut digits = Vec::with_capacity(self.scale as usize);
      for _ in 0..self.scale {
        frac_remainder *= obase;
        let digit = &frac_remainder / &scale_div;
        frac_remainder -= &digit * &scale_div;
        digits.push(digit);
      }
      for (i, digit) in digits.iter().enumerate() {
        if i > 0 && obase > 16 {
          out.push(' ');
        }
        write_digit(&mut out, digit, obase);
      }
    }

    out
  }
}

fn write_digits_in_base(out: &mut String, value: &num_bigint::BigUint, base: u32) {
  if value.is_zero() {
    out.push('0');
    return;
  }
  let mut digits = Vec::new();
  let mut rem = value.clone();
  let base_big = num_bigint::BigUint::from(base);
  while !rem.is_zero() {
    let digit = &rem % &base_big;
    rem /= &base_big;
    digits.push(digit);
  }
  digits.reverse();
  for (i, digit) in digits.iter().enumerate() {
    if i > 0 && base > 16 {
      out.push(' ');
    }
    write_digit(out, digit, base);
  }
}

fn write_digit(out: &mut String, digit: &num_bigint::BigUint, base: u32) {
  if base <= 16 {
    let d: u32 = digit.to_u32().unwrap_or(0);
    let c = std::char::from_digit(d, 16).unwrap_or('?').to_ascii_uppercase();
    out.push(c);
  } else {
    let _ = write!(out, "{digit}");
  }
}
