//! Key-space arithmetic for table-segment bisection.
//!
//! Primary keys come in three flavors for bisection purposes: plain integers,
//! UUIDs (128-bit), and fixed/varying-length alphanumeric strings. All three
//! need evenly-spaced interior points between a low and a high bound; UUIDs
//! and alphanumerics get there by round-tripping through an integer.

use crate::constants::ALPHANUMERIC_ALPHABET;
use crate::error::DiffError;
use std::cmp::Ordering;
use std::fmt;

fn alphabet_index(c: char) -> Option<u128> {
    ALPHANUMERIC_ALPHABET.chars().position(|a| a == c).map(|i| i as u128)
}

fn alphabet_char(i: u128) -> char {
    ALPHANUMERIC_ALPHABET.chars().nth(i as usize).expect("index in range")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidCase {
    Lower,
    Upper,
}

/// 128-bit unsigned integer view of a UUID, preserving the original string's case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArithUuid {
    value: u128,
    case: UuidCase,
}

impl PartialOrd for UuidCase {
    fn partial_cmp(&self, _other: &Self) -> Option<Ordering> {
        Some(Ordering::Equal)
    }
}
impl Ord for UuidCase {
    fn cmp(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }
}

impl ArithUuid {
    pub fn parse(s: &str) -> Result<Self, DiffError> {
        let cleaned: String = s.chars().filter(|c| *c != '-').collect();
        if cleaned.len() != 32 || !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DiffError::InvalidKeyValue { value: s.to_string() });
        }
        let case = if cleaned.chars().any(|c| c.is_ascii_uppercase()) {
            UuidCase::Upper
        } else {
            UuidCase::Lower
        };
        let value = u128::from_str_radix(&cleaned, 16)
            .map_err(|_| DiffError::InvalidKeyValue { value: s.to_string() })?;
        Ok(Self { value, case })
    }

    pub fn add(&self, n: u128) -> Self {
        Self { value: self.value.wrapping_add(n), case: self.case }
    }

    pub fn sub(&self, other: &Self) -> u128 {
        self.value.saturating_sub(other.value)
    }

    pub fn value(&self) -> u128 {
        self.value
    }
}

impl fmt::Display for ArithUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = format!("{:032x}", self.value);
        let hex = match self.case {
            UuidCase::Upper => hex.to_uppercase(),
            UuidCase::Lower => hex,
        };
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}

/// A string over `ALPHANUMERIC_ALPHABET`, right-padded to `max_len`, viewed as
/// a base-67 positional integer (leftmost character most significant).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArithAlphanumeric {
    value: u128,
    max_len: usize,
}

impl ArithAlphanumeric {
    pub fn parse(s: &str, max_len: usize) -> Result<Self, DiffError> {
        if s.chars().count() > max_len {
            return Err(DiffError::Overflow {
                message: format!("alphanumeric key {s:?} exceeds max_len {max_len}"),
            });
        }
        let mut value: u128 = 0;
        for c in s.chars() {
            let idx = alphabet_index(c)
                .ok_or_else(|| DiffError::InvalidKeyValue { value: s.to_string() })?;
            // Each missing trailing column pads with the zero symbol, which
            // contributes nothing, so padding need not be applied explicitly:
            // shifting left by one base-67 digit per character is sufficient.
            value = value
                .checked_mul(67)
                .and_then(|v| v.checked_add(idx))
                .ok_or_else(|| DiffError::Overflow {
                    message: format!("alphanumeric key {s:?} overflows u128"),
                })?;
        }
        // Account for right-padding: characters not present count as the zero
        // symbol in the remaining low-order positions.
        let pad = max_len - s.chars().count();
        let scale = 67u128
            .checked_pow(pad as u32)
            .ok_or_else(|| DiffError::Overflow { message: "alphanumeric max_len too large".into() })?;
        let value = value
            .checked_mul(scale)
            .ok_or_else(|| DiffError::Overflow { message: "alphanumeric key overflows u128".into() })?;
        Ok(Self { value, max_len })
    }

    pub fn add(&self, n: u128) -> Result<Self, DiffError> {
        let max_value = 67u128
            .checked_pow(self.max_len as u32)
            .ok_or_else(|| DiffError::Overflow { message: "alphanumeric max_len too large".into() })?;
        let nv = self.value.checked_add(n).ok_or_else(|| DiffError::Overflow {
            message: "alphanumeric key arithmetic overflowed u128".into(),
        })?;
        if nv >= max_value {
            return Err(DiffError::Overflow {
                message: format!("result exceeds max_len {}", self.max_len),
            });
        }
        Ok(Self { value: nv, max_len: self.max_len })
    }

    pub fn sub(&self, other: &Self) -> u128 {
        self.value.saturating_sub(other.value)
    }

    pub fn value(&self) -> u128 {
        self.value
    }
}

impl fmt::Display for ArithAlphanumeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut digits = vec![0u128; self.max_len];
        let mut v = self.value;
        for slot in digits.iter_mut().rev() {
            *slot = v % 67;
            v /= 67;
        }
        let s: String = digits.into_iter().map(alphabet_char).collect();
        write!(f, "{s}")
    }
}

/// A single component of a compound primary key.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    Int(i128),
    Uuid(ArithUuid),
    Alphanumeric(ArithAlphanumeric),
}

impl PartialOrd for KeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (KeyValue::Int(a), KeyValue::Int(b)) => a.partial_cmp(b),
            (KeyValue::Uuid(a), KeyValue::Uuid(b)) => a.value().partial_cmp(&b.value()),
            (KeyValue::Alphanumeric(a), KeyValue::Alphanumeric(b)) => {
                a.value().partial_cmp(&b.value())
            }
            _ => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Int(i) => write!(f, "{i}"),
            KeyValue::Uuid(u) => write!(f, "{u}"),
            KeyValue::Alphanumeric(a) => write!(f, "{a}"),
        }
    }
}

impl KeyValue {
    /// One unit past this value. `TableSegment`'s range predicates are
    /// half-open (`>= min`, `< max`), so a bound taken from the actual
    /// maximum key present in a table must be bumped by one to include that
    /// row. Saturates at the type's representable maximum rather than
    /// wrapping or erroring.
    pub fn successor(&self) -> KeyValue {
        match self {
            KeyValue::Int(i) => KeyValue::Int(i.saturating_add(1)),
            KeyValue::Uuid(u) => {
                if u.value() == u128::MAX {
                    KeyValue::Uuid(*u)
                } else {
                    KeyValue::Uuid(u.add(1))
                }
            }
            KeyValue::Alphanumeric(a) => match a.add(1) {
                Ok(next) => KeyValue::Alphanumeric(next),
                Err(_) => KeyValue::Alphanumeric(a.clone()),
            },
        }
    }
}

/// A tuple of key values, one per key column, compared lexicographically.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector(pub Vec<KeyValue>);

impl Vector {
    pub fn dims(&self) -> usize {
        self.0.len()
    }

    /// Per-dimension `KeyValue::successor`, for turning an inclusive upper
    /// bound into the exclusive one `TableSegment` range predicates expect.
    pub fn successor(&self) -> Vector {
        Vector(self.0.iter().map(KeyValue::successor).collect())
    }
}

impl PartialOrd for Vector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.partial_cmp(b)? {
                Ordering::Equal => continue,
                ord => return Some(ord),
            }
        }
        Some(self.0.len().cmp(&other.0.len()))
    }
}

/// Produce `n - 1` evenly spaced interior points strictly between `lo` and
/// `hi` for a single key dimension, i.e. boundaries for `n` child segments
/// covering `[lo, hi)`. `lo` and `hi` must be the same `KeyValue` variant.
pub fn split_range(lo: &KeyValue, hi: &KeyValue, n: usize) -> Result<Vec<KeyValue>, DiffError> {
    if n <= 1 {
        return Ok(vec![]);
    }
    let n128 = n as i128;
    match (lo, hi) {
        (KeyValue::Int(a), KeyValue::Int(b)) => {
            let span = b - a;
            Ok((1..n128).map(|i| KeyValue::Int(a + (span * i) / n128)).collect())
        }
        (KeyValue::Uuid(a), KeyValue::Uuid(b)) => {
            let span = b.sub(a);
            let nu = n as u128;
            Ok((1..nu).map(|i| KeyValue::Uuid(a.add((span * i) / nu))).collect())
        }
        (KeyValue::Alphanumeric(a), KeyValue::Alphanumeric(b)) => {
            let span = b.sub(a);
            let nu = n as u128;
            (1..nu)
                .map(|i| a.add((span * i) / nu).map(KeyValue::Alphanumeric))
                .collect()
        }
        _ => Err(DiffError::KeyTypeMismatch { column: String::new() }),
    }
}
