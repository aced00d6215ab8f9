//! Numeric constants shared by the checksum formula and type-precision defaults.
//!
//! Mirrors the constants every dialect's `md5_as_int` must agree on bit-for-bit;
//! changing any of these breaks cross-dialect checksum equality.

/// Hex digits of the MD5 hash kept after truncation. Must stay at or below 15
/// so the resulting integer fits a signed 64-bit column on every engine.
pub const CHECKSUM_HEXDIGITS: u32 = 15;

/// Hex digits in a full MD5 digest.
pub const MD5_HEXDIGITS: u32 = 32;

/// Bit width of the truncated checksum (`CHECKSUM_HEXDIGITS` nibbles).
pub const CHECKSUM_BITSIZE: u32 = CHECKSUM_HEXDIGITS * 4;

/// Subtracted from the unsigned truncated hash to center it on zero,
/// i.e. map `[0, 2^60)` to `[-2^59, 2^59)`.
pub const CHECKSUM_OFFSET: i64 = 1i64 << 59;

/// Default fractional-seconds precision assumed when a dialect doesn't report one.
pub const DEFAULT_DATETIME_PRECISION: u32 = 6;

/// Default numeric precision assumed when a dialect doesn't report one.
pub const DEFAULT_NUMERIC_PRECISION: u32 = 24;

/// `len("2022-06-03 12:24:35.")` — offset of the fractional-seconds digits
/// within a normalized timestamp string.
pub const TIMESTAMP_PRECISION_POS: usize = 20;

/// The 67-symbol alphabet alphanumeric primary keys are restricted to, in
/// ascending order. Symbol 0 (`' '`) is also the right-pad character.
pub const ALPHANUMERIC_ALPHABET: &str =
    " -0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Default number of rows sampled per Text column when inferring UUID/alphanumeric subtypes.
pub const SCHEMA_SAMPLE_SIZE: usize = 16;

/// Warn when a single `count_and_checksum` query takes longer than this.
pub const SLOW_QUERY_WARNING_SECS: u64 = 20;
