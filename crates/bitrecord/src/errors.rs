//! Error types for bit access, field encoding, raw text parsing and layouts.

use thiserror::Error;

/// Errors produced by the strict reads in [crate::bits::BitBuffer::checked_get].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Requested bit range reaches past the end of the buffer (or starts at bit 0).
    #[error("bit range {start}..={end} is outside a {bit_len}-bit buffer")]
    OutOfBounds {
        start: usize,
        end: usize,
        bit_len: usize,
    },
    /// More than 64 bits were requested in a single read.
    #[error("cannot read {0} bits into a u64")]
    TooManyBitsRead(usize),
}

/// Errors produced by the strict writes in [crate::bits::BitBuffer::checked_set].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// Requested bit range reaches past the end of the buffer (or starts at bit 0).
    #[error("bit range {start}..={end} is outside a {bit_len}-bit buffer")]
    OutOfBounds {
        start: usize,
        end: usize,
        bit_len: usize,
    },
}

/// Errors produced when a [crate::codec::FieldValue] cannot be written through a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The value kind does not match the descriptor kind (e.g. an integer for a flag).
    #[error("expected a {expected} value, got {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Choice index is past the end of the enum domain.
    #[error("choice {index} is outside a domain of {len} entries")]
    UnknownChoice { index: usize, len: usize },
    /// Bit array value has the wrong number of bits.
    #[error("expected {expected} bits, got {found}")]
    BitCountMismatch { expected: usize, found: usize },
    /// Integer is outside the bounded field's range.
    #[error("value {value} is outside {min}..{max}")]
    OutOfRange { value: u64, min: u64, max: u64 },
}

/// Errors produced when parsing the raw hex view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RawTextError {
    /// Wrong number of hex digits once whitespace is removed.
    #[error("expected {expected} hex digits, found {found}")]
    WrongLength { expected: usize, found: usize },
    /// Text contains a character that is not a hex digit.
    #[error("raw text is not valid hex")]
    InvalidHex,
}

/// Errors returned by [crate::editor::RecordEditor] edit operations.
///
/// A failed edit never touches the live buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no field at index {index} (editor has {count})")]
    NoSuchField { index: usize, count: usize },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    RawText(#[from] RawTextError),
    /// Replacement buffer length differs from the record length.
    #[error("expected a {expected}-byte record, got {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Errors produced by [crate::layout::RecordLayout::validate].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Field covers no bits (bit 0, reversed span, zero-count bit array).
    #[error("field `{field}` has an empty bit range")]
    EmptyRange { field: String },
    /// Field reaches past the end of the record.
    #[error("field `{field}` ends at bit {end}, past the {bit_len}-bit record")]
    RangeOutsideRecord {
        field: String,
        end: usize,
        bit_len: usize,
    },
    /// Scalar field is wider than 64 bits.
    #[error("field `{field}` is {width} bits wide, at most 64 are supported")]
    FieldTooWide { field: String, width: usize },
    /// Flag mask is zero or has bits outside the field width.
    #[error("field `{field}` has mask {mask:#x} that does not fit its range")]
    InvalidMask { field: String, mask: u64 },
    /// Enum field has no entries.
    #[error("field `{field}` has an empty domain")]
    EmptyDomain { field: String },
    /// Enum entry raw value cannot be stored in the field's bits.
    #[error("field `{field}` entry value {value} does not fit its range")]
    ValueTooWide { field: String, value: u64 },
    /// Two enum entries share a raw value, so the second can never be displayed.
    #[error("field `{field}` has more than one entry with value {value}")]
    DuplicateValue { field: String, value: u64 },
    /// Bounded field range is empty or exceeds what the bits can hold.
    #[error("field `{field}` bounds {min}..{max} do not fit its range")]
    InvalidBounds { field: String, min: u64, max: u64 },
    /// Two fields claim the same bits.
    #[error("fields `{first}` and `{second}` overlap")]
    Overlap { first: String, second: String },
    /// Record length is zero.
    #[error("record length must be non-zero")]
    EmptyRecord,
    /// Record length in bits does not fit a `usize`.
    #[error("record length {0} is too large")]
    RecordTooLong(usize),
    /// JSON definition could not be deserialised.
    #[error("invalid layout definition: {0}")]
    Definition(String),
}
