//! Field descriptors: where a field lives in a record and what values it takes.

use crate::{codec::FieldValue, errors::CodecError, range::BitRange};

/// One raw value of an enumerated field and its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub value: u64,
    pub label: String,
}

impl EnumEntry {
    pub fn new(value: u64, label: impl Into<String>) -> Self {
        EnumEntry {
            value,
            label: label.into(),
        }
    }
}

/// A single field of a record. Descriptors never own the buffer, they only say how
/// to read and write their bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDescriptor {
    /// Boolean: set iff every bit of `mask` is set within `range`.
    Flag { range: BitRange, mask: u64 },
    /// One of a finite ordered list of raw values.
    Enum {
        range: BitRange,
        domain: Vec<EnumEntry>,
    },
    /// Integer in `min..max`.
    Bounded { range: BitRange, min: u64, max: u64 },
    /// `count` independent flags at bits `start_bit..start_bit + count`.
    BitArray { start_bit: usize, count: usize },
}

impl FieldDescriptor {
    pub fn flag(range: impl Into<BitRange>, mask: u64) -> Self {
        FieldDescriptor::Flag {
            range: range.into(),
            mask,
        }
    }

    pub fn choice(range: impl Into<BitRange>, domain: Vec<EnumEntry>) -> Self {
        FieldDescriptor::Enum {
            range: range.into(),
            domain,
        }
    }

    /// Integer in `0..max`, the way layouts declare their value fields.
    pub fn bounded(range: impl Into<BitRange>, max: u64) -> Self {
        FieldDescriptor::Bounded {
            range: range.into(),
            min: 0,
            max,
        }
    }

    pub fn bit_array(start_bit: usize, count: usize) -> Self {
        FieldDescriptor::BitArray { start_bit, count }
    }

    /// Short name of the kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldDescriptor::Flag { .. } => "flag",
            FieldDescriptor::Enum { .. } => "choice",
            FieldDescriptor::Bounded { .. } => "integer",
            FieldDescriptor::BitArray { .. } => "bits",
        }
    }

    /// The contiguous bits the field occupies. A bit array running past the last
    /// addressable position ends at `usize::MAX`.
    pub fn bit_span(&self) -> BitRange {
        match self {
            FieldDescriptor::Flag { range, .. }
            | FieldDescriptor::Enum { range, .. }
            | FieldDescriptor::Bounded { range, .. } => *range,
            FieldDescriptor::BitArray { start_bit, count } => {
                match start_bit.checked_add(*count) {
                    Some(past_end) => BitRange::span(*start_bit, past_end.saturating_sub(1)),
                    None => BitRange::span(*start_bit, usize::MAX),
                }
            }
        }
    }

    pub fn width(&self) -> usize {
        self.bit_span().width()
    }

    /// Bit positions the field can change. A flag only claims its mask bits, so
    /// several flags may share one range.
    pub fn occupied_bits(&self) -> Vec<usize> {
        let (start, end) = self.bit_span().bounds();
        match self {
            FieldDescriptor::Flag { mask, .. } => (start..=end)
                .filter(|pos| {
                    let shift = end - pos;
                    shift < 64 && (*mask >> shift) & 1 == 1
                })
                .collect(),
            _ => (start..=end).collect(),
        }
    }

    pub fn overlaps(&self, other: &FieldDescriptor) -> bool {
        if !self.bit_span().overlaps(&other.bit_span()) {
            return false;
        }

        let ours = self.occupied_bits();
        other
            .occupied_bits()
            .iter()
            .any(|pos| ours.contains(pos))
    }

    /// Checks that `value` has this field's kind and lies in its domain. Successful
    /// checks guarantee [crate::codec::encode] writes a value that decodes back.
    pub fn accepts(&self, value: &FieldValue) -> Result<(), CodecError> {
        match (self, value) {
            (FieldDescriptor::Flag { .. }, FieldValue::Flag(_)) => Ok(()),
            (FieldDescriptor::Enum { domain, .. }, FieldValue::Choice(choice)) => match choice {
                Some(index) if *index >= domain.len() => Err(CodecError::UnknownChoice {
                    index: *index,
                    len: domain.len(),
                }),
                _ => Ok(()),
            },
            (FieldDescriptor::Bounded { range, min, max }, FieldValue::Integer(value)) => {
                if value < min || value >= max || *value > range.all_ones() {
                    return Err(CodecError::OutOfRange {
                        value: *value,
                        min: *min,
                        max: (*max).min(range.all_ones().saturating_add(1)),
                    });
                }
                Ok(())
            }
            (FieldDescriptor::BitArray { count, .. }, FieldValue::Bits(bits)) => {
                if bits.len() != *count {
                    return Err(CodecError::BitCountMismatch {
                        expected: *count,
                        found: bits.len(),
                    });
                }
                Ok(())
            }
            (descriptor, value) => Err(CodecError::KindMismatch {
                expected: descriptor.kind_name(),
                found: value.kind_name(),
            }),
        }
    }
}
