//! Decoding and encoding typed field values against a [BitBuffer].

use crate::{bits::BitBuffer, errors::CodecError, field::FieldDescriptor};

/// A typed value shown by one field view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Flag(bool),
    /// Index into the enum domain; `None` when the raw value is not in the domain.
    Choice(Option<usize>),
    Integer(u64),
    Bits(Vec<bool>),
}

impl FieldValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Flag(_) => "flag",
            FieldValue::Choice(_) => "choice",
            FieldValue::Integer(_) => "integer",
            FieldValue::Bits(_) => "bits",
        }
    }
}

/// Reads the field's current value out of `buffer`.
pub fn decode(field: &FieldDescriptor, buffer: &BitBuffer) -> FieldValue {
    match field {
        FieldDescriptor::Flag { range, mask } => {
            FieldValue::Flag((buffer.get(*range) & *mask) == *mask)
        }
        FieldDescriptor::Enum { range, domain } => {
            let raw = buffer.get(*range);
            FieldValue::Choice(domain.iter().position(|entry| entry.value == raw))
        }
        FieldDescriptor::Bounded { range, .. } => FieldValue::Integer(buffer.get(*range)),
        FieldDescriptor::BitArray { start_bit, count } => FieldValue::Bits(
            (0..*count)
                .map(|i| start_bit.checked_add(i).is_some_and(|pos| buffer.bit(pos)))
                .collect(),
        ),
    }
}

/// Writes `value` into a copy of `buffer`, leaving every bit outside the field (and,
/// for flags, outside the mask) untouched.
///
/// Domain bounds are not checked here, see [FieldDescriptor::accepts].
pub fn encode(
    field: &FieldDescriptor,
    buffer: &BitBuffer,
    value: &FieldValue,
) -> Result<BitBuffer, CodecError> {
    match (field, value) {
        (FieldDescriptor::Flag { range, mask }, FieldValue::Flag(checked)) => {
            let keep = *mask ^ range.all_ones();
            let mut raw = buffer.get(*range) & keep;
            if *checked {
                raw |= *mask;
            }

            Ok(buffer.set(*range, raw))
        }
        (FieldDescriptor::Enum { range, domain }, FieldValue::Choice(choice)) => match choice {
            None => Ok(buffer.clone()),
            Some(index) => {
                let entry = domain.get(*index).ok_or(CodecError::UnknownChoice {
                    index: *index,
                    len: domain.len(),
                })?;

                Ok(buffer.set(*range, entry.value))
            }
        },
        (FieldDescriptor::Bounded { range, .. }, FieldValue::Integer(raw)) => {
            Ok(buffer.set(*range, *raw))
        }
        (FieldDescriptor::BitArray { start_bit, count }, FieldValue::Bits(bits)) => {
            if bits.len() != *count {
                return Err(CodecError::BitCountMismatch {
                    expected: *count,
                    found: bits.len(),
                });
            }

            let mut out = buffer.clone();
            for (i, &wanted) in bits.iter().enumerate() {
                let Some(pos) = start_bit.checked_add(i) else {
                    break;
                };
                if out.bit(pos) != wanted {
                    out = out.with_bit(pos, wanted);
                }
            }

            Ok(out)
        }
        (field, value) => Err(CodecError::KindMismatch {
            expected: field.kind_name(),
            found: value.kind_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::EnumEntry;

    fn zeroes() -> BitBuffer {
        BitBuffer::zeroed(12)
    }

    #[test]
    fn test_flag_sets_only_its_mask() {
        let flag = FieldDescriptor::flag((1, 8), 0x02);
        let neighbour = FieldDescriptor::flag((1, 8), 0x01);

        let buffer = encode(&flag, &zeroes(), &FieldValue::Flag(true)).unwrap();
        assert_eq!(buffer.as_bytes()[0], 0x02);
        assert_eq!(decode(&flag, &buffer), FieldValue::Flag(true));
        assert_eq!(decode(&neighbour, &buffer), FieldValue::Flag(false));
    }

    #[test]
    fn test_flag_clear_preserves_other_bits() {
        let flag = FieldDescriptor::flag((1, 8), 0x30);
        let buffer = BitBuffer::from_bytes(&[0xFF, 0x00]);

        let cleared = encode(&flag, &buffer, &FieldValue::Flag(false)).unwrap();
        assert_eq!(cleared.as_bytes(), &[0xCF, 0x00]);
    }

    #[test]
    fn test_flag_partial_mask_is_unset() {
        let flag = FieldDescriptor::flag((1, 8), 0x03);
        let buffer = BitBuffer::from_bytes(&[0x01]);
        assert_eq!(decode(&flag, &buffer), FieldValue::Flag(false));
    }

    #[test]
    fn test_single_bit_flag() {
        let flag = FieldDescriptor::flag(12, 1);
        let buffer = encode(&flag, &zeroes(), &FieldValue::Flag(true)).unwrap();
        assert_eq!(buffer.as_bytes()[1], 0b0001_0000);
        assert_eq!(decode(&flag, &buffer), FieldValue::Flag(true));
    }

    #[test]
    fn test_enum_decode_known_and_unknown() {
        let field = FieldDescriptor::choice(
            (5, 8),
            vec![EnumEntry::new(0, "left"), EnumEntry::new(3, "right")],
        );

        let buffer = BitBuffer::from_bytes(&[0x03]);
        assert_eq!(decode(&field, &buffer), FieldValue::Choice(Some(1)));

        let buffer = BitBuffer::from_bytes(&[0x07]);
        assert_eq!(decode(&field, &buffer), FieldValue::Choice(None));
    }

    #[test]
    fn test_enum_encode() {
        let field = FieldDescriptor::choice(
            (5, 8),
            vec![EnumEntry::new(0, "left"), EnumEntry::new(3, "right")],
        );
        let buffer = BitBuffer::from_bytes(&[0xA0]);

        let updated = encode(&field, &buffer, &FieldValue::Choice(Some(1))).unwrap();
        assert_eq!(updated.as_bytes(), &[0xA3]);

        let untouched = encode(&field, &buffer, &FieldValue::Choice(None)).unwrap();
        assert_eq!(untouched, buffer);

        assert!(encode(&field, &buffer, &FieldValue::Choice(Some(2))).is_err());
    }

    #[test]
    fn test_bounded() {
        let field = FieldDescriptor::bounded((13, 20), 256);
        let buffer = encode(&field, &zeroes(), &FieldValue::Integer(0xAB)).unwrap();

        assert_eq!(&buffer.as_bytes()[1..3], &[0x0A, 0xB0]);
        assert_eq!(decode(&field, &buffer), FieldValue::Integer(0xAB));
    }

    #[test]
    fn test_bit_array_decode() {
        let field = FieldDescriptor::bit_array(1, 8);
        let mut bytes = [0u8; 12];
        bytes[0] = 0b1011_0000;
        let buffer = BitBuffer::from(bytes);

        assert_eq!(
            decode(&field, &buffer),
            FieldValue::Bits(vec![true, false, true, true, false, false, false, false])
        );
    }

    #[test]
    fn test_bit_array_set_one_keeps_neighbours() {
        let field = FieldDescriptor::bit_array(1, 8);
        let mut bytes = [0u8; 12];
        bytes[0] = 0b1011_0000;
        let buffer = BitBuffer::from(bytes);

        let mut bits = match decode(&field, &buffer) {
            FieldValue::Bits(bits) => bits,
            other => panic!("unexpected {other:?}"),
        };
        bits[1] = true;
        let updated = encode(&field, &buffer, &FieldValue::Bits(bits)).unwrap();

        assert_eq!(updated.as_bytes()[0], 0b1111_0000);
        match decode(&field, &updated) {
            FieldValue::Bits(bits) => assert!(bits[0]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bit_array_clear() {
        let field = FieldDescriptor::bit_array(5, 4);
        let buffer = BitBuffer::from_bytes(&[0xFF]);
        let updated = encode(
            &field,
            &buffer,
            &FieldValue::Bits(vec![false, true, false, true]),
        )
        .unwrap();
        assert_eq!(updated.as_bytes(), &[0b1111_0101]);
    }

    #[test]
    fn test_bit_array_at_the_last_position() {
        let field = FieldDescriptor::bit_array(usize::MAX, 2);
        let buffer = BitBuffer::from_bytes(&[0xFF]);

        assert_eq!(decode(&field, &buffer), FieldValue::Bits(vec![false, false]));
        let updated = encode(&field, &buffer, &FieldValue::Bits(vec![true, true])).unwrap();
        assert_eq!(updated, buffer);
    }

    #[test]
    fn test_kind_mismatch() {
        let field = FieldDescriptor::bit_array(1, 2);
        assert_eq!(
            encode(&field, &zeroes(), &FieldValue::Flag(true)).unwrap_err(),
            CodecError::KindMismatch {
                expected: "bits",
                found: "flag"
            }
        );
    }
}
