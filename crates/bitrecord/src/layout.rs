//! Record layouts: the labelled field list a registry supplies for one entity type.

use crate::{
    bits::RECORD_LEN,
    errors::LayoutError,
    field::FieldDescriptor,
};

/// A field together with the text shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutField {
    pub title: String,
    /// Tooltip text.
    pub comment: Option<String>,
    pub descriptor: FieldDescriptor,
}

impl LayoutField {
    pub fn new(title: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        LayoutField {
            title: title.into(),
            comment: None,
            descriptor,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// All fields of one entity type, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    pub name: String,
    pub notes: Option<String>,
    /// Other object files the entity's graphics are loaded from.
    pub related_obj_files: Option<String>,
    /// Record length in bytes.
    pub record_len: usize,
    pub fields: Vec<LayoutField>,
}

impl RecordLayout {
    pub fn new(name: impl Into<String>, fields: Vec<LayoutField>) -> Self {
        RecordLayout {
            name: name.into(),
            notes: None,
            related_obj_files: None,
            record_len: RECORD_LEN,
            fields,
        }
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().map(|field| &field.descriptor)
    }

    /// Checks every field against the record and against each other.
    ///
    /// The editor assumes a layout that passes this check; it does not repeat it.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.record_len == 0 {
            return Err(LayoutError::EmptyRecord);
        }

        let bit_len = self
            .record_len
            .checked_mul(8)
            .ok_or(LayoutError::RecordTooLong(self.record_len))?;
        for field in &self.fields {
            validate_field(field, bit_len)?;
        }

        for (i, first) in self.fields.iter().enumerate() {
            if let Some(second) = self.fields[i + 1..]
                .iter()
                .find(|other| first.descriptor.overlaps(&other.descriptor))
            {
                return Err(LayoutError::Overlap {
                    first: first.title.clone(),
                    second: second.title.clone(),
                });
            }
        }

        Ok(())
    }
}

fn validate_field(field: &LayoutField, bit_len: usize) -> Result<(), LayoutError> {
    let name = || field.title.clone();
    let span = field.descriptor.bit_span();
    let (start, end) = span.bounds();

    if start == 0 || span.width() == 0 {
        return Err(LayoutError::EmptyRange { field: name() });
    }
    if end > bit_len {
        return Err(LayoutError::RangeOutsideRecord {
            field: name(),
            end,
            bit_len,
        });
    }

    match &field.descriptor {
        FieldDescriptor::BitArray { .. } => Ok(()),
        _ if span.width() > 64 => Err(LayoutError::FieldTooWide {
            field: name(),
            width: span.width(),
        }),
        FieldDescriptor::Flag { range, mask } => {
            if *mask == 0 || (*mask & !range.all_ones()) != 0 {
                return Err(LayoutError::InvalidMask {
                    field: name(),
                    mask: *mask,
                });
            }
            Ok(())
        }
        FieldDescriptor::Enum { range, domain } => {
            if domain.is_empty() {
                return Err(LayoutError::EmptyDomain { field: name() });
            }
            if let Some(entry) = domain.iter().find(|entry| entry.value > range.all_ones()) {
                return Err(LayoutError::ValueTooWide {
                    field: name(),
                    value: entry.value,
                });
            }
            for (i, entry) in domain.iter().enumerate() {
                if domain[..i].iter().any(|earlier| earlier.value == entry.value) {
                    return Err(LayoutError::DuplicateValue {
                        field: name(),
                        value: entry.value,
                    });
                }
            }
            Ok(())
        }
        FieldDescriptor::Bounded { range, min, max } => {
            // max is exclusive, so a full-width field may declare all_ones + 1
            let limit = range.all_ones().saturating_add(1);
            if min >= max || (*max > limit && range.width() < 64) {
                return Err(LayoutError::InvalidBounds {
                    field: name(),
                    min: *min,
                    max: *max,
                });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::EnumEntry;

    fn layout(fields: Vec<LayoutField>) -> RecordLayout {
        RecordLayout::new("test sprite", fields)
    }

    #[test]
    fn test_valid_layout() {
        let layout = layout(vec![
            LayoutField::new("Fast", FieldDescriptor::flag((1, 8), 0x01)),
            LayoutField::new(
                "Direction",
                FieldDescriptor::choice(
                    (9, 12),
                    vec![EnumEntry::new(0, "Left"), EnumEntry::new(1, "Right")],
                ),
            ),
            LayoutField::new("Distance", FieldDescriptor::bounded((13, 16), 16))
                .with_comment("Tiles travelled"),
            LayoutField::new("Players", FieldDescriptor::bit_array(89, 8)),
        ]);

        assert_eq!(layout.validate(), Ok(()));
        assert_eq!(layout.descriptors().count(), 4);
    }

    #[test]
    fn test_flags_sharing_a_byte() {
        let shared = layout(vec![
            LayoutField::new("A", FieldDescriptor::flag((1, 8), 0x01)),
            LayoutField::new("B", FieldDescriptor::flag((1, 8), 0x02)),
        ]);
        assert_eq!(shared.validate(), Ok(()));

        let layout = layout(vec![
            LayoutField::new("A", FieldDescriptor::flag((1, 8), 0x03)),
            LayoutField::new("B", FieldDescriptor::flag((1, 8), 0x02)),
        ]);

        assert_eq!(
            layout.validate(),
            Err(LayoutError::Overlap {
                first: "A".to_string(),
                second: "B".to_string()
            })
        );
    }

    #[test]
    fn test_range_outside_record() {
        let layout = layout(vec![LayoutField::new(
            "Tail",
            FieldDescriptor::bit_array(90, 8),
        )]);

        assert_eq!(
            layout.validate(),
            Err(LayoutError::RangeOutsideRecord {
                field: "Tail".to_string(),
                end: 97,
                bit_len: 96
            })
        );
    }

    #[test]
    fn test_empty_range() {
        let layout = layout(vec![LayoutField::new("Zero", FieldDescriptor::flag(0, 1))]);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::EmptyRange { .. })
        ));
    }

    #[test]
    fn test_invalid_mask() {
        let layout = layout(vec![LayoutField::new(
            "Flag",
            FieldDescriptor::flag((1, 4), 0x10),
        )]);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::InvalidMask { mask: 0x10, .. })
        ));
    }

    #[test]
    fn test_enum_value_too_wide() {
        let layout = layout(vec![LayoutField::new(
            "Kind",
            FieldDescriptor::choice((1, 2), vec![EnumEntry::new(4, "Four")]),
        )]);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::ValueTooWide { value: 4, .. })
        ));
    }

    #[test]
    fn test_enum_duplicate_value() {
        let layout = layout(vec![LayoutField::new(
            "Kind",
            FieldDescriptor::choice(
                (1, 4),
                vec![
                    EnumEntry::new(1, "One"),
                    EnumEntry::new(2, "Two"),
                    EnumEntry::new(2, "Also two"),
                ],
            ),
        )]);
        assert_eq!(
            layout.validate(),
            Err(LayoutError::DuplicateValue {
                field: "Kind".to_string(),
                value: 2
            })
        );
    }

    #[test]
    fn test_bit_array_past_the_last_position() {
        let layout = layout(vec![LayoutField::new(
            "Tail",
            FieldDescriptor::bit_array(usize::MAX, 2),
        )]);
        assert_eq!(
            layout.validate(),
            Err(LayoutError::RangeOutsideRecord {
                field: "Tail".to_string(),
                end: usize::MAX,
                bit_len: 96
            })
        );
    }

    #[test]
    fn test_record_too_long() {
        let mut layout = layout(Vec::new());
        layout.record_len = usize::MAX;
        assert_eq!(
            layout.validate(),
            Err(LayoutError::RecordTooLong(usize::MAX))
        );
    }

    #[test]
    fn test_bounded_limits() {
        let full = layout(vec![LayoutField::new(
            "Byte",
            FieldDescriptor::bounded((1, 8), 256),
        )]);
        assert_eq!(full.validate(), Ok(()));

        let too_big = layout(vec![LayoutField::new(
            "Byte",
            FieldDescriptor::bounded((1, 8), 257),
        )]);
        assert!(matches!(
            too_big.validate(),
            Err(LayoutError::InvalidBounds { max: 257, .. })
        ));

        let empty = layout(vec![LayoutField::new(
            "Byte",
            FieldDescriptor::bounded((1, 8), 0),
        )]);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_too_wide() {
        let layout = layout(vec![LayoutField::new(
            "Wide",
            FieldDescriptor::bounded((1, 72), 10),
        )]);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::FieldTooWide { width: 72, .. })
        ));
    }
}
