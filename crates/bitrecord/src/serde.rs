//! JSON-deserializable layout description.
//!
//! These types describe the fields of one entity type the way a registry file
//! ships them, and convert into a validated [RecordLayout].
//!
//! ```json
//! {
//!   "name": "Goomba",
//!   "fields": [
//!     { "type": "Flag", "title": "Fast", "bit": [1, 8], "mask": 1 },
//!     { "type": "Bounded", "title": "Distance", "bit": [13, 16], "max": 16 },
//!     { "type": "BitArray", "title": "Players", "start_bit": 89, "count": 4 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    bits::RECORD_LEN,
    errors::LayoutError,
    field::{EnumEntry, FieldDescriptor},
    layout::{LayoutField, RecordLayout},
    range::BitRange,
};

/// A single bit (`7`) or an inclusive span (`[1, 8]`).
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum BitRangeDef {
    Bit(usize),
    Span([usize; 2]),
}

impl From<BitRangeDef> for BitRange {
    fn from(value: BitRangeDef) -> Self {
        match value {
            BitRangeDef::Bit(pos) => BitRange::Bit(pos),
            BitRangeDef::Span([start, end]) => BitRange::Span { start, end },
        }
    }
}

/// One raw value of an enum field and its label.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EnumEntryDef {
    pub value: u64,
    pub label: String,
}

/// Description of a single field; `type` selects the kind.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum FieldDef {
    Flag {
        title: String,
        #[serde(default)]
        comment: Option<String>,
        bit: BitRangeDef,
        mask: u64,
    },
    Enum {
        title: String,
        #[serde(default)]
        comment: Option<String>,
        bit: BitRangeDef,
        entries: Vec<EnumEntryDef>,
    },
    Bounded {
        title: String,
        #[serde(default)]
        comment: Option<String>,
        bit: BitRangeDef,
        #[serde(default)]
        min: u64,
        /// Exclusive upper bound.
        max: u64,
    },
    BitArray {
        title: String,
        #[serde(default)]
        comment: Option<String>,
        start_bit: usize,
        count: usize,
    },
}

impl From<FieldDef> for LayoutField {
    fn from(value: FieldDef) -> Self {
        let (title, comment, descriptor) = match value {
            FieldDef::Flag {
                title,
                comment,
                bit,
                mask,
            } => (title, comment, FieldDescriptor::flag(bit, mask)),
            FieldDef::Enum {
                title,
                comment,
                bit,
                entries,
            } => (
                title,
                comment,
                FieldDescriptor::choice(
                    bit,
                    entries
                        .into_iter()
                        .map(|entry| EnumEntry::new(entry.value, entry.label))
                        .collect(),
                ),
            ),
            FieldDef::Bounded {
                title,
                comment,
                bit,
                min,
                max,
            } => (
                title,
                comment,
                FieldDescriptor::Bounded {
                    range: bit.into(),
                    min,
                    max,
                },
            ),
            FieldDef::BitArray {
                title,
                comment,
                start_bit,
                count,
            } => (title, comment, FieldDescriptor::bit_array(start_bit, count)),
        };

        LayoutField {
            title,
            comment,
            descriptor,
        }
    }
}

fn default_record_len() -> usize {
    RECORD_LEN
}

/// Top-level layout definition for one entity type.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LayoutDef {
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub related_obj_files: Option<String>,
    #[serde(default = "default_record_len")]
    pub record_len: usize,
    pub fields: Vec<FieldDef>,
}

impl TryFrom<LayoutDef> for RecordLayout {
    type Error = LayoutError;

    fn try_from(value: LayoutDef) -> Result<Self, Self::Error> {
        let layout = RecordLayout {
            name: value.name,
            notes: value.notes,
            related_obj_files: value.related_obj_files,
            record_len: value.record_len,
            fields: value.fields.into_iter().map(Into::into).collect(),
        };

        layout.validate()?;
        Ok(layout)
    }
}

impl RecordLayout {
    /// Parses and validates a JSON [LayoutDef].
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let def: LayoutDef =
            serde_json::from_str(json).map_err(|e| LayoutError::Definition(e.to_string()))?;
        def.try_into()
    }
}
