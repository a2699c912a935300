//! # bitrecord
//!
//! Bit-packed fixed-size entity records, edited through typed field views and a raw
//! hex view that stay in sync.
//!
//! A record is a [BitBuffer] (12 bytes for level-editor sprites) whose fields occupy
//! arbitrary, possibly unaligned bit ranges. Each field is a [FieldDescriptor]: a
//! flag, an enumerated choice, a bounded integer or an array of independent bits.
//! [codec::decode] and [codec::encode] move typed [FieldValue]s in and out of a
//! buffer, and [RecordEditor] keeps every view of one record consistent.
//!
//! ## Example
//!
//! ```
//! use bitrecord::{BitBuffer, FieldDescriptor, FieldValue, RecordEditor};
//!
//! let editor = RecordEditor::new(
//!     vec![
//!         FieldDescriptor::flag((1, 8), 0x02),
//!         FieldDescriptor::bounded((9, 12), 16),
//!     ],
//!     BitBuffer::default(),
//! );
//! editor.on_buffer_changed(|buffer| println!("record is now {buffer}"));
//!
//! editor.edit_field(0, FieldValue::Flag(true)).unwrap();
//! editor.edit_raw("0250 0000 0000 0000 0000 0000").unwrap();
//!
//! assert_eq!(editor.value(1), Some(FieldValue::Integer(5)));
//! ```

pub mod bits;
pub mod codec;
pub mod editor;
pub mod errors;
pub mod field;
pub mod layout;
pub mod range;
pub mod raw;
#[cfg(feature = "serde")]
pub mod serde;

pub use bits::{BitBuffer, RECORD_LEN};
pub use codec::FieldValue;
pub use editor::{EditOutcome, EditorState, RecordEditor};
pub use field::{EnumEntry, FieldDescriptor};
pub use layout::{LayoutField, RecordLayout};
pub use range::BitRange;
