//! Editing one record through several views at once.
//!
//! A [RecordEditor] owns the current [BitBuffer], one displayed value per field and
//! the raw hex text. An accepted edit from any view replaces the buffer, re-decodes
//! every other view from it and emits exactly one buffer-changed event.
//!
//! Methods take `&self` so views holding an `Rc<RecordEditor>` can call back into
//! the editor from their listeners. Edits that arrive while the editor is pushing
//! values to its views are ignored, which stops a view's programmatic refresh from
//! echoing back as a new edit.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt, mem,
};

use tracing::{debug, trace, warn};

use crate::{
    bits::BitBuffer,
    codec::{self, FieldValue},
    errors::EditError,
    field::FieldDescriptor,
    layout::RecordLayout,
    raw,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Buffer and every view agree.
    Idle,
    /// Field views are being refreshed from a new buffer.
    Propagating,
}

/// Result of an edit that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The buffer was replaced by this value.
    Applied(BitBuffer),
    /// Nothing changed: the edit arrived during propagation or selected nothing.
    Ignored,
}

struct BoundField {
    descriptor: FieldDescriptor,
    value: FieldValue,
}

struct Record {
    buffer: BitBuffer,
    fields: Vec<BoundField>,
    raw_text: String,
    raw_valid: bool,
}

type BufferListener = Box<dyn FnMut(&BitBuffer)>;
type RefreshListener = Box<dyn FnMut(usize, &FieldValue)>;

pub struct RecordEditor {
    record: RefCell<Record>,
    state: Cell<EditorState>,
    buffer_listeners: RefCell<Vec<BufferListener>>,
    refresh_listeners: RefCell<Vec<RefreshListener>>,
    pending: RefCell<VecDeque<BitBuffer>>,
    emitting: Cell<bool>,
}

fn bind(fields: impl IntoIterator<Item = FieldDescriptor>, buffer: &BitBuffer) -> Vec<BoundField> {
    fields
        .into_iter()
        .map(|descriptor| BoundField {
            value: codec::decode(&descriptor, buffer),
            descriptor,
        })
        .collect()
}

impl RecordEditor {
    pub fn new(fields: impl IntoIterator<Item = FieldDescriptor>, buffer: BitBuffer) -> Self {
        let fields = bind(fields, &buffer);
        RecordEditor {
            record: RefCell::new(Record {
                raw_text: raw::format(&buffer),
                raw_valid: true,
                buffer,
                fields,
            }),
            state: Cell::new(EditorState::Idle),
            buffer_listeners: RefCell::new(Vec::new()),
            refresh_listeners: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            emitting: Cell::new(false),
        }
    }

    pub fn from_layout(layout: &RecordLayout, buffer: BitBuffer) -> Self {
        Self::new(layout.descriptors().cloned(), buffer)
    }

    /// Registers a handler called once per accepted field or raw edit.
    pub fn on_buffer_changed(&self, handler: impl FnMut(&BitBuffer) + 'static) {
        self.buffer_listeners.borrow_mut().push(Box::new(handler));
    }

    /// Registers a handler called for every field whose value is pushed from a new
    /// buffer. The editor is [EditorState::Propagating] while it runs.
    pub fn on_field_refreshed(&self, handler: impl FnMut(usize, &FieldValue) + 'static) {
        self.refresh_listeners.borrow_mut().push(Box::new(handler));
    }

    pub fn state(&self) -> EditorState {
        self.state.get()
    }

    pub fn buffer(&self) -> BitBuffer {
        self.record.borrow().buffer.clone()
    }

    pub fn field_count(&self) -> usize {
        self.record.borrow().fields.len()
    }

    pub fn descriptor(&self, index: usize) -> Option<FieldDescriptor> {
        self.record
            .borrow()
            .fields
            .get(index)
            .map(|field| field.descriptor.clone())
    }

    /// Value currently displayed by field `index`.
    pub fn value(&self, index: usize) -> Option<FieldValue> {
        self.record
            .borrow()
            .fields
            .get(index)
            .map(|field| field.value.clone())
    }

    pub fn values(&self) -> Vec<FieldValue> {
        self.record
            .borrow()
            .fields
            .iter()
            .map(|field| field.value.clone())
            .collect()
    }

    pub fn raw_text(&self) -> String {
        self.record.borrow().raw_text.clone()
    }

    /// False after raw text that could not be parsed, until the next accepted edit.
    pub fn raw_valid(&self) -> bool {
        self.record.borrow().raw_valid
    }

    /// True if every displayed value decodes from the current buffer.
    pub fn is_consistent(&self) -> bool {
        let record = self.record.borrow();
        record
            .fields
            .iter()
            .all(|field| codec::decode(&field.descriptor, &record.buffer) == field.value)
    }

    /// Applies an edit made through field `index`'s view.
    pub fn edit_field(&self, index: usize, value: FieldValue) -> Result<EditOutcome, EditError> {
        if self.state.get() == EditorState::Propagating {
            trace!(field = index, "field_echo_ignored");
            return Ok(EditOutcome::Ignored);
        }
        if value == FieldValue::Choice(None) {
            trace!(field = index, "empty_choice_ignored");
            return Ok(EditOutcome::Ignored);
        }

        let buffer = {
            let mut guard = self.record.borrow_mut();
            let record = &mut *guard;
            let count = record.fields.len();
            let field = record
                .fields
                .get_mut(index)
                .ok_or(EditError::NoSuchField { index, count })?;

            field.descriptor.accepts(&value)?;
            let buffer = codec::encode(&field.descriptor, &record.buffer, &value)?;
            // the view shows what the buffer now holds
            let decoded = codec::decode(&field.descriptor, &buffer);
            if decoded != value {
                warn!(field = index, "field_value_does_not_round_trip");
            }

            field.value = decoded;
            record.buffer = buffer.clone();
            record.raw_text = raw::format(&buffer);
            record.raw_valid = true;
            buffer
        };

        self.propagate(Some(index));
        debug!(field = index, buffer = %buffer, "field_edited");
        self.emit(buffer.clone());

        Ok(EditOutcome::Applied(buffer))
    }

    /// Applies an edit made through the raw hex view.
    ///
    /// Rejected text is kept as typed and marks the raw view invalid; the buffer and
    /// every field stay as they were.
    pub fn edit_raw(&self, text: &str) -> Result<EditOutcome, EditError> {
        if self.state.get() == EditorState::Propagating {
            trace!("raw_echo_ignored");
            return Ok(EditOutcome::Ignored);
        }

        let buffer = {
            let mut record = self.record.borrow_mut();
            let parsed = raw::parse(text, record.buffer.len());
            record.raw_text = text.to_string();

            match parsed {
                Ok(buffer) => {
                    record.raw_valid = true;
                    record.buffer = buffer.clone();
                    buffer
                }
                Err(error) => {
                    record.raw_valid = false;
                    debug!(error = %error, "raw_text_rejected");
                    return Err(error.into());
                }
            }
        };

        self.propagate(None);
        debug!(buffer = %buffer, "raw_text_edited");
        self.emit(buffer.clone());

        Ok(EditOutcome::Applied(buffer))
    }

    /// Loads a buffer from outside the views, e.g. when another entity is selected.
    ///
    /// Every field is refreshed but no buffer-changed event is emitted.
    pub fn replace_buffer(&self, buffer: BitBuffer) -> Result<EditOutcome, EditError> {
        if self.state.get() == EditorState::Propagating {
            trace!("replace_during_propagation_ignored");
            return Ok(EditOutcome::Ignored);
        }

        {
            let mut record = self.record.borrow_mut();
            if buffer.len() != record.buffer.len() {
                return Err(EditError::LengthMismatch {
                    expected: record.buffer.len(),
                    found: buffer.len(),
                });
            }

            record.raw_text = raw::format(&buffer);
            record.raw_valid = true;
            record.buffer = buffer.clone();
        }

        self.propagate(None);
        debug!(buffer = %buffer, "buffer_replaced");

        Ok(EditOutcome::Applied(buffer))
    }

    /// Rebinds the editor to a new field list (a different entity type) and decodes
    /// it from the current buffer.
    pub fn set_layout(&self, fields: impl IntoIterator<Item = FieldDescriptor>) {
        {
            let mut record = self.record.borrow_mut();
            record.fields = bind(fields, &record.buffer);
        }

        debug!(fields = self.field_count(), "layout_changed");
        self.propagate(None);
    }

    /// Re-decodes every field except `skip` and pushes the values to refresh listeners.
    fn propagate(&self, skip: Option<usize>) {
        let previous = self.state.replace(EditorState::Propagating);

        let refreshed: Vec<(usize, FieldValue)> = {
            let mut guard = self.record.borrow_mut();
            let record = &mut *guard;
            let buffer = &record.buffer;

            record
                .fields
                .iter_mut()
                .enumerate()
                .filter(|(index, _)| Some(*index) != skip)
                .map(|(index, field)| {
                    field.value = codec::decode(&field.descriptor, buffer);
                    (index, field.value.clone())
                })
                .collect()
        };

        if !refreshed.is_empty() {
            let mut listeners = mem::take(&mut *self.refresh_listeners.borrow_mut());
            for (index, value) in &refreshed {
                for listener in listeners.iter_mut() {
                    listener(*index, value);
                }
            }

            // keep handlers registered from inside a handler
            let mut slot = self.refresh_listeners.borrow_mut();
            listeners.append(&mut slot);
            *slot = listeners;
        }

        self.state.set(previous);
    }

    /// Delivers `buffer` to every buffer listener. Edits accepted from inside a
    /// listener are queued behind the current event.
    fn emit(&self, buffer: BitBuffer) {
        self.pending.borrow_mut().push_back(buffer);
        if self.emitting.replace(true) {
            return;
        }

        loop {
            let Some(buffer) = self.pending.borrow_mut().pop_front() else {
                break;
            };

            let mut listeners = mem::take(&mut *self.buffer_listeners.borrow_mut());
            for listener in listeners.iter_mut() {
                listener(&buffer);
            }

            let mut slot = self.buffer_listeners.borrow_mut();
            listeners.append(&mut slot);
            *slot = listeners;
        }

        self.emitting.set(false);
    }
}

impl fmt::Debug for RecordEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record.borrow();
        f.debug_struct("RecordEditor")
            .field("buffer", &record.buffer)
            .field("fields", &record.fields.len())
            .field("raw_valid", &record.raw_valid)
            .field("state", &self.state.get())
            .finish()
    }
}
