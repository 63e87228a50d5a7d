/// Batch input model.
///
/// Events enter the client as JSON maps, pre-serialized JSON text, or raw
/// bytes. The shape is fixed here at the boundary so the frame encoder never
/// re-inspects it downstream.

use std::borrow::Cow;

use serde_json::{Map, Value};
use thiserror::Error;

/// Batch input that is not a sequence of events of a supported shape.
/// Raised before any I/O; the caller can fix the input and resend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// The batch itself must be an array; a bare object or string is rejected
    /// rather than treated as a single-event batch.
    #[error("batch must be a sequence of events, got {found}")]
    NotASequence { found: &'static str },

    #[error("unsupported event at index {index}: {found}")]
    UnsupportedElement { index: usize, found: &'static str },
}

/// A single log record. The protocol only reads it.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Key/value record, serialized to JSON text on encode.
    Json(Map<String, Value>),
    /// Pre-serialized JSON text, UTF-8 encoded on the wire.
    Text(String),
    /// Pre-serialized payload, passed through unchanged.
    Raw(Vec<u8>),
}

impl Event {
    /// The payload bytes carried in this event's json data frame.
    pub fn payload_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            // String-keyed maps always serialize.
            Event::Json(map) => Cow::Owned(serde_json::to_vec(map).unwrap()),
            Event::Text(text) => Cow::Borrowed(text.as_bytes()),
            Event::Raw(bytes) => Cow::Borrowed(bytes),
        }
    }
}

/// An ordered batch of events submitted in one `send` call. May be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    events: Vec<Event>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a dynamic JSON value as a batch.
    ///
    /// The value must be an array whose elements are objects or strings;
    /// anything else names the offending index and observed type.
    pub fn from_value(value: Value) -> Result<Self, InputError> {
        let elements = match value {
            Value::Array(elements) => elements,
            other => {
                return Err(InputError::NotASequence {
                    found: json_type_name(&other),
                });
            }
        };

        let mut events = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            match element {
                Value::Object(map) => events.push(Event::Json(map)),
                Value::String(text) => events.push(Event::Text(text)),
                other => {
                    return Err(InputError::UnsupportedElement {
                        index,
                        found: json_type_name(&other),
                    });
                }
            }
        }
        Ok(Self { events })
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }
}

impl From<Vec<Event>> for Batch {
    fn from(events: Vec<Event>) -> Self {
        Self { events }
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
