//! Typed values, the field sink every target type implements, and the
//! registry that maps configured target names to record factories.
use std::any::Any;
use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// A coerced cell value handed to a record's field sink.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(value) => Some(*value),
            Value::DateTime(value) => Some(value.date()),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(value) => Some(*value),
            _ => None,
        }
    }
}

/// Errors a record may raise while accepting a field value.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FieldSinkError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{field}' cannot accept a {kind} value")]
    TypeMismatch { field: String, kind: &'static str },
}

/// Implemented by every extraction target: accepts coerced values by field
/// name. Unknown names and wrong value kinds are the implementor's call to
/// reject; rejections become recorded field errors, never panics.
pub trait FieldSink {
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldSinkError>;
}

/// Type-erased record as stored in extraction results. Auto-implemented for
/// any `FieldSink` that is also `Any`, so callers only ever write a
/// `FieldSink` impl.
pub trait Record: Any {
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldSinkError>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: FieldSink + Any> Record for T {
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldSinkError> {
        FieldSink::set_field(self, name, value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

type RecordFactory = Box<dyn Fn() -> Box<dyn Record>>;

/// Maps the configuration's `targetClass` names to record factories.
/// Extractors whose target has no binding are skipped; registered targets
/// with no extractor are reported as structural errors.
#[derive(Default)]
pub struct TargetRegistry {
    factories: HashMap<String, RecordFactory>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a target name to a default-constructed record type.
    pub fn register<R>(&mut self, target_class: &str)
    where
        R: FieldSink + Any + Default,
    {
        self.factories.insert(
            target_class.to_owned(),
            Box::new(|| Box::new(R::default()) as Box<dyn Record>),
        );
    }

    pub fn contains(&self, target_class: &str) -> bool {
        self.factories.contains_key(target_class)
    }

    pub(crate) fn create(&self, target_class: &str) -> Option<Box<dyn Record>> {
        self.factories.get(target_class).map(|factory| factory())
    }

    pub(crate) fn targets(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
