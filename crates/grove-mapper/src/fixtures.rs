//! Hand-written mapped types used by the crate's tests: a profile with a
//! single embedded summary, an ordered statement list, and a lazy audit
//! log.

use std::any::Any;

use grove_types::{ResourceId, Value, ValueKind};

use crate::classify::FieldDescriptor;
use crate::error::{MapperError, MapperResult};
use crate::object::{FieldValue, MappedObject};

pub const TERMS_TEXT: &str = "http://grove.org/terms/text";
pub const TERMS_TITLE: &str = "http://grove.org/terms/title";
pub const TERMS_YEAR: &str = "http://grove.org/terms/year";
pub const TERMS_LICENSE: &str = "http://grove.org/terms/license";
pub const TERMS_SUMMARY: &str = "http://grove.org/terms/summary";
pub const TERMS_STATEMENT: &str = "http://grove.org/terms/statement";
pub const TERMS_LOG: &str = "http://grove.org/terms/log";

fn downcast<T: 'static>(field: &str, child: Box<dyn MappedObject>) -> MapperResult<T> {
    child
        .into_any()
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| MapperError::EmbeddedType {
            field: field.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Statement: a minimal embedded resource
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statement {
    pub id: Option<ResourceId>,
    pub text: String,
}

impl Statement {
    pub fn new(text: &str) -> Self {
        Self {
            id: None,
            text: text.to_string(),
        }
    }

    const DESCRIPTORS: &'static [FieldDescriptor] =
        &[FieldDescriptor::literal("text", TERMS_TEXT, ValueKind::String)];
}

impl MappedObject for Statement {
    fn type_namespace(&self) -> &'static str {
        "http://grove.org/types/statement"
    }

    fn type_segment(&self) -> &'static str {
        "statement"
    }

    fn id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }

    fn assign_id(&mut self, id: ResourceId) {
        self.id = Some(id);
    }

    fn descriptors(&self) -> &'static [FieldDescriptor] {
        Self::DESCRIPTORS
    }

    fn field_value(&self, field: &str) -> FieldValue {
        match field {
            "text" => FieldValue::Literal(Value::String(self.text.clone())),
            _ => FieldValue::Absent,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapperResult<()> {
        match (field, value) {
            ("text", FieldValue::Literal(Value::String(text))) => {
                self.text = text;
                Ok(())
            }
            ("text", FieldValue::Absent) => Ok(()),
            _ => Err(MapperError::UnknownField {
                type_segment: "statement".into(),
                field: field.to_string(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

// ---------------------------------------------------------------------------
// LogEntry: element type of the lazy list
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogEntry {
    pub id: Option<ResourceId>,
    pub message: String,
}

impl LogEntry {
    pub fn new(message: &str) -> Self {
        Self {
            id: None,
            message: message.to_string(),
        }
    }

    const DESCRIPTORS: &'static [FieldDescriptor] =
        &[FieldDescriptor::literal("message", TERMS_TEXT, ValueKind::String)];
}

impl MappedObject for LogEntry {
    fn type_namespace(&self) -> &'static str {
        "http://grove.org/types/log-entry"
    }

    fn type_segment(&self) -> &'static str {
        "log"
    }

    fn id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }

    fn assign_id(&mut self, id: ResourceId) {
        self.id = Some(id);
    }

    fn descriptors(&self) -> &'static [FieldDescriptor] {
        Self::DESCRIPTORS
    }

    fn field_value(&self, field: &str) -> FieldValue {
        match field {
            "message" => FieldValue::Literal(Value::String(self.message.clone())),
            _ => FieldValue::Absent,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapperResult<()> {
        match (field, value) {
            ("message", FieldValue::Literal(Value::String(message))) => {
                self.message = message;
                Ok(())
            }
            ("message", FieldValue::Absent) => Ok(()),
            _ => Err(MapperError::UnknownField {
                type_segment: "log".into(),
                field: field.to_string(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

// ---------------------------------------------------------------------------
// Profile: the root type exercising every field role
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profile {
    pub id: Option<ResourceId>,
    pub title: String,
    pub year: Option<i64>,
    pub license: Option<ResourceId>,
    pub summary: Option<Statement>,
    pub statements: Vec<Statement>,
    pub audit_log: Vec<LogEntry>,
}

impl Profile {
    pub fn with_id(uri: &str) -> Self {
        Self {
            id: Some(ResourceId::parse(uri).expect("fixture uri")),
            ..Self::default()
        }
    }

    const DESCRIPTORS: &'static [FieldDescriptor] = &[
        FieldDescriptor::literal("title", TERMS_TITLE, ValueKind::String),
        FieldDescriptor::literal("year", TERMS_YEAR, ValueKind::Integer),
        FieldDescriptor::link("license", TERMS_LICENSE),
        FieldDescriptor::resource("summary", TERMS_SUMMARY, || {
            Box::new(Statement::default())
        }),
        FieldDescriptor::list("statements", TERMS_STATEMENT, || {
            Box::new(Statement::default())
        }),
        FieldDescriptor::lazy_list("audit_log", TERMS_LOG, || Box::new(LogEntry::default())),
    ];
}

impl MappedObject for Profile {
    fn type_namespace(&self) -> &'static str {
        "http://grove.org/types/profile"
    }

    fn type_segment(&self) -> &'static str {
        "profile"
    }

    fn id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }

    fn assign_id(&mut self, id: ResourceId) {
        self.id = Some(id);
    }

    fn descriptors(&self) -> &'static [FieldDescriptor] {
        Self::DESCRIPTORS
    }

    fn field_value(&self, field: &str) -> FieldValue {
        match field {
            "title" => FieldValue::Literal(Value::String(self.title.clone())),
            "year" => match self.year {
                Some(y) => FieldValue::Literal(Value::Integer(y)),
                None => FieldValue::Absent,
            },
            "license" => match &self.license {
                Some(uri) => FieldValue::Link(uri.clone()),
                None => FieldValue::Absent,
            },
            "summary" => match &self.summary {
                Some(s) => FieldValue::Resource(Box::new(s.clone())),
                None => FieldValue::Absent,
            },
            "statements" => FieldValue::List(
                self.statements
                    .iter()
                    .map(|s| Box::new(s.clone()) as Box<dyn MappedObject>)
                    .collect(),
            ),
            "audit_log" => FieldValue::List(
                self.audit_log
                    .iter()
                    .map(|e| Box::new(e.clone()) as Box<dyn MappedObject>)
                    .collect(),
            ),
            _ => FieldValue::Absent,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapperResult<()> {
        match (field, value) {
            ("title", FieldValue::Literal(Value::String(title))) => {
                self.title = title;
            }
            ("title", FieldValue::Absent) => self.title.clear(),
            ("year", FieldValue::Literal(Value::Integer(year))) => {
                self.year = Some(year);
            }
            ("year", FieldValue::Absent) => self.year = None,
            ("license", FieldValue::Link(uri)) => self.license = Some(uri),
            ("license", FieldValue::Absent) => self.license = None,
            ("summary", FieldValue::Resource(child)) => {
                self.summary = Some(downcast("summary", child)?);
            }
            ("summary", FieldValue::Absent) => self.summary = None,
            ("statements", FieldValue::List(children)) => {
                self.statements = children
                    .into_iter()
                    .map(|c| downcast("statements", c))
                    .collect::<MapperResult<_>>()?;
            }
            ("statements", FieldValue::Absent) => self.statements.clear(),
            ("audit_log", FieldValue::List(children)) => {
                self.audit_log = children
                    .into_iter()
                    .map(|c| downcast("audit_log", c))
                    .collect::<MapperResult<_>>()?;
            }
            ("audit_log", FieldValue::Absent) => self.audit_log.clear(),
            (other, _) => {
                return Err(MapperError::UnknownField {
                    type_segment: "profile".into(),
                    field: other.to_string(),
                })
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
