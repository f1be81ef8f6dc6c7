//! Declarative record shapes and the walk that checks JSON values against them.
//!
//! This is deliberately small: it understands exactly the constructs the hook
//! protocol uses (scalars, string picklists, nullable values, arrays, nested
//! objects and `type`-tagged variants), nothing more.

use std::fmt;

use serde_json::Value;

/// Shape of a single JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Boolean,
    Number,
    /// Any value, including null
    Any,
    /// Exactly this string
    Literal(String),
    /// One of a fixed set of strings
    OneOf(Vec<String>),
    Nullable(Box<FieldKind>),
    Array(Box<FieldKind>),
    Object(ObjectSchema),
    Variant(VariantSchema),
}

impl FieldKind {
    pub fn literal(value: impl Into<String>) -> Self {
        FieldKind::Literal(value.into())
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldKind::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn nullable(inner: FieldKind) -> Self {
        FieldKind::Nullable(Box::new(inner))
    }

    pub fn array_of(item: FieldKind) -> Self {
        FieldKind::Array(Box::new(item))
    }

    pub(crate) fn check(&self, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
        match self {
            FieldKind::Any => {}
            FieldKind::String => {
                if !value.is_string() {
                    issues.push(ValidationIssue::mismatch(path, "string", value));
                }
            }
            FieldKind::Boolean => {
                if !value.is_boolean() {
                    issues.push(ValidationIssue::mismatch(path, "boolean", value));
                }
            }
            FieldKind::Number => {
                if !value.is_number() {
                    issues.push(ValidationIssue::mismatch(path, "number", value));
                }
            }
            FieldKind::Literal(expected) => {
                if value.as_str() != Some(expected.as_str()) {
                    issues.push(ValidationIssue::new(
                        path,
                        format!("expected \"{}\", received {}", expected, render(value)),
                    ));
                }
            }
            FieldKind::OneOf(options) => {
                let matched = value
                    .as_str()
                    .map(|s| options.iter().any(|o| o == s))
                    .unwrap_or(false);
                if !matched {
                    issues.push(ValidationIssue::new(
                        path,
                        format!(
                            "expected one of {}, received {}",
                            quote_all(options),
                            render(value)
                        ),
                    ));
                }
            }
            FieldKind::Nullable(inner) => {
                if !value.is_null() {
                    inner.check(value, path, issues);
                }
            }
            FieldKind::Array(item) => match value.as_array() {
                Some(items) => {
                    for (i, element) in items.iter().enumerate() {
                        item.check(element, &format!("{}[{}]", path, i), issues);
                    }
                }
                None => issues.push(ValidationIssue::mismatch(path, "array", value)),
            },
            FieldKind::Object(schema) => schema.check(value, path, issues),
            FieldKind::Variant(schema) => schema.check(value, path, issues),
        }
    }
}

/// One named entry of an object shape
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub optional: bool,
}

/// Ordered field list describing a JSON object. Unlisted keys are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    fields: Vec<FieldSpec>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            optional: false,
        });
        self
    }

    /// Add a field that may be absent (but must match `kind` when present)
    pub fn optional(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            optional: true,
        });
        self
    }

    /// Append every field of `other`, replacing same-named fields
    pub fn extend(mut self, other: &ObjectSchema) -> Self {
        for spec in &other.fields {
            self.fields.retain(|f| f.name != spec.name);
            self.fields.push(spec.clone());
        }
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn check(&self, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
        let Some(object) = value.as_object() else {
            issues.push(ValidationIssue::mismatch(path, "object", value));
            return;
        };

        for spec in &self.fields {
            let field_path = join_path(path, &spec.name);
            match object.get(&spec.name) {
                Some(field_value) => spec.kind.check(field_value, &field_path, issues),
                None if spec.optional => {}
                None => issues.push(ValidationIssue::new(field_path, "missing required field")),
            }
        }
    }

    /// Collect every issue of `value` against this shape
    pub fn validate(&self, value: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.check(value, "", &mut issues);
        issues
    }
}

/// Objects discriminated by a string tag field
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSchema {
    tag: String,
    variants: Vec<(String, ObjectSchema)>,
}

impl VariantSchema {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            variants: Vec::new(),
        }
    }

    /// Add a variant; `schema` lists the fields besides the tag
    pub fn variant(mut self, name: impl Into<String>, schema: ObjectSchema) -> Self {
        self.variants.push((name.into(), schema));
        self
    }

    pub(crate) fn check(&self, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
        let Some(object) = value.as_object() else {
            issues.push(ValidationIssue::mismatch(path, "object", value));
            return;
        };

        let tag_path = join_path(path, &self.tag);
        let tag_value = object.get(&self.tag).unwrap_or(&Value::Null);
        let selected = tag_value
            .as_str()
            .and_then(|tag| self.variants.iter().find(|(name, _)| name == tag));

        match selected {
            Some((_, schema)) => schema.check(value, path, issues),
            None => {
                let names: Vec<String> = self.variants.iter().map(|(n, _)| n.clone()).collect();
                issues.push(ValidationIssue::new(
                    tag_path,
                    format!(
                        "expected one of {}, received {}",
                        quote_all(&names),
                        render(tag_value)
                    ),
                ));
            }
        }
    }
}

/// A single failed check, addressed by field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path with `[i]` indices; empty for the document root
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    fn mismatch(path: &str, expected: &str, value: &Value) -> Self {
        Self::new(
            path,
            format!("expected {}, received {}", expected, type_name(value)),
        )
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => type_name(other).to_string(),
    }
}

fn quote_all(options: &[String]) -> String {
    options
        .iter()
        .map(|o| format!("\"{}\"", o))
        .collect::<Vec<_>>()
        .join(" | ")
}
