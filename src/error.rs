use std::error::Error;
use std::fmt;
use std::fmt::Formatter;

/// Failure while decoding a front matter block. Lines are 1-based and point
/// at the offending line of the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    pub fn new(line: usize, reason: impl Into<String>) -> ParseError {
        ParseError { line, reason: reason.into() }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at line {}: {}", self.line, self.reason)
    }
}

impl Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    MissingField,
    MalformedField,
    DuplicateSlug,
}

/// Failure while turning a decoded mapping into a post. `field` carries the
/// offending key, or the colliding slug for `DuplicateSlug`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub field: Option<String>,
}

impl ValidationError {
    pub fn missing_field(field: &str) -> ValidationError {
        ValidationError {
            kind: ValidationKind::MissingField,
            field: Some(field.to_string()),
        }
    }

    pub fn malformed_field(field: &str) -> ValidationError {
        ValidationError {
            kind: ValidationKind::MalformedField,
            field: Some(field.to_string()),
        }
    }

    pub fn duplicate_slug(slug: &str) -> ValidationError {
        ValidationError {
            kind: ValidationKind::DuplicateSlug,
            field: Some(slug.to_string()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let field = self.field.as_deref().unwrap_or("?");
        match self.kind {
            ValidationKind::MissingField => write!(f, "missing required field `{}`", field),
            ValidationKind::MalformedField => write!(f, "malformed value for field `{}`", field),
            ValidationKind::DuplicateSlug => write!(f, "duplicate slug `{}`", field),
        }
    }
}

impl Error for ValidationError {}

/// Per-document rejection cause. One bad document never aborts the batch;
/// the builder collects these next to the document name.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Parse(ParseError),
    Validation(ValidationError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Parse(e) => write!(f, "{}", e),
            LoadError::Validation(e) => write!(f, "{}", e),
        }
    }
}

impl Error for LoadError {}

impl From<ParseError> for LoadError {
    fn from(value: ParseError) -> Self {
        LoadError::Parse(value)
    }
}

impl From<ValidationError> for LoadError {
    fn from(value: ValidationError) -> Self {
        LoadError::Validation(value)
    }
}
