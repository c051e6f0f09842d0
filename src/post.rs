use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Formatter;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::error::ValidationError;
use crate::front_matter::{Mapping, Scalar, Value};
use crate::text_utils::parse_date_time;

/// One validated blog entry. Construction happens once per load cycle;
/// the record never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub published_at: DateTime<FixedOffset>,
    pub categories: BTreeSet<String>,
    pub tags: Vec<String>,
    pub body: String,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "slug={}, date={}, tags={:?}\ntitle={}\nbody:\n{}",
               self.slug,
               self.published_at,
               self.tags,
               self.title,
               self.body
        )
    }
}

impl Post {
    /// Builds a post from a decoded mapping and the slug derived from the
    /// document name. `title` and `date` are required; `categories` and
    /// `tags` accept a single scalar or a list.
    pub fn from_document(slug: &str, mapping: &Mapping, body: &str) -> Result<Post, ValidationError> {
        let title = match mapping.get("title") {
            None => return Err(ValidationError::missing_field("title")),
            Some(Value::List(_)) => return Err(ValidationError::malformed_field("title")),
            Some(Value::Scalar(scalar)) => scalar.to_text(),
        };
        if title.trim().is_empty() {
            return Err(ValidationError::malformed_field("title"));
        }

        let published_at = match mapping.get("date") {
            None => return Err(ValidationError::missing_field("date")),
            Some(Value::List(_)) => return Err(ValidationError::malformed_field("date")),
            Some(Value::Scalar(Scalar::Date(date))) => *date,
            Some(Value::Scalar(scalar)) => {
                match parse_date_time(&scalar.to_text()) {
                    Ok(date) => date,
                    Err(_) => return Err(ValidationError::malformed_field("date")),
                }
            }
        };

        let categories: BTreeSet<String> = coerce_to_list(mapping.get("categories")).into_iter().collect();
        let tags = coerce_to_list(mapping.get("tags"));

        Ok(Post {
            slug: slug.to_string(),
            title,
            published_at,
            categories,
            tags,
            body: body.to_string(),
        })
    }
}

// A single scalar normalizes to a one-element sequence, absence to an empty one
fn coerce_to_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None => vec![],
        Some(Value::List(items)) => items.clone(),
        Some(Value::Scalar(scalar)) => {
            let text = scalar.to_text();
            if text.trim().is_empty() {
                vec![]
            } else {
                vec![text]
            }
        }
    }
}
