//! Field rules for books, applied identically on create and update.

use std::fmt;

use thiserror::Error;

use super::models::{BookFields, ValidBook};

pub const MIN_PUBLISHED_YEAR: i32 = 1900;

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every rule a candidate book broke, in field declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Book validation failed: {}", join(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.iter().map(|error| error.field)
    }
}

/// The calendar year used as the upper bound for `publishedYear`, read on every call.
pub fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

/// Check `fields` against the book rules and apply defaults.
///
/// `title` and `author` must be present and non-empty. `publishedYear`, when present, must lie
/// in `MIN_PUBLISHED_YEAR..=current_year`.
pub fn validate(fields: BookFields, current_year: i32) -> Result<ValidBook, ValidationErrors> {
    let mut errors = Vec::new();

    let title = required("title", fields.title, &mut errors);
    let author = required("author", fields.author, &mut errors);

    if let Some(year) = fields.published_year {
        if year < MIN_PUBLISHED_YEAR {
            errors.push(FieldError {
                field: "publishedYear",
                message: format!(
                    "Path `publishedYear` ({}) is less than minimum allowed value ({}).",
                    year, MIN_PUBLISHED_YEAR
                ),
            });
        } else if year > current_year {
            errors.push(FieldError {
                field: "publishedYear",
                message: format!("{} exceeds the current year ({})", year, current_year),
            });
        }
    }

    match (title, author) {
        (Some(title), Some(author)) if errors.is_empty() => Ok(ValidBook {
            title,
            author,
            published_year: fields.published_year,
            genres: fields.genres.unwrap_or_default(),
            is_available: fields.is_available.unwrap_or(true),
        }),
        _ => Err(ValidationErrors { errors }),
    }
}

fn required(
    field: &'static str,
    value: Option<String>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            errors.push(FieldError {
                field,
                message: format!("Path `{}` is required.", field),
            });
            None
        }
    }
}
