use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

fn default_available() -> bool {
    true
}

/// A book as stored in the `books` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

impl BookRecord {
    /// Current field values as a complete set of request fields, used as the base for updates.
    pub fn to_fields(&self) -> BookFields {
        BookFields {
            title: Some(self.title.clone()),
            author: Some(self.author.clone()),
            published_year: self.published_year,
            genres: Some(self.genres.clone()),
            is_available: Some(self.is_available),
        }
    }
}

/// A book as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Hex-encoded ObjectId
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

impl Book {
    /// One-line human-readable summary.
    pub fn info(&self) -> String {
        format!("The book '{}' is written by {}.", self.title, self.author)
    }
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Self {
            id: record.id.to_hex(),
            title: record.title,
            author: record.author,
            published_year: record.published_year,
            genres: record.genres,
            is_available: record.is_available,
        }
    }
}

/// Request body for create and update. Every field is optional at the wire level; required
/// fields are enforced by validation so that a missing title reports the same way on both paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

impl BookFields {
    /// Overlay the fields present in `patch` onto `self`.
    pub fn merge(self, patch: BookFields) -> BookFields {
        BookFields {
            title: patch.title.or(self.title),
            author: patch.author.or(self.author),
            published_year: patch.published_year.or(self.published_year),
            genres: patch.genres.or(self.genres),
            is_available: patch.is_available.or(self.is_available),
        }
    }
}

/// Field values that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBook {
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
    pub genres: Vec<String>,
    pub is_available: bool,
}

impl ValidBook {
    pub fn into_record(self, id: ObjectId) -> BookRecord {
        BookRecord {
            id,
            title: self.title,
            author: self.author,
            published_year: self.published_year,
            genres: self.genres,
            is_available: self.is_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn book_serializes_with_camel_case_and_hex_id() {
        let record = BookRecord {
            id: ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            published_year: Some(1965),
            genres: vec!["Science Fiction".to_string()],
            is_available: true,
        };

        let value = serde_json::to_value(Book::from(record)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "65a1f0c2e4b0a1b2c3d4e5f6",
                "title": "Dune",
                "author": "Herbert",
                "publishedYear": 1965,
                "genres": ["Science Fiction"],
                "isAvailable": true
            })
        );
    }

    #[test]
    fn record_stores_id_under_underscore_id() {
        let id = ObjectId::new();
        let record = ValidBook {
            title: "Emma".to_string(),
            author: "Austen".to_string(),
            published_year: None,
            genres: vec![],
            is_available: false,
        }
        .into_record(id);

        let document = bson::ser::serialize_to_document(&record).unwrap();
        assert_eq!(document.get_object_id("_id").unwrap(), id);
        assert!(!document.contains_key("publishedYear"));
        assert!(!document.get_bool("isAvailable").unwrap());
    }

    #[test]
    fn fields_ignore_unknown_keys() {
        let fields: BookFields =
            serde_json::from_value(json!({ "title": "Dune", "id": "abc", "rating": 5 })).unwrap();
        assert_eq!(fields.title.as_deref(), Some("Dune"));
        assert_eq!(fields.author, None);
    }

    #[test]
    fn merge_prefers_patch_values() {
        let base = BookFields {
            title: Some("Dune".to_string()),
            author: Some("Herbert".to_string()),
            published_year: Some(1965),
            genres: Some(vec!["Science Fiction".to_string()]),
            is_available: Some(true),
        };
        let patch = BookFields {
            is_available: Some(false),
            ..Default::default()
        };

        let merged = base.clone().merge(patch);
        assert_eq!(merged.title, base.title);
        assert_eq!(merged.genres, base.genres);
        assert_eq!(merged.is_available, Some(false));
    }

    #[test]
    fn info_summarizes_title_and_author() {
        let book = Book {
            id: ObjectId::new().to_hex(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            published_year: None,
            genres: vec![],
            is_available: true,
        };
        assert_eq!(book.info(), "The book 'Dune' is written by Herbert.");
    }
}
