use std::path::PathBuf;

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Front matter dates are plain calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One publishable article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub slug: String,
    pub date: NaiveDate,
    pub updated: Option<NaiveDate>,
    /// Body converted to HTML.
    pub content: String,
    /// Plain-text summary of the raw body.
    pub excerpt: String,
    /// Document the post was loaded from. Not exposed to templates.
    pub source: PathBuf,
}

impl Post {
    pub fn date_iso(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn updated_iso(&self) -> Option<String> {
        self.updated.map(|d| d.format(DATE_FORMAT).to_string())
    }
}

// Templates see dates as `YYYY-MM-DD` strings plus the `*_iso` accessors.
impl Serialize for Post {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let date = self.date_iso();
        let updated = self.updated_iso();

        let mut state = serializer.serialize_struct("Post", 8)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("slug", &self.slug)?;
        state.serialize_field("date", &date)?;
        state.serialize_field("updated", &updated)?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("excerpt", &self.excerpt)?;
        state.serialize_field("date_iso", &date)?;
        state.serialize_field("updated_iso", &updated)?;
        state.end()
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
}
