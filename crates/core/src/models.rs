use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DefaultOnNull};
use std::collections::BTreeMap;

pub type RecordAttributes = Map<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Publish,
    Trash,
    Draft,
    Pending,
    Private,
    Future,
    #[serde(other)]
    Other,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Trash => "trash",
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Private => "private",
            Self::Future => "future",
            Self::Other => "other",
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Term {
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// A unit of authored content as exported by the CMS. Read-only here.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub status: ContentStatus,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub title: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub content: String,
    #[serde(with = "content_date")]
    pub date: NaiveDateTime,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<Term>>,
    #[serde(default)]
    pub is_revision: bool,
    #[serde(default)]
    pub is_autosave: bool,
}

impl ContentItem {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn terms(&self, taxonomy: &str) -> &[Term] {
        self.terms.get(taxonomy).map(Vec::as_slice).unwrap_or_default()
    }

    /// Seconds since the epoch, reading the stored date as UTC.
    pub fn timestamp(&self) -> i64 {
        self.date.and_utc().timestamp()
    }

    pub fn formatted_date(&self) -> String {
        self.date.format(content_date::FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tenant {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub front_page_id: Option<u64>,
    #[serde(default)]
    pub is_primary: bool,
}

impl Tenant {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            front_page_id: None,
            is_primary: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentTypeInfo {
    pub name: String,
    #[serde(default = "default_public")]
    pub public: bool,
    #[serde(default)]
    pub exclude_from_search: bool,
}

fn default_public() -> bool {
    true
}

impl ContentTypeInfo {
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public: true,
            exclude_from_search: false,
        }
    }

    pub fn is_search_eligible(&self) -> bool {
        self.public && !self.exclude_from_search
    }
}

/// The unit of storage in the search index.
///
/// `object_id` is unique per record while every record derived from the same
/// content item shares `distinct_key`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRecord {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub distinct_key: String,
    #[serde(flatten)]
    pub attributes: RecordAttributes,
}

impl SearchRecord {
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.attribute("type").and_then(Value::as_str)
    }

    pub fn content(&self) -> Option<&str> {
        self.attribute(crate::splitter::CONTENT_FIELD)
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordFilter {
    DistinctKey(String),
}

impl RecordFilter {
    pub fn to_filter_string(&self) -> String {
        match self {
            Self::DistinctKey(key) => {
                format!("distinct_key:\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))
            }
        }
    }

    pub fn matches(&self, record: &SearchRecord) -> bool {
        match self {
            Self::DistinctKey(key) => record.distinct_key == *key,
        }
    }
}

mod content_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, ISO_FORMAT))
            .map_err(serde::de::Error::custom)
    }
}
