use crate::error::IndexerError;
use crate::models::{ContentItem, RecordAttributes, SearchRecord, Tenant};
use crate::splitter::{ContentSplitter, CONTENT_CHAR_LIMIT, CONTENT_FIELD};
use serde_json::{json, Value};

const RESERVED_KEYS: [&str; 2] = ["objectID", "distinct_key"];

/// `tenant#type#id`, shared by every record of one content item.
pub fn distinct_key(tenant_id: u64, content_type: &str, item_id: u64) -> String {
    format!("{tenant_id}#{content_type}#{item_id}")
}

#[derive(Debug, Clone)]
pub struct RecordAssembler {
    splitter: ContentSplitter,
}

impl RecordAssembler {
    pub fn new() -> Result<Self, IndexerError> {
        Self::with_char_limit(CONTENT_CHAR_LIMIT)
    }

    pub fn with_char_limit(char_limit: usize) -> Result<Self, IndexerError> {
        Ok(Self {
            splitter: ContentSplitter::new(char_limit)?,
        })
    }

    pub fn splitter(&self) -> &ContentSplitter {
        &self.splitter
    }

    pub fn default_attributes(&self, item: &ContentItem, tenant: &Tenant) -> RecordAttributes {
        let mut attributes = RecordAttributes::new();
        attributes.insert("tenant_id".to_string(), json!(tenant.id));
        attributes.insert("type".to_string(), json!(item.content_type));
        attributes.insert("title".to_string(), json!(item.title));
        attributes.insert("date".to_string(), json!(item.formatted_date()));
        attributes.insert("timestamp".to_string(), json!(item.timestamp()));
        attributes.insert("url".to_string(), json!(item.permalink));
        attributes
    }

    /// Merges defaults, type-specific attributes and one body chunk per record.
    ///
    /// Later sources win on key collisions, except for the identity keys which
    /// always come from the item itself. Always returns at least one record.
    pub fn assemble(
        &self,
        item: &ContentItem,
        tenant: &Tenant,
        type_attributes: RecordAttributes,
    ) -> Vec<SearchRecord> {
        let key = distinct_key(tenant.id, &item.content_type, item.id);
        let mut base = self.default_attributes(item, tenant);

        for (name, value) in type_attributes {
            if RESERVED_KEYS.contains(&name.as_str()) {
                continue;
            }
            base.insert(name, value);
        }

        self.splitter
            .split(CONTENT_FIELD, &item.content)
            .into_iter()
            .enumerate()
            .map(|(position, chunk)| {
                let mut attributes = base.clone();
                attributes.insert(chunk.field, Value::String(chunk.text));

                SearchRecord {
                    object_id: format!("{key}#{position}"),
                    distinct_key: key.clone(),
                    attributes,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentStatus;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn page(id: u64, body: String) -> ContentItem {
        ContentItem {
            id,
            content_type: "page".to_string(),
            status: ContentStatus::Publish,
            title: "About Us".to_string(),
            content: body,
            date: NaiveDate::from_ymd_opt(2020, 1, 2)
                .and_then(|date| date.and_hms_opt(3, 4, 5))
                .unwrap(),
            permalink: "https://example.edu/about".to_string(),
            featured_image: None,
            fields: Default::default(),
            terms: Default::default(),
            is_revision: false,
            is_autosave: false,
        }
    }

    #[test]
    fn long_body_becomes_addressable_chunks() {
        let assembler = RecordAssembler::new().unwrap();
        let tenant = Tenant::new(1, "Main");
        let records = assembler.assemble(&page(7, "a".repeat(2_500)), &tenant, RecordAttributes::new());

        assert_eq!(records.len(), 3);
        let ids: Vec<_> = records.iter().map(|record| record.object_id.as_str()).collect();
        assert_eq!(ids, vec!["1#page#7#0", "1#page#7#1", "1#page#7#2"]);
        assert!(records.iter().all(|record| record.distinct_key == "1#page#7"));
        assert_eq!(records[2].content().map(str::len), Some(500));
    }

    #[test]
    fn defaults_are_present_on_every_chunk() {
        let assembler = RecordAssembler::new().unwrap();
        let tenant = Tenant::new(3, "Satellite");
        let records = assembler.assemble(&page(9, "<p>short</p>".to_string()), &tenant, RecordAttributes::new());

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.attribute("tenant_id"), Some(&json!(3)));
        assert_eq!(record.content_type(), Some("page"));
        assert_eq!(record.attribute("title"), Some(&json!("About Us")));
        assert_eq!(record.attribute("date"), Some(&json!("2020-01-02 03:04:05")));
        assert_eq!(record.attribute("timestamp"), Some(&json!(1_577_934_245)));
        assert_eq!(record.attribute("url"), Some(&json!("https://example.edu/about")));
        assert_eq!(record.content(), Some("short"));
    }

    #[test]
    fn type_attributes_override_defaults_but_not_identity() {
        let assembler = RecordAssembler::new().unwrap();
        let tenant = Tenant::new(1, "Main");
        let mut attributes = RecordAttributes::new();
        attributes.insert("title".to_string(), json!("Home"));
        attributes.insert("objectID".to_string(), json!("hijack"));
        attributes.insert("distinct_key".to_string(), json!("hijack"));
        attributes.insert("is_front_page".to_string(), json!(true));

        let records = assembler.assemble(&page(2, String::new()), &tenant, attributes);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].object_id, "1#page#2#0");
        assert_eq!(records[0].distinct_key, "1#page#2");
        assert_eq!(records[0].attribute("title"), Some(&json!("Home")));
        assert_eq!(records[0].attribute("is_front_page"), Some(&json!(true)));
        assert!(!records[0].attributes.contains_key("objectID"));
        assert_eq!(records[0].content(), Some(""));
    }

    #[test]
    fn object_ids_are_pairwise_distinct() {
        let assembler = RecordAssembler::with_char_limit(10).unwrap();
        let tenant = Tenant::new(1, "Main");
        let records = assembler.assemble(&page(5, "z".repeat(95)), &tenant, RecordAttributes::new());

        let unique: HashSet<_> = records.iter().map(|record| &record.object_id).collect();
        assert_eq!(records.len(), 10);
        assert_eq!(unique.len(), records.len());
    }
}
