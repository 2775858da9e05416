//! Record shapes for the content types shipped with the site.
//!
//! Each function only picks type-specific attributes; identity, dates and body
//! chunks are added by the assembler.

use crate::assembler::RecordAssembler;
use crate::error::IndexerError;
use crate::models::{ContentItem, RecordAttributes};
use crate::registry::{TransformContext, TransformerRegistry};
use serde_json::{json, Value};

/// Registry with every built-in content type registered.
pub fn builtin_registry() -> Result<TransformerRegistry, IndexerError> {
    let mut registry = TransformerRegistry::new(RecordAssembler::new()?);
    registry
        .register("page", page)
        .register("post", post)
        .register("student", student)
        .register("faculty", faculty)
        .register("person", person)
        .register("project", project)
        .register("dialogue", dialogue)
        .register("resource", resource)
        .register("program", program);
    Ok(registry)
}

fn page(item: &ContentItem, context: &TransformContext<'_>) -> Option<RecordAttributes> {
    let is_front_page = context.tenant.front_page_id == Some(item.id);
    let title = if is_front_page && !context.tenant.name.is_empty() {
        context.tenant.name.clone()
    } else {
        item.title.clone()
    };

    let mut attributes = RecordAttributes::new();
    attributes.insert("is_front_page".to_string(), json!(is_front_page));
    attributes.insert("title".to_string(), json!(title));
    Some(attributes)
}

fn post(item: &ContentItem, _context: &TransformContext<'_>) -> Option<RecordAttributes> {
    let people = item
        .field("people_in_this_story")
        .and_then(|field| field.get("selected_posts"))
        .map(people_refs)
        .unwrap_or_else(|| json!([]));

    let mut attributes = RecordAttributes::new();
    attributes.insert("featured_image".to_string(), json!(item.featured_image));
    attributes.insert("introduction".to_string(), field(item, "introduction"));
    attributes.insert("people".to_string(), people);
    insert_terms(
        &mut attributes,
        item,
        &[
            ("tags", "post_tag"),
            ("categories", "category"),
            ("topics", "topic"),
            ("departments", "department"),
            ("research_centers", "research_center"),
            ("semesters", "semester"),
        ],
    );
    Some(attributes)
}

fn student(item: &ContentItem, context: &TransformContext<'_>) -> Option<RecordAttributes> {
    let mut attributes = profile_attributes(item);
    for name in ["areas_of_study", "pathway", "graduation_status"] {
        attributes.insert(name.to_string(), field(item, name));
    }
    attributes.insert("introduction".to_string(), plain_field(item, context, "introduction"));
    insert_terms(
        &mut attributes,
        item,
        &[
            ("student_types", "student_type"),
            ("degrees", "degree"),
            ("topics", "topic"),
            ("departments", "department"),
            ("research_centers", "research_center"),
        ],
    );
    Some(attributes)
}

fn faculty(item: &ContentItem, context: &TransformContext<'_>) -> Option<RecordAttributes> {
    let mut attributes = staff_attributes(item, context);
    insert_terms(
        &mut attributes,
        item,
        &[
            ("faculty_types", "faculty_type"),
            ("topics", "topic"),
            ("departments", "department"),
            ("research_centers", "research_center"),
        ],
    );
    Some(attributes)
}

fn person(item: &ContentItem, context: &TransformContext<'_>) -> Option<RecordAttributes> {
    let (friends_partners, staff): (Vec<_>, Vec<_>) = item
        .terms("person_type")
        .iter()
        .partition(|term| {
            term.fields.get("refinement_list").and_then(Value::as_str) == Some("friends_partners")
        });

    let mut attributes = staff_attributes(item, context);
    attributes.insert(
        "staff_types".to_string(),
        json!(staff.iter().map(|term| &term.name).collect::<Vec<_>>()),
    );
    attributes.insert(
        "friends_partners_types".to_string(),
        json!(friends_partners.iter().map(|term| &term.name).collect::<Vec<_>>()),
    );
    insert_terms(&mut attributes, item, &[("topics", "topic")]);
    Some(attributes)
}

fn project(item: &ContentItem, _context: &TransformContext<'_>) -> Option<RecordAttributes> {
    let mut attributes = RecordAttributes::new();
    attributes.insert("featured_image".to_string(), json!(item.featured_image));
    attributes.insert("subhead_text".to_string(), field(item, "subhead_text"));
    attributes.insert("people".to_string(), related_people(item, "project_team"));
    insert_terms(
        &mut attributes,
        item,
        &[
            ("topics", "topic"),
            ("departments", "department"),
            ("research_centers", "research_center"),
            ("project_types", "project_type"),
        ],
    );
    Some(attributes)
}

fn dialogue(item: &ContentItem, _context: &TransformContext<'_>) -> Option<RecordAttributes> {
    let mut attributes = RecordAttributes::new();
    for name in ["session", "year", "countries"] {
        attributes.insert(name.to_string(), field(item, name));
    }
    attributes.insert("people".to_string(), related_people(item, "led_by"));
    insert_terms(&mut attributes, item, &[("topics", "topic")]);
    Some(attributes)
}

fn resource(item: &ContentItem, _context: &TransformContext<'_>) -> Option<RecordAttributes> {
    let link_type = item.field_str("resource_link_type");
    let link_field = if link_type == Some("Link") {
        "resource_link"
    } else {
        "resource_file"
    };
    let link = item
        .field(link_field)
        .and_then(|value| value.get("url"))
        .cloned()
        .unwrap_or(Value::Null);

    let mut attributes = RecordAttributes::new();
    attributes.insert("resource_source".to_string(), field(item, "resource_source"));
    attributes.insert("resource_link_type".to_string(), json!(link_type));
    attributes.insert("resource_link".to_string(), link);
    insert_terms(
        &mut attributes,
        item,
        &[
            ("audiences", "audience"),
            ("departments", "department"),
            ("resource_types", "resource_type"),
        ],
    );
    Some(attributes)
}

// Only program landing pages are searchable.
fn program(item: &ContentItem, _context: &TransformContext<'_>) -> Option<RecordAttributes> {
    if item.field_str("page_type") != Some("landing") {
        return None;
    }

    let mut attributes = RecordAttributes::new();
    insert_terms(&mut attributes, item, &[("program_types", "program_type")]);
    Some(attributes)
}

fn profile_attributes(item: &ContentItem) -> RecordAttributes {
    let mut attributes = RecordAttributes::new();
    attributes.insert("first_name".to_string(), field(item, "first_name"));
    attributes.insert("last_name".to_string(), field(item, "last_name"));
    attributes.insert("headshot".to_string(), json!(item.featured_image));
    attributes
}

fn staff_attributes(item: &ContentItem, context: &TransformContext<'_>) -> RecordAttributes {
    let mut attributes = profile_attributes(item);
    for name in ["job_title", "phone_number", "email_address"] {
        attributes.insert(name.to_string(), field(item, name));
    }
    attributes.insert("bio".to_string(), plain_field(item, context, "bio"));
    attributes
}

fn field(item: &ContentItem, name: &str) -> Value {
    item.field(name).cloned().unwrap_or(Value::Null)
}

fn plain_field(item: &ContentItem, context: &TransformContext<'_>, name: &str) -> Value {
    let text = item.field_str(name).unwrap_or_default();
    Value::String(context.strip_markup(text))
}

fn insert_terms(attributes: &mut RecordAttributes, item: &ContentItem, mapping: &[(&str, &str)]) {
    for (attribute, taxonomy) in mapping {
        let names: Vec<_> = item.terms(taxonomy).iter().map(|term| &term.name).collect();
        attributes.insert((*attribute).to_string(), json!(names));
    }
}

fn related_people(item: &ContentItem, name: &str) -> Value {
    item.field(name).map(people_refs).unwrap_or(Value::Null)
}

fn people_refs(value: &Value) -> Value {
    let people: Vec<_> = value
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|person| {
            json!({
                "id": person.get("id").or_else(|| person.get("ID")),
                "name": person.get("title").or_else(|| person.get("post_title")),
            })
        })
        .collect();
    json!(people)
}
