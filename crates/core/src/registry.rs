use crate::assembler::RecordAssembler;
use crate::error::IndexerError;
use crate::models::{ContentItem, RecordAttributes, SearchRecord, Tenant};
use crate::splitter::MarkupStripper;
use std::collections::HashMap;

pub struct TransformContext<'a> {
    pub tenant: &'a Tenant,
    stripper: &'a MarkupStripper,
}

impl<'a> TransformContext<'a> {
    pub fn new(tenant: &'a Tenant, stripper: &'a MarkupStripper) -> Self {
        Self { tenant, stripper }
    }

    pub fn strip_markup(&self, text: &str) -> String {
        self.stripper.strip(text)
    }
}

/// Produces the type-specific attributes of a content item.
///
/// `None` means the item yields no records at all.
pub trait RecordTransformer: Send + Sync {
    fn attributes(&self, item: &ContentItem, context: &TransformContext<'_>) -> Option<RecordAttributes>;
}

impl<F> RecordTransformer for F
where
    F: Fn(&ContentItem, &TransformContext<'_>) -> Option<RecordAttributes> + Send + Sync,
{
    fn attributes(&self, item: &ContentItem, context: &TransformContext<'_>) -> Option<RecordAttributes> {
        self(item, context)
    }
}

pub struct TransformerRegistry {
    transformers: HashMap<String, Box<dyn RecordTransformer>>,
    assembler: RecordAssembler,
}

impl TransformerRegistry {
    pub fn new(assembler: RecordAssembler) -> Self {
        Self {
            transformers: HashMap::new(),
            assembler,
        }
    }

    pub fn register<T>(&mut self, content_type: impl Into<String>, transformer: T) -> &mut Self
    where
        T: RecordTransformer + 'static,
    {
        self.transformers
            .insert(content_type.into(), Box::new(transformer));
        self
    }

    pub fn register_fn<F>(&mut self, content_type: impl Into<String>, transform: F) -> &mut Self
    where
        F: Fn(&ContentItem, &TransformContext<'_>) -> Option<RecordAttributes> + Send + Sync + 'static,
    {
        self.register(content_type, transform)
    }

    pub fn lookup(&self, content_type: &str) -> Option<&dyn RecordTransformer> {
        self.transformers.get(content_type).map(Box::as_ref)
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.transformers.contains_key(content_type)
    }

    pub fn content_types(&self) -> Vec<&str> {
        let mut types: Vec<_> = self.transformers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn assembler(&self) -> &RecordAssembler {
        &self.assembler
    }

    /// Transforms and assembles one item. An unregistered type is an error
    /// here; callers decide whether that means skip or abort.
    pub fn transform(&self, item: &ContentItem, tenant: &Tenant) -> Result<Vec<SearchRecord>, IndexerError> {
        let transformer = self
            .lookup(&item.content_type)
            .ok_or_else(|| IndexerError::UnknownTransform(item.content_type.clone()))?;

        let context = TransformContext::new(tenant, self.assembler.splitter().stripper());
        let records = match transformer.attributes(item, &context) {
            Some(attributes) => self.assembler.assemble(item, tenant, attributes),
            None => Vec::new(),
        };

        Ok(records)
    }
}
