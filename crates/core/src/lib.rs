pub mod assembler;
pub mod catalog;
pub mod error;
pub mod fetch;
pub mod index_config;
pub mod models;
pub mod naming;
pub mod registry;
pub mod reindex;
pub mod splitter;
pub mod stores;
pub mod traits;
pub mod transformers;
pub mod upsert;

pub use assembler::{distinct_key, RecordAssembler};
pub use catalog::{searchable_types, DEFAULT_EXCLUDED_TYPES};
pub use error::{ContentError, IndexerError, SearchError};
pub use fetch::{validate_page_size, PaginatedFetcher, DEFAULT_PAGE_SIZE};
pub use index_config::{
    ConfigKind, ConfigSelection, IndexConfigFiles, IndexConfigManager, IndexConfigSnapshot,
    PushReport,
};
pub use models::{
    ContentItem, ContentStatus, ContentTypeInfo, RecordAttributes, RecordFilter, SearchRecord,
    Tenant, Term,
};
pub use naming::{is_person_type, IndexNamer, GLOBAL_INDEX, PEOPLE_INDEX, PEOPLE_TYPES};
pub use registry::{RecordTransformer, TransformContext, TransformerRegistry};
pub use reindex::{
    ReindexFailure, ReindexOptions, ReindexReport, Reindexer, MAX_CONSECUTIVE_FETCH_FAILURES,
};
pub use splitter::{ContentChunk, ContentSplitter, MarkupStripper, CONTENT_CHAR_LIMIT, CONTENT_FIELD};
pub use stores::{AlgoliaClient, AlgoliaConfig, RestContentSource};
pub use traits::{primary_tenant, ContentSource, PageRequest, SearchService};
pub use transformers::builtin_registry;
pub use upsert::{BatchUpserter, IncrementalIndexer, SkipReason, UpdateOutcome};
