pub mod algolia;
pub mod content_api;

pub use algolia::{AlgoliaClient, AlgoliaConfig};
pub use content_api::RestContentSource;
