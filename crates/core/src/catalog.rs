use crate::models::ContentTypeInfo;

/// Public types that are never sent to search.
pub const DEFAULT_EXCLUDED_TYPES: [&str; 1] = ["job_listing"];

/// Search-eligible type names minus `excluded`, in registration order.
pub fn searchable_types<S: AsRef<str>>(types: &[ContentTypeInfo], excluded: &[S]) -> Vec<String> {
    types
        .iter()
        .filter(|info| info.is_search_eligible())
        .filter(|info| !excluded.iter().any(|name| name.as_ref() == info.name))
        .map(|info| info.name.clone())
        .fold(Vec::new(), |mut names, name| {
            if !names.contains(&name) {
                names.push(name);
            }
            names
        })
}
