pub const GLOBAL_INDEX: &str = "global_search";

pub const PEOPLE_INDEX: &str = "people_search";

pub const PEOPLE_TYPES: [&str; 3] = ["student", "faculty", "person"];

pub fn is_person_type(content_type: &str) -> bool {
    PEOPLE_TYPES.contains(&content_type)
}

/// Expands logical index names into physical ones:
/// `{environment_prefix}_{table_prefix}{logical_name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNamer {
    environment_prefix: String,
    table_prefix: String,
}

impl IndexNamer {
    pub fn new(environment_prefix: impl Into<String>, table_prefix: impl Into<String>) -> Self {
        Self {
            environment_prefix: environment_prefix.into(),
            table_prefix: table_prefix.into(),
        }
    }

    pub fn qualify(&self, logical_name: &str) -> String {
        format!(
            "{}_{}{}",
            self.environment_prefix, self.table_prefix, logical_name
        )
    }

    pub fn prefix(&self) -> String {
        self.qualify("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifies_with_environment_and_table_prefix() {
        let namer = IndexNamer::new("local", "wp_");
        assert_eq!(namer.qualify(GLOBAL_INDEX), "local_wp_global_search");
        assert_eq!(namer.qualify(PEOPLE_INDEX), "local_wp_people_search");
        assert_eq!(namer.prefix(), "local_wp_");
    }

    #[test]
    fn empty_environment_keeps_separator() {
        let namer = IndexNamer::new("", "wp_");
        assert_eq!(namer.qualify(GLOBAL_INDEX), "_wp_global_search");
    }

    #[test]
    fn environments_never_collide() {
        let stage = IndexNamer::new("stage", "wp_");
        let prod = IndexNamer::new("prod", "wp_");
        assert_ne!(stage.qualify(GLOBAL_INDEX), prod.qualify(GLOBAL_INDEX));
    }

    #[test]
    fn person_types() {
        assert!(is_person_type("faculty"));
        assert!(!is_person_type("page"));
    }
}
