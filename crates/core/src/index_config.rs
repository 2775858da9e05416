use crate::naming::IndexNamer;
use crate::traits::SearchService;
use crate::IndexerError;
use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Settings,
    Synonyms,
    Rules,
}

impl ConfigKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Synonyms => "synonyms",
            Self::Rules => "rules",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigSelection {
    pub settings: bool,
    pub synonyms: bool,
    pub rules: bool,
}

impl ConfigSelection {
    pub fn all() -> Self {
        Self {
            settings: true,
            synonyms: true,
            rules: true,
        }
    }
}

/// `{dir}/{logical_name}-{settings|synonyms|rules}.json`
#[derive(Debug, Clone)]
pub struct IndexConfigFiles {
    dir: PathBuf,
}

impl IndexConfigFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, logical_name: &str, kind: ConfigKind) -> PathBuf {
        self.dir
            .join(format!("{logical_name}-{}.json", kind.as_str()))
    }

    pub async fn load(&self, logical_name: &str, kind: ConfigKind) -> Result<Value, IndexerError> {
        let path = self.path(logical_name, kind);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(IndexerError::ConfigMissing(path));
            }
            Err(error) => return Err(error.into()),
        };

        serde_json::from_str(&raw).map_err(|source| IndexerError::InvalidConfig { path, source })
    }

    /// Like [`Self::load`], with a missing file meaning "nothing to push".
    pub async fn load_optional(&self, logical_name: &str, kind: ConfigKind) -> Result<Option<Value>, IndexerError> {
        match self.load(logical_name, kind).await {
            Ok(value) => Ok(Some(value)),
            Err(IndexerError::ConfigMissing(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn load_list(&self, logical_name: &str, kind: ConfigKind) -> Result<Option<Vec<Value>>, IndexerError> {
        let Some(value) = self.load_optional(logical_name, kind).await? else {
            return Ok(None);
        };

        serde_json::from_value(value).map(Some).map_err(|source| IndexerError::InvalidConfig {
            path: self.path(logical_name, kind),
            source,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexConfigSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    pub index: String,
    pub pushed: Vec<ConfigKind>,
    pub skipped: Vec<ConfigKind>,
}

pub struct IndexConfigManager<S> {
    service: Arc<S>,
    namer: IndexNamer,
    files: IndexConfigFiles,
}

impl<S> IndexConfigManager<S>
where
    S: SearchService,
{
    pub fn new(service: Arc<S>, namer: IndexNamer, files: IndexConfigFiles) -> Self {
        Self {
            service,
            namer,
            files,
        }
    }

    pub async fn pull(&self, logical_name: &str, selection: ConfigSelection) -> Result<IndexConfigSnapshot, IndexerError> {
        let index = self.existing_index(logical_name).await?;
        let mut snapshot = IndexConfigSnapshot::default();

        if selection.settings {
            snapshot.settings = Some(self.service.get_settings(&index).await?);
        }
        if selection.synonyms {
            snapshot.synonyms = Some(self.service.browse_synonyms(&index).await?);
        }
        if selection.rules {
            snapshot.rules = Some(self.service.browse_rules(&index).await?);
        }

        Ok(snapshot)
    }

    /// Pushes each selected local document; absent or empty documents are skipped.
    pub async fn push(&self, logical_name: &str, selection: ConfigSelection) -> Result<PushReport, IndexerError> {
        let index = self.existing_index(logical_name).await?;
        let mut report = PushReport {
            index: index.clone(),
            ..PushReport::default()
        };

        if selection.settings {
            match self.files.load_optional(logical_name, ConfigKind::Settings).await? {
                Some(settings) if !is_empty_document(&settings) => {
                    self.service
                        .set_settings(&index, &settings)
                        .await
                        .map_err(|error| IndexerError::upstream("set settings", &index, error))?;
                    report.pushed.push(ConfigKind::Settings);
                }
                _ => report.skipped.push(ConfigKind::Settings),
            }
        }

        if selection.synonyms {
            match self.files.load_list(logical_name, ConfigKind::Synonyms).await? {
                Some(synonyms) if !synonyms.is_empty() => {
                    self.service
                        .replace_synonyms(&index, &synonyms)
                        .await
                        .map_err(|error| IndexerError::upstream("replace synonyms", &index, error))?;
                    report.pushed.push(ConfigKind::Synonyms);
                }
                _ => report.skipped.push(ConfigKind::Synonyms),
            }
        }

        if selection.rules {
            match self.files.load_list(logical_name, ConfigKind::Rules).await? {
                Some(rules) if !rules.is_empty() => {
                    self.service
                        .replace_rules(&index, &rules)
                        .await
                        .map_err(|error| IndexerError::upstream("replace rules", &index, error))?;
                    report.pushed.push(ConfigKind::Rules);
                }
                _ => report.skipped.push(ConfigKind::Rules),
            }
        }

        for kind in &report.pushed {
            info!(index = %index, part = kind.as_str(), "pushed index config");
        }
        for kind in &report.skipped {
            info!(index = %index, part = kind.as_str(), "nothing to push");
        }
        Ok(report)
    }

    async fn existing_index(&self, logical_name: &str) -> Result<String, IndexerError> {
        let index = self.namer.qualify(logical_name);
        if !self.service.index_exists(&index).await? {
            return Err(IndexerError::IndexNotFound(index));
        }
        Ok(index)
    }
}

fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
