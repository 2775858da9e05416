mod common;

use common::{Call, FakeSearchService};
use serde_json::json;
use site_search_core::{
    ConfigKind, ConfigSelection, IndexConfigFiles, IndexConfigManager, IndexNamer, IndexerError,
    SearchService, GLOBAL_INDEX, PEOPLE_INDEX,
};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

const GLOBAL: &str = "local_wp_global_search";

fn manager(service: &Arc<FakeSearchService>, dir: &std::path::Path) -> IndexConfigManager<FakeSearchService> {
    IndexConfigManager::new(
        service.clone(),
        IndexNamer::new("local", "wp_"),
        IndexConfigFiles::new(dir),
    )
}

#[tokio::test]
async fn push_sends_present_documents_and_skips_the_rest() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("global_search-settings.json"),
        r#"{"distinct": true, "attributeForDistinct": "distinct_key"}"#,
    )?;
    fs::write(
        dir.path().join("global_search-synonyms.json"),
        r#"[{"objectID": "syn-1", "type": "synonym", "synonyms": ["prof", "professor"]}]"#,
    )?;
    fs::write(dir.path().join("global_search-rules.json"), "[]")?;

    let service = Arc::new(FakeSearchService::default());
    service.create_index(GLOBAL);

    let report = manager(&service, dir.path())
        .push(GLOBAL_INDEX, ConfigSelection::all())
        .await?;

    assert_eq!(report.index, GLOBAL);
    assert_eq!(report.pushed, vec![ConfigKind::Settings, ConfigKind::Synonyms]);
    assert_eq!(report.skipped, vec![ConfigKind::Rules]);
    assert_eq!(
        service.settings(GLOBAL),
        Some(json!({"distinct": true, "attributeForDistinct": "distinct_key"}))
    );
    assert_eq!(
        service.calls(),
        vec![
            Call::SetSettings(GLOBAL.to_string()),
            Call::ReplaceSynonyms(GLOBAL.to_string(), 1),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn push_respects_selection() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("people_search-settings.json"), r#"{"hitsPerPage": 50}"#)?;
    fs::write(
        dir.path().join("people_search-rules.json"),
        r#"[{"objectID": "rule-1", "conditions": []}]"#,
    )?;

    let service = Arc::new(FakeSearchService::default());
    service.create_index("local_wp_people_search");

    let selection = ConfigSelection {
        rules: true,
        ..ConfigSelection::default()
    };
    let report = manager(&service, dir.path()).push(PEOPLE_INDEX, selection).await?;

    assert_eq!(report.pushed, vec![ConfigKind::Rules]);
    assert!(report.skipped.is_empty());
    assert_eq!(service.settings("local_wp_people_search"), None);
    Ok(())
}

#[tokio::test]
async fn missing_index_is_reported_without_writes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("global_search-settings.json"), r#"{"hitsPerPage": 20}"#)?;
    let service = Arc::new(FakeSearchService::default());
    let manager = manager(&service, dir.path());

    assert!(matches!(
        manager.push(GLOBAL_INDEX, ConfigSelection::all()).await,
        Err(IndexerError::IndexNotFound(index)) if index == GLOBAL
    ));
    assert!(matches!(
        manager.pull(GLOBAL_INDEX, ConfigSelection::all()).await,
        Err(IndexerError::IndexNotFound(_))
    ));
    assert!(service.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn malformed_document_aborts_push() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("global_search-settings.json"), "{oops")?;
    let service = Arc::new(FakeSearchService::default());
    service.create_index(GLOBAL);

    let result = manager(&service, dir.path())
        .push(GLOBAL_INDEX, ConfigSelection::all())
        .await;

    assert!(matches!(result, Err(IndexerError::InvalidConfig { .. })));
    assert!(service.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn pull_returns_only_selected_parts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let service = Arc::new(FakeSearchService::default());
    service.create_index(GLOBAL);
    service.set_settings(GLOBAL, &json!({"hitsPerPage": 20})).await?;
    service
        .replace_synonyms(GLOBAL, &[json!({"objectID": "syn-1", "type": "synonym"})])
        .await?;

    let selection = ConfigSelection {
        settings: true,
        synonyms: true,
        rules: false,
    };
    let snapshot = manager(&service, dir.path()).pull(GLOBAL_INDEX, selection).await?;

    assert_eq!(snapshot.settings, Some(json!({"hitsPerPage": 20})));
    assert_eq!(snapshot.synonyms, Some(vec![json!({"objectID": "syn-1", "type": "synonym"})]));
    assert_eq!(snapshot.rules, None);
    assert_eq!(
        serde_json::to_value(&snapshot)?,
        json!({
            "settings": {"hitsPerPage": 20},
            "synonyms": [{"objectID": "syn-1", "type": "synonym"}]
        })
    );
    Ok(())
}
