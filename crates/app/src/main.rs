use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use site_search_core::{
    builtin_registry, primary_tenant, searchable_types, AlgoliaClient, AlgoliaConfig,
    BatchUpserter, ConfigSelection, ContentItem, ContentSource, IncrementalIndexer,
    IndexConfigFiles, IndexConfigManager, IndexNamer, ReindexFailure, ReindexOptions, Reindexer,
    RestContentSource, UpdateOutcome, DEFAULT_PAGE_SIZE, GLOBAL_INDEX,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "site-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Search service application id
    #[arg(long, env = "ALGOLIA_APPLICATION_ID")]
    app_id: Option<String>,

    /// Search service admin API key
    #[arg(long, env = "ALGOLIA_ADMIN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override of the search service write host
    #[arg(long, env = "ALGOLIA_HOST")]
    search_host: Option<String>,

    /// Environment prefix of every index name (e.g. `local`, `prod`)
    #[arg(long, env = "ALGOLIA_INDEX_PREFIX", default_value = "")]
    index_prefix: String,

    /// CMS table prefix, the second part of every index name
    #[arg(long, env = "CMS_TABLE_PREFIX", default_value = "wp_")]
    table_prefix: String,

    /// Base URL of the CMS content export API
    #[arg(long, env = "CONTENT_API_URL")]
    content_api_url: Option<String>,

    /// Bearer token for the content export API
    #[arg(long, env = "CONTENT_API_TOKEN", hide_env_values = true)]
    content_api_token: Option<String>,

    /// Directory holding `{index}-{settings|synonyms|rules}.json`
    #[arg(long, env = "SEARCH_CONFIG_DIR", default_value = "algolia-json")]
    config_dir: PathBuf,

    /// Content types never indexed, comma separated
    #[arg(
        long,
        env = "SEARCH_EXCLUDED_TYPES",
        value_delimiter = ',',
        default_value = "job_listing"
    )]
    excluded_types: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Clear the search indexes and rebuild them from the content store.
    Reindex {
        /// Only reindex this content type; indexes are not cleared.
        #[arg(long = "type")]
        content_type: Option<String>,
        /// Log every serialized item and batch.
        #[arg(long, default_value_t = false)]
        verbose: bool,
        /// Items requested per content page.
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Print settings, synonyms and rules of an index as JSON.
    GetConfig(ConfigArgs),
    /// Push local settings, synonyms and rules files to an index.
    SetConfig(ConfigArgs),
    /// Apply one saved content item (CMS hook payload) to the indexes.
    SyncItem {
        /// Tenant the item belongs to.
        #[arg(long)]
        tenant: u64,
        /// JSON document path, `-` for stdin.
        #[arg(long, default_value = "-")]
        file: String,
    },
    /// Print the physical name of a logical index, or the bare prefix.
    IndexName {
        name: Option<String>,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Logical index name.
    #[arg(long, default_value = GLOBAL_INDEX)]
    index: String,
    #[arg(long, default_value_t = false)]
    settings: bool,
    #[arg(long, default_value_t = false)]
    synonyms: bool,
    #[arg(long, default_value_t = false)]
    rules: bool,
}

impl ConfigArgs {
    /// No part flag means every part.
    fn selection(&self) -> ConfigSelection {
        if !(self.settings || self.synonyms || self.rules) {
            return ConfigSelection::all();
        }
        ConfigSelection {
            settings: self.settings,
            synonyms: self.synonyms,
            rules: self.rules,
        }
    }
}

impl Cli {
    fn namer(&self) -> IndexNamer {
        IndexNamer::new(&self.index_prefix, &self.table_prefix)
    }

    fn search_client(&self) -> anyhow::Result<AlgoliaClient> {
        let (Some(app_id), Some(api_key)) = (&self.app_id, &self.api_key) else {
            bail!("ALGOLIA_APPLICATION_ID and ALGOLIA_ADMIN_API_KEY must be set");
        };

        Ok(AlgoliaClient::new(AlgoliaConfig {
            host: self.search_host.clone(),
            ..AlgoliaConfig::new(app_id, api_key)
        })?)
    }

    fn content_source(&self) -> anyhow::Result<RestContentSource> {
        let base_url = self
            .content_api_url
            .as_deref()
            .context("CONTENT_API_URL must be set")?;
        Ok(RestContentSource::new(
            base_url,
            self.content_api_token.clone(),
        )?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "site-search boot"
    );

    match &cli.command {
        Command::Reindex {
            content_type,
            verbose,
            page_size,
        } => {
            let reindexer = Reindexer::new(
                Arc::new(cli.content_source()?),
                Arc::new(cli.search_client()?),
                Arc::new(builtin_registry()?),
                cli.namer(),
            )
            .with_excluded_types(cli.excluded_types.clone());

            let options = ReindexOptions {
                content_type: content_type.clone(),
                verbose: *verbose,
                page_size: *page_size,
            };
            let report = reindexer.run(&options).await?;

            for failure in &report.failures {
                match failure {
                    ReindexFailure::Clear { index, reason } => {
                        error!(index = %index, reason = %reason, "clear failed");
                    }
                    ReindexFailure::Fetch {
                        index,
                        tenant_id,
                        content_type,
                        page,
                        reason,
                    } => {
                        error!(index = %index, tenant_id, content_type = %content_type, page, reason = %reason, "fetch failed");
                    }
                    ReindexFailure::Save {
                        index,
                        tenant_id,
                        content_type,
                        page,
                        records,
                        reason,
                    } => {
                        error!(index = %index, tenant_id, content_type = %content_type, page, records, reason = %reason, "save failed");
                    }
                }
            }

            println!(
                "{} items ({} records) indexed, {} skipped at {}",
                report.indexed_items,
                report.indexed_records,
                report.skipped_items,
                Utc::now().to_rfc3339()
            );

            if !report.is_success() {
                bail!("reindex finished with {} failure(s)", report.failures.len());
            }
        }
        Command::GetConfig(args) => {
            let manager = IndexConfigManager::new(
                Arc::new(cli.search_client()?),
                cli.namer(),
                IndexConfigFiles::new(&cli.config_dir),
            );
            let snapshot = manager.pull(&args.index, args.selection()).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::SetConfig(args) => {
            let manager = IndexConfigManager::new(
                Arc::new(cli.search_client()?),
                cli.namer(),
                IndexConfigFiles::new(&cli.config_dir),
            );
            let report = manager.push(&args.index, args.selection()).await?;
            for kind in &report.pushed {
                println!("{} pushed to {}", kind.as_str(), report.index);
            }
            for kind in &report.skipped {
                println!("{} skipped for {} (nothing to push)", kind.as_str(), report.index);
            }
        }
        Command::SyncItem { tenant, file } => {
            let raw = if file == "-" {
                let mut raw = String::new();
                tokio::io::stdin().read_to_string(&mut raw).await?;
                raw
            } else {
                tokio::fs::read_to_string(file)
                    .await
                    .with_context(|| format!("reading {file}"))?
            };
            let item: ContentItem = serde_json::from_str(&raw).context("parsing content item")?;

            let source = cli.content_source()?;
            let tenants = source.tenants().await?;
            let Some(target) = tenants.iter().find(|candidate| candidate.id == *tenant) else {
                bail!("tenant {tenant} is not known to the content store");
            };
            let primary = primary_tenant(&tenants).context("content store reported no tenants")?;
            let types = source.content_types(primary).await?;

            let indexer = IncrementalIndexer::new(
                BatchUpserter::new(Arc::new(cli.search_client()?), cli.namer()),
                Arc::new(builtin_registry()?),
                searchable_types(&types, &cli.excluded_types),
            );

            match indexer.content_saved(&item, target).await? {
                UpdateOutcome::Indexed { records, people } => {
                    println!("{} {} indexed as {records} record(s), people index: {people}", item.content_type, item.id);
                }
                UpdateOutcome::Removed { people } => {
                    println!("{} {} removed, people index: {people}", item.content_type, item.id);
                }
                UpdateOutcome::Skipped(reason) => {
                    warn!(item_id = item.id, reason = ?reason, "update skipped");
                    println!("{} {} skipped: {reason:?}", item.content_type, item.id);
                }
            }
        }
        Command::IndexName { name } => {
            let namer = cli.namer();
            match name {
                Some(name) => println!("{}", namer.qualify(name)),
                None => println!("{}", namer.prefix()),
            }
        }
    }

    Ok(())
}
