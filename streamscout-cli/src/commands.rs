//! CLI command implementations

use anyhow::Context;
use clap::{Args, Subcommand};
use serde_json::{Map, Value, json};
use streamscout_core::{
    ResponseShape, RuntimeMode, ScoutConfig, StreamAggregator, validate_media_query,
};
use streamscout_providers::factory_for;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the JSON API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// Print the provider's sources as JSON
    Sources {
        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// Resolve streams for one movie or episode and print the result
    Resolve {
        #[command(flatten)]
        query: QueryArgs,
        /// Resolve a single source instead of all sources
        #[arg(long)]
        source: Option<String>,
        #[command(flatten)]
        provider: ProviderArgs,
    },
}

/// Flags selecting the provider collaborator.
#[derive(Args, Debug, Default)]
pub struct ProviderArgs {
    /// Runtime mode: production uses the sidecar, development the demo catalogue
    #[arg(long)]
    mode: Option<RuntimeMode>,
    /// Base URL of the provider sidecar
    #[arg(long)]
    provider_url: Option<String>,
    /// Shape of all-sources results (normalized or raw)
    #[arg(long)]
    shape: Option<ResponseShape>,
}

/// Media query flags for `resolve`.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Title of the movie or show
    #[arg(long)]
    title: String,
    /// Release year
    #[arg(long)]
    year: i64,
    /// TMDB id of the movie or show
    #[arg(long)]
    tmdb_id: String,
    /// IMDB id, if known
    #[arg(long)]
    imdb_id: Option<String>,
    /// Season number; makes the query an episode lookup
    #[arg(long)]
    season: Option<i64>,
    /// TMDB id of the season
    #[arg(long)]
    season_tmdb_id: Option<String>,
    /// Episode number
    #[arg(long)]
    episode: Option<i64>,
    /// TMDB id of the episode
    #[arg(long)]
    episode_tmdb_id: Option<String>,
}

impl QueryArgs {
    /// Builds the request body the API would receive for these flags.
    fn to_payload(&self) -> Value {
        let mut payload = Map::new();
        let is_show = self.season.is_some() || self.episode.is_some();
        payload.insert("type".into(), json!(if is_show { "show" } else { "movie" }));
        payload.insert("title".into(), json!(self.title));
        payload.insert("releaseYear".into(), json!(self.year));
        payload.insert("tmdbId".into(), json!(self.tmdb_id));
        if let Some(imdb_id) = &self.imdb_id {
            payload.insert("imdbId".into(), json!(imdb_id));
        }

        if is_show {
            payload.insert(
                "season".into(),
                nested(self.season, self.season_tmdb_id.as_deref()),
            );
            payload.insert(
                "episode".into(),
                nested(self.episode, self.episode_tmdb_id.as_deref()),
            );
        }

        Value::Object(payload)
    }
}

fn nested(number: Option<i64>, tmdb_id: Option<&str>) -> Value {
    let mut object = Map::new();
    if let Some(number) = number {
        object.insert("number".into(), json!(number));
    }
    if let Some(tmdb_id) = tmdb_id {
        object.insert("tmdbId".into(), json!(tmdb_id));
    }
    Value::Object(object)
}

/// Handle the CLI command
///
/// # Errors
/// Returns the first configuration, provider or validation failure
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            provider,
        } => serve(host, port, provider).await,
        Commands::Sources { provider } => list_sources(provider).await,
        Commands::Resolve {
            query,
            source,
            provider,
        } => resolve(query, source, provider).await,
    }
}

/// Environment configuration with command-line overrides applied.
fn load_config(provider: &ProviderArgs) -> anyhow::Result<ScoutConfig> {
    let mut config = ScoutConfig::from_env();
    if let Some(mode) = provider.mode {
        config.runtime_mode = mode;
    }
    if let Some(url) = &provider.provider_url {
        config.provider.base_url = url.clone();
    }
    if let Some(shape) = provider.shape {
        config.streams.all_sources_shape = shape;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn serve(
    host: Option<String>,
    port: Option<u16>,
    provider: ProviderArgs,
) -> anyhow::Result<()> {
    let mut config = load_config(&provider)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let factory = factory_for(&config)?;
    streamscout_web::run_server(config, factory)
        .await
        .context("Server failed")
}

async fn list_sources(provider: ProviderArgs) -> anyhow::Result<()> {
    let config = load_config(&provider)?;
    let providers = factory_for(&config)?.build();

    let sources = providers
        .list_sources()
        .await
        .context("Failed to list sources")?;

    println!("{}", serde_json::to_string_pretty(&sources)?);
    Ok(())
}

async fn resolve(
    query: QueryArgs,
    source: Option<String>,
    provider: ProviderArgs,
) -> anyhow::Result<()> {
    let config = load_config(&provider)?;
    let media = validate_media_query(&query.to_payload())?;
    let providers = factory_for(&config)?.build();

    tracing::debug!(%media, source = ?source, "Resolving from the command line");
    let response = StreamAggregator::new(providers.as_ref())
        .resolve(source.as_deref(), &media, config.streams.all_sources_shape)
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
