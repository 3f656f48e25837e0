//! Feed sync entry point
//!
//! Run with:
//! ```bash
//! cargo run -p feed-sync -- [viewer_id]
//! ```
//!
//! Configuration is loaded from environment variables. Prints the first feed
//! page, decorated for the given viewer, as JSON on stdout.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use feed_cache::{FeedCache, ReactionTallyCache, SyncContext, ViewerSession};
use feed_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use feed_core::{EntityType, RepoResult, SessionProvider, Snowflake, SnowflakeGenerator};
use feed_db::{
    create_pool, run_migrations, PgCommentRepository, PgFavoriteRepository, PgPostRepository,
    PgProfileRepository, PgReactionRepository, PgVoteRepository,
};
use tracing::{error, info};

/// Session backed by the user id given on the command line
struct CommandLineSession(Option<Snowflake>);

#[async_trait]
impl SessionProvider for CommandLineSession {
    async fn current_user(&self) -> RepoResult<Option<Snowflake>> {
        Ok(self.0)
    }
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Feed sync failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        page_size = config.feed.page_size,
        "Configuration loaded"
    );

    let viewer_id = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<Snowflake>())
        .transpose()
        .context("viewer id must be an integer")?;

    let pool = create_pool(&config.database)
        .await
        .context("failed to connect to the database")?;
    run_migrations(&pool).await.context("failed to run migrations")?;

    let profiles = Arc::new(PgProfileRepository::new(pool.clone()));
    let ctx = SyncContext::builder()
        .post_repo(Arc::new(PgPostRepository::new(pool.clone())))
        .comment_repo(Arc::new(PgCommentRepository::new(pool.clone())))
        .vote_repo(Arc::new(PgVoteRepository::new(pool.clone())))
        .favorite_repo(Arc::new(PgFavoriteRepository::new(pool.clone())))
        .reaction_repo(Arc::new(PgReactionRepository::new(pool)))
        .profile_repo(profiles.clone())
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .feed_config(config.feed.clone())
        .storage_config(config.storage.clone())
        .build()?;

    let session = ViewerSession::new(Arc::new(CommandLineSession(viewer_id)), profiles);
    let viewer = session.initialize().await;

    let feed = FeedCache::new(ctx.clone());
    let page = feed.fetch_posts(viewer, true).await;
    if !page.is_success() {
        anyhow::bail!(page.error.unwrap_or_else(|| "feed fetch failed".to_string()));
    }

    let reactions = ReactionTallyCache::new(ctx);
    let post_ids: Vec<Snowflake> = feed.posts().iter().map(|p| p.id).collect();
    let tallies = reactions
        .fetch_reactions_batch(viewer, &post_ids, EntityType::Post)
        .await;

    let entries: Vec<serde_json::Value> = feed
        .posts()
        .into_iter()
        .map(|post| {
            let tally = tallies.get(&post.id).cloned().unwrap_or_default();
            serde_json::json!({ "post": post, "reactions": tally })
        })
        .collect();

    let output = serde_json::json!({
        "viewer": viewer.map(|v| v.id),
        "has_more": feed.has_more(),
        "posts": entries,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    info!(count = post_ids.len(), "Feed page printed");
    Ok(())
}
