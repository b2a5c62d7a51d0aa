//! Gazette - a multi-user blogging backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gazette::{
    api::{self, AppState},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCategoryRepository, SqlxContactMessageRepository, SqlxPostRepository,
            SqlxSessionRepository, SqlxTagRepository, SqlxUserRepository,
        },
    },
    services::{
        CategoryService, ChallengeVerifier, ContactService, HttpChallengeVerifier,
        PostService, SmtpMailer, TagService, UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gazette=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gazette blog service...");

    let config = Arc::new(Config::load_with_env(Path::new("config.yml"))?);
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected");

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let cache = create_cache(&config.cache);
    tracing::info!("Cache initialized");

    // Repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let contact_repo = SqlxContactMessageRepository::boxed(pool.clone());

    // Shared collaborators
    let mailer = Arc::new(SmtpMailer::new(config.mail.clone()));
    let challenge_verifier: Option<Arc<dyn ChallengeVerifier>> = if config.challenge.is_enabled() {
        tracing::info!("Human-verification challenge enabled");
        Some(Arc::new(HttpChallengeVerifier::new(
            config.challenge.clone(),
        )?))
    } else {
        None
    };

    // Services
    let user_service = Arc::new(UserService::new(
        user_repo,
        session_repo,
        mailer.clone(),
    ));
    let category_service = Arc::new(CategoryService::new(category_repo, cache.clone()));
    let tag_service = Arc::new(TagService::new(tag_repo.clone()));
    let post_service = Arc::new(PostService::new(post_repo, tag_repo, cache));
    let contact_service = Arc::new(ContactService::new(
        contact_repo,
        mailer,
        challenge_verifier,
    ));

    let state = AppState {
        config: config.clone(),
        post_service,
        category_service,
        tag_service,
        contact_service,
        user_service,
    };

    let app = api::build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
