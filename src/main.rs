use std::sync::Arc;

use anyhow::Context;
use bookshelf_app::modules::books::mongo::MongoBookRepository;
use bookshelf_kernel::{settings::Settings, InitCtx};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    bookshelf_telemetry::init(&settings.telemetry).context("failed to initialize telemetry")?;

    tracing::info!(
        env = ?settings.environment,
        database = %settings.database.name,
        "bookshelf-app bootstrap starting"
    );

    let connection = bookshelf_db::connect(&settings.database)
        .await
        .context("failed to set up MongoDB client")?;

    let registry = bookshelf_app::registry(Arc::new(MongoBookRepository::new(connection)));

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;

    let served =
        bookshelf_http::start_server(&registry, &settings, bookshelf_http::shutdown_signal()).await;

    registry.stop_modules().await?;
    served?;

    tracing::info!("bookshelf-app shut down");
    Ok(())
}
