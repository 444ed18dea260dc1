use std::sync::Arc;

use sangbad::models::Language;
use sangbad::{
    Config, ContentRepository, HttpTranslator, LocalCacheStore, RemoteContentGateway, Result,
    SessionTokenManager, TranslationProvider, UnconfiguredTranslator,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load()?;

    let cache = Arc::new(LocalCacheStore::new(&config.db_path).await?);

    // Remote mode is decided once here, not re-evaluated per call
    let gateway = if config.remote_configured() {
        let url = config.remote_url.clone().unwrap_or_default();
        let key = config.remote_api_key.clone().unwrap_or_default();
        Some(Arc::new(RemoteContentGateway::new(&url, key)?))
    } else {
        tracing::warn!("Remote backend not configured; running in local-only mode");
        None
    };

    let provider: Arc<dyn TranslationProvider> = match &config.translator_api_key {
        Some(key) if !key.is_empty() => Arc::new(HttpTranslator::new(key.clone())),
        _ => Arc::new(UnconfiguredTranslator),
    };

    let session = Arc::new(SessionTokenManager::new(gateway.clone(), Arc::clone(&cache)));
    if let Some(restored) = session.restore_session().await {
        eprintln!("Session restored for {}", restored.user.email);
    }

    let repository = ContentRepository::new(cache, gateway, session, provider);

    // Check for --refresh flag (warm the local cache and exit)
    if args.len() >= 2 && args[1] == "--refresh" {
        let articles = repository.list_recent(config.default_list_limit).await;
        println!("Cached {} articles", articles.len());
        return Ok(());
    }

    // Default: print recent headlines; `--en` resolves them to English first
    let english = args.len() >= 2 && args[1] == "--en";
    let lang = if english { Language::En } else { Language::Bn };

    let articles = repository.list_recent(config.default_list_limit).await;
    if articles.is_empty() {
        println!("No articles available");
        return Ok(());
    }

    for article in articles {
        let article = repository.resolve_for_language(article, lang).await;
        let marker = if article.is_breaking { "! " } else { "  " };
        println!(
            "{}{}  [{} | {} views]",
            marker,
            article.title.get(lang),
            article.category.as_str(),
            article.views
        );
    }

    Ok(())
}
