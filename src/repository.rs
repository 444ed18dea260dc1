use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::db::LocalCacheStore;
use crate::error::{AppError, Result};
use crate::models::{Article, ArticlePatch, ArticleStatus, Language, NewArticle, User};
use crate::services::{RemoteContentGateway, SessionTokenManager};
use crate::translation::{TranslationPipeline, TranslationProvider};

/// The façade the presentation tier talks to.
///
/// Routes reads and writes between the remote gateway and the local cache,
/// invokes translation lazily at display time, and keeps navigation flows
/// alive when the backend is unreachable. Whether a remote backend exists is
/// decided once at construction and never re-checked per call.
pub struct ContentRepository {
    cache: Arc<LocalCacheStore>,
    gateway: Option<Arc<RemoteContentGateway>>,
    session: Arc<SessionTokenManager>,
    pipeline: TranslationPipeline,
}

impl ContentRepository {
    pub fn new(
        cache: Arc<LocalCacheStore>,
        gateway: Option<Arc<RemoteContentGateway>>,
        session: Arc<SessionTokenManager>,
        provider: Arc<dyn TranslationProvider>,
    ) -> Self {
        Self {
            cache,
            gateway,
            session,
            pipeline: TranslationPipeline::new(provider),
        }
    }

    pub fn remote_mode(&self) -> bool {
        self.gateway.is_some()
    }

    /// Recent articles, newest first. Remote first; any failure there falls
    /// back to the local cache so the caller always gets *a* list, degraded
    /// rather than absent. Successful remote reads refresh the cache.
    pub async fn list_recent(&self, limit: usize) -> Vec<Article> {
        if let Some(gateway) = &self.gateway {
            match gateway.latest(limit).await {
                Ok(articles) => {
                    if let Err(e) = self.cache.put_all(articles.clone()).await {
                        tracing::warn!("Failed to refresh local cache: {}", e);
                    }
                    return articles;
                }
                Err(e) => {
                    tracing::warn!("Remote list failed, serving cached articles: {}", e);
                }
            }
        }

        match self.cache.list().await {
            Ok(mut articles) => {
                articles.truncate(limit);
                articles
            }
            Err(e) => {
                tracing::error!("Local cache read failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Creates an article. The Bengali title and content are mandatory;
    /// secondary-language fields default to empty pending translation.
    ///
    /// In remote mode creation is delegated to the gateway (and requires an
    /// authenticated session); in local-only mode the id, timestamp and view
    /// counter are assigned here.
    pub async fn create(&self, new: NewArticle, author: &User) -> Result<Article> {
        if new.title.bn.trim().is_empty() {
            return Err(AppError::Validation("title.bn is required".to_string()));
        }
        if new.content.bn.trim().is_empty() {
            return Err(AppError::Validation("content.bn is required".to_string()));
        }

        if let Some(gateway) = &self.gateway {
            let session = self.session.require_authenticated().await?;
            return gateway.create(&new, author, &session.access_token).await;
        }

        let article = Article {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            excerpt: new.excerpt,
            content: new.content,
            category: new.category,
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            published_at: Utc::now(),
            image: new.image.unwrap_or_default(),
            views: 0,
            is_breaking: new.is_breaking,
            is_featured: new.is_featured,
            status: ArticleStatus::Published,
        };
        self.cache.put(article.clone()).await?;
        Ok(article)
    }

    /// Merges only the supplied fields into the stored record.
    pub async fn update(&self, id: &str, patch: ArticlePatch) -> Result<()> {
        if let Some(gateway) = &self.gateway {
            let session = self.session.require_authenticated().await?;
            return gateway.update(id, &patch, &session.access_token).await;
        }

        let mut article = self
            .cache
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        patch.apply(&mut article);
        self.cache.put(article).await?;
        Ok(())
    }

    /// Idempotent: deleting an unknown id is a no-op.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if let Some(gateway) = &self.gateway {
            let session = self.session.require_authenticated().await?;
            return gateway.delete(id, &session.access_token).await;
        }

        self.cache.remove(id).await
    }

    /// Best-effort view counting. Reads the current count and writes back
    /// count + 1 without locking; concurrent viewers may lose an update,
    /// which is an accepted inaccuracy. Never fails the caller.
    pub async fn record_view(&self, id: &str) {
        if let Err(e) = self.increment_views(id).await {
            tracing::debug!(article_id = %id, "View count update dropped: {}", e);
        }
    }

    async fn increment_views(&self, id: &str) -> Result<()> {
        if let Some(gateway) = &self.gateway {
            if let Some(views) = gateway.views(id).await? {
                gateway.set_views(id, views + 1).await?;
            }
            return Ok(());
        }

        if let Some(article) = self.cache.get(id).await? {
            self.cache.set_views(id, article.views + 1).await?;
        }
        Ok(())
    }

    /// Called before display and on every language switch. Articles already
    /// carrying real content in `lang` pass through untouched; the rest go to
    /// the translation pipeline, which degrades to the original on failure.
    pub async fn resolve_for_language(&self, article: Article, lang: Language) -> Article {
        if article.is_complete_for(lang) {
            return article;
        }
        self.pipeline.translate(article, lang).await
    }

    // Bookmarks are device-local flags, never synced to the remote store.

    pub async fn toggle_bookmark(&self, id: &str) -> Result<bool> {
        self.cache.toggle_bookmark(id).await
    }

    pub async fn is_bookmarked(&self, id: &str) -> Result<bool> {
        self.cache.is_bookmarked(id).await
    }

    pub async fn bookmarks(&self) -> Result<Vec<String>> {
        self.cache.bookmarks().await
    }
}
