use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::error::{AppError, AuthError, Result};
use crate::models::{
    Article, ArticlePatch, ArticleStatus, Category, LocalizedText, NewArticle, Session, User,
    UserRole,
};

const DEFAULT_IMAGE: &str = "https://picsum.photos/seed/news/800/450";

/// Article row as the backend stores it: one flattened column per language.
#[derive(Debug, Deserialize)]
struct ArticleRow {
    id: String,
    title_bn: Option<String>,
    title_en: Option<String>,
    excerpt_bn: Option<String>,
    excerpt_en: Option<String>,
    content_bn: Option<String>,
    content_en: Option<String>,
    category: Option<String>,
    author_id: Option<String>,
    author_name: Option<String>,
    published_at: Option<String>,
    image: Option<String>,
    views: Option<i64>,
    is_breaking: Option<bool>,
    is_featured: Option<bool>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ViewsRow {
    views: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: String,
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Deserialize)]
struct UserMetadata {
    full_name: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthFailure {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

/// Client for the authoritative backend: a PostgREST-style article collection
/// plus password-grant auth and token introspection.
#[derive(Debug)]
pub struct RemoteContentGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteContentGateway {
    pub fn new(base_url: &str, api_key: String) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("invalid remote_url {base_url:?}: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    // Article collection

    pub async fn latest(&self, limit: usize) -> Result<Vec<Article>> {
        let response = self
            .client
            .get(format!(
                "{}/rest/v1/articles?select=*&order=published_at.desc&limit={}",
                self.base_url, limit
            ))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(
                anyhow::anyhow!("article list failed: HTTP {}", response.status()).into(),
            );
        }

        let rows: Vec<ArticleRow> = response.json().await?;
        Ok(rows.into_iter().map(article_from_row).collect())
    }

    pub async fn create(&self, new: &NewArticle, author: &User, token: &str) -> Result<Article> {
        let body = json!({
            "title_bn": new.title.bn,
            "title_en": new.title.en,
            "excerpt_bn": new.excerpt.bn,
            "excerpt_en": new.excerpt.en,
            "content_bn": new.content.bn,
            "content_en": new.content.en,
            "category": new.category.as_str(),
            "author_id": author.id,
            "author_name": author.name,
            "image": new.image,
            "is_breaking": new.is_breaking,
            "is_featured": new.is_featured,
            "status": ArticleStatus::Published.as_str(),
        });

        let response = self
            .client
            .post(format!("{}/rest/v1/articles", self.base_url))
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AppError::Storage(error_text));
        }

        let mut rows: Vec<ArticleRow> = response.json().await?;
        if rows.is_empty() {
            return Err(AppError::Storage(
                "backend returned no row for created article".to_string(),
            ));
        }
        Ok(article_from_row(rows.remove(0)))
    }

    pub async fn update(&self, id: &str, patch: &ArticlePatch, token: &str) -> Result<()> {
        let mut body = serde_json::Map::new();
        if let Some(title) = &patch.title {
            body.insert("title_bn".to_string(), json!(title.bn));
            body.insert("title_en".to_string(), json!(title.en));
        }
        if let Some(excerpt) = &patch.excerpt {
            body.insert("excerpt_bn".to_string(), json!(excerpt.bn));
            body.insert("excerpt_en".to_string(), json!(excerpt.en));
        }
        if let Some(content) = &patch.content {
            body.insert("content_bn".to_string(), json!(content.bn));
            body.insert("content_en".to_string(), json!(content.en));
        }
        if let Some(category) = patch.category {
            body.insert("category".to_string(), json!(category.as_str()));
        }
        if let Some(image) = &patch.image {
            body.insert("image".to_string(), json!(image));
        }
        if let Some(is_breaking) = patch.is_breaking {
            body.insert("is_breaking".to_string(), json!(is_breaking));
        }
        if let Some(is_featured) = patch.is_featured {
            body.insert("is_featured".to_string(), json!(is_featured));
        }
        if let Some(status) = patch.status {
            body.insert("status".to_string(), json!(status.as_str()));
        }

        let response = self
            .client
            .patch(format!(
                "{}/rest/v1/articles?id=eq.{}",
                self.base_url, id
            ))
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AppError::Storage(error_text));
        }

        // PATCH on a missing id succeeds with an empty representation
        let rows: Vec<ArticleRow> = response.json().await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str, token: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!(
                "{}/rest/v1/articles?id=eq.{}",
                self.base_url, id
            ))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        // Delete is idempotent: a missing row is not an error
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            let error_text = response.text().await?;
            return Err(AppError::Storage(error_text));
        }
        Ok(())
    }

    /// Current view count for `id`, or `None` when the row is absent.
    pub async fn views(&self, id: &str) -> Result<Option<u64>> {
        let response = self
            .client
            .get(format!(
                "{}/rest/v1/articles?id=eq.{}&select=views",
                self.base_url, id
            ))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("views read failed: HTTP {}", response.status()).into());
        }

        let rows: Vec<ViewsRow> = response.json().await?;
        Ok(rows
            .first()
            .map(|row| row.views.unwrap_or(0).max(0) as u64))
    }

    pub async fn set_views(&self, id: &str, views: u64) -> Result<()> {
        let response = self
            .client
            .patch(format!(
                "{}/rest/v1/articles?id=eq.{}",
                self.base_url, id
            ))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&json!({ "views": views }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("views write failed: HTTP {}", response.status()).into());
        }
        Ok(())
    }

    // Auth

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.base_url
            ))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let failure: AuthFailure = response.json().await.unwrap_or(AuthFailure {
                error_description: None,
                msg: None,
                message: None,
            });
            let message = failure
                .error_description
                .or(failure.msg)
                .or(failure.message)
                .unwrap_or_else(|| "authentication failed".to_string());
            return Err(classify_login_failure(&message));
        }

        let token: TokenResponse = response.json().await?;
        let user = user_from_auth(token.user);
        Ok(Session {
            user,
            access_token: token.access_token,
        })
    }

    /// Resolves a persisted token to its user. Any failure means the token is
    /// no longer good.
    pub async fn user_from_token(&self, token: &str) -> Result<User> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(
                anyhow::anyhow!("token introspection failed: HTTP {}", response.status()).into(),
            );
        }

        let user: AuthUser = response.json().await?;
        Ok(user_from_auth(user))
    }
}

/// Maps the auth endpoint's error text onto the two user-actionable login
/// failures. Anything unrecognized stays a generic error.
fn classify_login_failure(message: &str) -> AppError {
    if message.contains("Email not confirmed") {
        AppError::Auth(AuthError::UnconfirmedAccount)
    } else if message.contains("Invalid login credentials") {
        AppError::Auth(AuthError::InvalidCredentials)
    } else {
        anyhow::anyhow!("login failed: {message}").into()
    }
}

fn user_from_auth(user: AuthUser) -> User {
    let metadata = user.user_metadata.unwrap_or(UserMetadata {
        full_name: None,
        role: None,
    });
    let name = metadata
        .full_name
        .unwrap_or_else(|| user.email.split('@').next().unwrap_or_default().to_string());
    let role = match metadata.role.as_deref() {
        Some("editor") => UserRole::Editor,
        Some("reporter") => UserRole::Reporter,
        Some("user") => UserRole::User,
        // editorial accounts without explicit metadata act as admins
        _ => UserRole::Admin,
    };
    User {
        id: user.id,
        name,
        email: user.email,
        role,
    }
}

fn article_from_row(row: ArticleRow) -> Article {
    Article {
        id: row.id,
        title: LocalizedText {
            bn: row.title_bn.unwrap_or_default(),
            en: row.title_en.unwrap_or_default(),
        },
        excerpt: LocalizedText {
            bn: row.excerpt_bn.unwrap_or_default(),
            en: row.excerpt_en.unwrap_or_default(),
        },
        content: LocalizedText {
            bn: row.content_bn.unwrap_or_default(),
            en: row.content_en.unwrap_or_default(),
        },
        category: Category::parse(row.category.as_deref().unwrap_or_default()),
        author_id: row.author_id.unwrap_or_default(),
        author_name: row.author_name.unwrap_or_default(),
        published_at: row
            .published_at
            .as_deref()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .unwrap_or_else(chrono::Utc::now),
        image: row.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        views: row.views.unwrap_or(0).max(0) as u64,
        is_breaking: row.is_breaking.unwrap_or(false),
        is_featured: row.is_featured.unwrap_or(false),
        status: ArticleStatus::parse(row.status.as_deref().unwrap_or_default()),
    }
}
