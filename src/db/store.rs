use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{Article, ArticleStatus, Category, LocalizedText};

use super::schema::SCHEMA;

/// Most recent records retained in the active working set by `put_all`.
/// The cache serves the "recent news" access pattern, not a full archive.
const WORKING_SET_LIMIT: usize = 50;

/// Durable local persistence: article working set, bookmark flags and the
/// persisted session token, all in one SQLite file.
///
/// First access on a fresh path creates an empty store; callers never need a
/// separate initialization step.
pub struct LocalCacheStore {
    conn: Connection,
}

impl LocalCacheStore {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Article operations

    /// Active working set, newest `published_at` first. Sort order is applied
    /// at read time; writes never reorder.
    pub async fn list(&self) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, title_bn, title_en, excerpt_bn, excerpt_en, content_bn, content_en,
                              category, author_id, author_name, published_at, image, views,
                              is_breaking, is_featured, status
                       FROM articles
                       WHERE active = 1
                       ORDER BY published_at DESC, cached_at DESC"#,
                )?;
                let articles = stmt
                    .query_map([], |row| Ok(article_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Article>> {
        let id = id.to_string();
        let article = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, title_bn, title_en, excerpt_bn, excerpt_en, content_bn, content_en,
                              category, author_id, author_name, published_at, image, views,
                              is_breaking, is_featured, status
                       FROM articles
                       WHERE id = ?1 AND active = 1"#,
                )?;
                let article = stmt
                    .query_row(params![id], |row| Ok(article_from_row(row)))
                    .optional()?;
                Ok(article)
            })
            .await?;
        Ok(article)
    }

    pub async fn put(&self, article: Article) -> Result<()> {
        self.conn
            .call(move |conn| {
                upsert_article(conn, &article)?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Writes the full working set back, then demotes everything beyond the
    /// `WORKING_SET_LIMIT` most recent records. Demoted rows stay in the
    /// table as history but leave the active set.
    pub async fn put_all(&self, articles: Vec<Article>) -> Result<()> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for article in &articles {
                    upsert_article(&tx, article)?;
                }
                tx.execute(
                    r#"UPDATE articles SET active = 0
                       WHERE active = 1 AND id NOT IN (
                           SELECT id FROM articles
                           WHERE active = 1
                           ORDER BY published_at DESC, cached_at DESC
                           LIMIT ?1
                       )"#,
                    params![WORKING_SET_LIMIT as i64],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Removes `id` from the active set. A no-op for unknown ids; the row
    /// history is kept.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("UPDATE articles SET active = 0 WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn set_views(&self, id: &str, views: u64) -> Result<()> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE articles SET views = ?1 WHERE id = ?2",
                    params![views as i64, id],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    // Bookmark operations

    /// Flips the bookmark flag for `id`, returning the new state.
    pub async fn toggle_bookmark(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        let bookmarked = self
            .conn
            .call(move |conn| {
                let removed =
                    conn.execute("DELETE FROM bookmarks WHERE article_id = ?1", params![id])?;
                if removed > 0 {
                    Ok(false)
                } else {
                    conn.execute(
                        "INSERT INTO bookmarks (article_id) VALUES (?1)",
                        params![id],
                    )?;
                    Ok(true)
                }
            })
            .await?;
        Ok(bookmarked)
    }

    pub async fn is_bookmarked(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        let exists = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM bookmarks WHERE article_id = ?1",
                    params![id],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await?;
        Ok(exists)
    }

    pub async fn bookmarks(&self) -> Result<Vec<String>> {
        let ids = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT article_id FROM bookmarks ORDER BY created_at")?;
                let ids = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, _>>()?;
                Ok(ids)
            })
            .await?;
        Ok(ids)
    }

    // Session token persistence

    pub async fn save_token(&self, token: &str) -> Result<()> {
        let token = token.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO session (id, access_token, saved_at) VALUES (1, ?1, datetime('now'))",
                    params![token],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn load_token(&self) -> Result<Option<String>> {
        let token = self
            .conn
            .call(|conn| {
                let token = conn
                    .query_row("SELECT access_token FROM session WHERE id = 1", [], |row| {
                        row.get(0)
                    })
                    .optional()?;
                Ok(token)
            })
            .await?;
        Ok(token)
    }

    pub async fn clear_token(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute("DELETE FROM session WHERE id = 1", [])?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

fn upsert_article(conn: &rusqlite::Connection, article: &Article) -> rusqlite::Result<()> {
    conn.execute(
        r#"INSERT INTO articles (id, title_bn, title_en, excerpt_bn, excerpt_en, content_bn,
                                 content_en, category, author_id, author_name, published_at,
                                 image, views, is_breaking, is_featured, status, active)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, 1)
           ON CONFLICT(id) DO UPDATE SET
               title_bn = excluded.title_bn,
               title_en = excluded.title_en,
               excerpt_bn = excluded.excerpt_bn,
               excerpt_en = excluded.excerpt_en,
               content_bn = excluded.content_bn,
               content_en = excluded.content_en,
               category = excluded.category,
               author_id = excluded.author_id,
               author_name = excluded.author_name,
               published_at = excluded.published_at,
               image = excluded.image,
               views = excluded.views,
               is_breaking = excluded.is_breaking,
               is_featured = excluded.is_featured,
               status = excluded.status,
               active = 1"#,
        params![
            article.id,
            article.title.bn,
            article.title.en,
            article.excerpt.bn,
            article.excerpt.en,
            article.content.bn,
            article.content.en,
            article.category.as_str(),
            article.author_id,
            article.author_name,
            article.published_at.to_rfc3339(),
            article.image,
            article.views as i64,
            article.is_breaking,
            article.is_featured,
            article.status.as_str(),
        ],
    )?;
    Ok(())
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn article_from_row(row: &Row) -> Article {
    Article {
        id: row.get(0).unwrap(),
        title: LocalizedText {
            bn: row.get(1).unwrap(),
            en: row.get(2).unwrap(),
        },
        excerpt: LocalizedText {
            bn: row.get(3).unwrap(),
            en: row.get(4).unwrap(),
        },
        content: LocalizedText {
            bn: row.get(5).unwrap(),
            en: row.get(6).unwrap(),
        },
        category: Category::parse(&row.get::<_, String>(7).unwrap()),
        author_id: row.get(8).unwrap(),
        author_name: row.get(9).unwrap(),
        published_at: row
            .get::<_, String>(10)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
        image: row.get(11).unwrap(),
        views: row.get::<_, i64>(12).unwrap().max(0) as u64,
        is_breaking: row.get::<_, i64>(13).unwrap() != 0,
        is_featured: row.get::<_, i64>(14).unwrap() != 0,
        status: ArticleStatus::parse(&row.get::<_, String>(15).unwrap()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn open_store() -> (tempfile::TempDir, LocalCacheStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let store = LocalCacheStore::new(path.to_str().unwrap()).await.unwrap();
        (dir, store)
    }

    fn article(id: &str, minutes_ago: i64) -> Article {
        Article {
            id: id.to_string(),
            title: LocalizedText::bn(format!("শিরোনাম {id}")),
            excerpt: LocalizedText::default(),
            content: LocalizedText::bn("বিস্তারিত সংবাদ এখানে"),
            category: Category::National,
            author_id: "admin-1".to_string(),
            author_name: "ডেস্ক".to_string(),
            published_at: Utc::now() - Duration::minutes(minutes_ago),
            image: String::new(),
            views: 0,
            is_breaking: false,
            is_featured: false,
            status: ArticleStatus::Published,
        }
    }

    #[tokio::test]
    async fn fresh_store_lists_empty() {
        let (_dir, store) = open_store().await;
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let (_dir, store) = open_store().await;
        store.put(article("old", 60)).await.unwrap();
        store.put(article("new", 1)).await.unwrap();
        store.put(article("mid", 30)).await.unwrap();

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn put_all_caps_working_set() {
        let (_dir, store) = open_store().await;
        let articles: Vec<Article> = (0..55).map(|i| article(&format!("a-{i}"), i)).collect();
        store.put_all(articles).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 50);
        // the 50 newest survive; a-50..a-54 are the oldest and get demoted
        assert!(listed.iter().all(|a| {
            let n: i64 = a.id.trim_start_matches("a-").parse().unwrap();
            n < 50
        }));
    }

    #[tokio::test]
    async fn demoted_rows_are_not_deleted() {
        let (_dir, store) = open_store().await;
        store.put(article("gone", 5)).await.unwrap();
        store.remove("gone").await.unwrap();

        assert!(store.get("gone").await.unwrap().is_none());
        // history row still exists; re-putting reactivates the same id
        store.put(article("gone", 5)).await.unwrap();
        assert!(store.get("gone").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn remove_unknown_id_is_noop() {
        let (_dir, store) = open_store().await;
        store.remove("never-existed").await.unwrap();
        store.remove("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn put_round_trips_all_fields() {
        let (_dir, store) = open_store().await;
        let mut a = article("full", 2);
        a.title.en = "Winter wave across the country".to_string();
        a.content.en = "Full news details here".to_string();
        a.category = Category::Sports;
        a.views = 42;
        a.is_breaking = true;
        a.is_featured = true;
        a.status = ArticleStatus::Draft;
        a.image = "https://example.com/a.jpg".to_string();

        store.put(a.clone()).await.unwrap();
        let got = store.get("full").await.unwrap().unwrap();

        assert_eq!(got.title, a.title);
        assert_eq!(got.content, a.content);
        assert_eq!(got.category, a.category);
        assert_eq!(got.views, 42);
        assert!(got.is_breaking);
        assert!(got.is_featured);
        assert_eq!(got.status, ArticleStatus::Draft);
        assert_eq!(got.image, a.image);
    }

    #[tokio::test]
    async fn bookmarks_toggle_and_list() {
        let (_dir, store) = open_store().await;
        assert!(!store.is_bookmarked("a-1").await.unwrap());

        assert!(store.toggle_bookmark("a-1").await.unwrap());
        assert!(store.is_bookmarked("a-1").await.unwrap());
        store.toggle_bookmark("a-2").await.unwrap();
        assert_eq!(store.bookmarks().await.unwrap().len(), 2);

        assert!(!store.toggle_bookmark("a-1").await.unwrap());
        assert_eq!(store.bookmarks().await.unwrap(), vec!["a-2".to_string()]);
    }

    #[tokio::test]
    async fn session_token_persists_and_clears() {
        let (_dir, store) = open_store().await;
        assert!(store.load_token().await.unwrap().is_none());

        store.save_token("jwt-one").await.unwrap();
        store.save_token("jwt-two").await.unwrap();
        assert_eq!(store.load_token().await.unwrap().as_deref(), Some("jwt-two"));

        store.clear_token().await.unwrap();
        assert!(store.load_token().await.unwrap().is_none());
    }
}
