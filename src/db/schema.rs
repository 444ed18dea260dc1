pub const SCHEMA: &str = r#"
-- articles table: local working set plus history.
-- Rows are never deleted; eviction from the working set clears `active`.
CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY,
    title_bn TEXT NOT NULL,
    title_en TEXT NOT NULL DEFAULT '',
    excerpt_bn TEXT NOT NULL DEFAULT '',
    excerpt_en TEXT NOT NULL DEFAULT '',
    content_bn TEXT NOT NULL,
    content_en TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL,
    author_id TEXT NOT NULL,
    author_name TEXT NOT NULL,
    published_at TEXT NOT NULL,
    image TEXT NOT NULL DEFAULT '',
    views INTEGER NOT NULL DEFAULT 0,
    is_breaking INTEGER NOT NULL DEFAULT 0,
    is_featured INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'published',
    active INTEGER NOT NULL DEFAULT 1,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles(published_at DESC);
CREATE INDEX IF NOT EXISTS idx_articles_active ON articles(active);

-- bookmarks table: device-local flags, never synced to the remote store
CREATE TABLE IF NOT EXISTS bookmarks (
    article_id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- session table: the single persisted auth token
CREATE TABLE IF NOT EXISTS session (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    access_token TEXT NOT NULL,
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
