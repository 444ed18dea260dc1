use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum length of a translated title before we trust it as real content
/// rather than placeholder text. Gates whether translation is re-attempted.
pub const MIN_TITLE_LEN: usize = 5;

/// The two languages the engine serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "bn")]
    Bn,
    #[serde(rename = "en")]
    En,
}

impl Language {
    /// The other supported language, i.e. the translation source for `self`.
    pub fn other(self) -> Language {
        match self {
            Language::Bn => Language::En,
            Language::En => Language::Bn,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Bn => "bn",
            Language::En => "en",
        }
    }

    /// Human-readable name, used when prompting the translation model.
    pub fn name(self) -> &'static str {
        match self {
            Language::Bn => "Bengali",
            Language::En => "English",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A text field carried in both languages. Either entry may be empty while a
/// translation is still pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub bn: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    pub fn bn(text: impl Into<String>) -> Self {
        Self {
            bn: text.into(),
            en: String::new(),
        }
    }

    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::Bn => &self.bn,
            Language::En => &self.en,
        }
    }

    pub fn set(&mut self, lang: Language, text: String) {
        match lang {
            Language::Bn => self.bn = text,
            Language::En => self.en = text,
        }
    }
}

/// Fixed editorial sections, mirroring the backend's category column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    National,
    International,
    Politics,
    Sports,
    Entertainment,
    Technology,
    Campus,
    Education,
    Opinion,
    Economy,
    Lifestyle,
    Health,
    Science,
    Environment,
    Law,
    Religion,
    Literature,
    Crime,
    Agriculture,
    Travel,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::National => "National",
            Category::International => "International",
            Category::Politics => "Politics",
            Category::Sports => "Sports",
            Category::Entertainment => "Entertainment",
            Category::Technology => "Technology",
            Category::Campus => "Campus",
            Category::Education => "Education",
            Category::Opinion => "Opinion",
            Category::Economy => "Economy",
            Category::Lifestyle => "Lifestyle",
            Category::Health => "Health",
            Category::Science => "Science",
            Category::Environment => "Environment",
            Category::Law => "Law",
            Category::Religion => "Religion",
            Category::Literature => "Literature",
            Category::Crime => "Crime",
            Category::Agriculture => "Agriculture",
            Category::Travel => "Travel",
        }
    }

    /// Parses the backend's category string, defaulting to `National` for
    /// values this build does not know about.
    pub fn parse(s: &str) -> Category {
        match s {
            "International" => Category::International,
            "Politics" => Category::Politics,
            "Sports" => Category::Sports,
            "Entertainment" => Category::Entertainment,
            "Technology" => Category::Technology,
            "Campus" => Category::Campus,
            "Education" => Category::Education,
            "Opinion" => Category::Opinion,
            "Economy" => Category::Economy,
            "Lifestyle" => Category::Lifestyle,
            "Health" => Category::Health,
            "Science" => Category::Science,
            "Environment" => Category::Environment,
            "Law" => Category::Law,
            "Religion" => Category::Religion,
            "Literature" => Category::Literature,
            "Crime" => Category::Crime,
            "Agriculture" => Category::Agriculture,
            "Travel" => Category::Travel,
            _ => Category::National,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Published,
    Draft,
    Archived,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Published => "published",
            ArticleStatus::Draft => "draft",
            ArticleStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> ArticleStatus {
        match s {
            "draft" => ArticleStatus::Draft,
            "archived" => ArticleStatus::Archived,
            _ => ArticleStatus::Published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: LocalizedText,
    pub excerpt: LocalizedText,
    pub content: LocalizedText,
    pub category: Category,
    pub author_id: String,
    pub author_name: String,
    pub published_at: DateTime<Utc>,
    pub image: String,
    pub views: u64,
    pub is_breaking: bool,
    pub is_featured: bool,
    pub status: ArticleStatus,
}

impl Article {
    /// Whether this article already carries real content in `lang`.
    ///
    /// Title and content must both be non-empty and the title must be longer
    /// than [`MIN_TITLE_LEN`] characters; shorter titles are treated as stray
    /// placeholders and the article stays eligible for translation.
    pub fn is_complete_for(&self, lang: Language) -> bool {
        !self.content.get(lang).is_empty()
            && self.title.get(lang).chars().count() > MIN_TITLE_LEN
    }
}

/// Input for article creation. Only the Bengali title and content are
/// mandatory; everything else defaults.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub title: LocalizedText,
    pub excerpt: LocalizedText,
    pub content: LocalizedText,
    pub category: Category,
    pub image: Option<String>,
    pub is_breaking: bool,
    pub is_featured: bool,
}

/// Partial update: only `Some` fields are merged into the stored record.
#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub title: Option<LocalizedText>,
    pub excerpt: Option<LocalizedText>,
    pub content: Option<LocalizedText>,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub is_breaking: Option<bool>,
    pub is_featured: Option<bool>,
    pub status: Option<ArticleStatus>,
}

impl ArticlePatch {
    pub fn apply(&self, article: &mut Article) {
        if let Some(title) = &self.title {
            article.title = title.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            article.excerpt = excerpt.clone();
        }
        if let Some(content) = &self.content {
            article.content = content.clone();
        }
        if let Some(category) = self.category {
            article.category = category;
        }
        if let Some(image) = &self.image {
            article.image = image.clone();
        }
        if let Some(is_breaking) = self.is_breaking {
            article.is_breaking = is_breaking;
        }
        if let Some(is_featured) = self.is_featured {
            article.is_featured = is_featured;
        }
        if let Some(status) = self.status {
            article.status = status;
        }
    }

    /// True when no field is set; applying an empty patch is a no-op.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.excerpt.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.image.is_none()
            && self.is_breaking.is_none()
            && self.is_featured.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    Reporter,
    #[default]
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// The single process-wide session: who is logged in and with what token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            id: "a-1".to_string(),
            title: LocalizedText {
                bn: "সারাদেশে শীতের দাপট".to_string(),
                en: String::new(),
            },
            excerpt: LocalizedText::default(),
            content: LocalizedText {
                bn: "বিস্তারিত সংবাদ এখানে".to_string(),
                en: String::new(),
            },
            category: Category::National,
            author_id: "admin-1".to_string(),
            author_name: "রিপোর্ট প্রতিবেদক".to_string(),
            published_at: Utc::now(),
            image: String::new(),
            views: 0,
            is_breaking: false,
            is_featured: false,
            status: ArticleStatus::Published,
        }
    }

    #[test]
    fn completeness_requires_title_and_content() {
        let mut a = article();
        assert!(a.is_complete_for(Language::Bn));
        assert!(!a.is_complete_for(Language::En));

        a.title.en = "Winter".to_string();
        a.content.en = "Details".to_string();
        // 6-character title passes the placeholder threshold
        assert!(a.is_complete_for(Language::En));
    }

    #[test]
    fn short_title_counts_as_placeholder() {
        let mut a = article();
        a.title.en = "News".to_string();
        a.content.en = "Full news details here".to_string();
        assert!(!a.is_complete_for(Language::En));
    }

    #[test]
    fn completeness_counts_chars_not_bytes() {
        // Six Bengali characters are many more than six bytes; the threshold
        // must be measured in characters.
        let a = article();
        assert!(a.title.bn.len() > MIN_TITLE_LEN);
        assert!(a.is_complete_for(Language::Bn));
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut a = article();
        let before = a.clone();

        let patch = ArticlePatch {
            is_featured: Some(true),
            ..Default::default()
        };
        patch.apply(&mut a);

        assert!(a.is_featured);
        assert_eq!(a.title, before.title);
        assert_eq!(a.content, before.content);
        assert_eq!(a.views, before.views);
        assert_eq!(a.status, before.status);
    }

    #[test]
    fn empty_patch_is_noop() {
        let mut a = article();
        let before = a.clone();
        ArticlePatch::default().apply(&mut a);
        assert_eq!(a, before);
    }

    #[test]
    fn language_other_flips() {
        assert_eq!(Language::Bn.other(), Language::En);
        assert_eq!(Language::En.other(), Language::Bn);
    }

    #[test]
    fn category_parse_round_trips() {
        assert_eq!(Category::parse("Sports"), Category::Sports);
        assert_eq!(Category::parse("unknown-section"), Category::National);
    }
}
