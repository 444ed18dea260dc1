use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::Result;
use crate::models::{Article, Language};

use super::provider::TranslationProvider;

type JobKey = (String, Language);
type SharedJob = Shared<BoxFuture<'static, Article>>;

/// Fills the missing-language fields of an article by calling the provider,
/// with at most one in-flight job per (article id, target language).
///
/// A second caller arriving while a job is outstanding awaits the same
/// shared future instead of issuing duplicate provider calls; the list view
/// and the detail view triggering translation near-simultaneously is the
/// common case.
pub struct TranslationPipeline {
    provider: Arc<dyn TranslationProvider>,
    in_flight: Mutex<HashMap<JobKey, SharedJob>>,
}

impl TranslationPipeline {
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            provider,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Translates `article` into `target` from the other language.
    ///
    /// Title, excerpt and content are translated in parallel. If any field
    /// fails, the original article is returned unchanged: the caller never
    /// sees an error and never sees a partially-translated record.
    pub async fn translate(&self, article: Article, target: Language) -> Article {
        let key = (article.id.clone(), target);

        let job = {
            let mut jobs = self.in_flight.lock().expect("in-flight map poisoned");
            match jobs.get(&key) {
                Some(job) => job.clone(),
                None => {
                    let job = translate_fields(Arc::clone(&self.provider), article, target)
                        .boxed()
                        .shared();
                    jobs.insert(key.clone(), job.clone());
                    job
                }
            }
        };

        let result = job.clone().await;

        // Completed jobs leave the map so a later call retries rather than
        // reusing a possibly-failed attempt. Only this job is removed; a
        // newer job for the same key started by another caller stays.
        let mut jobs = self.in_flight.lock().expect("in-flight map poisoned");
        if jobs.get(&key).is_some_and(|current| current.ptr_eq(&job)) {
            jobs.remove(&key);
        }

        result
    }
}

async fn translate_fields(
    provider: Arc<dyn TranslationProvider>,
    article: Article,
    target: Language,
) -> Article {
    let source = target.other();

    let (title, excerpt, content) = tokio::join!(
        translate_field(provider.as_ref(), article.title.get(source), source, target),
        translate_field(provider.as_ref(), article.excerpt.get(source), source, target),
        translate_field(provider.as_ref(), article.content.get(source), source, target),
    );

    match (title, excerpt, content) {
        (Ok(title), Ok(excerpt), Ok(content)) => {
            let mut translated = article;
            translated.title.set(target, title);
            translated.excerpt.set(target, excerpt);
            translated.content.set(target, content);
            translated
        }
        (title, excerpt, content) => {
            for error in [title.err(), excerpt.err(), content.err()].into_iter().flatten() {
                tracing::warn!(
                    article_id = %article.id,
                    target = %target,
                    "Translation failed, serving original: {}",
                    error
                );
            }
            article
        }
    }
}

/// Blank source text needs no provider round-trip.
async fn translate_field(
    provider: &dyn TranslationProvider,
    text: &str,
    from: Language,
    to: Language,
) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(String::new());
    }
    provider.translate(text, from, to).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{ArticleStatus, Category, LocalizedText};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Echo translator: prefixes the target language code, counts calls, can
    /// be slowed down or made to fail on specific input.
    struct EchoProvider {
        calls: AtomicUsize,
        delay: Duration,
        fail_on: Option<String>,
    }

    impl EchoProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                fail_on: None,
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn failing_on(mut self, text: &str) -> Self {
            self.fail_on = Some(text.to_string());
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationProvider for EchoProvider {
        async fn translate(&self, text: &str, _from: Language, to: Language) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail_on.as_deref() == Some(text) {
                return Err(AppError::Translation("provider unreachable".to_string()));
            }
            Ok(format!("{}:{}", to.code(), text))
        }
    }

    fn bn_article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: LocalizedText::bn("সারাদেশে শীতের দাপট"),
            excerpt: LocalizedText::bn("হিমেল হাওয়ায় বিপর্যস্ত জনজীবন"),
            content: LocalizedText::bn("বিস্তারিত সংবাদ এখানে"),
            category: Category::National,
            author_id: "admin-1".to_string(),
            author_name: "ডেস্ক".to_string(),
            published_at: Utc::now(),
            image: String::new(),
            views: 0,
            is_breaking: false,
            is_featured: false,
            status: ArticleStatus::Published,
        }
    }

    #[tokio::test]
    async fn translates_all_three_fields() {
        let provider = Arc::new(EchoProvider::new());
        let pipeline = TranslationPipeline::new(provider.clone());

        let original = bn_article("a-1");
        let translated = pipeline.translate(original.clone(), Language::En).await;

        assert_eq!(translated.title.en, format!("en:{}", original.title.bn));
        assert_eq!(translated.excerpt.en, format!("en:{}", original.excerpt.bn));
        assert_eq!(translated.content.en, format!("en:{}", original.content.bn));
        // source language untouched
        assert_eq!(translated.title.bn, original.title.bn);
        assert_eq!(translated.content.bn, original.content.bn);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn blank_fields_skip_the_provider() {
        let provider = Arc::new(EchoProvider::new());
        let pipeline = TranslationPipeline::new(provider.clone());

        let mut original = bn_article("a-2");
        original.excerpt = LocalizedText::default();

        let translated = pipeline.translate(original, Language::En).await;

        assert_eq!(translated.excerpt.en, "");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn failure_returns_original_unchanged() {
        let provider = Arc::new(EchoProvider::new().failing_on("বিস্তারিত সংবাদ এখানে"));
        let pipeline = TranslationPipeline::new(provider);

        let original = bn_article("a-3");
        let result = pipeline.translate(original.clone(), Language::En).await;

        // no partial mutation: even the fields that translated fine are
        // dropped when any field fails
        assert_eq!(result, original);
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_job() {
        let provider = Arc::new(EchoProvider::new().slow(Duration::from_millis(100)));
        let pipeline = Arc::new(TranslationPipeline::new(provider.clone()));

        let article = bn_article("a-4");
        let (first, second) = tokio::join!(
            pipeline.translate(article.clone(), Language::En),
            pipeline.translate(article.clone(), Language::En),
        );

        assert_eq!(first, second);
        // one underlying job: three field calls, not six
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn different_targets_do_not_share_jobs() {
        let provider = Arc::new(EchoProvider::new().slow(Duration::from_millis(50)));
        let pipeline = Arc::new(TranslationPipeline::new(provider.clone()));

        let mut article = bn_article("a-5");
        article.title.en = "Winter wave across the country".to_string();
        article.excerpt.en = "Public life disrupted".to_string();
        article.content.en = "Full news details here".to_string();

        let (_, _) = tokio::join!(
            pipeline.translate(article.clone(), Language::En),
            pipeline.translate(article.clone(), Language::Bn),
        );

        assert_eq!(provider.call_count(), 6);
    }

    #[tokio::test]
    async fn completed_jobs_are_retried_not_cached() {
        let provider = Arc::new(EchoProvider::new().failing_on("বিস্তারিত সংবাদ এখানে"));
        let pipeline = TranslationPipeline::new(provider.clone());

        let original = bn_article("a-6");
        let first = pipeline.translate(original.clone(), Language::En).await;
        assert_eq!(first, original);

        let calls_after_first = provider.call_count();
        let second = pipeline.translate(original.clone(), Language::En).await;
        assert_eq!(second, original);
        // the failed attempt was not cached; the provider was called again
        assert!(provider.call_count() > calls_after_first);
    }
}
