use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Language;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// A single external translation capability. Failures surface as errors,
/// never as silently-wrong text.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Translator backed by an LLM completion endpoint.
pub struct HttpTranslator {
    client: Client,
    api_key: String,
}

impl HttpTranslator {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, api_key }
    }
}

#[async_trait]
impl TranslationProvider for HttpTranslator {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String> {
        let prompt = format!(
            "You are a professional newspaper translator. \
             Translate the following news text from {} to {}. \
             Maintain a formal, journalistic, and neutral tone. \
             Do not add any explanations or notes. Return ONLY the translated text.\n\n\
             Text to translate:\n{}",
            from.name(),
            to.name(),
            text
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            // Low temperature for factual consistency
            generation_config: GenerationConfig {
                temperature: 0.1,
                top_p: 0.95,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/{}:generateContent?key={}",
                GEMINI_API_URL, GEMINI_MODEL, self.api_key
            ))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AppError::Translation(format!("API error: {}", error_text)));
        }

        let generate_response: GenerateResponse = response.json().await?;

        let translated = generate_response
            .candidates
            .into_iter()
            .flatten()
            .filter_map(|c| c.content)
            .filter_map(|c| c.parts)
            .flatten()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        let translated = translated.trim().to_string();
        if translated.is_empty() {
            return Err(AppError::Translation(
                "empty response from provider".to_string(),
            ));
        }
        Ok(translated)
    }
}

/// Stand-in used when no translator API key is configured: every call fails,
/// so the pipeline hands articles back untranslated.
pub struct UnconfiguredTranslator;

#[async_trait]
impl TranslationProvider for UnconfiguredTranslator {
    async fn translate(&self, _text: &str, _from: Language, _to: Language) -> Result<String> {
        Err(AppError::Translation(
            "translator API key not configured".to_string(),
        ))
    }
}
