//! Bilingual (Bengali/English) news content engine.
//!
//! Serves article records to a presentation tier, writes editor changes to an
//! authoritative remote backend, and fills in missing-language text through an
//! external translation provider on demand. When the backend is unreachable
//! the engine degrades to its local SQLite cache instead of failing.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod translation;

pub use config::Config;
pub use db::LocalCacheStore;
pub use error::{AppError, AuthError, Result};
pub use repository::ContentRepository;
pub use services::{RemoteContentGateway, SessionTokenManager};
pub use translation::{
    HttpTranslator, TranslationPipeline, TranslationProvider, UnconfiguredTranslator,
};
