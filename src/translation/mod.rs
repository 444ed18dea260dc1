mod pipeline;
mod provider;

pub use pipeline::TranslationPipeline;
pub use provider::{HttpTranslator, TranslationProvider, UnconfiguredTranslator};
