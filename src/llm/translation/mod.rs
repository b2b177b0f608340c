//! Translation for the single supported language pair.

pub mod translate;

pub use translate::{LanguagePair, TranslationOutcome, TranslationService, UNSUPPORTED_PAIR_MESSAGE};
