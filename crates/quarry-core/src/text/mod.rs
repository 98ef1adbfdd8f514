//! Module: text
//! Responsibility: collation sort keys and search tokenization seams.
//! Does not own: locale data; implementations are supplied by callers.
//! Boundary: only text key columns and `?` search clauses reach this module.

mod collator;
mod tokenizer;

pub use collator::{CollationStrength, Collator, FoldingCollator};
pub use tokenizer::{Tokenizer, WordTokenizer};

///
/// TextProvider
///
/// Locale-aware factory for collators and tokenizers.
///

pub trait TextProvider {
    /// Active locale of the collection being queried.
    fn locale(&self) -> &str;

    fn make_collator(&self, locale: &str, strength: CollationStrength) -> Box<dyn Collator>;

    fn tokenizer(&self, locale: &str) -> Box<dyn Tokenizer>;
}

///
/// BasicTextProvider
///
/// Locale-agnostic provider backed by `FoldingCollator` and `WordTokenizer`.
///

#[derive(Clone, Debug)]
pub struct BasicTextProvider {
    locale: String,
}

impl BasicTextProvider {
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }
}

impl Default for BasicTextProvider {
    fn default() -> Self {
        Self::new("en_US")
    }
}

impl TextProvider for BasicTextProvider {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn make_collator(&self, _locale: &str, strength: CollationStrength) -> Box<dyn Collator> {
        Box::new(FoldingCollator::new(strength))
    }

    fn tokenizer(&self, _locale: &str) -> Box<dyn Tokenizer> {
        Box::new(WordTokenizer)
    }
}
