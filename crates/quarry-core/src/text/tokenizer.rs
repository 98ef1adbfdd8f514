use crate::{
    key::{Key, KeyError, KeySet},
    text::Collator,
    value::Value,
};

///
/// Tokenizer
///
/// Splits search text into token keys, each encoded as a string key
/// component (through `collator` when given).
///

pub trait Tokenizer {
    fn tokenize(&self, text: &str, collator: Option<&dyn Collator>) -> Result<KeySet, KeyError>;
}

///
/// WordTokenizer
///
/// Word-break tokenizer: maximal runs of alphanumeric characters.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str, collator: Option<&dyn Collator>) -> Result<KeySet, KeyError> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(|word| Key::from_value(&Value::from(word), collator))
            .collect()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{CollationStrength, FoldingCollator};

    #[test]
    fn splits_on_non_alphanumeric_runs() {
        let tokens = WordTokenizer
            .tokenize("red, green--blue  red", None)
            .expect("tokenize");

        assert_eq!(tokens.len(), 3);
        assert!(tokens.contains(&Key::from_value(&Value::from("green"), None).expect("key")));
    }

    #[test]
    fn collator_folds_tokens() {
        let collator = FoldingCollator::new(CollationStrength::Primary);
        let tokens = WordTokenizer
            .tokenize("Apple APPLE apple", Some(&collator))
            .expect("tokenize");

        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(WordTokenizer.tokenize(" ,. ", None).expect("tokenize").is_empty());
    }
}
