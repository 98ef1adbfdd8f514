use crate::codec::TOKEN_START;
use std::collections::BTreeMap;

///
/// TokenTable
///
/// Property-name substitution table. Tokens only ever replace property
/// names; values are always written literally.
///

pub trait TokenTable {
    fn token_for(&self, name: &str) -> Option<u8>;

    fn name_for(&self, token: u8) -> Option<&str>;
}

///
/// TokenSet
///
/// In-memory token table assigning bytes `TOKEN_START..=255` in
/// registration order.
///

#[derive(Clone, Debug, Default)]
pub struct TokenSet {
    by_name: BTreeMap<String, u8>,
    by_token: BTreeMap<u8, String>,
}

impl TokenSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, returning its token; `None` once all token bytes are taken.
    pub fn register(&mut self, name: &str) -> Option<u8> {
        if let Some(token) = self.by_name.get(name) {
            return Some(*token);
        }

        let next = u8::try_from(usize::from(TOKEN_START) + self.by_token.len()).ok()?;
        self.by_name.insert(name.to_string(), next);
        self.by_token.insert(next, name.to_string());

        Some(next)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

impl TokenTable for TokenSet {
    fn token_for(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    fn name_for(&self, token: u8) -> Option<&str> {
        self.by_token.get(&token).map(String::as_str)
    }
}
