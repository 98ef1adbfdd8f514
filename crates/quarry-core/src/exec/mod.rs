//! Module: exec
//! Responsibility: run planned ranges over ordered collections and yield records.
//! Does not own: range construction (see `plan`) or record encoding.
//! Boundary: stores are reached only through the `store` traits.

mod cursor;
mod find;
mod search;


use crate::{record::RecordDecoder, text::TextProvider};

pub use cursor::{CursorState, QueryCursor, QueryItem, ScanOutcome, ScanWarning};
pub use find::{FindCursor, find};
pub use search::SearchCursor;

// Design notes:
// - The limit is charged after kind exclusion, post filters and distinct.
// - Ghost keys are warnings unless the caller asked for index verification.
// - Search results are materialised before the first item is returned.

///
/// ExecServices
///
/// Collaborators a cursor borrows for its whole life. `locale` is handed to
/// every collator and tokenizer the executor asks `text` for.
///

#[derive(Clone, Copy)]
pub struct ExecServices<'a> {
    pub text: &'a dyn TextProvider,
    pub decoder: &'a dyn RecordDecoder,
    pub locale: &'a str,
}

impl<'a> ExecServices<'a> {
    /// Services using the provider's own locale.
    #[must_use]
    pub fn new(text: &'a dyn TextProvider, decoder: &'a dyn RecordDecoder) -> Self {
        Self {
            text,
            decoder,
            locale: text.locale(),
        }
    }

    #[must_use]
    pub const fn with_locale(mut self, locale: &'a str) -> Self {
        self.locale = locale;
        self
    }
}
