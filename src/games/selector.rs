//! Outcome Selector
//!
//! Chooses the book a bet plays out. Production uses uniform random choice;
//! the scripted selector pins outcomes for tests and client debugging.

use crate::games::catalogue::Catalogue;
use crate::games::types::Book;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Picks one book per bet
pub trait BookSelector: Send + Sync {
    fn select<'a>(&self, catalogue: &'a Catalogue) -> &'a Book;

    fn name(&self) -> &'static str;
}

/// Independent uniform choice on every call
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformSelector;

impl BookSelector for UniformSelector {
    fn select<'a>(&self, catalogue: &'a Catalogue) -> &'a Book {
        let books = catalogue.books();
        &books[rand::thread_rng().gen_range(0..books.len())]
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

/// Cycles through a fixed list of book ids.
///
/// Ids must exist in the catalogue; callers check with
/// [`crate::games::catalogue::missing_ids`] before building one. An unknown id
/// falls back to the first book.
#[derive(Debug)]
pub struct ScriptedSelector {
    ids: Vec<u64>,
    cursor: AtomicUsize,
}

impl ScriptedSelector {
    pub fn new(ids: Vec<u64>) -> Self {
        Self {
            ids,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl BookSelector for ScriptedSelector {
    fn select<'a>(&self, catalogue: &'a Catalogue) -> &'a Book {
        let first = &catalogue.books()[0];
        if self.ids.is_empty() {
            return first;
        }
        let step = self.cursor.fetch_add(1, Ordering::Relaxed);
        let id = self.ids[step % self.ids.len()];
        catalogue.get(id).unwrap_or(first)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
