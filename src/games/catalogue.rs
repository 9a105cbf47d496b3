//! Outcome Catalogue
//!
//! Immutable set of books loaded once at startup. Structural problems in the
//! catalogue are fatal configuration errors; nothing here is checked again at
//! request time.

use crate::errors::{ConfigError, ConfigResult};
use crate::games::types::Book;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// Books bundled with the binary
const EMBEDDED_BOOKS: &str = include_str!("../../fixtures/books.json");

/// Allowed drift between the win breakdown and the declared multiplier, in basis points
const BREAKDOWN_TOLERANCE_BP: u64 = 1;

/// Validated, read-only outcome catalogue
#[derive(Debug, Clone)]
pub struct Catalogue {
    books: Vec<Book>,
    by_id: HashMap<u64, usize>,
}

impl Catalogue {
    /// Build a catalogue from already-parsed books
    pub fn new(books: Vec<Book>) -> ConfigResult<Self> {
        if books.is_empty() {
            return Err(ConfigError::InvalidCatalogue(
                "catalogue contains no books".to_string(),
            ));
        }

        let mut by_id = HashMap::with_capacity(books.len());
        for (position, book) in books.iter().enumerate() {
            validate_book(book)?;
            if by_id.insert(book.id, position).is_some() {
                return Err(ConfigError::InvalidCatalogue(format!(
                    "duplicate book id {}",
                    book.id
                )));
            }
        }

        Ok(Self { books, by_id })
    }

    /// Parse a JSON array of books
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let books: Vec<Book> = serde_json::from_str(raw)?;
        Self::new(books)
    }

    /// Load books from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalogue = Self::from_json(&raw)?;
        info!(path = %path.display(), books = catalogue.len(), "Loaded outcome catalogue");
        Ok(catalogue)
    }

    /// Catalogue shipped in `fixtures/books.json`
    pub fn embedded() -> ConfigResult<Self> {
        Self::from_json(EMBEDDED_BOOKS)
    }

    pub fn get(&self, id: u64) -> Option<&Book> {
        self.by_id.get(&id).map(|&i| &self.books[i])
    }

    /// Books in load order; never empty
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    pub fn bonus_count(&self) -> usize {
        self.books.iter().filter(|b| b.is_bonus()).count()
    }
}

fn validate_book(book: &Book) -> ConfigResult<()> {
    for (expected, event) in book.events.iter().enumerate() {
        if event.index as usize != expected {
            return Err(ConfigError::InvalidCatalogue(format!(
                "book {}: event at position {} has index {}",
                book.id, expected, event.index
            )));
        }
    }

    let declared = book.payout_multiplier.basis_points();
    let breakdown = book
        .base_game_wins
        .basis_points()
        .saturating_add(book.free_game_wins.basis_points());
    if declared.abs_diff(breakdown) > BREAKDOWN_TOLERANCE_BP {
        return Err(ConfigError::InvalidCatalogue(format!(
            "book {}: baseGameWins + freeGameWins ({} + {}) != payoutMultiplier ({})",
            book.id, book.base_game_wins, book.free_game_wins, book.payout_multiplier
        )));
    }

    // Criteria is informational; a mismatch is worth a look but not fatal.
    let tagged_bonus = book.criteria == "freegame";
    if tagged_bonus != book.is_bonus() {
        warn!(
            book_id = book.id,
            criteria = %book.criteria,
            triggers = book.is_bonus(),
            "Book criteria disagrees with free spin trigger"
        );
    }

    Ok(())
}

/// Ids present in `ids` but missing from the catalogue
pub fn missing_ids(catalogue: &Catalogue, ids: &[u64]) -> Vec<u64> {
    let mut seen = HashSet::new();
    ids.iter()
        .copied()
        .filter(|id| catalogue.get(*id).is_none() && seen.insert(*id))
        .collect()
}
