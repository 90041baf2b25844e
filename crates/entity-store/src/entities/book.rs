//! Book catalog record.

use chrono::{DateTime, Utc};
use common::EntityId;
use serde::{Deserialize, Serialize};

use super::order::PartyDetails;

/// Catalog visibility of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    /// Listed in the public catalog.
    #[default]
    Publish,
    /// Hidden from the public catalog.
    Unpublish,
}

impl BookStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Publish => "publish",
            BookStatus::Unpublish => "unpublish",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A book listed in the catalog, owned by the librarian who created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: EntityId,
    pub name: String,
    pub author: String,
    /// Catalog price in major units; converted to minor units when charged.
    pub price: f64,
    pub image: Option<String>,
    pub status: BookStatus,
    /// The librarian who listed this book.
    pub librarian: PartyDetails,
    pub added_at: DateTime<Utc>,
}

impl Book {
    /// Creates a new published book with a fresh identifier.
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        price: f64,
        librarian: PartyDetails,
    ) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            author: author.into(),
            price,
            image: None,
            status: BookStatus::default(),
            librarian,
            added_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book_is_published() {
        let book = Book::new("Dune", "Frank Herbert", 12.50, PartyDetails::default());
        assert_eq!(book.status, BookStatus::Publish);
        assert_eq!(book.price, 12.50);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&BookStatus::Publish).unwrap(),
            "\"publish\""
        );
        assert_eq!(
            serde_json::to_string(&BookStatus::Unpublish).unwrap(),
            "\"unpublish\""
        );
    }

    #[test]
    fn test_book_serialization_roundtrip() {
        let book = Book::new("Dune", "Frank Herbert", 12.50, PartyDetails::default());
        let json = serde_json::to_string(&book).unwrap();
        let deserialized: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(book, deserialized);
    }
}
