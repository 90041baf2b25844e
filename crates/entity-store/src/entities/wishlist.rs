//! Wishlist entry record.

use chrono::{DateTime, Utc};
use common::{EntityId, EntityRef};
use serde::{Deserialize, Serialize};

/// A (book, user) wishlist pair with a denormalized book snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: EntityId,
    pub book_id: EntityRef,
    pub user_email: String,
    pub book_name: String,
    pub book_image: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WishlistEntry {
    /// Creates a wishlist entry for a user and book.
    pub fn new(
        book_id: EntityRef,
        user_email: impl Into<String>,
        book_name: impl Into<String>,
        book_image: Option<String>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            book_id,
            user_email: user_email.into(),
            book_name: book_name.into(),
            book_image,
            added_at: Utc::now(),
        }
    }
}
