//! Book model and the availability rules

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book record
///
/// `id` is `None` until the store has persisted the book.
/// Every book handed out by the service satisfies
/// `0 <= available_quantity <= quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub isbn: String,
    /// Total copies owned
    pub quantity: i32,
    /// Copies not currently on loan
    pub available_quantity: i32,
}

/// Create book request. Any `id` or `availableQuantity` sent by the client is ignored.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
}

/// Update book request. All fields are overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
}

/// Query of `PUT /api/books/{id}/available`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityChange {
    /// Signed delta: positive for returned copies, negative for loaned copies
    pub change: i32,
}

impl Book {
    /// Build an unsaved book with every copy available
    pub fn from_new(data: NewBook) -> Self {
        Self {
            id: None,
            title: data.title,
            author: data.author,
            isbn: data.isbn,
            quantity: data.quantity,
            available_quantity: data.quantity,
        }
    }

    /// Overwrite the catalog fields and shift the available pool by the
    /// change in total quantity, clamped into `[0, quantity]`.
    ///
    /// Returns `true` when the clamp had to correct the shifted value.
    pub fn replace_fields(&mut self, details: UpdateBook) -> bool {
        let delta = i64::from(details.quantity) - i64::from(self.quantity);
        let shifted = i64::from(self.available_quantity) + delta;
        let new_quantity = i64::from(details.quantity);

        let mut available = shifted;
        if available < 0 {
            available = 0;
        }
        if available > new_quantity {
            available = new_quantity;
        }

        self.title = details.title;
        self.author = details.author;
        self.isbn = details.isbn;
        self.quantity = details.quantity;
        // bounded by [0, quantity] above
        self.available_quantity = available as i32;

        available != shifted
    }

    /// Apply a loan (`delta < 0`) or return (`delta > 0`) to the available pool.
    ///
    /// Rejects, without touching the book, any delta that would leave
    /// `available_quantity` outside `[0, quantity]`.
    pub fn adjust_available(&mut self, delta: i32) -> AppResult<()> {
        let candidate = i64::from(self.available_quantity) + i64::from(delta);
        if candidate < 0 || candidate > i64::from(self.quantity) {
            return Err(AppError::InvalidAdjustment(format!(
                "Book {:?}: available quantity {} {:+} is outside [0, {}]",
                self.id, self.available_quantity, delta, self.quantity
            )));
        }
        self.available_quantity = candidate as i32;
        Ok(())
    }

    /// `0 <= available_quantity <= quantity`
    pub fn is_consistent(&self) -> bool {
        0 <= self.available_quantity && self.available_quantity <= self.quantity
    }
}

/// A change to an existing book, applied inside the store's read-modify-write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookMutation {
    /// Catalog edit: overwrite fields, shift and clamp availability
    ReplaceFields(UpdateBook),
    /// Loan-side delta on availability, strict bounds
    AdjustAvailable(i32),
}

impl BookMutation {
    pub fn apply(self, book: &mut Book) -> AppResult<()> {
        match self {
            BookMutation::ReplaceFields(details) => {
                let previous = book.available_quantity;
                if book.replace_fields(details) {
                    tracing::warn!(
                        "Book {:?}: available quantity clamped to {} (was {}, quantity now {})",
                        book.id,
                        book.available_quantity,
                        previous,
                        book.quantity
                    );
                }
            }
            BookMutation::AdjustAvailable(delta) => book.adjust_available(delta)?,
        }
        debug_assert!(book.is_consistent(), "inconsistent book after update: {:?}", book);
        Ok(())
    }
}
