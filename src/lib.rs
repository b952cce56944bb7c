//! Core library surface for the school library loan manager.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as any other front end can reuse the same pieces:
//! open the store, bootstrap the catalog, and drive the loan lifecycle
//! through `circulation`.

pub mod circulation;
pub mod db;
pub mod error;
pub mod models;

/// Convenience re-exports for the persistence layer. These functions are
/// typically used by `main.rs` to initialize the embedded SQLite store and
/// preload the catalog.
pub use db::{bootstrap_catalog, open_in_memory_store, open_store, reset_all};

/// The circulation operations front ends call into.
pub use circulation::{
    borrow, is_book_loaned, remove_loan, return_loan, status_of, summarize_search,
};

/// The domain types other layers manipulate, plus the typed error contract.
pub use error::{LibraryError, Result};
pub use models::{Book, BorrowerType, Loan, LoanDraft, LoanStatus, SearchMatch, SearchSummary};

/// Seed catalog bundled with the binary, in the source export format.
pub const BUNDLED_SEED: &str = include_str!("../data/catalog_seed.json");
