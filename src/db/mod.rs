//! Persistence module split across logical submodules.

mod books;
mod connection;
mod loans;

pub use books::{bootstrap_catalog, count_books, get_book, search_books_by_title};
pub use connection::{ensure_schema, open_in_memory_store, open_store, reset_all};
pub use loans::{
    add_loan, delete_loan, get_loan, list_all_loans, list_loans_for_book, update_loan,
};
