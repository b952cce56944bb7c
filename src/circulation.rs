//! Circulation logic: availability resolution and the loan lifecycle.
//!
//! The state machine per book is small: AVAILABLE -> borrow -> ON_LOAN ->
//! return -> AVAILABLE, with delete as the history-erasing exit from either
//! state. The one rule everything hinges on is that a book has at most one
//! active (non-returned) loan at a time, and `borrow` enforces it inside a
//! single transaction so no concurrent request can slip between the
//! availability check and the insert.

use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use tracing::info;

use crate::db;
use crate::error::{LibraryError, Result};
use crate::models::{
    BorrowerType, Loan, LoanDraft, LoanStatus, SearchMatch, SearchSummary,
};

/// True iff the book currently has an active loan. Returned loans do not
/// count; absent books trivially report `false`.
pub fn is_book_loaned(conn: &Connection, accession_id: &str) -> Result<bool> {
    let loans = db::list_loans_for_book(conn, accession_id)?;
    Ok(loans.iter().any(|loan| !loan.returned))
}

/// Derive the presentation status of a loan on a given calendar date. The
/// caller passes "today" so the comparison stays deterministic; both sides
/// are plain dates, never formatted strings.
pub fn status_of(loan: &Loan, today: NaiveDate) -> LoanStatus {
    if loan.returned {
        LoanStatus::Returned
    } else if today > loan.due_date {
        LoanStatus::Overdue
    } else {
        LoanStatus::Active
    }
}

/// Title search cross-referenced against active loans: aggregate counts plus
/// one row per matched book carrying its availability and, when out, the
/// borrower's name.
pub fn summarize_search(conn: &Connection, title_query: &str) -> Result<SearchSummary> {
    let books = db::search_books_by_title(conn, title_query)?;

    let mut matches = Vec::with_capacity(books.len());
    let mut loaned_out = 0;
    for book in books {
        let active = db::list_loans_for_book(conn, &book.accession_id)?
            .into_iter()
            .find(|loan| !loan.returned);
        if active.is_some() {
            loaned_out += 1;
        }
        matches.push(SearchMatch {
            book,
            loaned_out: active.is_some(),
            borrower_name: active.map(|loan| loan.borrower_name),
        });
    }

    Ok(SearchSummary {
        total: matches.len(),
        available: matches.len() - loaned_out,
        loaned_out,
        matches,
    })
}

/// Register a checkout dated today. See [`borrow_on`] for the rules.
pub fn borrow(conn: &mut Connection, draft: &LoanDraft) -> Result<Loan> {
    borrow_on(conn, draft, Local::now().date_naive())
}

/// Register a checkout with an explicit loan date.
///
/// Validates the request, then resolves the book, checks availability, and
/// inserts the loan, all inside one transaction spanning both tables, so
/// the one-active-loan-per-book invariant holds even if another borrow for
/// the same book races this one. Any failure rolls the transaction back.
pub fn borrow_on(conn: &mut Connection, draft: &LoanDraft, loan_date: NaiveDate) -> Result<Loan> {
    validate_draft(draft)?;

    let tx = conn.transaction()?;

    let book = db::get_book(&tx, &draft.accession_id)?;
    if is_book_loaned(&tx, &draft.accession_id)? {
        return Err(LibraryError::Conflict(format!(
            "book {} ({}) is already on loan",
            book.accession_id, book.title
        )));
    }

    let loan = db::add_loan(&tx, draft, &book.title, loan_date)?;
    tx.commit()?;

    info!(
        loan_id = loan.id,
        accession_id = %loan.accession_id,
        borrower = %loan.borrower_name,
        "book borrowed"
    );
    Ok(loan)
}

/// Mark a loan as returned, preserving the record. The loan row survives so
/// the history of who borrowed what is not erased; use [`remove_loan`] for
/// that.
pub fn return_loan(conn: &Connection, id: i64) -> Result<Loan> {
    let mut loan = db::get_loan(conn, id)?;
    loan.returned = true;
    db::update_loan(conn, &loan)?;
    info!(loan_id = id, accession_id = %loan.accession_id, "loan returned");
    Ok(loan)
}

/// Erase a loan record permanently, whether or not it was returned.
pub fn remove_loan(conn: &Connection, id: i64) -> Result<()> {
    db::delete_loan(conn, id)?;
    info!(loan_id = id, "loan record removed");
    Ok(())
}

/// Field-level validation of a borrow request. The accession number and a
/// positive quantity are always required; students must give a name and a
/// grade, teachers a name.
fn validate_draft(draft: &LoanDraft) -> Result<()> {
    if draft.accession_id.trim().is_empty() {
        return Err(LibraryError::Validation(
            "the accession number is required".to_string(),
        ));
    }
    if draft.quantity == 0 {
        return Err(LibraryError::Validation(
            "the quantity must be at least 1".to_string(),
        ));
    }
    match draft.borrower_type {
        BorrowerType::Student => {
            if draft.borrower_name.trim().is_empty()
                || draft.grade.as_deref().unwrap_or("").trim().is_empty()
            {
                return Err(LibraryError::Validation(
                    "students must give a name and a grade".to_string(),
                ));
            }
        }
        BorrowerType::Teacher => {
            if draft.borrower_name.trim().is_empty() {
                return Err(LibraryError::Validation(
                    "teachers must give a name".to_string(),
                ));
            }
        }
    }
    Ok(())
}
