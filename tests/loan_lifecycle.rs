//! End-to-end circulation scenarios against the bundled seed catalog, run on
//! an in-memory store so each test starts from a fresh bootstrap.

use chrono::NaiveDate;
use library_loan_manager::{
    bootstrap_catalog, circulation, db, open_in_memory_store, reset_all, BorrowerType,
    LibraryError, LoanDraft, BUNDLED_SEED,
};
use rusqlite::Connection;

fn fresh_library() -> Connection {
    let mut conn = open_in_memory_store().expect("in-memory store");
    let inserted = bootstrap_catalog(&mut conn, BUNDLED_SEED).expect("bootstrap");
    assert!(inserted > 0, "seed catalog should not be empty");
    conn
}

fn ana_draft(accession_id: &str) -> LoanDraft {
    LoanDraft {
        accession_id: accession_id.to_string(),
        quantity: 1,
        borrower_type: BorrowerType::Student,
        borrower_name: "Ana".to_string(),
        grade: Some("9".to_string()),
        classroom: None,
        due_date: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, d).unwrap()
}

#[test]
fn dom_casmurro_full_lifecycle() {
    let mut conn = fresh_library();

    // Borrow accession "100" (Dom Casmurro in the bundled seed).
    let loan = circulation::borrow_on(&mut conn, &ana_draft("100"), day(1)).expect("first borrow");
    assert!(!loan.returned);
    assert_eq!(loan.title, "Dom Casmurro");

    // A second borrow before the return conflicts.
    let err = circulation::borrow_on(&mut conn, &ana_draft("100"), day(2)).unwrap_err();
    assert!(matches!(err, LibraryError::Conflict(_)));

    // Returning flips the flag and makes the book available again.
    let returned = circulation::return_loan(&conn, loan.id).expect("return");
    assert!(returned.returned);
    assert!(!circulation::is_book_loaned(&conn, "100").unwrap());

    // A third borrow now succeeds.
    circulation::borrow_on(&mut conn, &ana_draft("100"), day(3)).expect("borrow after return");
}

#[test]
fn borrowing_a_book_not_in_the_catalog_fails() {
    let mut conn = fresh_library();
    let err = circulation::borrow_on(&mut conn, &ana_draft("999"), day(1)).unwrap_err();
    assert!(matches!(err, LibraryError::NotFound(_)));
}

#[test]
fn borrow_without_an_accession_number_is_rejected() {
    let mut conn = fresh_library();
    let mut draft = ana_draft("100");
    draft.accession_id = String::new();
    let err = circulation::borrow_on(&mut conn, &draft, day(1)).unwrap_err();
    assert!(matches!(err, LibraryError::Validation(_)));
}

#[test]
fn every_seeded_book_starts_available() {
    let conn = fresh_library();
    let summary = circulation::summarize_search(&conn, "").expect("search all");
    assert_eq!(summary.total as i64, db::count_books(&conn).unwrap());
    assert_eq!(summary.loaned_out, 0);
    assert_eq!(summary.available, summary.total);
}

#[test]
fn removing_a_loan_erases_history_while_return_preserves_it() {
    let mut conn = fresh_library();

    let kept = circulation::borrow_on(&mut conn, &ana_draft("100"), day(1)).unwrap();
    circulation::return_loan(&conn, kept.id).unwrap();
    assert!(db::get_loan(&conn, kept.id).is_ok());

    let erased = circulation::borrow_on(&mut conn, &ana_draft("101"), day(1)).unwrap();
    circulation::remove_loan(&conn, erased.id).unwrap();
    assert!(matches!(
        db::get_loan(&conn, erased.id).unwrap_err(),
        LibraryError::NotFound(_)
    ));
}

#[test]
fn repeated_bootstrap_keeps_the_catalog_stable() {
    let mut conn = fresh_library();
    let before = db::count_books(&conn).unwrap();
    assert_eq!(bootstrap_catalog(&mut conn, BUNDLED_SEED).unwrap(), 0);
    assert_eq!(db::count_books(&conn).unwrap(), before);
}

#[test]
fn reset_wipes_everything_and_allows_re_bootstrap() {
    let mut conn = fresh_library();
    circulation::borrow_on(&mut conn, &ana_draft("100"), day(1)).unwrap();

    reset_all(&mut conn).expect("reset");
    assert_eq!(db::count_books(&conn).unwrap(), 0);
    assert!(db::list_all_loans(&conn).unwrap().is_empty());

    // The next initialize sees an empty store and re-seeds it.
    assert!(bootstrap_catalog(&mut conn, BUNDLED_SEED).unwrap() > 0);
}
