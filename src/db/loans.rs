//! Loan store: plain row-level CRUD over the `loans` table. Lifecycle rules
//! (one active loan per book, validation, transactional borrow) live in
//! `circulation`; every function here encapsulates exactly one query, like
//! the rest of the persistence layer.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{LibraryError, Result};
use crate::models::{BorrowerType, Loan, LoanDraft};

const LOAN_COLUMNS: &str = "id, accession_id, title, quantity, borrower_type, \
     borrower_name, grade, classroom, loan_date, due_date, returned";

/// Insert a new loan row and echo the hydrated struct, so callers can use
/// the assigned id without re-querying. The caller supplies the denormalized
/// title and the loan date; this function just persists.
pub fn add_loan(
    conn: &Connection,
    draft: &LoanDraft,
    title: &str,
    loan_date: NaiveDate,
) -> Result<Loan> {
    conn.execute(
        "INSERT INTO loans
            (accession_id, title, quantity, borrower_type, borrower_name,
             grade, classroom, loan_date, due_date, returned)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)",
        params![
            draft.accession_id,
            title,
            draft.quantity,
            draft.borrower_type.as_str(),
            draft.borrower_name,
            draft.grade,
            draft.classroom,
            loan_date,
            draft.due_date,
        ],
    )?;

    let id = conn.last_insert_rowid();
    Ok(Loan {
        id,
        accession_id: draft.accession_id.clone(),
        title: title.to_string(),
        quantity: draft.quantity,
        borrower_type: draft.borrower_type,
        borrower_name: draft.borrower_name.clone(),
        grade: draft.grade.clone(),
        classroom: draft.classroom.clone(),
        loan_date,
        due_date: draft.due_date,
        returned: false,
    })
}

/// Look a loan up by id.
pub fn get_loan(conn: &Connection, id: i64) -> Result<Loan> {
    conn.prepare(&format!("SELECT {LOAN_COLUMNS} FROM loans WHERE id = ?1"))?
        .query_row(params![id], loan_from_row)
        .optional()?
        .ok_or_else(|| LibraryError::NotFound(format!("loan {id} not found")))
}

/// Overwrite every mutable column of an existing loan. Surfaces `NotFound`
/// when zero rows were touched instead of silently continuing.
pub fn update_loan(conn: &Connection, loan: &Loan) -> Result<()> {
    let updated = conn.execute(
        "UPDATE loans SET
            accession_id = ?1, title = ?2, quantity = ?3, borrower_type = ?4,
            borrower_name = ?5, grade = ?6, classroom = ?7, loan_date = ?8,
            due_date = ?9, returned = ?10
         WHERE id = ?11",
        params![
            loan.accession_id,
            loan.title,
            loan.quantity,
            loan.borrower_type.as_str(),
            loan.borrower_name,
            loan.grade,
            loan.classroom,
            loan.loan_date,
            loan.due_date,
            loan.returned,
            loan.id,
        ],
    )?;

    if updated == 0 {
        Err(LibraryError::NotFound(format!("loan {} not found", loan.id)))
    } else {
        Ok(())
    }
}

/// Remove a loan row permanently, regardless of its returned flag.
pub fn delete_loan(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM loans WHERE id = ?1", params![id])?;

    if deleted == 0 {
        Err(LibraryError::NotFound(format!("loan {id} not found")))
    } else {
        Ok(())
    }
}

/// Every loan (active and returned) that references a book, via the
/// accession-number index.
pub fn list_loans_for_book(conn: &Connection, accession_id: &str) -> Result<Vec<Loan>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOAN_COLUMNS} FROM loans WHERE accession_id = ?1"
    ))?;
    let loans = stmt
        .query_map(params![accession_id], loan_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(loans)
}

/// Every loan in the store, in storage iteration order. Callers that need a
/// particular order sort the result themselves.
pub fn list_all_loans(conn: &Connection) -> Result<Vec<Loan>> {
    let mut stmt = conn.prepare(&format!("SELECT {LOAN_COLUMNS} FROM loans"))?;
    let loans = stmt
        .query_map([], loan_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(loans)
}

fn loan_from_row(row: &Row<'_>) -> rusqlite::Result<Loan> {
    let borrower_raw: String = row.get(4)?;
    let borrower_type = BorrowerType::parse(&borrower_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown borrower type {borrower_raw:?}").into(),
        )
    })?;

    Ok(Loan {
        id: row.get(0)?,
        accession_id: row.get(1)?,
        title: row.get(2)?,
        quantity: row.get(3)?,
        borrower_type,
        borrower_name: row.get(5)?,
        grade: row.get(6)?,
        classroom: row.get(7)?,
        loan_date: row.get(8)?,
        due_date: row.get(9)?,
        returned: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::open_in_memory_store;

    fn draft(accession_id: &str) -> LoanDraft {
        LoanDraft {
            accession_id: accession_id.to_string(),
            quantity: 1,
            borrower_type: BorrowerType::Teacher,
            borrower_name: "Marta".to_string(),
            grade: None,
            classroom: None,
            due_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    #[test]
    fn add_assigns_increasing_ids_and_round_trips() {
        let conn = open_in_memory_store().unwrap();
        let first = add_loan(&conn, &draft("100"), "Dom Casmurro", today()).unwrap();
        let second = add_loan(&conn, &draft("101"), "Quincas Borba", today()).unwrap();
        assert!(second.id > first.id);

        let loaded = get_loan(&conn, first.id).unwrap();
        assert_eq!(loaded, first);
        assert!(!loaded.returned);
    }

    #[test]
    fn update_overwrites_and_reports_missing_rows() {
        let conn = open_in_memory_store().unwrap();
        let mut loan = add_loan(&conn, &draft("100"), "Dom Casmurro", today()).unwrap();
        loan.returned = true;
        update_loan(&conn, &loan).unwrap();
        assert!(get_loan(&conn, loan.id).unwrap().returned);

        loan.id = 9999;
        assert!(matches!(
            update_loan(&conn, &loan).unwrap_err(),
            LibraryError::NotFound(_)
        ));
    }

    #[test]
    fn delete_erases_the_record() {
        let conn = open_in_memory_store().unwrap();
        let loan = add_loan(&conn, &draft("100"), "Dom Casmurro", today()).unwrap();
        delete_loan(&conn, loan.id).unwrap();
        assert!(matches!(
            get_loan(&conn, loan.id).unwrap_err(),
            LibraryError::NotFound(_)
        ));
        assert!(matches!(
            delete_loan(&conn, loan.id).unwrap_err(),
            LibraryError::NotFound(_)
        ));
    }

    #[test]
    fn listing_filters_by_accession_id() {
        let conn = open_in_memory_store().unwrap();
        add_loan(&conn, &draft("100"), "Dom Casmurro", today()).unwrap();
        add_loan(&conn, &draft("101"), "Quincas Borba", today()).unwrap();

        assert_eq!(list_loans_for_book(&conn, "100").unwrap().len(), 1);
        assert!(list_loans_for_book(&conn, "999").unwrap().is_empty());
        assert_eq!(list_all_loans(&conn).unwrap().len(), 2);
    }
}
