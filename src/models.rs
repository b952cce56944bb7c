//! Domain models that mirror the SQLite schema and get passed between the
//! persistence layer, the circulation logic, and whatever front end renders
//! them. The intent is that these types stay light-weight data holders so
//! other layers can focus on queries and lifecycle rules.

use std::fmt;

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
/// A catalog entry for one physical book. Books are written once during the
/// catalog bootstrap and never mutated or deleted by this crate afterwards.
pub struct Book {
    /// Accession number ("tombo"): the unique catalog key. Always a string,
    /// even when it looks numeric: the seed data mixes `"100"` and `100`
    /// and we normalize at ingestion so lookups never flip key types.
    pub accession_id: String,
    /// Title displayed in lists and search results.
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub genre: String,
    /// Date the book entered the collection, as recorded in the seed data.
    /// Kept as raw text because the source format is not uniform.
    pub accession_date: String,
    /// How the book was acquired (donation, purchase, ...).
    pub origin: String,
    /// Free-form condition/status note from the seed data.
    pub status: String,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({}, {})",
            self.title, self.author, self.publisher, self.genre
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Who is borrowing a book. Students must also supply a grade; teachers only
/// a name. The distinction drives validation in `circulation::borrow`.
pub enum BorrowerType {
    Student,
    Teacher,
}

impl BorrowerType {
    /// Stable text form stored in the `loans` table.
    pub fn as_str(self) -> &'static str {
        match self {
            BorrowerType::Student => "student",
            BorrowerType::Teacher => "teacher",
        }
    }

    /// Parse the stored text form back. Returns `None` for unknown values so
    /// the persistence layer can surface a storage error instead of guessing.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(BorrowerType::Student),
            "teacher" => Some(BorrowerType::Teacher),
            _ => None,
        }
    }
}

impl fmt::Display for BorrowerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A checkout record. Returning a loan flips `returned` and preserves the
/// row; removing a loan deletes the row outright. The two are deliberately
/// distinct operations.
pub struct Loan {
    /// Auto-increment primary key assigned by SQLite.
    pub id: i64,
    /// Accession number of the borrowed book.
    pub accession_id: String,
    /// Title copied from the book at borrow time so loan listings render
    /// without a join.
    pub title: String,
    pub quantity: u32,
    pub borrower_type: BorrowerType,
    pub borrower_name: String,
    /// Grade/year, present for student borrowers.
    pub grade: Option<String>,
    /// Classroom label, optional for everyone.
    pub classroom: Option<String>,
    /// Stored as ISO-8601 text in SQLite; comparisons happen on the parsed
    /// date, never on display strings.
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned: bool,
}

#[derive(Debug, Clone)]
/// Input for a borrow request, before validation and before an id exists.
/// Fields mirror the checkout form; `circulation::borrow` validates them and
/// fills in the rest of the `Loan`.
pub struct LoanDraft {
    pub accession_id: String,
    pub quantity: u32,
    pub borrower_type: BorrowerType,
    pub borrower_name: String,
    pub grade: Option<String>,
    pub classroom: Option<String>,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Derived presentation status of a loan on a given calendar date.
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One row of a title search result: the matched book plus its current
/// availability, with the borrower's name when it is out.
pub struct SearchMatch {
    pub book: Book,
    pub loaned_out: bool,
    pub borrower_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// Aggregate counts for a title search, cross-referenced against active
/// loans.
pub struct SearchSummary {
    pub total: usize,
    pub available: usize,
    pub loaned_out: usize,
    pub matches: Vec<SearchMatch>,
}
