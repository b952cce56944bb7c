//! Catalog store: bootstrap from the bundled seed data plus the read-only
//! book queries. Books are never inserted, updated, or deleted through any
//! other path.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::error::{LibraryError, Result};
use crate::models::Book;

/// One record of the seed file, in its source shape. Field names are case-
/// and accent-sensitive in the JSON; missing presentation fields default to
/// empty strings rather than failing the whole import.
#[derive(Debug, Deserialize)]
struct SeedBook {
    #[serde(rename = "numeroTombo", deserialize_with = "string_or_number")]
    accession_id: String,
    #[serde(rename = "TITULO")]
    title: String,
    #[serde(rename = "AUTOR", default)]
    author: String,
    #[serde(rename = "EDITORA", default)]
    publisher: String,
    #[serde(rename = "GÊNERO", default)]
    genre: String,
    #[serde(rename = "DATA TOMBO", default)]
    accession_date: String,
    #[serde(rename = "ORIGEM", default)]
    origin: String,
    #[serde(rename = "SITUAÇÃO", default)]
    status: String,
}

/// Accession numbers arrive as `"100"` in some seed rows and `100` in
/// others. Normalize both to a trimmed string here, exactly once; every
/// later lookup uses the string form.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.trim().to_string(),
        Raw::Number(n) => n.to_string(),
    })
}

/// Populate the catalog from the seed JSON if and only if it is empty.
/// Returns the number of books inserted (`0` means the store was already
/// bootstrapped). The JSON is parsed before any write, so a malformed seed
/// leaves the store untouched, and the bulk insert runs in one transaction.
pub fn bootstrap_catalog(conn: &mut Connection, seed_json: &str) -> Result<usize> {
    if count_books(conn)? > 0 {
        return Ok(0);
    }

    let seed: Vec<SeedBook> = serde_json::from_str(seed_json)?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO books
                (accession_id, title, author, publisher, genre,
                 accession_date, origin, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for book in &seed {
            stmt.execute(params![
                book.accession_id,
                book.title,
                book.author,
                book.publisher,
                book.genre,
                book.accession_date,
                book.origin,
                book.status,
            ])?;
        }
    }
    tx.commit()?;

    info!(count = seed.len(), "catalog bootstrapped from seed data");
    Ok(seed.len())
}

/// Look a book up by its accession number.
pub fn get_book(conn: &Connection, accession_id: &str) -> Result<Book> {
    conn.prepare(
        "SELECT accession_id, title, author, publisher, genre,
                accession_date, origin, status
         FROM books WHERE accession_id = ?1",
    )?
    .query_row(params![accession_id], book_from_row)
    .optional()?
    .ok_or_else(|| LibraryError::NotFound(format!("book {accession_id} not found")))
}

/// Total number of cataloged books. Only used to decide whether to
/// bootstrap.
pub fn count_books(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
    Ok(count)
}

/// Case-insensitive substring search on the title, ordered so mixed-case
/// titles group together.
pub fn search_books_by_title(conn: &Connection, query: &str) -> Result<Vec<Book>> {
    let mut stmt = conn.prepare(
        "SELECT accession_id, title, author, publisher, genre,
                accession_date, origin, status
         FROM books
         WHERE LOWER(title) LIKE '%' || LOWER(?1) || '%'
         ORDER BY title COLLATE NOCASE",
    )?;

    let books = stmt
        .query_map(params![query.trim()], book_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(books)
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        accession_id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        publisher: row.get(3)?,
        genre: row.get(4)?,
        accession_date: row.get(5)?,
        origin: row.get(6)?,
        status: row.get(7)?,
    })
}
