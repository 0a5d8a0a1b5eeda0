use std::fs;
use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::table::{HotelIdentity, ReviewRecord};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reviews (
            id                    INTEGER PRIMARY KEY,
            hotel_id              TEXT NOT NULL,
            hotel_name            TEXT NOT NULL,
            source_name           TEXT NOT NULL,
            positive_text         TEXT,
            negative_text         TEXT,
            rating                TEXT,
            reviewer_name         TEXT,
            reviewer_country      TEXT,
            checkin_date          TEXT,
            review_created_date   TEXT,
            apartment_type        TEXT,
            length_of_stay_nights INTEGER,
            group_type            TEXT,
            partner_reply_text    TEXT,
            sentiment             TEXT,
            combined_review_text  TEXT,
            seen                  BOOLEAN NOT NULL DEFAULT 0,
            created_at            TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_reviews_identity
            ON reviews(hotel_id, source_name,
                       COALESCE(reviewer_name, ''),
                       COALESCE(combined_review_text, ''));
        CREATE INDEX IF NOT EXISTS idx_reviews_sentiment ON reviews(sentiment);

        CREATE TABLE IF NOT EXISTS runs (
            id             INTEGER PRIMARY KEY,
            hotel_id       TEXT NOT NULL,
            source_name    TEXT NOT NULL,
            pages          INTEGER NOT NULL,
            rows_assembled INTEGER NOT NULL,
            rows_inserted  INTEGER NOT NULL,
            rows_skipped   INTEGER NOT NULL,
            finished_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

/// Outcome of an idempotent batch upsert.
pub struct UpsertOutcome {
    pub inserted: usize,
    pub skipped: usize,
}

/// INSERT OR IGNORE the whole batch in one transaction. A row conflicting
/// on (hotel, source, reviewer, combined text) with one already stored is
/// skipped, so re-running a listing inserts nothing new.
pub fn upsert_reviews(conn: &Connection, rows: &[ReviewRecord]) -> Result<UpsertOutcome> {
    let tx = conn.unchecked_transaction()?;
    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO reviews
             (hotel_id, hotel_name, source_name, positive_text, negative_text, rating,
              reviewer_name, reviewer_country, checkin_date, review_created_date,
              apartment_type, length_of_stay_nights, group_type, partner_reply_text,
              sentiment, combined_review_text, seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        )?;
        for r in rows {
            inserted += stmt.execute(rusqlite::params![
                r.hotel_id,
                r.hotel_name,
                r.source_name,
                r.positive_text,
                r.negative_text,
                r.rating,
                r.reviewer_name,
                r.reviewer_country,
                r.checkin_date,
                r.review_created_date,
                r.apartment_type,
                r.length_of_stay_nights,
                r.group_type,
                r.partner_reply_text,
                r.sentiment,
                r.combined_review_text,
                r.seen,
            ])?;
        }
    }
    tx.commit()?;
    Ok(UpsertOutcome {
        inserted,
        skipped: rows.len() - inserted,
    })
}

pub fn record_run(
    conn: &Connection,
    hotel: &HotelIdentity,
    pages: u32,
    assembled: usize,
    outcome: &UpsertOutcome,
) -> Result<()> {
    conn.execute(
        "INSERT INTO runs (hotel_id, source_name, pages, rows_assembled, rows_inserted, rows_skipped)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            hotel.hotel_id,
            hotel.source_name,
            pages,
            assembled,
            outcome.inserted,
            outcome.skipped,
        ],
    )?;
    Ok(())
}

// ── Stats ──

pub struct RunRow {
    pub hotel_id: String,
    pub source_name: String,
    pub pages: i64,
    pub rows_assembled: i64,
    pub rows_inserted: i64,
    pub rows_skipped: i64,
    pub finished_at: String,
}

pub struct StoreStats {
    pub reviews: usize,
    pub hotels: usize,
    pub labeled: usize,
    pub with_reply: usize,
    pub by_sentiment: Vec<(String, usize)>,
    pub recent_runs: Vec<RunRow>,
}

pub fn get_stats(conn: &Connection) -> Result<StoreStats> {
    let reviews: usize = conn.query_row("SELECT COUNT(*) FROM reviews", [], |r| r.get(0))?;
    let hotels: usize =
        conn.query_row("SELECT COUNT(DISTINCT hotel_id) FROM reviews", [], |r| r.get(0))?;
    let labeled: usize = conn.query_row(
        "SELECT COUNT(*) FROM reviews WHERE sentiment IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let with_reply: usize = conn.query_row(
        "SELECT COUNT(*) FROM reviews WHERE partner_reply_text IS NOT NULL",
        [],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT sentiment, COUNT(*) FROM reviews
         WHERE sentiment IS NOT NULL
         GROUP BY sentiment ORDER BY COUNT(*) DESC",
    )?;
    let by_sentiment = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT hotel_id, source_name, pages, rows_assembled, rows_inserted, rows_skipped, finished_at
         FROM runs ORDER BY id DESC LIMIT 10",
    )?;
    let recent_runs = stmt
        .query_map([], |row| {
            Ok(RunRow {
                hotel_id: row.get(0)?,
                source_name: row.get(1)?,
                pages: row.get(2)?,
                rows_assembled: row.get(3)?,
                rows_inserted: row.get(4)?,
                rows_skipped: row.get(5)?,
                finished_at: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StoreStats {
        reviews,
        hotels,
        labeled,
        with_reply,
        by_sentiment,
        recent_runs,
    })
}

// ── Tests ──
