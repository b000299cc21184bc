use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::now_stamp;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            fullname        TEXT,
            village         TEXT,
            contact         TEXT NOT NULL,
            joined_date     TEXT NOT NULL,
            profile_image   TEXT,
            banner_image    TEXT
        );

        CREATE TABLE IF NOT EXISTS jobs (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            location        TEXT,
            contact         TEXT NOT NULL,
            category        TEXT,
            eligibility     TEXT,
            salary          TEXT,
            deadline        TEXT,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            posted_date     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_jobs_user
            ON jobs(user_id);

        CREATE TABLE IF NOT EXISTS schemes (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            eligibility     TEXT,
            how_to_apply    TEXT,
            deadline        TEXT,
            agency          TEXT,
            contact         TEXT,
            website         TEXT,
            posted_date     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS issues (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            location        TEXT NOT NULL,
            category        TEXT,
            image           TEXT,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            reported_date   TEXT NOT NULL,
            status          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_issues_user
            ON issues(user_id);

        CREATE TABLE IF NOT EXISTS products (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            description     TEXT,
            price           TEXT NOT NULL,
            location        TEXT,
            contact         TEXT NOT NULL,
            category        TEXT,
            image           TEXT,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            posted_date     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_products_user
            ON products(user_id);

        CREATE TABLE IF NOT EXISTS job_applications (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            job_id              INTEGER NOT NULL REFERENCES jobs(id),
            user_id             INTEGER NOT NULL REFERENCES users(id),
            name                TEXT NOT NULL,
            phone               TEXT NOT NULL,
            experience          TEXT,
            message             TEXT,
            application_date    TEXT NOT NULL,
            status              TEXT NOT NULL,
            UNIQUE(job_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token       TEXT PRIMARY KEY,
            user_id     INTEGER REFERENCES users(id),
            language    TEXT NOT NULL DEFAULT 'en',
            flashes     TEXT NOT NULL DEFAULT '[]',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    seed_schemes(conn)?;

    info!("Database migrations complete");
    Ok(())
}

/// Insert the sample government schemes on first initialization only.
/// Guarded by a row-count check so reruns are no-ops.
fn seed_schemes(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM schemes", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let samples = [
        (
            "Pradhan Mantri Kisan Samman Nidhi",
            "Financial support of Rs. 6000 per year to eligible farmer families.",
            "Small and marginal farmers with combined landholding up to 2 hectares.",
            "1. Register online at pmkisan.gov.in or visit local agriculture office.\n2. Submit land records and bank details.",
            "Ongoing",
            "Ministry of Agriculture & Farmers Welfare",
            "1800-115-526",
            "https://pmkisan.gov.in/",
        ),
        (
            "Pradhan Mantri Fasal Bima Yojana",
            "Crop insurance scheme providing financial support to farmers in case of crop failure.",
            "All farmers including sharecroppers and tenant farmers.",
            "1. Apply through nearest bank branch, CSC center or online.\n2. Submit land records and pay premium amount.",
            "Seasonal (Varies by crop)",
            "Ministry of Agriculture & Farmers Welfare",
            "1800-110-144",
            "https://pmfby.gov.in/",
        ),
        (
            "Pradhan Mantri Awas Yojana - Gramin",
            "Housing scheme to provide financial assistance for construction of pucca houses in rural areas.",
            "Houseless rural families and those living in dilapidated houses.",
            "1. Apply through Gram Panchayat.\n2. Submit income proof and land documents.",
            "Ongoing",
            "Ministry of Rural Development",
            "1800-11-6446",
            "https://pmayg.nic.in/",
        ),
    ];

    let now = now_stamp();
    let mut stmt = conn.prepare(
        "INSERT INTO schemes (title, description, eligibility, how_to_apply, deadline, agency, contact, website, posted_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for (title, description, eligibility, how_to_apply, deadline, agency, contact, website) in &samples {
        stmt.execute(rusqlite::params![
            title,
            description,
            eligibility,
            how_to_apply,
            deadline,
            agency,
            contact,
            website,
            now,
        ])?;
    }

    info!("Seeded {} sample schemes", samples.len());
    Ok(())
}
