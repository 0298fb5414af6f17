use rusqlite::Connection;
use tracing::info;

use super::SqliteResultExt;
use crate::DbError;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .to_db()?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        // v1: events, areas, proposed jobs with photos and tools
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS summerjob_events (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                start_date  TEXT NOT NULL,
                end_date    TEXT NOT NULL,
                is_active   INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS areas (
                id                  TEXT PRIMARY KEY,
                name                TEXT NOT NULL,
                summer_job_event_id TEXT NOT NULL REFERENCES summerjob_events(id) ON DELETE CASCADE,
                requires_car        INTEGER NOT NULL DEFAULT 0,
                supports_adoration  INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_areas_event ON areas(summer_job_event_id);

            CREATE TABLE IF NOT EXISTS proposed_jobs (
                id                  TEXT PRIMARY KEY,
                name                TEXT NOT NULL,
                public_description  TEXT NOT NULL DEFAULT '',
                private_description TEXT NOT NULL DEFAULT '',
                allergens           TEXT NOT NULL DEFAULT '[]',
                address             TEXT NOT NULL,
                latitude            REAL,
                longitude           REAL,
                contact             TEXT NOT NULL,
                required_days       INTEGER NOT NULL,
                min_workers         INTEGER NOT NULL,
                max_workers         INTEGER NOT NULL,
                strong_workers      INTEGER NOT NULL DEFAULT 0,
                priority            INTEGER NOT NULL DEFAULT 1,
                has_food            INTEGER NOT NULL DEFAULT 0,
                has_shower          INTEGER NOT NULL DEFAULT 0,
                pinned              INTEGER NOT NULL DEFAULT 0,
                hidden              INTEGER NOT NULL DEFAULT 0,
                completed           INTEGER NOT NULL DEFAULT 0,
                availability        TEXT NOT NULL DEFAULT '[]',
                job_type            TEXT NOT NULL DEFAULT 'OTHER',
                area_id             TEXT REFERENCES areas(id) ON DELETE SET NULL,
                photo_ids           TEXT NOT NULL DEFAULT '[]',
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_proposed_jobs_area ON proposed_jobs(area_id);

            CREATE TABLE IF NOT EXISTS photos (
                id              TEXT PRIMARY KEY,
                photo_path      TEXT NOT NULL,
                extension       TEXT NOT NULL,
                proposed_job_id TEXT NOT NULL REFERENCES proposed_jobs(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_photos_job ON photos(proposed_job_id);

            CREATE TABLE IF NOT EXISTS tools (
                id                           TEXT PRIMARY KEY,
                tool                         TEXT NOT NULL,
                amount                       INTEGER NOT NULL DEFAULT 1,
                proposed_job_on_site_id      TEXT REFERENCES proposed_jobs(id) ON DELETE CASCADE,
                proposed_job_to_take_with_id TEXT REFERENCES proposed_jobs(id) ON DELETE CASCADE,
                sort_order                   INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_tools_on_site ON tools(proposed_job_on_site_id);
            CREATE INDEX IF NOT EXISTS idx_tools_to_take_with ON tools(proposed_job_to_take_with_id);",
        )
        .to_db()?;

        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (1, datetime('now'))",
            [],
        )
        .to_db()?;
        info!("applied migration v1");
    }

    if current_version < 2 {
        // v2: workers with a single optional photo
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS workers (
                id           TEXT PRIMARY KEY,
                first_name   TEXT NOT NULL,
                last_name    TEXT NOT NULL,
                email        TEXT NOT NULL UNIQUE,
                phone        TEXT NOT NULL,
                is_strong    INTEGER NOT NULL DEFAULT 0,
                allergies    TEXT NOT NULL DEFAULT '[]',
                availability TEXT NOT NULL DEFAULT '[]',
                photo_path   TEXT,
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            );",
        )
        .to_db()?;

        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (2, datetime('now'))",
            [],
        )
        .to_db()?;
        info!("applied migration v2");
    }

    Ok(())
}
