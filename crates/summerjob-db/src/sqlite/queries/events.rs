use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use summerjob_core::event::{CreateEvent, SummerJobEvent};

use super::super::{or_not_found, SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_event(row: &Row) -> rusqlite::Result<SummerJobEvent> {
    Ok(SummerJobEvent {
        id: row.get("id")?,
        name: row.get("name")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
    })
}

fn load_event(conn: &Connection, id: &str) -> Result<SummerJobEvent, DbError> {
    or_not_found(
        conn.query_row(
            "SELECT * FROM summerjob_events WHERE id = ?1",
            params![id],
            row_to_event,
        ),
        format!("event {id}"),
    )
}

impl SqliteDatabase {
    pub fn create_event_sync(&self, input: &CreateEvent) -> Result<SummerJobEvent, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO summerjob_events (id, name, start_date, end_date, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5)",
                params![id, input.name, input.start_date, input.end_date, Utc::now()],
            )
            .to_db()?;
            load_event(conn, &id)
        })
    }

    pub fn get_event_sync(&self, id: &str) -> Result<SummerJobEvent, DbError> {
        self.with_conn(|conn| load_event(conn, id))
    }

    pub fn list_events_sync(&self) -> Result<Vec<SummerJobEvent>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM summerjob_events ORDER BY start_date DESC")
                .to_db()?;
            let events = stmt
                .query_map([], row_to_event)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(events)
        })
    }

    pub fn get_active_event_sync(&self) -> Result<Option<SummerJobEvent>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM summerjob_events WHERE is_active = 1 LIMIT 1",
                [],
                row_to_event,
            )
            .optional()
            .to_db()
        })
    }

    pub fn activate_event_sync(&self, id: &str) -> Result<SummerJobEvent, DbError> {
        self.with_tx(|conn| {
            load_event(conn, id)?;
            conn.execute("UPDATE summerjob_events SET is_active = 0 WHERE is_active = 1", [])
                .to_db()?;
            conn.execute(
                "UPDATE summerjob_events SET is_active = 1 WHERE id = ?1",
                params![id],
            )
            .to_db()?;
            load_event(conn, id)
        })
    }
}
