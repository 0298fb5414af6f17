use chrono::Utc;
use rusqlite::{params, Row};

use summerjob_core::worker::{CreateWorker, Worker};

use super::super::{json_column, or_not_found, to_json, SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_worker(row: &Row) -> rusqlite::Result<Worker> {
    Ok(Worker {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        is_strong: row.get("is_strong")?,
        allergies: json_column(row, "allergies")?,
        availability: json_column(row, "availability")?,
        photo_path: row.get("photo_path")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl SqliteDatabase {
    pub fn create_worker_sync(&self, input: &CreateWorker) -> Result<Worker, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO workers (
                    id, first_name, last_name, email, phone, is_strong, allergies,
                    availability, created_at, updated_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id,
                    input.first_name,
                    input.last_name,
                    input.email,
                    input.phone,
                    input.is_strong,
                    to_json(&input.allergies)?,
                    to_json(&input.availability)?,
                    now,
                    now,
                ],
            )
            .to_db()?;
            conn.query_row(
                "SELECT * FROM workers WHERE id = ?1",
                params![id],
                row_to_worker,
            )
            .to_db()
        })
    }

    pub fn get_worker_sync(&self, id: &str) -> Result<Worker, DbError> {
        self.with_conn(|conn| {
            or_not_found(
                conn.query_row(
                    "SELECT * FROM workers WHERE id = ?1",
                    params![id],
                    row_to_worker,
                ),
                format!("worker {id}"),
            )
        })
    }

    pub fn list_workers_sync(&self) -> Result<Vec<Worker>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM workers ORDER BY first_name ASC, last_name ASC")
                .to_db()?;
            let workers = stmt
                .query_map([], row_to_worker)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(workers)
        })
    }

    pub fn set_worker_photo_sync(
        &self,
        id: &str,
        photo_path: Option<&str>,
    ) -> Result<Worker, DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE workers SET photo_path = ?1, updated_at = ?2 WHERE id = ?3",
                    params![photo_path, Utc::now(), id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("worker {id}")));
            }
            conn.query_row(
                "SELECT * FROM workers WHERE id = ?1",
                params![id],
                row_to_worker,
            )
            .to_db()
        })
    }

    pub fn delete_worker_sync(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM workers WHERE id = ?1", params![id])
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("worker {id}")));
            }
            Ok(())
        })
    }
}
