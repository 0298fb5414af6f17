use rusqlite::{params, Row};

use summerjob_core::area::{Area, CreateArea};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_area(row: &Row) -> rusqlite::Result<Area> {
    Ok(Area {
        id: row.get("id")?,
        name: row.get("name")?,
        summer_job_event_id: row.get("summer_job_event_id")?,
        requires_car: row.get("requires_car")?,
        supports_adoration: row.get("supports_adoration")?,
    })
}

impl SqliteDatabase {
    pub fn create_area_sync(&self, event_id: &str, input: &CreateArea) -> Result<Area, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO areas (id, name, summer_job_event_id, requires_car, supports_adoration)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    input.name,
                    event_id,
                    input.requires_car,
                    input.supports_adoration
                ],
            )
            .to_db()?;
            conn.query_row("SELECT * FROM areas WHERE id = ?1", params![id], row_to_area)
                .to_db()
        })
    }

    pub fn list_areas_sync(&self, event_id: Option<&str>) -> Result<Vec<Area>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM areas
                     WHERE ?1 IS NULL OR summer_job_event_id = ?1
                     ORDER BY name ASC",
                )
                .to_db()?;
            let areas = stmt
                .query_map(params![event_id], row_to_area)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(areas)
        })
    }
}
