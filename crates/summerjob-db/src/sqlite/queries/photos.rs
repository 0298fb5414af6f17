use rusqlite::{params, Connection, Row};

use summerjob_core::photo::{NewPhoto, Photo};

use super::super::{or_not_found, SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_photo(row: &Row) -> rusqlite::Result<Photo> {
    Ok(Photo {
        id: row.get("id")?,
        photo_path: row.get("photo_path")?,
        extension: row.get("extension")?,
        proposed_job_id: row.get("proposed_job_id")?,
    })
}

pub(crate) fn insert_photos(
    conn: &Connection,
    proposed_job_id: &str,
    photos: &[NewPhoto],
) -> Result<(), DbError> {
    let mut stmt = conn
        .prepare(
            "INSERT INTO photos (id, photo_path, extension, proposed_job_id)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .to_db()?;
    for photo in photos {
        stmt.execute(params![photo.id, photo.photo_path, photo.extension, proposed_job_id])
            .to_db()?;
    }
    Ok(())
}

/// Delete photo rows of one job. Ids belonging to other jobs are ignored.
pub(crate) fn delete_photos(
    conn: &Connection,
    proposed_job_id: &str,
    ids: &[String],
) -> Result<(), DbError> {
    let mut stmt = conn
        .prepare("DELETE FROM photos WHERE id = ?1 AND proposed_job_id = ?2")
        .to_db()?;
    for id in ids {
        stmt.execute(params![id, proposed_job_id]).to_db()?;
    }
    Ok(())
}

impl SqliteDatabase {
    pub fn get_photo_sync(&self, id: &str) -> Result<Photo, DbError> {
        self.with_conn(|conn| {
            or_not_found(
                conn.query_row(
                    "SELECT * FROM photos WHERE id = ?1",
                    params![id],
                    row_to_photo,
                ),
                format!("photo {id}"),
            )
        })
    }

    pub fn list_photos_sync(&self, proposed_job_id: &str) -> Result<Vec<Photo>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM photos WHERE proposed_job_id = ?1 ORDER BY rowid ASC")
                .to_db()?;
            let photos = stmt
                .query_map(params![proposed_job_id], row_to_photo)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(photos)
        })
    }
}
