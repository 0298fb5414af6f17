use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};

use summerjob_core::photo::NewPhoto;
use summerjob_core::proposed_job::{CreateProposedJob, JobType, ProposedJob};
use summerjob_core::tool::{ToolChanges, ToolGroup};

use super::super::{json_column, or_not_found, to_json, SqliteDatabase, SqliteResultExt};
use super::{photos, tools};
use crate::{DbError, ProposedJobPatch};

fn row_to_job(row: &Row) -> rusqlite::Result<ProposedJob> {
    let job_type_str: String = row.get("job_type")?;
    let latitude: Option<f64> = row.get("latitude")?;
    let longitude: Option<f64> = row.get("longitude")?;
    Ok(ProposedJob {
        id: row.get("id")?,
        name: row.get("name")?,
        public_description: row.get("public_description")?,
        private_description: row.get("private_description")?,
        allergens: json_column(row, "allergens")?,
        address: row.get("address")?,
        coordinates: latitude.zip(longitude).map(|(lat, lng)| [lat, lng]),
        contact: row.get("contact")?,
        required_days: row.get("required_days")?,
        min_workers: row.get("min_workers")?,
        max_workers: row.get("max_workers")?,
        strong_workers: row.get("strong_workers")?,
        priority: row.get("priority")?,
        has_food: row.get("has_food")?,
        has_shower: row.get("has_shower")?,
        pinned: row.get("pinned")?,
        hidden: row.get("hidden")?,
        completed: row.get("completed")?,
        availability: json_column(row, "availability")?,
        job_type: JobType::parse_str(&job_type_str).unwrap_or(JobType::Other),
        area_id: row.get("area_id")?,
        photo_ids: json_column(row, "photo_ids")?,
        tools_on_site: Vec::new(),
        tools_to_take_with: Vec::new(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Load a job together with both tool collections.
pub(crate) fn load_job(conn: &Connection, id: &str) -> Result<ProposedJob, DbError> {
    let mut job = or_not_found(
        conn.query_row(
            "SELECT * FROM proposed_jobs WHERE id = ?1",
            params![id],
            row_to_job,
        ),
        format!("proposed job {id}"),
    )?;
    attach_tools(conn, &mut job)?;
    Ok(job)
}

fn attach_tools(conn: &Connection, job: &mut ProposedJob) -> Result<(), DbError> {
    job.tools_on_site = tools::load_tools(conn, &job.id, ToolGroup::OnSite)?;
    job.tools_to_take_with = tools::load_tools(conn, &job.id, ToolGroup::ToTakeWith)?;
    Ok(())
}

fn apply_tool_changes(conn: &Connection, job_id: &str, changes: &ToolChanges) -> Result<(), DbError> {
    if let Some(ref on_site) = changes.on_site {
        tools::replace_tools(conn, job_id, ToolGroup::OnSite, on_site)?;
    }
    if let Some(ref to_take_with) = changes.to_take_with {
        tools::replace_tools(conn, job_id, ToolGroup::ToTakeWith, to_take_with)?;
    }
    Ok(())
}

impl SqliteDatabase {
    pub fn create_proposed_job_sync(
        &self,
        id: &str,
        input: &CreateProposedJob,
        new_photos: &[NewPhoto],
        tool_changes: &ToolChanges,
    ) -> Result<ProposedJob, DbError> {
        self.with_tx(|conn| {
            let now = Utc::now();
            let photo_ids: Vec<&str> = new_photos.iter().map(|p| p.id.as_str()).collect();
            conn.execute(
                "INSERT INTO proposed_jobs (
                    id, name, public_description, private_description, allergens, address,
                    latitude, longitude, contact, required_days, min_workers, max_workers,
                    strong_workers, priority, has_food, has_shower, availability, job_type,
                    area_id, photo_ids, created_at, updated_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                         ?16, ?17, ?18, ?19, ?20, ?21, ?22)",
                params![
                    id,
                    input.name,
                    input.public_description,
                    input.private_description,
                    to_json(&input.allergens)?,
                    input.address,
                    input.coordinates.map(|c| c[0]),
                    input.coordinates.map(|c| c[1]),
                    input.contact,
                    input.required_days,
                    input.min_workers,
                    input.max_workers,
                    input.strong_workers,
                    input.priority,
                    input.has_food,
                    input.has_shower,
                    to_json(&input.availability)?,
                    input.job_type.as_str(),
                    input.area_id,
                    to_json(&photo_ids)?,
                    now,
                    now,
                ],
            )
            .to_db()?;
            photos::insert_photos(conn, id, new_photos)?;
            apply_tool_changes(conn, id, tool_changes)?;
            load_job(conn, id)
        })
    }

    pub fn get_proposed_job_sync(&self, id: &str) -> Result<ProposedJob, DbError> {
        self.with_conn(|conn| load_job(conn, id))
    }

    pub fn list_proposed_jobs_sync(&self) -> Result<Vec<ProposedJob>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM proposed_jobs ORDER BY pinned DESC, name ASC")
                .to_db()?;
            let mut jobs = stmt
                .query_map([], row_to_job)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            for job in &mut jobs {
                attach_tools(conn, job)?;
            }
            Ok(jobs)
        })
    }

    pub fn apply_proposed_job_patch_sync(
        &self,
        id: &str,
        patch: &ProposedJobPatch,
    ) -> Result<ProposedJob, DbError> {
        self.with_tx(|conn| {
            load_job(conn, id)?;

            let f = &patch.fields;
            let now = Utc::now();
            let mut sets = vec!["updated_at = ?1".to_string()];
            let mut param_values: Vec<Box<dyn ToSql>> = vec![Box::new(now)];

            if let Some(ref name) = f.name {
                param_values.push(Box::new(name.clone()));
                sets.push(format!("name = ?{}", param_values.len()));
            }
            if let Some(ref public_description) = f.public_description {
                param_values.push(Box::new(public_description.clone()));
                sets.push(format!("public_description = ?{}", param_values.len()));
            }
            if let Some(ref private_description) = f.private_description {
                param_values.push(Box::new(private_description.clone()));
                sets.push(format!("private_description = ?{}", param_values.len()));
            }
            if let Some(ref allergens) = f.allergens {
                param_values.push(Box::new(to_json(allergens)?));
                sets.push(format!("allergens = ?{}", param_values.len()));
            }
            if let Some(ref address) = f.address {
                param_values.push(Box::new(address.clone()));
                sets.push(format!("address = ?{}", param_values.len()));
            }
            if let Some(coordinates) = f.coordinates {
                param_values.push(Box::new(coordinates.map(|c| c[0])));
                sets.push(format!("latitude = ?{}", param_values.len()));
                param_values.push(Box::new(coordinates.map(|c| c[1])));
                sets.push(format!("longitude = ?{}", param_values.len()));
            }
            if let Some(ref contact) = f.contact {
                param_values.push(Box::new(contact.clone()));
                sets.push(format!("contact = ?{}", param_values.len()));
            }
            if let Some(required_days) = f.required_days {
                param_values.push(Box::new(required_days));
                sets.push(format!("required_days = ?{}", param_values.len()));
            }
            if let Some(min_workers) = f.min_workers {
                param_values.push(Box::new(min_workers));
                sets.push(format!("min_workers = ?{}", param_values.len()));
            }
            if let Some(max_workers) = f.max_workers {
                param_values.push(Box::new(max_workers));
                sets.push(format!("max_workers = ?{}", param_values.len()));
            }
            if let Some(strong_workers) = f.strong_workers {
                param_values.push(Box::new(strong_workers));
                sets.push(format!("strong_workers = ?{}", param_values.len()));
            }
            if let Some(priority) = f.priority {
                param_values.push(Box::new(priority));
                sets.push(format!("priority = ?{}", param_values.len()));
            }
            if let Some(has_food) = f.has_food {
                param_values.push(Box::new(has_food));
                sets.push(format!("has_food = ?{}", param_values.len()));
            }
            if let Some(has_shower) = f.has_shower {
                param_values.push(Box::new(has_shower));
                sets.push(format!("has_shower = ?{}", param_values.len()));
            }
            if let Some(pinned) = f.pinned {
                param_values.push(Box::new(pinned));
                sets.push(format!("pinned = ?{}", param_values.len()));
            }
            if let Some(hidden) = f.hidden {
                param_values.push(Box::new(hidden));
                sets.push(format!("hidden = ?{}", param_values.len()));
            }
            if let Some(completed) = f.completed {
                param_values.push(Box::new(completed));
                sets.push(format!("completed = ?{}", param_values.len()));
            }
            if let Some(ref availability) = f.availability {
                param_values.push(Box::new(to_json(availability)?));
                sets.push(format!("availability = ?{}", param_values.len()));
            }
            if let Some(job_type) = f.job_type {
                param_values.push(Box::new(job_type.as_str().to_string()));
                sets.push(format!("job_type = ?{}", param_values.len()));
            }
            if let Some(ref area_id) = f.area_id {
                param_values.push(Box::new(area_id.clone()));
                sets.push(format!("area_id = ?{}", param_values.len()));
            }
            if let Some(ref photo_ids) = patch.photo_ids {
                param_values.push(Box::new(to_json(photo_ids)?));
                sets.push(format!("photo_ids = ?{}", param_values.len()));
            }

            param_values.push(Box::new(id.to_string()));
            let sql = format!(
                "UPDATE proposed_jobs SET {} WHERE id = ?{}",
                sets.join(", "),
                param_values.len()
            );
            let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_ref.as_slice()).to_db()?;

            photos::delete_photos(conn, id, &patch.deleted_photo_ids)?;
            photos::insert_photos(conn, id, &patch.new_photos)?;
            apply_tool_changes(conn, id, &patch.tools)?;

            load_job(conn, id)
        })
    }

    pub fn delete_proposed_job_sync(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM proposed_jobs WHERE id = ?1", params![id])
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("proposed job {id}")));
            }
            Ok(())
        })
    }
}
