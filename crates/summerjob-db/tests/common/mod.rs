// Backend-agnostic integration tests for the Database trait.
//
// Each public async function accepts `&dyn Database`.

use chrono::NaiveDate;

use summerjob_core::area::CreateArea;
use summerjob_core::event::CreateEvent;
use summerjob_core::photo::NewPhoto;
use summerjob_core::proposed_job::{Allergy, CreateProposedJob, JobType, UpdateProposedJob};
use summerjob_core::tool::{ToolChanges, ToolInput, ToolName};
use summerjob_core::worker::CreateWorker;
use summerjob_db::{Database, DbError, ProposedJobPatch};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_job(name: &str) -> CreateProposedJob {
    CreateProposedJob {
        name: name.to_string(),
        public_description: String::new(),
        private_description: String::new(),
        allergens: vec![Allergy::Dust],
        address: "X".into(),
        coordinates: Some([49.19, 16.61]),
        contact: "555 123 456".into(),
        required_days: 2,
        min_workers: 2,
        max_workers: 4,
        strong_workers: 1,
        priority: 1,
        has_food: true,
        has_shower: false,
        availability: vec![NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()],
        job_type: JobType::Garden,
        area_id: None,
    }
}

fn photo(job_id: &str, id: &str) -> NewPhoto {
    NewPhoto {
        id: id.to_string(),
        photo_path: format!("proposed-job/{job_id}/{id}.png"),
        extension: "png".into(),
    }
}

fn tool(name: ToolName, amount: i32) -> ToolInput {
    ToolInput { tool: name, amount }
}

fn make_event(name: &str) -> CreateEvent {
    CreateEvent {
        name: name.to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 7, 7).unwrap(),
    }
}

// ---------------------------------------------------------------------------
// Proposed jobs
// ---------------------------------------------------------------------------

pub async fn test_proposed_job_crud(db: &dyn Database) {
    let tools = ToolChanges {
        on_site: Some(vec![tool(ToolName::Ladder, 1)]),
        to_take_with: Some(vec![tool(ToolName::Axe, 2), tool(ToolName::Rake, 1)]),
    };
    let job = db
        .create_proposed_job("job-1", &make_job("Chop wood"), &[photo("job-1", "p1")], &tools)
        .await
        .unwrap();
    assert_eq!(job.id, "job-1");
    assert_eq!(job.name, "Chop wood");
    assert_eq!(job.coordinates, Some([49.19, 16.61]));
    assert_eq!(job.allergens, vec![Allergy::Dust]);
    assert_eq!(job.photo_ids, vec!["p1"]);
    assert!(!job.pinned);
    assert_eq!(job.tools_on_site.len(), 1);
    assert_eq!(job.tools_on_site[0].proposed_job_on_site_id.as_deref(), Some("job-1"));
    assert_eq!(
        job.tools_to_take_with.iter().map(|t| t.tool).collect::<Vec<_>>(),
        vec![ToolName::Axe, ToolName::Rake]
    );

    let fetched = db.get_proposed_job("job-1").await.unwrap();
    assert_eq!(fetched, job);

    let photos = db.list_photos("job-1").await.unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].photo_path, "proposed-job/job-1/p1.png");
    assert_eq!(db.get_photo("p1").await.unwrap().proposed_job_id, "job-1");

    db.create_proposed_job("job-2", &make_job("Another"), &[], &ToolChanges::default())
        .await
        .unwrap();
    assert_eq!(db.list_proposed_jobs().await.unwrap().len(), 2);

    let err = db.get_proposed_job("nope").await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}

pub async fn test_patch_changes_only_dirty_fields(db: &dyn Database) {
    let mut input = make_job("Old");
    input.min_workers = 2;
    let before = db
        .create_proposed_job("job-1", &input, &[photo("job-1", "p1")], &ToolChanges::default())
        .await
        .unwrap();

    let patch = ProposedJobPatch {
        fields: UpdateProposedJob {
            name: Some("New".into()),
            ..Default::default()
        },
        ..Default::default()
    };
    let after = db.apply_proposed_job_patch("job-1", &patch).await.unwrap();
    assert_eq!(after.name, "New");
    assert_eq!(after.address, "X");
    assert_eq!(after.min_workers, 2);
    assert_eq!(after.photo_ids, before.photo_ids);
    assert_eq!(after.coordinates, before.coordinates);
    assert!(after.updated_at >= before.updated_at);

    let patch = ProposedJobPatch {
        fields: UpdateProposedJob {
            coordinates: Some(None),
            pinned: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    let after = db.apply_proposed_job_patch("job-1", &patch).await.unwrap();
    assert_eq!(after.coordinates, None);
    assert!(after.pinned);
    assert_eq!(after.name, "New");
}

pub async fn test_patch_reconciles_photos(db: &dyn Database) {
    db.create_proposed_job(
        "job-1",
        &make_job("Photos"),
        &[photo("job-1", "p1"), photo("job-1", "p2")],
        &ToolChanges::default(),
    )
    .await
    .unwrap();

    let patch = ProposedJobPatch {
        photo_ids: Some(vec!["p2".into(), "p3".into()]),
        new_photos: vec![photo("job-1", "p3")],
        deleted_photo_ids: vec!["p1".into()],
        ..Default::default()
    };
    let job = db.apply_proposed_job_patch("job-1", &patch).await.unwrap();
    assert_eq!(job.photo_ids, vec!["p2", "p3"]);
    let ids: Vec<String> = db
        .list_photos("job-1")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["p2", "p3"]);
    assert!(matches!(db.get_photo("p1").await.unwrap_err(), DbError::NotFound(_)));
}

pub async fn test_patch_replaces_tools(db: &dyn Database) {
    let tools = ToolChanges {
        on_site: Some(vec![tool(ToolName::Ladder, 1)]),
        to_take_with: Some(vec![tool(ToolName::Axe, 2)]),
    };
    db.create_proposed_job("job-1", &make_job("Tools"), &[], &tools)
        .await
        .unwrap();

    // Omitted key leaves the collection alone; empty list clears it.
    let patch = ProposedJobPatch {
        tools: ToolChanges {
            on_site: Some(vec![]),
            to_take_with: None,
        },
        ..Default::default()
    };
    let job = db.apply_proposed_job_patch("job-1", &patch).await.unwrap();
    assert!(job.tools_on_site.is_empty());
    assert_eq!(job.tools_to_take_with.len(), 1);

    let patch = ProposedJobPatch {
        tools: ToolChanges {
            on_site: None,
            to_take_with: Some(vec![tool(ToolName::Shovel, 3), tool(ToolName::Broom, 1)]),
        },
        ..Default::default()
    };
    let job = db.apply_proposed_job_patch("job-1", &patch).await.unwrap();
    assert_eq!(
        job.tools_to_take_with
            .iter()
            .map(|t| (t.tool, t.amount))
            .collect::<Vec<_>>(),
        vec![(ToolName::Shovel, 3), (ToolName::Broom, 1)]
    );
    assert_eq!(db.get_proposed_job("job-1").await.unwrap(), job);
}

pub async fn test_patch_is_atomic(db: &dyn Database) {
    db.create_proposed_job(
        "job-1",
        &make_job("Atomic"),
        &[photo("job-1", "p1")],
        &ToolChanges::default(),
    )
    .await
    .unwrap();

    // Re-registering an existing photo id violates the primary key after the
    // scalar update already ran.
    let patch = ProposedJobPatch {
        fields: UpdateProposedJob {
            name: Some("Changed".into()),
            ..Default::default()
        },
        photo_ids: Some(vec!["p1".into(), "p1".into()]),
        new_photos: vec![photo("job-1", "p1")],
        deleted_photo_ids: vec![],
        tools: ToolChanges::default(),
    };
    assert!(db.apply_proposed_job_patch("job-1", &patch).await.is_err());

    let job = db.get_proposed_job("job-1").await.unwrap();
    assert_eq!(job.name, "Atomic");
    assert_eq!(job.photo_ids, vec!["p1"]);
}

pub async fn test_patch_missing_job(db: &dyn Database) {
    let patch = ProposedJobPatch {
        new_photos: vec![photo("ghost", "p1")],
        ..Default::default()
    };
    let err = db.apply_proposed_job_patch("ghost", &patch).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
    assert!(db.get_photo("p1").await.is_err());
}

pub async fn test_delete_cascades(db: &dyn Database) {
    let tools = ToolChanges {
        on_site: Some(vec![tool(ToolName::Ladder, 1)]),
        to_take_with: None,
    };
    db.create_proposed_job("job-1", &make_job("Gone"), &[photo("job-1", "p1")], &tools)
        .await
        .unwrap();
    db.delete_proposed_job("job-1").await.unwrap();

    assert!(db.list_photos("job-1").await.unwrap().is_empty());
    let err = db.delete_proposed_job("job-1").await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));

    // Tool rows went with the job, so a job reusing the id starts empty.
    let job = db
        .create_proposed_job("job-1", &make_job("Again"), &[], &ToolChanges::default())
        .await
        .unwrap();
    assert!(job.tools_on_site.is_empty());
    assert!(job.tools_to_take_with.is_empty());
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

pub async fn test_worker_crud(db: &dyn Database) {
    let worker = db
        .create_worker(&CreateWorker {
            first_name: "Jana".into(),
            last_name: "Novakova".into(),
            email: "jana@example.com".into(),
            phone: "123456789".into(),
            is_strong: false,
            allergies: vec![Allergy::Pollen],
            availability: vec![],
        })
        .await
        .unwrap();
    assert_eq!(worker.photo_path, None);
    assert_eq!(worker.allergies, vec![Allergy::Pollen]);

    let updated = db
        .set_worker_photo(&worker.id, Some("worker/abc.png"))
        .await
        .unwrap();
    assert_eq!(updated.photo_path.as_deref(), Some("worker/abc.png"));
    assert_eq!(db.get_worker(&worker.id).await.unwrap(), updated);
    assert_eq!(db.list_workers().await.unwrap().len(), 1);

    db.delete_worker(&worker.id).await.unwrap();
    assert!(matches!(
        db.get_worker(&worker.id).await.unwrap_err(),
        DbError::NotFound(_)
    ));
    assert!(matches!(
        db.set_worker_photo(&worker.id, None).await.unwrap_err(),
        DbError::NotFound(_)
    ));
}

// ---------------------------------------------------------------------------
// Events and areas
// ---------------------------------------------------------------------------

pub async fn test_event_activation(db: &dyn Database) {
    assert!(db.get_active_event().await.unwrap().is_none());

    let first = db.create_event(&make_event("2025")).await.unwrap();
    let second = db.create_event(&make_event("2026")).await.unwrap();
    assert!(!first.is_active);

    db.activate_event(&first.id).await.unwrap();
    assert_eq!(db.get_active_event().await.unwrap().unwrap().id, first.id);

    let active = db.activate_event(&second.id).await.unwrap();
    assert!(active.is_active);
    assert_eq!(db.get_active_event().await.unwrap().unwrap().id, second.id);
    assert!(!db.get_event(&first.id).await.unwrap().is_active);
    assert_eq!(db.list_events().await.unwrap().len(), 2);

    let err = db.activate_event("nope").await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
    assert_eq!(db.get_active_event().await.unwrap().unwrap().id, second.id);
}

pub async fn test_areas_by_event(db: &dyn Database) {
    let first = db.create_event(&make_event("2025")).await.unwrap();
    let second = db.create_event(&make_event("2026")).await.unwrap();
    let area = |name: &str| CreateArea {
        name: name.to_string(),
        requires_car: true,
        supports_adoration: false,
    };
    db.create_area(&first.id, &area("North")).await.unwrap();
    db.create_area(&second.id, &area("South")).await.unwrap();
    db.create_area(&second.id, &area("East")).await.unwrap();

    assert_eq!(db.list_areas(None).await.unwrap().len(), 3);
    let names: Vec<String> = db
        .list_areas(Some(&second.id))
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["East", "South"]);

    assert!(db.create_area("missing-event", &area("West")).await.is_err());
}
