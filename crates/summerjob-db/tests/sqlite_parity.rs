// Integration tests that exercise every Database trait method against the
// in-memory SQLite backend. The test bodies live in `common/mod.rs` and only
// see `&dyn Database`.

mod common;

use std::sync::Arc;
use summerjob_db::Database;

async fn make_db() -> Arc<dyn Database> {
    Arc::new(summerjob_db::SqliteDatabase::open_in_memory().unwrap())
}

#[tokio::test]
async fn proposed_job_crud() {
    let db = make_db().await;
    common::test_proposed_job_crud(&*db).await;
}

#[tokio::test]
async fn patch_changes_only_dirty_fields() {
    let db = make_db().await;
    common::test_patch_changes_only_dirty_fields(&*db).await;
}

#[tokio::test]
async fn patch_reconciles_photos() {
    let db = make_db().await;
    common::test_patch_reconciles_photos(&*db).await;
}

#[tokio::test]
async fn patch_replaces_tools() {
    let db = make_db().await;
    common::test_patch_replaces_tools(&*db).await;
}

#[tokio::test]
async fn patch_is_atomic() {
    let db = make_db().await;
    common::test_patch_is_atomic(&*db).await;
}

#[tokio::test]
async fn patch_missing_job() {
    let db = make_db().await;
    common::test_patch_missing_job(&*db).await;
}

#[tokio::test]
async fn delete_cascades() {
    let db = make_db().await;
    common::test_delete_cascades(&*db).await;
}

#[tokio::test]
async fn worker_crud() {
    let db = make_db().await;
    common::test_worker_crud(&*db).await;
}

#[tokio::test]
async fn event_activation() {
    let db = make_db().await;
    common::test_event_activation(&*db).await;
}

#[tokio::test]
async fn areas_by_event() {
    let db = make_db().await;
    common::test_areas_by_event(&*db).await;
}
