//! Integration tests against a real server.
//!
//! Each test spawns an in-process axum server on 127.0.0.1:0 with in-memory
//! SQLite and a temporary upload root, then drives it with multipart requests.

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use summerjob_core::proposed_job::PHOTO_FIELD;
use summerjob_server::test_helpers::{spawn_test_server, TestServer};

fn job_payload() -> Value {
    json!({
        "name": "Woodshed",
        "address": "Main 1",
        "contact": "555 123",
        "requiredDays": "3",
        "minWorkers": "2",
        "maxWorkers": "5",
        "strongWorkers": 1,
        "jobType": "WOOD",
        "allergens": ["DUST"],
        "coordinates": [49.2, 16.6],
        "toolsOnSiteCreate": { "tools": [{ "tool": "AXE", "amount": 2 }] },
        "toolsToTakeWithCreate": { "tools": [{ "tool": "RAKE" }] },
    })
}

fn photo(name: &str) -> Part {
    Part::bytes(format!("bytes of {name}").into_bytes())
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap()
}

fn form(payload: &Value, photos: &[&str]) -> Form {
    let mut form = Form::new().text("jsonData", payload.to_string());
    for name in photos {
        form = form.part(PHOTO_FIELD, photo(name));
    }
    form
}

async fn create_job(server: &TestServer, photos: &[&str]) -> Value {
    let resp = reqwest::Client::new()
        .post(format!("{}/api/proposed-jobs", server.base_url))
        .multipart(form(&job_payload(), photos))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

async fn get_job(server: &TestServer, id: &str) -> Value {
    reqwest::get(format!("{}/api/proposed-jobs/{id}", server.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn patch_job(server: &TestServer, id: &str, form: Form) -> reqwest::Response {
    reqwest::Client::new()
        .patch(format!("{}/api/proposed-jobs/{id}", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

fn photo_count_on_disk(server: &TestServer, id: &str) -> usize {
    std::fs::read_dir(server.upload_root.path().join(format!("proposed-job/{id}")))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn health_check() {
    let server = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/api/health", server.base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_coerces_form_values() {
    let server = spawn_test_server().await;
    let job = create_job(&server, &["a.png", "b.png"]).await;

    assert_eq!(job["requiredDays"], 3);
    assert_eq!(job["minWorkers"], 2);
    assert_eq!(job["priority"], 1);
    assert_eq!(job["coordinates"], json!([49.2, 16.6]));
    assert_eq!(job["toolsOnSite"][0]["amount"], 2);
    assert_eq!(job["toolsToTakeWith"][0]["amount"], 1);
    assert_eq!(job["photoIds"].as_array().unwrap().len(), 2);
    assert_eq!(photo_count_on_disk(&server, job["id"].as_str().unwrap()), 2);
}

#[tokio::test]
async fn update_workflow_end_to_end() {
    let server = spawn_test_server().await;
    let job = create_job(&server, &["a.png", "b.png"]).await;
    let id = job["id"].as_str().unwrap();
    let first = job["photoIds"][0].as_str().unwrap().to_string();
    let second = job["photoIds"][1].as_str().unwrap().to_string();

    // Delete one photo, add one, rename, clear on-site tools.
    let payload = json!({
        "name": "Woodshed II",
        "photoIdsDeleted": [first, "not-a-photo"],
        "toolsOnSiteCreate": { "tools": [] },
    });
    let resp = patch_job(&server, id, form(&payload, &["c.png"])).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let after = get_job(&server, id).await;
    assert_eq!(after["name"], "Woodshed II");
    assert_eq!(after["address"], "Main 1");
    let ids = after["photoIds"].as_array().unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], second.as_str());
    assert!(!ids.iter().any(|v| v == first.as_str()));
    assert!(after["toolsOnSite"].as_array().unwrap().is_empty());
    assert_eq!(after["toolsToTakeWith"].as_array().unwrap().len(), 1);
    assert_eq!(photo_count_on_disk(&server, id), 2);

    let resp = reqwest::get(format!(
        "{}/api/proposed-jobs/{id}/photos/{first}",
        server.base_url
    ))
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let new_id = ids[1].as_str().unwrap();
    let resp = reqwest::get(format!(
        "{}/api/proposed-jobs/{id}/photos/{new_id}",
        server.base_url
    ))
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"bytes of c.png");
}

#[tokio::test]
async fn worker_counts_checked_against_stored_job() {
    let server = spawn_test_server().await;
    let job = create_job(&server, &[]).await;
    let id = job["id"].as_str().unwrap();

    let resp = patch_job(&server, id, form(&json!({ "maxWorkers": 1 }), &["a.png"])).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["fields"]["maxWorkers"].is_array());

    let after = get_job(&server, id).await;
    assert_eq!(after["maxWorkers"], 5);
    assert!(after["photoIds"].as_array().unwrap().is_empty());
    assert_eq!(photo_count_on_disk(&server, id), 0);
}

#[tokio::test]
async fn photo_limit_counts_existing_photos() {
    let server = spawn_test_server().await;
    let names: Vec<String> = (0..8).map(|i| format!("p{i}.png")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let job = create_job(&server, &refs).await;
    let id = job["id"].as_str().unwrap();

    let resp = patch_job(&server, id, form(&json!({}), &["x.png", "y.png", "z.png"])).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(photo_count_on_disk(&server, id), 8);

    let resp = patch_job(&server, id, form(&json!({}), &["x.png", "y.png"])).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(get_job(&server, id).await["photoIds"].as_array().unwrap().len(), 10);
    assert_eq!(photo_count_on_disk(&server, id), 10);
}

#[tokio::test]
async fn worker_registration_with_photo() {
    let server = spawn_test_server().await;
    let payload = json!({
        "firstName": "Petr",
        "lastName": "Svoboda",
        "email": "petr@example.com",
        "phone": "+420 777 888 999",
        "isStrong": true,
    });
    let form = Form::new().text("jsonData", payload.to_string()).part(
        "photoFile",
        Part::bytes(b"gif".to_vec())
            .file_name("me.gif")
            .mime_str("image/gif")
            .unwrap(),
    );
    let resp = reqwest::Client::new()
        .post(format!("{}/api/workers/new", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let worker: Value = resp.json().await.unwrap();
    let id = worker["id"].as_str().unwrap();

    let resp = reqwest::get(format!("{}/api/workers/{id}/photo", server.base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "image/gif");

    let resp = reqwest::Client::new()
        .delete(format!("{}/api/workers/{id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(!server
        .upload_root
        .path()
        .join(format!("worker/{id}.gif"))
        .exists());
}
