use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use onboarding_forms::{
    api::create_router,
    app_state::AppState,
    config::Config,
    store::{KeyValueStorage, MemoryStorage, STORAGE_KEY},
};

fn app() -> Router {
    let state = AppState::with_storage(Config::default(), Arc::new(MemoryStorage::new()));
    create_router(state)
}

/// Router over storage that already holds `custom_fields`
fn app_with_stored(custom_fields: Value) -> Router {
    let storage = MemoryStorage::new();
    storage
        .set(STORAGE_KEY, &custom_fields.to_string())
        .unwrap();
    create_router(AppState::with_storage(Config::default(), Arc::new(storage)))
}

fn core_values() -> Value {
    json!({
        "firstName": "Asha",
        "lastName": "Rao",
        "email": "asha@example.com",
        "phone": "+919876543210"
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_schema_lists_mandatory_then_defaults() {
    let (status, body) = send(&app(), "GET", "/api/schema", None).await;
    assert_eq!(status, StatusCode::OK);

    let fields = body["data"]["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 8);
    assert_eq!(fields[0]["name"], "firstName");
    assert_eq!(fields[0]["isCore"], true);
    assert_eq!(fields[5]["name"], "role");
    assert_eq!(body["data"]["groups"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_catalog() {
    let (_, body) = send(&app(), "GET", "/api/schema/catalog", None).await;
    let types = body["data"]["fieldTypes"].as_array().unwrap();
    assert_eq!(types.len(), 8);
}

#[tokio::test]
async fn test_group_fields() {
    let (_, body) = send(&app(), "GET", "/api/schema/groups/employment", None).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["joiningDate", "role", "managerName"]);
}

#[tokio::test]
async fn test_create_field_then_validate() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/schema/fields",
        Some(json!({ "label": "Start City", "type": "text", "required": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "start_city");
    assert_eq!(body["data"]["isCore"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/api/forms/validate",
        Some(json!({ "values": {
            "firstName": "Asha",
            "lastName": "Rao",
            "email": "asha@example.com",
            "phone": "+919876543210",
            "start_city": ""
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let details = body["error"]["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["field"], "start_city");
    assert_eq!(details[0]["message"], "Start City is required");
}

#[tokio::test]
async fn test_valid_form() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/forms/validate",
        Some(json!({ "values": {
            "firstName": "Asha",
            "lastName": "Rao",
            "email": "asha@example.com",
            "phone": "+919876543210"
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);
}

#[tokio::test]
async fn test_builder_errors_reported_together() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/schema/fields",
        Some(json!({ "label": "", "name": "9lives", "type": "select", "options": ["Only"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|detail| detail["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["label", "name", "options"]);
}

#[tokio::test]
async fn test_core_fields_are_protected() {
    let app = app();
    let (status, _) = send(
        &app,
        "PUT",
        "/api/schema/fields/email",
        Some(json!({ "label": "Mail" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "DELETE", "/api/schema/fields/email", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_update_keeps_name() {
    let app = app();
    let (status, body) = send(
        &app,
        "PUT",
        "/api/schema/fields/managerName",
        Some(json!({ "label": "Reporting Manager", "name": "boss" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "managerName");
    assert_eq!(body["data"]["label"], "Reporting Manager");
}

#[tokio::test]
async fn test_delete_and_reset() {
    let app = app();
    let (status, _) = send(&app, "DELETE", "/api/schema/fields/role", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", "/api/schema/fields/role", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", "/api/schema/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_render_controls() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/forms/render",
        Some(json!({ "values": { "phone": "+91" }, "errors": { "phone": "Bad phone" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let fields = body["data"]["fields"].as_array().unwrap();
    let phone = fields.iter().find(|field| field["name"] == "phone").unwrap();
    assert_eq!(phone["control"]["kind"], "textInput");
    assert_eq!(phone["control"]["inputMode"], "tel");
    assert_eq!(phone["value"], "+91");
    assert_eq!(phone["error"], "Bad phone");

    let laptop = fields
        .iter()
        .find(|field| field["name"] == "laptopRequired")
        .unwrap();
    assert_eq!(laptop["control"]["kind"], "switch");
    assert_eq!(laptop["control"]["checked"], true);

    assert_eq!(body["data"]["sections"][0]["groupId"], "personal");
}

#[tokio::test]
async fn test_hidden_required_field_neither_rendered_nor_validated() {
    let app = app_with_stored(json!([
        { "name": "badge", "label": "Badge", "type": "text", "required": true, "order": 9, "visible": false }
    ]));

    let (_, body) = send(&app, "POST", "/api/forms/render", Some(json!({ "values": core_values() }))).await;
    let names: Vec<&str> = body["data"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["firstName", "lastName", "email", "phone"]);

    let (status, body) = send(
        &app,
        "POST",
        "/api/forms/validate",
        Some(json!({ "values": core_values() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);
}

#[tokio::test]
async fn test_colliding_stored_field_is_addressable() {
    let app = app_with_stored(json!([
        { "name": "email", "label": "Work Email", "type": "email", "order": 9 }
    ]));

    let (_, body) = send(&app, "GET", "/api/schema", None).await;
    let names: Vec<&str> = body["data"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["firstName", "lastName", "email", "phone", "email_2"]);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/schema/fields/email_2",
        Some(json!({ "label": "Personal Email" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "email_2");

    let (status, _) = send(&app, "DELETE", "/api/schema/fields/email_2", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/schema", None).await;
    assert_eq!(body["data"]["fields"].as_array().unwrap().len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_writes_all_land() {
    let app = app();
    let mut handles = Vec::new();
    for index in 0..5 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            send(
                &app,
                "POST",
                "/api/schema/fields",
                Some(json!({ "label": format!("Desk {}", index) })),
            )
            .await
        }));
    }
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, "GET", "/api/schema", None).await;
    let fields = body["data"]["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 13);
    for index in 0..5 {
        let name = format!("desk_{}", index);
        assert!(fields.iter().any(|field| field["name"] == name.as_str()));
    }
}
