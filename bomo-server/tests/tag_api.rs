use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use bomo_server::db::DbService;
use bomo_server::db::repository::note;
use bomo_server::{Config, ServerState, api};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::{NoteCreate, NoteStatus};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    state: ServerState,
    _work_dir: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let work_dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(work_dir.path().to_string_lossy(), 0);
        let db = DbService::in_memory().await.unwrap();
        let state = ServerState::new(config, db);
        Self {
            app: api::build_app(state.clone()),
            state,
            _work_dir: work_dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    /// Send a JSON-typed body verbatim, even when it does not parse
    async fn send_raw(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap();
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    /// POST /api/tags, returning the new id
    async fn create(&self, name: &str, parent_id: Option<i64>) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/tags",
                Some(json!({ "name": name, "parentId": parent_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }
}

fn assert_error(status: StatusCode, body: &Value, expected: StatusCode, code: u64) {
    assert_eq!(status, expected, "{body}");
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], code);
}

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn create_returns_envelope_with_camel_case_fields() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/tags",
            Some(json!({ "name": "  Tech  ", "color": "#7c3aed" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["code"], 0);
    let tag = &body["data"];
    assert_eq!(tag["name"], "Tech");
    assert_eq!(tag["level"], 0);
    assert_eq!(tag["parentId"], Value::Null);
    assert_eq!(tag["noteCount"], 0);
    assert!(tag["createdAt"].is_i64());
}

#[tokio::test]
async fn reparent_scenario_propagates_levels() {
    let app = TestApp::new().await;
    let tech = app.create("Tech", None).await;
    let go = app.create("Go", Some(tech)).await;
    let conc = app.create("Concurrency", Some(go)).await;

    let (status, body) = app.get(&format!("/api/tags/{conc}?path=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], 2);
    assert_eq!(body["data"]["path"], json!(["Tech", "Go", "Concurrency"]));

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/tags/{go}"),
            Some(json!({ "parentId": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["level"], 0);
    assert_eq!(body["data"]["parentId"], Value::Null);

    let (_, body) = app.get(&format!("/api/tags/{conc}?path=true")).await;
    assert_eq!(body["data"]["level"], 1);
    assert_eq!(body["data"]["path"], json!(["Go", "Concurrency"]));

    // Absent parentId keeps the parent
    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/tags/{conc}"),
            Some(json!({ "color": "#000000" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["parentId"], go);
}

#[tokio::test]
async fn structural_violations_map_to_error_codes() {
    let app = TestApp::new().await;
    let tech = app.create("Tech", None).await;
    let go = app.create("Go", Some(tech)).await;
    let conc = app.create("Concurrency", Some(go)).await;

    // Cycle
    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/tags/{tech}"),
            Some(json!({ "parentId": conc })),
        )
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 1004);

    // Self parent
    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/tags/{tech}"),
            Some(json!({ "parentId": tech })),
        )
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 1003);

    // Nothing moved
    let (_, body) = app.get(&format!("/api/tags/{tech}")).await;
    assert_eq!(body["data"]["parentId"], Value::Null);
    assert_eq!(body["data"]["level"], 0);

    // Delete blocked by children
    let (status, body) = app.send(Method::DELETE, &format!("/api/tags/{go}"), None).await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 1005);
    assert_eq!(body["details"]["childCount"], 1);
    let (status, _) = app.get(&format!("/api/tags/{go}")).await;
    assert_eq!(status, StatusCode::OK);

    // Leaf delete succeeds, then the tag is gone
    let (status, body) = app.send(Method::DELETE, &format!("/api/tags/{conc}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Concurrency");
    let (status, body) = app.get(&format!("/api/tags/{conc}")).await;
    assert_error(status, &body, StatusCode::NOT_FOUND, 1001);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let app = TestApp::new().await;
    app.create("Tech", None).await;

    let (status, body) = app
        .send(Method::POST, "/api/tags", Some(json!({ "name": "TECH" })))
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 1002);
    assert_eq!(body["details"]["name"], "TECH");

    let (status, body) = app
        .send(Method::POST, "/api/tags", Some(json!({ "name": "   " })))
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 2);
    assert_eq!(body["details"]["field"], "name");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/tags",
            Some(json!({ "name": "Go", "color": "green" })),
        )
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 1007);
    assert_eq!(body["details"]["field"], "color");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/tags",
            Some(json!({ "name": "Go", "parentId": 424242 })),
        )
        .await;
    assert_error(status, &body, StatusCode::NOT_FOUND, 1006);

    let (status, body) = app
        .send(Method::PUT, "/api/tags/424242", Some(json!({ "name": "x" })))
        .await;
    assert_error(status, &body, StatusCode::NOT_FOUND, 1001);
}

#[tokio::test]
async fn malformed_requests_get_the_envelope() {
    let app = TestApp::new().await;
    let tech = app.create("Tech", None).await;

    let (status, body) = app.send(Method::POST, "/api/tags", Some(json!({}))).await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 2);
    assert_eq!(body["details"]["source"], "body");

    let (status, body) = app
        .send(Method::POST, "/api/tags", Some(json!({ "color": "#000000" })))
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 2);

    let (status, body) = app.send_raw(Method::POST, "/api/tags", "{\"name\":").await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 2);

    let (status, body) = app
        .send(Method::PUT, "/api/tags/abc", Some(json!({ "name": "x" })))
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 2);
    assert_eq!(body["details"]["source"], "path");

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/tags/{tech}"),
            Some(json!({ "parentId": "root" })),
        )
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 2);

    let (status, body) = app.get("/api/tags?view=sideways").await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 2);
    assert_eq!(body["details"]["source"], "query");

    let (status, body) = app.get(&format!("/api/tags/{tech}/notes?limit=many")).await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, 2);

    // Nothing above reached storage
    let (_, body) = app.get("/api/tags").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_views_search_and_stats() {
    let app = TestApp::new().await;
    let tech = app.create("技术", None).await;
    let js = app.create("JavaScript", Some(tech)).await;
    app.create("React", Some(tech)).await;
    app.create("日记", None).await;

    {
        let mut conn = app.state.db.pool.acquire().await.unwrap();
        note::create(
            &mut conn,
            NoteCreate {
                title: "closures".into(),
                tag_ids: vec![js],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let (status, body) = app.get("/api/tags").await;
    assert_eq!(status, StatusCode::OK);
    let levels: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["level"].as_i64().unwrap())
        .collect();
    assert_eq!(levels, vec![0, 0, 1, 1]);

    let (_, body) = app.get("/api/tags?view=tree").await;
    let forest = body["data"].as_array().unwrap();
    assert_eq!(forest.len(), 2);
    let tech_node = forest.iter().find(|n| n["id"] == tech).unwrap();
    assert_eq!(tech_node["childCount"], 2);
    assert_eq!(tech_node["children"][0]["name"], "JavaScript");
    assert_eq!(tech_node["children"][0]["noteCount"], 1);

    let (_, body) = app.get("/api/tags?view=root").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app.get(&format!("/api/tags?parentId={tech}")).await;
    let kids = body["data"].as_array().unwrap();
    assert_eq!(kids.len(), 2);
    assert_eq!(kids[0]["name"], "JavaScript");

    let (status, _) = app.get("/api/tags?parentId=424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/tags?search=SCRIPT").await;
    let found = body["data"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "JavaScript");
    assert_eq!(found[0]["parent"]["id"], tech);

    let (_, body) = app.get("/api/tags?stats=true&search=ignored").await;
    assert_eq!(body["data"]["total"], 4);
    assert_eq!(body["data"]["mostUsed"][0]["name"], "JavaScript");
    assert_eq!(body["data"]["mostUsed"][0]["usageCount"], 1);
}

#[tokio::test]
async fn notes_for_tag_paginates() {
    let app = TestApp::new().await;
    let tech = app.create("Tech", None).await;
    {
        let mut conn = app.state.db.pool.acquire().await.unwrap();
        for (title, status) in [
            ("a", NoteStatus::Draft),
            ("b", NoteStatus::Published),
            ("c", NoteStatus::Published),
        ] {
            note::create(
                &mut conn,
                NoteCreate {
                    title: title.into(),
                    status: Some(status),
                    tag_ids: vec![tech],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
    }

    let (status, body) = app
        .get(&format!("/api/tags/{tech}/notes?limit=1&status=PUBLISHED"))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["notes"].as_array().unwrap().len(), 1);
    assert_eq!(data["notes"][0]["status"], "PUBLISHED");
    assert_eq!(data["pagination"], json!({ "total": 2, "limit": 1, "offset": 0, "hasMore": true }));
    assert_eq!(data["tag"]["name"], "Tech");

    let (status, body) = app.get("/api/tags/999/notes").await;
    assert_error(status, &body, StatusCode::NOT_FOUND, 1001);
}

#[tokio::test]
async fn batch_create_and_repair() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/tags/batch",
            Some(json!([{ "name": "Reading" }, { "name": "Diary", "color": "#db2777" }])),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = app.get("/api/tags/consistency").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = app.send(Method::POST, "/api/tags/repair", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["repaired"], 0);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}
