//! REST 接口端到端流程测试
//!
//! 使用内存仓储与内存元数据来源驱动完整路由，不依赖数据库

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tower::ServiceExt;

use progression::api::{self, AppState};
use progression::error::Result;
use progression::metadata::{GraphCache, GraphCatalog, MetadataSource};
use progression::models::{
    ActorId, HideoutModule, ProgressSnapshot, RequirementStatus, Task, TaskState,
};
use progression::repository::{ProgressRepositoryTrait, ProgressRow};
use progression::service::ProgressService;

/// 内存仓储，行为与数据库实现一致：整行替换，版本递增
#[derive(Default)]
struct InMemoryRepository {
    rows: Mutex<HashMap<ActorId, ProgressRow>>,
}

impl InMemoryRepository {
    fn seed(&self, actor_id: &str, snapshot: ProgressSnapshot) {
        let actor_id = ActorId::new(actor_id);
        self.rows.lock().insert(
            actor_id.clone(),
            ProgressRow {
                actor_id,
                snapshot,
                version: 1,
                updated_at: Some(Utc::now()),
            },
        );
    }

    fn version_of(&self, actor_id: &str) -> Option<i64> {
        self.rows
            .lock()
            .get(&ActorId::new(actor_id))
            .map(|row| row.version)
    }
}

#[async_trait]
impl ProgressRepositoryTrait for InMemoryRepository {
    async fn get_progress(&self, actor_id: &ActorId) -> Result<Option<ProgressRow>> {
        Ok(self.rows.lock().get(actor_id).cloned())
    }

    async fn get_progress_many(&self, actor_ids: &[ActorId]) -> Result<Vec<ProgressRow>> {
        let rows = self.rows.lock();
        Ok(actor_ids
            .iter()
            .filter_map(|id| rows.get(id).cloned())
            .collect())
    }

    async fn replace_progress(
        &self,
        actor_id: &ActorId,
        snapshot: &ProgressSnapshot,
    ) -> Result<i64> {
        let mut rows = self.rows.lock();
        let row = rows
            .entry(actor_id.clone())
            .or_insert_with(|| ProgressRow::empty(actor_id.clone()));
        row.snapshot = snapshot.clone();
        row.version += 1;
        row.updated_at = Some(Utc::now());
        Ok(row.version)
    }
}

/// 固定目录的元数据来源
struct StaticCatalog(GraphCatalog);

#[async_trait]
impl MetadataSource for StaticCatalog {
    async fn load_catalog(&self) -> Result<GraphCatalog> {
        Ok(self.0.clone())
    }
}

fn catalog() -> GraphCatalog {
    use RequirementStatus::*;
    GraphCatalog {
        tasks: vec![
            Task::new("intro").with_name("Debut").with_trader("prapor"),
            Task::new("delivery").requires("intro", &[Complete]),
            Task::new("branch_a")
                .requires("intro", &[Complete])
                .with_alternative("branch_b"),
            Task::new("branch_b")
                .requires("intro", &[Complete])
                .with_alternative("branch_a"),
            Task::new("bear_only").with_faction("Bear"),
        ],
        hideout_modules: vec![
            HideoutModule::new("stash-1", "stash", 1),
            HideoutModule::new("stash-2", "stash", 2),
            HideoutModule::new("workbench-1", "workbench", 1).requires_station("stash", 2),
        ],
        ..GraphCatalog::default()
    }
}

fn setup() -> (Router, Arc<InMemoryRepository>) {
    let repo = Arc::new(InMemoryRepository::default());
    let graphs = Arc::new(GraphCache::new(
        Arc::new(StaticCatalog(catalog())),
        Duration::from_secs(300),
    ));
    let service = Arc::new(ProgressService::new(repo.clone(), graphs, "api-test"));
    (api::router(AppState::new(service)), repo)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_get_progress_for_unknown_actor_returns_empty_snapshot() {
    let (app, _) = setup();

    let (status, body) = send(&app, "GET", "/api/v1/progress/nobody", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["version"], 0);
    assert_eq!(body["data"]["progress"]["level"], 1);
    assert_eq!(body["data"]["progress"]["faction"], "Any");
}

#[tokio::test]
async fn test_complete_task_cascades_to_alternatives() {
    let (app, repo) = setup();

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/progress/p1/tasks/intro",
        Some(json!({ "state": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], 1);
    assert_eq!(body["data"]["update"]["source"], "api-test");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/progress/p1/tasks/branch_a",
        Some(json!({ "state": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let changes = body["data"]["update"]["tasks"].as_array().unwrap();
    assert!(changes.contains(&json!({ "id": "branch_b", "state": "failed" })));

    let (_, body) = send(&app, "GET", "/api/v1/progress/p1", None).await;
    let completions = &body["data"]["progress"]["completions"];
    assert_eq!(completions["branch_a"]["complete"], true);
    assert_eq!(completions["branch_b"]["failed"], true);
    assert_eq!(
        body["data"]["progress"]["lastUpdate"]["tasks"],
        json!(changes)
    );
    assert_eq!(repo.version_of("p1"), Some(2));
}

#[tokio::test]
async fn test_repeated_write_has_no_update_record() {
    let (app, repo) = setup();

    send(
        &app,
        "PUT",
        "/api/v1/progress/p1/tasks/intro",
        Some(json!({ "state": "completed" })),
    )
    .await;
    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/progress/p1/tasks/intro",
        Some(json!({ "state": "completed" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["update"].is_null());
    assert_eq!(repo.version_of("p1"), Some(2));
}

#[tokio::test]
async fn test_unknown_task_returns_404_without_write() {
    let (app, repo) = setup();

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/progress/p1/tasks/missing",
        Some(json!({ "state": "completed" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "TASK_NOT_FOUND");
    assert_eq!(repo.version_of("p1"), None);
}

#[tokio::test]
async fn test_invalid_state_is_rejected() {
    let (app, repo) = setup();

    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/progress/p1/tasks/intro",
        Some(json!({ "state": "started" })),
    )
    .await;

    assert!(status.is_client_error());
    assert_eq!(repo.version_of("p1"), None);
}

#[tokio::test]
async fn test_batch_update_single_write() {
    let (app, repo) = setup();

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/progress/p1/tasks",
        Some(json!([
            { "id": "intro", "state": "completed" },
            { "id": "delivery", "state": "completed" },
            { "id": "branch_b", "state": "completed" }
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["accepted"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["version"], 1);
    assert_eq!(repo.version_of("p1"), Some(1));

    let (_, body) = send(&app, "GET", "/api/v1/progress/p1", None).await;
    assert_eq!(
        body["data"]["progress"]["completions"]["branch_a"]["failed"],
        true
    );
}

#[tokio::test]
async fn test_empty_batch_is_validation_error() {
    let (app, _) = setup();

    let (status, body) = send(&app, "PUT", "/api/v1/progress/p1/tasks", Some(json!([]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_availability_follows_writes() {
    let (app, _) = setup();

    let (status, body) = send(&app, "GET", "/api/v1/progress/p1/availability", None).await;
    assert_eq!(status, StatusCode::OK);
    let available = &body["data"]["tasks"]["available"];
    assert_eq!(available["intro"], true);
    assert_eq!(available["delivery"], false);
    assert_eq!(body["data"]["hideout"]["stash-1"], true);
    assert_eq!(body["data"]["hideout"]["stash-2"], false);

    send(
        &app,
        "PUT",
        "/api/v1/progress/p1/tasks/intro",
        Some(json!({ "state": "completed" })),
    )
    .await;

    let (_, body) = send(&app, "GET", "/api/v1/progress/p1/availability", None).await;
    let available = &body["data"]["tasks"]["available"];
    assert_eq!(available["intro"], false);
    assert_eq!(available["delivery"], true);
    assert_eq!(available["branch_a"], true);
    assert_eq!(body["data"]["version"], 1);
}

#[tokio::test]
async fn test_hideout_levels() {
    let (app, _) = setup();

    for module in ["stash-1", "stash-2"] {
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/v1/progress/p1/hideout/{module}"),
            Some(json!({ "complete": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, "GET", "/api/v1/progress/p1/availability", None).await;
    assert_eq!(body["data"]["hideout"]["workbench-1"], true);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/progress/p1/hideout/stash-1",
        Some(json!({ "complete": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let modules = body["data"]["update"]["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 2);

    let (_, body) = send(&app, "GET", "/api/v1/progress/p1", None).await;
    let stored = &body["data"]["progress"]["hideoutModules"];
    assert_eq!(stored["stash-1"]["complete"], false);
    assert_eq!(stored["stash-2"]["complete"], false);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/progress/p1/hideout/missing",
        Some(json!({ "complete": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "MODULE_NOT_FOUND");
}

#[tokio::test]
async fn test_team_availability() {
    let (app, repo) = setup();
    repo.seed(
        "me",
        ProgressSnapshot::default()
            .with_faction("Usec")
            .with_state("intro", TaskState::Completed),
    );
    repo.seed(
        "mate",
        ProgressSnapshot::default()
            .with_faction("Bear")
            .with_state("intro", TaskState::Failed),
    );

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/team/availability",
        Some(json!({ "primary": "me", "teammates": ["mate", "me", "stranger"] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let team = &body["data"];
    assert_eq!(team["aggregate_state"]["intro"], "failed");
    assert_eq!(team["by_task"]["intro"].as_object().unwrap().len(), 3);
    assert_eq!(team["by_task"]["bear_only"]["mate"], true);
    assert_eq!(team["by_task"]["bear_only"]["me"], false);
    assert_eq!(team["available_for_any"]["bear_only"], true);
    assert_eq!(team["hideout_available_for_any"]["stash-1"], true);
}

#[tokio::test]
async fn test_invalidations_report_inconsistent_rows() {
    let (app, repo) = setup();
    repo.seed(
        "p1",
        ProgressSnapshot::default()
            .with_state("delivery", TaskState::Completed)
            .with_state("branch_a", TaskState::Completed)
            .with_state("branch_b", TaskState::Completed),
    );

    let (status, body) = send(&app, "GET", "/api/v1/progress/p1/invalidations", None).await;

    assert_eq!(status, StatusCode::OK);
    let findings = body["data"]["findings"].as_array().unwrap();
    let kinds: Vec<&str> = findings
        .iter()
        .filter_map(|f| f["kind"].as_str())
        .collect();
    assert_eq!(
        kinds
            .iter()
            .filter(|k| **k == "alternative_conflict")
            .count(),
        1
    );
    assert!(findings.contains(&json!({
        "kind": "requirement_not_met",
        "task_id": "delivery",
        "requirement_id": "intro"
    })));
}
