//! Integration tests for the goalkeeper manager backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, DatabaseConfig};
use crate::dashboard::{Dashboard, HttpBackend};
use crate::db::{init_database, Database, Repository, SqlParam};
use crate::models::PartidaStatus;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    db: Database,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        // Initialize database
        let db = init_database(&db_url).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(db.clone()));

        // Create config
        let config = Config {
            database: DatabaseConfig {
                url: Some(db_url),
                port: 3306,
                ..Default::default()
            },
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_json: false,
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            db,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Rows are created out of band in production; tests insert them directly.
    async fn seed_goleiro(&self, id: i64, name: &str, active: bool) {
        self.db
            .execute(
                "INSERT INTO goleiros (id, nomecompleto, whatsapp, cidade, tipo_campo, status, fotoperfil, rating) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    id.into(),
                    name.into(),
                    "11999990000".into(),
                    "São Paulo".into(),
                    "Society".into(),
                    SqlParam::Int(active as i64),
                    None::<&str>.into(),
                    4.5.into(),
                ],
            )
            .await
            .expect("Failed to seed goleiro");
    }

    async fn seed_partida(&self, id: i64, goleiro_id: Option<i64>, status: PartidaStatus) {
        self.db
            .execute(
                "INSERT INTO partidas (id, data, hora, endereco, tipocampo, contratante, idgoleiro, status) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    id.into(),
                    "2023-10-26".into(),
                    "19:00".into(),
                    "Quadra do Zé, Osasco".into(),
                    "Futsal".into(),
                    "Firma FC".into(),
                    goleiro_id.into(),
                    status.as_str().into(),
                ],
            )
            .await
            .expect("Failed to seed partida");
    }

    async fn get_json(&self, path: &str) -> Value {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }

    async fn find(&self, path: &str, id: i64) -> Value {
        let list = self.get_json(path).await;
        list.as_array()
            .unwrap()
            .iter()
            .find(|row| row["id"] == id)
            .cloned()
            .unwrap_or_else(|| panic!("row {} not found in {}", id, path))
    }
}

#[tokio::test]
async fn test_list_goleiros_empty() {
    let fixture = TestFixture::new().await;

    let body = fixture.get_json("/api/goleiros").await;

    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_goleiros_shape_and_order() {
    let fixture = TestFixture::new().await;
    fixture.seed_goleiro(2, "João 'Mão de Cola'", true).await;
    fixture.seed_goleiro(1, "Carlos Muralha", false).await;

    let body = fixture.get_json("/api/goleiros").await;
    let rows = body.as_array().unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[0]["nomecompleto"], "Carlos Muralha");
    assert_eq!(rows[0]["status"], false);
    assert_eq!(rows[0]["fotoperfil"], Value::Null);
    assert_eq!(rows[0]["rating"], 4.5);
    assert_eq!(rows[1]["tipo_campo"], "Society");
    assert_eq!(rows[1]["status"], true);
}

#[tokio::test]
async fn test_list_goleiros_reads_boolean_status_column() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("existing.sqlite");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    // Tables created outside this service may declare status as BOOLEAN
    sqlx::any::install_default_drivers();
    let pool = sqlx::any::AnyPoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await
        .expect("Failed to open DB");
    let db = Database::new(pool);
    db.execute(
        "CREATE TABLE goleiros (id INTEGER PRIMARY KEY, nomecompleto VARCHAR(255) NOT NULL, whatsapp VARCHAR(32) NOT NULL, cidade VARCHAR(128) NOT NULL, tipo_campo VARCHAR(32) NOT NULL, status BOOLEAN NOT NULL, fotoperfil VARCHAR(512), rating DOUBLE NOT NULL)",
        &[],
    )
    .await
    .expect("Failed to create table");
    db.execute(
        "INSERT INTO goleiros (id, nomecompleto, whatsapp, cidade, tipo_campo, status, fotoperfil, rating) VALUES (1, 'Carlos Muralha', '11999990001', 'São Paulo', 'Society', TRUE, NULL, 4.8), (2, 'Pedro Peneira', '11999990003', 'São Paulo', 'Futsal', FALSE, NULL, 3.2)",
        &[],
    )
    .await
    .expect("Failed to seed goleiros");

    let repo = Repository::new(db);
    let goleiros = repo.list_goleiros().await.expect("Failed to list goleiros");

    assert_eq!(goleiros.len(), 2);
    assert!(goleiros[0].status);
    assert!(!goleiros[1].status);

    repo.toggle_goleiro_status(2).await.unwrap();
    let goleiros = repo.list_goleiros().await.unwrap();
    assert!(goleiros[1].status);
}

#[tokio::test]
async fn test_toggle_goleiro_status() {
    let fixture = TestFixture::new().await;
    fixture.seed_goleiro(7, "Carlos Muralha", true).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/goleiros/7/toggle"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "ok": true }));

    let goleiro = fixture.find("/api/goleiros", 7).await;
    assert_eq!(goleiro["status"], false);
}

#[tokio::test]
async fn test_double_toggle_restores_status() {
    let fixture = TestFixture::new().await;
    fixture.seed_goleiro(1, "Carlos Muralha", true).await;
    fixture.seed_goleiro(3, "Pedro Peneira", false).await;

    for _ in 0..2 {
        for id in [1, 3] {
            let resp = fixture
                .client
                .post(fixture.url(&format!("/api/goleiros/{}/toggle", id)))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), 200);
        }
    }

    assert_eq!(fixture.find("/api/goleiros", 1).await["status"], true);
    assert_eq!(fixture.find("/api/goleiros", 3).await["status"], false);
}

#[tokio::test]
async fn test_toggle_unknown_goleiro_still_ok() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/goleiros/999/toggle"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_toggle_invalid_id() {
    let fixture = TestFixture::new().await;

    for path in ["/api/goleiros/abc/toggle", "/api/goleiros/0/toggle"] {
        let resp = fixture.client.post(fixture.url(path)).send().await.unwrap();

        assert_eq!(resp.status(), 400, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Invalid id");
    }
}

#[tokio::test]
async fn test_assign_confirms_pending_match() {
    let fixture = TestFixture::new().await;
    fixture.seed_goleiro(2, "João 'Mão de Cola'", true).await;
    fixture.seed_partida(101, None, PartidaStatus::Pendente).await;

    let before = fixture.find("/api/partidas", 101).await;
    assert_eq!(before["idgoleiro"], Value::Null);
    assert_eq!(before["status"], "pendente");

    let resp = fixture
        .client
        .post(fixture.url("/api/partidas/101/assign"))
        .json(&json!({ "goleiroId": 2 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "ok": true }));

    let after = fixture.find("/api/partidas", 101).await;
    assert_eq!(after["idgoleiro"], 2);
    assert_eq!(after["status"], "confirmado");
}

#[tokio::test]
async fn test_assign_confirms_cancelled_match() {
    let fixture = TestFixture::new().await;
    fixture.seed_goleiro(4, "Roberto Luva", true).await;
    fixture.seed_goleiro(5, "André Seguro", true).await;
    fixture.seed_partida(104, Some(4), PartidaStatus::Cancelado).await;

    // Numeric string and no content type, as older clients send it
    let resp = fixture
        .client
        .post(fixture.url("/api/partidas/104/assign"))
        .body(r#"{"goleiroId":"5"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);

    let after = fixture.find("/api/partidas", 104).await;
    assert_eq!(after["idgoleiro"], 5);
    assert_eq!(after["status"], "confirmado");
}

#[tokio::test]
async fn test_assign_malformed_body_leaves_match_unchanged() {
    let fixture = TestFixture::new().await;
    fixture.seed_goleiro(2, "João 'Mão de Cola'", true).await;
    fixture.seed_partida(102, None, PartidaStatus::Pendente).await;

    let bodies = [
        json!({}).to_string(),
        json!({ "goleiroId": "abc" }).to_string(),
        json!({ "goleiroId": null }).to_string(),
        "not json".to_string(),
    ];

    for body in bodies {
        let resp = fixture
            .client
            .post(fixture.url("/api/partidas/102/assign"))
            .header("content-type", "application/json")
            .body(body.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400, "{}", body);
        let error: Value = resp.json().await.unwrap();
        assert_eq!(error["error"]["message"], "Invalid goleiroId");
    }

    let partida = fixture.find("/api/partidas", 102).await;
    assert_eq!(partida["idgoleiro"], Value::Null);
    assert_eq!(partida["status"], "pendente");
}

#[tokio::test]
async fn test_assign_unknown_goleiro_is_not_found() {
    let fixture = TestFixture::new().await;
    fixture.seed_partida(102, None, PartidaStatus::Pendente).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/partidas/102/assign"))
        .json(&json!({ "goleiroId": 99 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let partida = fixture.find("/api/partidas", 102).await;
    assert_eq!(partida["status"], "pendente");
}

#[tokio::test]
async fn test_assign_unknown_match_still_ok() {
    let fixture = TestFixture::new().await;
    fixture.seed_goleiro(2, "João 'Mão de Cola'", true).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/partidas/555/assign"))
        .json(&json!({ "goleiroId": 2 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_unsupported_method_leaves_data_unchanged() {
    let fixture = TestFixture::new().await;
    fixture.seed_goleiro(7, "Carlos Muralha", true).await;
    fixture.seed_partida(101, None, PartidaStatus::Pendente).await;

    let responses = [
        fixture.client.get(fixture.url("/api/goleiros/7/toggle")).send().await.unwrap(),
        fixture.client.delete(fixture.url("/api/goleiros")).send().await.unwrap(),
        fixture
            .client
            .put(fixture.url("/api/partidas/101/assign"))
            .json(&json!({ "goleiroId": 7 }))
            .send()
            .await
            .unwrap(),
    ];

    for resp in responses {
        assert_eq!(resp.status(), 405);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
    }

    assert_eq!(fixture.find("/api/goleiros", 7).await["status"], true);
    assert_eq!(fixture.find("/api/partidas", 101).await["status"], "pendente");
}

#[tokio::test]
async fn test_database_error_is_not_exposed() {
    let fixture = TestFixture::new().await;
    fixture.db.execute("DROP TABLE partidas", &[]).await.unwrap();

    let resp = fixture
        .client
        .get(fixture.url("/api/partidas"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let text = resp.text().await.unwrap();
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    assert_eq!(body["error"]["message"], "Database error");
    assert!(!text.contains("partidas"));
}

#[tokio::test]
async fn test_confirmed_match_requires_goalkeeper() {
    let fixture = TestFixture::new().await;

    let result = fixture
        .db
        .execute(
            "INSERT INTO partidas (id, data, hora, endereco, tipocampo, contratante, idgoleiro, status) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            &[
                1i64.into(),
                "2023-10-25".into(),
                "20:00".into(),
                "Arena Society, SP".into(),
                "Society".into(),
                "Time dos Amigos".into(),
                SqlParam::Null,
                "confirmado".into(),
            ],
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_diagnostics_report() {
    let fixture = TestFixture::new().await;
    fixture.seed_goleiro(1, "Carlos Muralha", true).await;
    fixture.seed_goleiro(2, "João 'Mão de Cola'", true).await;
    fixture.seed_partida(101, Some(1), PartidaStatus::Confirmado).await;

    let body = fixture.get_json("/api/test-db").await;

    assert_eq!(body["success"], true);
    assert_eq!(body["connectionTest"]["status"], "success");
    assert_eq!(body["goleirosTest"]["totalRows"], 2);
    assert_eq!(body["partidasTest"]["totalRows"], 1);
    assert_eq!(body["environment"]["urlOverride"], true);
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn test_diagnostics_reports_failed_table_check() {
    let fixture = TestFixture::new().await;
    fixture.db.execute("DROP TABLE partidas", &[]).await.unwrap();

    let body = fixture.get_json("/api/test-db").await;

    assert_eq!(body["success"], true);
    assert_eq!(body["goleirosTest"]["status"], "success");
    assert_eq!(body["partidasTest"]["status"], "error");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_dashboard_over_http_backend() {
    let fixture = TestFixture::new().await;
    fixture.seed_goleiro(1, "Carlos Muralha", true).await;
    fixture.seed_goleiro(3, "Pedro Peneira", false).await;
    fixture.seed_partida(102, None, PartidaStatus::Pendente).await;

    let backend = HttpBackend::new(&fixture.url("/api"));
    let mut dashboard = Dashboard::new(Arc::new(backend), None);
    dashboard.load().await.unwrap();
    assert_eq!(dashboard.goleiros().len(), 2);
    assert_eq!(dashboard.partidas().len(), 1);

    // Activate Pedro, then give him the pending match
    dashboard.toggle_goleiro(3).await.unwrap();
    assert!(dashboard.open_swap_modal(102));
    assert!(dashboard.select_swap_goleiro(3));
    assert!(dashboard.confirm_swap().await.unwrap());

    let local = (dashboard.goleiros().to_vec(), dashboard.partidas().to_vec());
    dashboard.refresh().await.unwrap();
    assert_eq!(dashboard.goleiros(), local.0.as_slice());
    assert_eq!(dashboard.partidas(), local.1.as_slice());
    assert_eq!(dashboard.partidas()[0].status, PartidaStatus::Confirmado);
    assert_eq!(dashboard.partidas()[0].goleiro_id, Some(3));
}

#[tokio::test]
async fn test_dashboard_reports_backend_failure() {
    let fixture = TestFixture::new().await;
    fixture.db.execute("DROP TABLE goleiros", &[]).await.ok();

    let backend = HttpBackend::new(&fixture.url("/api"));
    let mut dashboard = Dashboard::new(Arc::new(backend), None);

    assert!(dashboard.load().await.is_err());
    assert!(dashboard.goleiros().is_empty());
    assert!(dashboard.last_error().unwrap().contains("500"));
}
