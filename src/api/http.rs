//! HTTP surface: read endpoints over the store and the predict endpoint.
//!
//! Every failure is logged once here and mapped to exactly one status code.
//! Error bodies carry a human readable `detail` and a stable `code`.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::common::config::AppCfg;
use crate::common::error::{PenguinCode, PenguinError, PenguinResult};
use crate::data::{DataService, FilterSpec, Record, SqliteDataRepo, Table};
use crate::inference::{self, FeatureVector, PredictionResult};
use crate::models::{FsArtifactRepo, ModelId, ModelResolver, VersionTable};

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub data: DataService,
    pub models: ModelResolver,
}

impl AppState {
    pub fn new(data: DataService, models: ModelResolver) -> Self {
        Self { data, models }
    }

    /// Wire the SQLite store, versioning table and artifact directory from `cfg`.
    pub fn from_config(cfg: &AppCfg) -> PenguinResult<Self> {
        let data = DataService::new(
            Arc::new(SqliteDataRepo::new(cfg.db_path.clone(), cfg.query_timeout)),
            cfg.query_timeout,
        );

        let versions = VersionTable::load(&cfg.versions_path)?;
        tracing::info!(
            versions = versions.len(),
            path = %cfg.versions_path.display(),
            "versioning table loaded"
        );
        let resolver = ModelResolver::new(
            versions,
            Arc::new(FsArtifactRepo::new(cfg)),
            cfg.load_timeout,
        );
        let models = if cfg.cache_artifacts {
            resolver
        } else {
            resolver.without_cache()
        };

        Ok(Self::new(data, models))
    }
}

/// Build the router. Paths are served with and without a trailing slash.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/penguins", get(list_penguins))
        .route("/penguins/", get(list_penguins))
        .route("/model", get(list_models))
        .route("/model/", get(list_models))
        .route("/status", get(list_status))
        .route("/status/", get(list_status))
        .route("/predict", post(predict))
        .route("/predict/", post(predict))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct PenguinQuery {
    pub island_id: Option<i64>,
    pub status_id: Option<i64>,
    pub species: Option<String>,
    pub model_id: Option<i64>,
}

impl PenguinQuery {
    pub fn filters(self) -> FilterSpec {
        FilterSpec::new()
            .with("island_id", self.island_id)
            .with("status_id", self.status_id)
            .with("species", self.species)
            .with("model_id", self.model_id)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelQuery {
    pub model_id: Option<i64>,
}

/// Body of `POST /predict`. All four measurements are required.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(alias = "model_id")]
    pub prediction_model_id: i64,
    pub bill_length_mm: f64,
    pub bill_depth_mm: f64,
    pub flipper_length_mm: f64,
    pub body_mass_g: f64,
}

impl PredictRequest {
    pub fn features(&self) -> FeatureVector {
        FeatureVector {
            bill_length_mm: self.bill_length_mm,
            bill_depth_mm: self.bill_depth_mm,
            flipper_length_mm: self.flipper_length_mm,
            body_mass_g: self.body_mass_g,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PenguinsResponse {
    pub penguins: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub model: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: PredictionResult,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
    code: &'static str,
}

/// An error already mapped to its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: PenguinCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: String) -> Self {
        tracing::warn!(%detail, "rejected request");
        Self {
            status: StatusCode::BAD_REQUEST,
            code: PenguinCode::InvalidInput,
            detail,
        }
    }
}

/// The single status each error kind maps to.
pub fn status_for(code: PenguinCode) -> StatusCode {
    match code {
        PenguinCode::ModelNotFound => StatusCode::NOT_FOUND,
        PenguinCode::FeatureBinding | PenguinCode::InvalidInput => StatusCode::BAD_REQUEST,
        PenguinCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        PenguinCode::Storage | PenguinCode::Inference => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<PenguinError> for ApiError {
    fn from(err: PenguinError) -> Self {
        let code = err.code();
        let status = status_for(code);
        if status.is_server_error() {
            tracing::error!(code = code.as_str(), error = %err, "request failed");
        } else {
            tracing::warn!(code = code.as_str(), error = %err, "request rejected");
        }
        Self {
            status,
            code,
            detail: err.to_string(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.detail,
            code: self.code.as_str(),
        };
        (self.status, Json(body)).into_response()
    }
}

async fn list_penguins(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PenguinQuery>, QueryRejection>,
) -> Result<Json<PenguinsResponse>, ApiError> {
    let Query(query) = query?;
    let penguins = state.data.query(Table::Penguins, &query.filters()).await?;
    Ok(Json(PenguinsResponse { penguins }))
}

async fn list_models(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ModelQuery>, QueryRejection>,
) -> Result<Json<ModelsResponse>, ApiError> {
    let Query(query) = query?;
    let filters = FilterSpec::new().with("model_id", query.model_id);
    let model = state.data.query(Table::Model, &filters).await?;
    Ok(Json(ModelsResponse { model }))
}

async fn list_status(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.data.query(Table::Status, &FilterSpec::new()).await?;
    Ok(Json(StatusResponse { status }))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let artifact = state
        .models
        .resolve(ModelId(request.prediction_model_id))
        .await?;
    let prediction = inference::service::predict(&artifact, &request.features())?;
    tracing::info!(
        model_id = request.prediction_model_id,
        artifact = artifact.key().as_str(),
        "prediction served"
    );
    Ok(Json(PredictResponse { prediction }))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::data::repo_sqlite::fixtures;

    const V1: &str = r#"{"kind": "linear_regression",
        "features": ["body_mass_g", "flipper_length_mm", "bill_depth_mm", "bill_length_mm"],
        "coefficients": [1000, 100, 10, 1], "intercept": 0}"#;

    const V3_FOREIGN: &str = r#"{"kind": "linear_regression",
        "features": ["bill_length_mm", "bill_depth_mm", "flipper_length_mm", "sex"],
        "coefficients": [1, 1, 1, 1], "intercept": 0}"#;

    /// Store with exactly one Adelie row plus the model/status tables.
    fn state(dir: &Path) -> Arc<AppState> {
        let db = fixtures::empty_db(dir);
        fixtures::insert_penguin(&db, "Adelie", 1, 2, Some(39.1));
        rusqlite::Connection::open(&db)
            .unwrap()
            .execute_batch(
                "INSERT INTO MODEL (model_id, model_name) VALUES (101, 'v1'), (103, 'v3');
                 INSERT INTO STATUS (status_id, status) VALUES (2, 'tagged');",
            )
            .unwrap();

        let models = dir.join("models");
        fs::create_dir(&models).unwrap();
        fs::write(models.join("model_v1.json"), V1).unwrap();
        fs::write(models.join("model_v3.json"), V3_FOREIGN).unwrap();

        let data = DataService::new(
            Arc::new(SqliteDataRepo::new(db, Duration::from_secs(1))),
            Duration::from_secs(5),
        );
        let versions = VersionTable::from_entries([(101, "v1"), (102, "v2"), (103, "v3")]).unwrap();
        let resolver = ModelResolver::new(
            versions,
            Arc::new(FsArtifactRepo::with_root(models)),
            Duration::from_secs(5),
        );
        Arc::new(AppState::new(data, resolver))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn measurements(model_id: i64) -> Value {
        json!({
            "prediction_model_id": model_id,
            "bill_length_mm": 1.0,
            "bill_depth_mm": 2.0,
            "flipper_length_mm": 3.0,
            "body_mass_g": 4.0
        })
    }

    #[tokio::test]
    async fn species_filter_returns_matching_rows_only() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path()));

        let (status, body) = get_json(app.clone(), "/penguins?species=Adelie").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["penguins"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["species"], json!("Adelie"));
        assert_eq!(rows[0]["island_id"], json!(1));
        assert_eq!(rows[0]["status_id"], json!(2));

        let (status, body) = get_json(app, "/penguins?species=Gentoo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "penguins": [] }));
    }

    #[tokio::test]
    async fn penguin_filters_combine_and_accept_trailing_slash() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path()));

        let (_, body) = get_json(app.clone(), "/penguins/").await;
        assert_eq!(body["penguins"].as_array().unwrap().len(), 1);

        let uri = "/penguins?island_id=1&status_id=2&model_id=101";
        let (_, body) = get_json(app.clone(), uri).await;
        assert_eq!(body["penguins"].as_array().unwrap().len(), 1);

        let (_, body) = get_json(app.clone(), "/penguins?island_id=1&status_id=3").await;
        assert!(body["penguins"].as_array().unwrap().is_empty());

        let (_, body) = get_json(app, "/penguins?species=x'%20OR%20'1'%3D'1").await;
        assert!(body["penguins"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_query_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path()));

        let (status, body) = get_json(app, "/penguins?island_id=one").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("invalid_input"));
    }

    #[tokio::test]
    async fn model_and_status_listings() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path()));

        let (status, body) = get_json(app.clone(), "/model").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"].as_array().unwrap().len(), 2);

        let (_, body) = get_json(app.clone(), "/model/?model_id=103").await;
        assert_eq!(
            body["model"],
            json!([{ "model_id": 103, "model_name": "v3", "description": null }])
        );

        let (status, body) = get_json(app, "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": [{ "status_id": 2, "status": "tagged" }] }));
    }

    #[tokio::test]
    async fn predict_binds_by_name_and_maps_errors() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path()));

        // v1 declares body_mass_g first (weight 1000) and bill_length_mm last (weight 1).
        let (status, body) = post_json(app.clone(), "/predict", measurements(101)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "prediction": [4321.0] }));

        let (status, body) = post_json(app.clone(), "/predict", measurements(999)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], json!("model_not_found"));

        // 102 is mapped but its artifact was never published.
        let (status, _) = post_json(app.clone(), "/predict/", measurements(102)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = post_json(app, "/predict", measurements(103)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("feature_binding_error"));
    }

    #[tokio::test]
    async fn predict_requires_every_measurement() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path()));

        let mut body = measurements(101);
        body.as_object_mut().unwrap().remove("body_mass_g");
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let legacy = json!({
            "model_id": 101,
            "bill_length_mm": 1.0,
            "bill_depth_mm": 2.0,
            "flipper_length_mm": 3.0,
            "body_mass_g": 4.0
        });
        let (status, body) = post_json(app, "/predict", legacy).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], json!([4321.0]));
    }

    #[tokio::test]
    async fn storage_failures_are_internal_errors() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataService::new(
            Arc::new(SqliteDataRepo::new(
                dir.path().join("missing.db"),
                Duration::from_secs(1),
            )),
            Duration::from_secs(1),
        );
        let resolver = ModelResolver::new(
            VersionTable::default(),
            Arc::new(FsArtifactRepo::with_root(dir.path())),
            Duration::from_secs(1),
        );
        let app = router(Arc::new(AppState::new(data, resolver)));

        let (status, body) = get_json(app, "/status").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], json!("storage_error"));
    }

    #[test]
    fn each_code_maps_to_one_status() {
        assert_eq!(status_for(PenguinCode::Storage), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(PenguinCode::ModelNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(PenguinCode::FeatureBinding), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(PenguinCode::Inference), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(PenguinCode::Timeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(status_for(PenguinCode::InvalidInput), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn from_config_requires_versioning_table() {
        let dir = tempfile::tempdir().unwrap();
        let versions = dir.path().join("versions.json");
        let lookup = |key: &str| match key {
            "PENGUINS_VERSIONS_PATH" => Some(versions.display().to_string()),
            "PENGUINS_MODEL_DIR" => Some(dir.path().display().to_string()),
            _ => None,
        };

        let cfg = AppCfg::from_lookup(lookup).unwrap();
        assert!(AppState::from_config(&cfg).is_err());

        fs::write(&versions, r#"{"101": "v1"}"#).unwrap();
        let state = AppState::from_config(&cfg).unwrap();
        assert_eq!(state.models.versions().len(), 1);
    }
}
