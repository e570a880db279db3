//! HTTP API
//!
//! Stateless: callers post the rules, documents, and records they loaded
//! from the catalog store and get compiled queries or trees back.

use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

use crate::config::ServiceConfig;
use crate::hierarchy::{build_json, count, HierarchicalNode, TreeNode};
use crate::rules::{CompiledQuery, RuleCompiler};
use crate::CatalogError;

pub const SERVICE_NAME: &str = "opensase-merchandising";

#[derive(Clone)]
pub struct AppState { pub compiler: Arc<RuleCompiler>, pub config: Arc<ServiceConfig> }

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let compiler = RuleCompiler::with_reference_attributes(config.reference_attributes.clone());
        Self { compiler: Arc::new(compiler), config: Arc::new(config) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "healthy", "service": SERVICE_NAME })) }))
        .route("/api/v1/collections/compile", post(compile_collection))
        .route("/api/v1/collections/preview", post(preview_collection))
        .route("/api/v1/categories/tree", post(category_tree))
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge(String),
    Unprocessable(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidArgument(_) => Self::BadRequest(err.to_string()),
            CatalogError::CyclicHierarchy { .. } => Self::Unprocessable(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self { Self::BadRequest(err.to_string()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            Self::PayloadTooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m),
            Self::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m),
        };
        tracing::debug!(%status, %message, "request rejected");
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn check_limit(what: &str, value: &Value, max: usize) -> Result<(), ApiError> {
    match value.as_array() {
        Some(items) if items.len() > max => Err(ApiError::PayloadTooLarge(format!("{} exceeds limit of {} (got {})", what, max, items.len()))),
        _ => Ok(()),
    }
}

// =============================================================================
// Collections
// =============================================================================

#[derive(Debug, Deserialize)] pub struct CompileRequest { #[serde(default)] pub rules: Value }
#[derive(Debug, Serialize)] pub struct CompileResponse { pub query: CompiledQuery, pub predicates: usize }

async fn compile_collection(State(s): State<AppState>, Json(r): Json<CompileRequest>) -> Result<Json<CompileResponse>, ApiError> {
    check_limit("rules", &r.rules, s.config.max_rules)?;
    let query = s.compiler.compile_json(&r.rules)?;
    Ok(Json(CompileResponse { predicates: query.len(), query }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PreviewRequest {
    #[serde(default)]
    pub rules: Value,
    #[validate(length(max = 10000))]
    pub documents: Vec<Value>,
}

#[derive(Debug, Serialize)] pub struct PreviewResponse { pub query: CompiledQuery, pub matched: Vec<Value>, pub total: usize }

async fn preview_collection(State(s): State<AppState>, Json(r): Json<PreviewRequest>) -> Result<Json<PreviewResponse>, ApiError> {
    r.validate()?;
    check_limit("rules", &r.rules, s.config.max_rules)?;
    if r.documents.len() > s.config.max_records {
        return Err(ApiError::PayloadTooLarge(format!("documents exceeds limit of {}", s.config.max_records)));
    }
    let query = s.compiler.compile_json(&r.rules)?;
    let total = r.documents.len();
    let matched: Vec<Value> = r.documents.into_iter().filter(|d| query.matches(d)).collect();
    tracing::debug!(total, matched = matched.len(), predicates = query.len(), "collection preview");
    Ok(Json(PreviewResponse { query, matched, total }))
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct TreeRequest {
    #[serde(default)]
    pub records: Value,
    #[validate(length(min = 1, max = 128))]
    pub parent_id: Option<String>,
}

#[derive(Debug, Serialize)] pub struct TreeResponse { pub tree: Vec<TreeNode<HierarchicalNode>>, pub count: usize }

async fn category_tree(State(s): State<AppState>, Json(r): Json<TreeRequest>) -> Result<Json<TreeResponse>, ApiError> {
    r.validate()?;
    check_limit("records", &r.records, s.config.max_records)?;
    let tree = build_json(&r.records, r.parent_id.as_deref())?;
    Ok(Json(TreeResponse { count: count(&tree), tree }))
}
