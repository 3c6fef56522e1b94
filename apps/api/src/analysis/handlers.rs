//! Axum handler for the analysis request.
//!
//! Flow: validate the upload and job description, extract résumé text, select the rubric,
//! compose the prompt, call the model, persist when a user is attached, respond.
//! Validation failures are 400s; everything downstream is a 500 with a generic message.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::analysis::extractor::validate_pdf;
use crate::analysis::prompts::{compose_prompt, response_schema};
use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::models::application::NewApplication;
use crate::state::AppState;

const DEFAULT_JOB_TITLE: &str = "Untitled role";
const DEFAULT_COMPANY: &str = "Unknown company";

/// Validated multipart form for `POST /analyze`.
#[derive(Debug)]
pub struct AnalyzeForm {
    pub resume: Bytes,
    pub job_description: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub user_id: Option<Uuid>,
}

impl AnalyzeForm {
    /// Reads every field, then checks that exactly one résumé and a non-empty job
    /// description were supplied. Unknown fields are ignored.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut resume: Option<Bytes> = None;
        let mut job_description: Option<String> = None;
        let mut job_title: Option<String> = None;
        let mut company: Option<String> = None;
        let mut user_id: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error("Failed to read multipart field", e))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume" => {
                    if resume.is_some() {
                        return Err(AppError::Validation(
                            "Exactly one resume file must be uploaded.".to_string(),
                        ));
                    }
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error("Failed to read resume file", e))?;
                    resume = Some(data);
                }
                "jobDescription" | "jobTitle" | "company" | "userId" => {
                    let value = field.text().await.map_err(|e| {
                        multipart_error(&format!("Failed to read field '{name}'"), e)
                    })?;
                    let slot = match name.as_str() {
                        "jobDescription" => &mut job_description,
                        "jobTitle" => &mut job_title,
                        "company" => &mut company,
                        _ => &mut user_id,
                    };
                    *slot = Some(value);
                }
                _ => {}
            }
        }

        let resume =
            resume.ok_or_else(|| AppError::Validation("No resume file uploaded.".to_string()))?;
        validate_pdf(&resume)?;

        let job_description = job_description
            .filter(|jd| !jd.trim().is_empty())
            .ok_or_else(|| AppError::Validation("No job description provided.".to_string()))?;

        let user_id = user_id
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                Uuid::parse_str(&raw)
                    .map_err(|_| AppError::Validation("userId must be a valid UUID.".to_string()))
            })
            .transpose()?;

        Ok(Self {
            resume,
            job_description,
            job_title: non_blank(job_title),
            company: non_blank(company),
            user_id,
        })
    }
}

/// Body-limit overflows stay 413; every other malformed part is a 400.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Resume upload exceeds the size limit: {e}"))
    } else {
        AppError::Validation(format!("{context}: {e}"))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /analyze
///
/// Multipart fields: `resume` (PDF, required), `jobDescription` (required),
/// `jobTitle`, `company`, `userId` (optional). Returns the analysis JSON.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let form = AnalyzeForm::from_multipart(multipart).await?;
    let result = run_analysis(&state, &form).await?;

    if let Some(user_id) = form.user_id {
        state
            .store
            .create(NewApplication {
                user_id,
                job_title: form
                    .job_title
                    .clone()
                    .unwrap_or_else(|| DEFAULT_JOB_TITLE.to_string()),
                company: form
                    .company
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
                analysis: result.clone(),
            })
            .await?;
    }

    Ok(Json(result))
}

/// Extraction → rubric selection → prompt → model call. No side effects.
pub async fn run_analysis(state: &AppState, form: &AnalyzeForm) -> Result<AnalysisResult, AppError> {
    let resume_text = state.extractor.extract(form.resume.clone()).await?;
    let rubric = state.rubrics.select_rubric(&form.job_description).await?;

    let prompt = compose_prompt(&rubric.document, &resume_text, &form.job_description);
    let result = state.model.analyze(&prompt, &response_schema()).await?;

    info!(
        role = %rubric.role,
        role_score = rubric.scores.get(rubric.role),
        scores = %rubric.scores,
        match_score = result.match_score,
        "Analysis complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::extractor::ResumeExtractor;
    use crate::analysis::rubric::{RubricCatalog, Role};
    use crate::applications::store::memory::MemoryApplicationStore;
    use crate::config::Config;
    use crate::errors::GENERIC_ANALYSIS_ERROR;
    use crate::llm_client::{AnalysisModel, LlmError};
    use crate::routes::build_router;

    const BOUNDARY: &str = "jobify-test-boundary";
    const PDF: &[u8] = b"%PDF-1.4\n%fake\n";

    struct FakeExtractor;

    #[async_trait]
    impl ResumeExtractor for FakeExtractor {
        async fn extract(&self, _file: Bytes) -> Result<String, AppError> {
            Ok("Jane Doe. Rust, PostgreSQL, Kubernetes.".to_string())
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl ResumeExtractor for FailingExtractor {
        async fn extract(&self, _file: Bytes) -> Result<String, AppError> {
            Err(AppError::Extraction("corrupt xref table".to_string()))
        }
    }

    enum Reply {
        Success(AnalysisResult),
        UpstreamStatus(u16),
        Garbage,
    }

    struct FakeModel {
        reply: Reply,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl FakeModel {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalysisModel for FakeModel {
        async fn analyze(&self, prompt: &str, _schema: &Value) -> Result<AnalysisResult, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.reply {
                Reply::Success(result) => Ok(result.clone()),
                Reply::UpstreamStatus(status) => Err(LlmError::Api {
                    status: *status,
                    message: "model overloaded".to_string(),
                }),
                Reply::Garbage => crate::llm_client::parse_analysis("not json at all"),
            }
        }
    }

    fn sample_result() -> AnalysisResult {
        serde_json::from_value(serde_json::json!({
            "overallVerdict": "Strong backend candidate.",
            "matchScore": 83,
            "atsAnalysis": {"keywordsFound": ["rust"], "keywordsMissing": ["kafka"]},
            "feedbackOnStrengths": [{"skill": "Rust", "feedback": "Shipped services."}],
            "criticalImprovementAreas": [{"area": "Kafka", "feedback": "Not mentioned."}]
        }))
        .unwrap()
    }

    struct Harness {
        app: axum::Router,
        model: Arc<FakeModel>,
        store: Arc<MemoryApplicationStore>,
        _corpus: tempfile::TempDir,
    }

    fn harness_with(
        model: Arc<FakeModel>,
        extractor: Arc<dyn ResumeExtractor>,
        write_corpus: bool,
    ) -> Harness {
        harness_with_limit(model, extractor, write_corpus, 1024 * 1024)
    }

    fn harness_with_limit(
        model: Arc<FakeModel>,
        extractor: Arc<dyn ResumeExtractor>,
        write_corpus: bool,
        max_upload_bytes: usize,
    ) -> Harness {
        let corpus = tempfile::tempdir().unwrap();
        if write_corpus {
            for role in Role::ALL {
                std::fs::write(
                    corpus.path().join(role.document_name()),
                    format!("RUBRIC FOR {role}"),
                )
                .unwrap();
            }
        }
        let store = Arc::new(MemoryApplicationStore::default());
        let state = AppState {
            config: Config {
                database_url: "postgres://unused".to_string(),
                gemini_api_key: "test".to_string(),
                gemini_model: "test-model".to_string(),
                gemini_api_base: "http://localhost".to_string(),
                rubric_dir: corpus.path().to_path_buf(),
                max_upload_bytes,
                port: 0,
                rust_log: "debug".to_string(),
            },
            rubrics: Arc::new(RubricCatalog::new(corpus.path()).unwrap()),
            extractor,
            model: model.clone(),
            store: store.clone(),
        };
        Harness {
            app: build_router(state),
            model,
            store,
            _corpus: corpus,
        }
    }

    fn harness(reply: Reply) -> Harness {
        harness_with(FakeModel::new(reply), Arc::new(FakeExtractor), true)
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"resume.pdf\"\r\n\
                             Content-Type: application/pdf\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_missing_file_is_400_without_model_call() {
        let h = harness(Reply::Success(sample_result()));
        let request = multipart_request(&[Part::Text("jobDescription", "Backend engineer")]);

        let (status, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No resume file uploaded.");
        assert_eq!(h.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_job_description_is_400() {
        let h = harness(Reply::Success(sample_result()));
        let request = multipart_request(&[
            Part::File("resume", PDF),
            Part::Text("jobDescription", "   "),
        ]);

        let (status, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No job description provided.");
        assert_eq!(h.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_job_description_is_400() {
        let h = harness(Reply::Success(sample_result()));
        let (status, _) = send(&h.app, multipart_request(&[Part::File("resume", PDF)])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_two_resume_files_is_400() {
        let h = harness(Reply::Success(sample_result()));
        let request = multipart_request(&[
            Part::File("resume", PDF),
            Part::File("resume", PDF),
            Part::Text("jobDescription", "Backend engineer"),
        ]);
        let (status, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_400() {
        let h = harness(Reply::Success(sample_result()));
        let request = multipart_request(&[
            Part::File("resume", b"just some text"),
            Part::Text("jobDescription", "Backend engineer"),
        ]);
        let (status, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_413_without_model_call() {
        let h = harness_with_limit(
            FakeModel::new(Reply::Success(sample_result())),
            Arc::new(FakeExtractor),
            true,
            1024,
        );
        let mut big = PDF.to_vec();
        big.resize(8 * 1024, b'x');
        let request = multipart_request(&[
            Part::Text("jobDescription", "Backend engineer"),
            Part::File("resume", &big),
        ]);

        let (status, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(h.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_user_id_is_400() {
        let h = harness(Reply::Success(sample_result()));
        let request = multipart_request(&[
            Part::File("resume", PDF),
            Part::Text("jobDescription", "Backend engineer"),
            Part::Text("userId", "not-a-uuid"),
        ]);
        let (status, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_400_json() {
        let h = harness(Reply::Success(sample_result()));
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_success_returns_analysis_json() {
        let h = harness(Reply::Success(sample_result()));
        let request = multipart_request(&[
            Part::File("resume", PDF),
            Part::Text("jobDescription", "Kubernetes and Terraform for our SRE team"),
        ]);

        let (status, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::OK);
        let score = body["matchScore"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&score));
        assert!(body["atsAnalysis"]["keywordsFound"].is_array());
        assert!(body["atsAnalysis"]["keywordsMissing"].is_array());
        assert_eq!(h.model.calls(), 1);

        let prompt = h.model.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("RUBRIC FOR devops"));
        assert!(prompt.contains("Jane Doe"));
        assert!(prompt.contains("Kubernetes and Terraform"));
    }

    #[tokio::test]
    async fn test_success_without_user_does_not_persist() {
        let h = harness(Reply::Success(sample_result()));
        let request = multipart_request(&[
            Part::File("resume", PDF),
            Part::Text("jobDescription", "Backend engineer"),
        ]);
        let (status, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(h.store.len(), 0);
    }

    #[tokio::test]
    async fn test_success_with_user_persists_and_lists() {
        let h = harness(Reply::Success(sample_result()));
        let user_id = Uuid::new_v4();
        let user = user_id.to_string();
        let request = multipart_request(&[
            Part::File("resume", PDF),
            Part::Text("jobDescription", "Backend engineer"),
            Part::Text("jobTitle", "Backend Engineer"),
            Part::Text("company", "Render"),
            Part::Text("userId", &user),
        ]);
        let (status, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(h.store.len(), 1);

        let list = Request::builder()
            .uri(format!("/api/v1/applications?user_id={user_id}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&h.app, list).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["jobTitle"], "Backend Engineer");
        assert_eq!(rows[0]["company"], "Render");
        assert_eq!(rows[0]["scoreBand"], "high");

        let id = rows[0]["id"].as_str().unwrap();
        let detail = Request::builder()
            .uri(format!("/api/v1/applications/{id}?user_id={user_id}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&h.app, detail).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysisResult"]["matchScore"], 83.0);

        let other_user = Request::builder()
            .uri(format!("/api/v1/applications/{id}?user_id={}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&h.app, other_user).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500_and_not_persisted() {
        let h = harness(Reply::UpstreamStatus(503));
        let user = Uuid::new_v4().to_string();
        let request = multipart_request(&[
            Part::File("resume", PDF),
            Part::Text("jobDescription", "Backend engineer"),
            Part::Text("userId", &user),
        ]);

        let (status, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], GENERIC_ANALYSIS_ERROR);
        assert!(!body.to_string().contains("overloaded"));
        assert_eq!(h.model.calls(), 1);
        assert_eq!(h.store.len(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_model_output_is_500() {
        let h = harness(Reply::Garbage);
        let request = multipart_request(&[
            Part::File("resume", PDF),
            Part::Text("jobDescription", "Backend engineer"),
        ]);
        let (status, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_extraction_failure_is_500_without_model_call() {
        let h = harness_with(
            FakeModel::new(Reply::Success(sample_result())),
            Arc::new(FailingExtractor),
            true,
        );
        let request = multipart_request(&[
            Part::File("resume", PDF),
            Part::Text("jobDescription", "Backend engineer"),
        ]);
        let (status, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], GENERIC_ANALYSIS_ERROR);
        assert_eq!(h.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_rubric_document_is_500_without_model_call() {
        let h = harness_with(
            FakeModel::new(Reply::Success(sample_result())),
            Arc::new(FakeExtractor),
            false,
        );
        let request = multipart_request(&[
            Part::File("resume", PDF),
            Part::Text("jobDescription", "Backend engineer"),
        ]);
        let (status, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "CONFIGURATION_ERROR");
        assert_eq!(h.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_versioned_route_is_mounted() {
        let h = harness(Reply::Success(sample_result()));
        let mut request = multipart_request(&[
            Part::File("resume", PDF),
            Part::Text("jobDescription", "Backend engineer"),
        ]);
        *request.uri_mut() = "/api/v1/analyze".parse().unwrap();
        let (status, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::OK);
    }
}
