pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::evaluation::handlers::handle_evaluate;
use crate::freeform::handlers::handle_evaluate_b;
use crate::state::AppState;

/// Success envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

async fn evaluate_method_not_allowed() -> Result<(), AppError> {
    Err(AppError::MethodNotAllowed {
        action: "evaluate resumes",
    })
}

async fn evaluate_b_method_not_allowed() -> Result<(), AppError> {
    Err(AppError::MethodNotAllowed {
        action: "evaluate resumes with Approach B",
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/evaluate",
            post(handle_evaluate).get(evaluate_method_not_allowed),
        )
        .route(
            "/api/v1/evaluate-b",
            post(handle_evaluate_b).get(evaluate_b_method_not_allowed),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::providers::scripted::{blacklist_answer, rating_answer, ScriptedProvider};
    use crate::providers::{Provider, ProviderRegistry};

    fn app(provider: Arc<ScriptedProvider>) -> Router {
        let mut providers = ProviderRegistry::new();
        providers.register("scripted", move || provider.clone() as Arc<dyn Provider>);
        build_router(AppState {
            config: Config::default(),
            providers,
        })
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    fn rule_based_body(provider: &str) -> Value {
        json!({
            "resume": "Five years of Rust.",
            "jobDescription": "Senior backend engineer.",
            "apiConfig": { "provider": provider, "key": "sk-test" },
            "rules": {
                "evaluationRules": [
                    { "id": "rust", "description": "Rust experience", "weight": 0.6 },
                    { "id": "cloud", "description": "Cloud experience", "weight": 0.4 }
                ]
            }
        })
    }

    fn freeform_body(system_prompt: &str) -> Value {
        json!({
            "resume": "Five years of Rust.",
            "jobDescription": "Senior backend engineer.",
            "apiConfig": { "provider": "scripted", "key": "sk-test" },
            "prompts": {
                "systemPrompt": system_prompt,
                "userPrompt": "Resume: {resume}\nJob: {jobDescription}"
            }
        })
    }

    // ── health / methods ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(ScriptedProvider::new().into_arc()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "screener-api");
    }

    #[tokio::test]
    async fn test_get_on_evaluate_routes_is_405() {
        let cases = [
            (
                "/api/v1/evaluate",
                "Method not allowed. Use POST to evaluate resumes.",
            ),
            (
                "/api/v1/evaluate-b",
                "Method not allowed. Use POST to evaluate resumes with Approach B.",
            ),
        ];
        for (uri, message) in cases {
            let request = Request::get(uri).body(Body::empty()).unwrap();
            let (status, body) = send(app(ScriptedProvider::new().into_arc()), request).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(body["success"], false);
            assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
            assert_eq!(body["error"], message);
        }
    }

    #[tokio::test]
    async fn test_unreadable_body_is_invalid_request() {
        for uri in ["/api/v1/evaluate", "/api/v1/evaluate-b"] {
            let request = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .unwrap();
            let (status, body) = send(app(ScriptedProvider::new().into_arc()), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["success"], false);
            assert_eq!(body["code"], "INVALID_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_mistyped_field_is_invalid_request_without_provider_call() {
        let provider = ScriptedProvider::new().into_arc();
        let mut request = rule_based_body("scripted");
        request["resume"] = json!(5);

        let (status, body) = send(app(provider.clone()), post_json("/api/v1/evaluate", &request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
        assert!(provider.seen_configs().is_empty());
    }

    // ── rule-based ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_evaluate_weighted_score() {
        let provider = ScriptedProvider::new()
            .answer("rust", rating_answer("rust", 4.0))
            .answer("cloud", rating_answer("cloud", 3.0))
            .into_arc();
        let (status, body) = send(
            app(provider),
            post_json("/api/v1/evaluate", &rule_based_body("scripted")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let data = &body["data"];
        assert_eq!(data["finalScore"], 3.6);
        assert_eq!(data["percentage"], 72.0);
        assert_eq!(data["maxPossibleScore"], 5.0);
        assert_eq!(data["isDisqualified"], false);
        assert_eq!(data["ruleResults"][0]["rule_id"], "rust");
        assert_eq!(data["ruleResults"][1]["rule_id"], "cloud");
        assert_eq!(data["breakdown"]["ratingResults"].as_array().unwrap().len(), 2);
        assert!(data["breakdown"].get("blacklistResults").is_none());
        assert_eq!(data["metadata"]["provider"], "scripted");
        assert_eq!(data["metadata"]["rulesEvaluated"], 2);
        assert!(data["metadata"]["runId"].is_string());
        assert!(data["metadata"]["executionTimeMs"].is_u64());
    }

    #[tokio::test]
    async fn test_evaluate_blacklist_disqualifies() {
        let provider = ScriptedProvider::new()
            .answer("rust", rating_answer("rust", 5.0))
            .answer("cloud", rating_answer("cloud", 5.0))
            .answer(
                "company_blacklist",
                blacklist_answer("company_blacklist", "DISQUALIFIED"),
            )
            .into_arc();
        let mut request = rule_based_body("scripted");
        request["rules"]["blacklist"] = json!({
            "companyBlacklistEnabled": true,
            "companyBlacklist": "Acme Corp"
        });

        let (status, body) = send(app(provider.clone()), post_json("/api/v1/evaluate", &request)).await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["finalScore"], 0.0);
        assert_eq!(data["isDisqualified"], true);
        assert_eq!(data["breakdown"]["blacklistResults"][0]["qualification_check"], "DISQUALIFIED");
        assert!(data["breakdown"].get("ratingResults").is_none());
        assert_eq!(data["metadata"]["rulesEvaluated"], 3);
        assert_eq!(provider.completed().len(), 3);
    }

    #[tokio::test]
    async fn test_evaluate_validation_order() {
        let cases = [
            (json!({}), "RESUME_MISSING"),
            (json!({ "resume": "r" }), "JOB_DESCRIPTION_MISSING"),
            (json!({ "resume": "r", "jobDescription": "j" }), "CONFIG_MISSING"),
            (
                json!({ "resume": "r", "jobDescription": "j", "apiConfig": { "provider": "scripted", "key": "k" } }),
                "RULES_MISSING",
            ),
            (
                json!({
                    "resume": "r", "jobDescription": "j",
                    "apiConfig": { "provider": "scripted", "key": "k" },
                    "rules": {}
                }),
                "RULES_MISSING",
            ),
            (
                json!({
                    "resume": "r", "jobDescription": "j",
                    "apiConfig": { "provider": "scripted", "key": "k" },
                    "rules": { "evaluationRules": [] }
                }),
                "RULES_MISSING",
            ),
        ];
        for (request, code) in cases {
            let provider = ScriptedProvider::new().into_arc();
            let (status, body) = send(app(provider.clone()), post_json("/api/v1/evaluate", &request)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{code}");
            assert_eq!(body["code"], code);
            assert!(provider.seen_configs().is_empty());
        }
    }

    #[tokio::test]
    async fn test_evaluate_blacklist_only_ruleset_is_rejected_before_any_call() {
        let provider = ScriptedProvider::new()
            .answer("company_blacklist", blacklist_answer("company_blacklist", "PASSED"))
            .into_arc();
        let mut request = rule_based_body("scripted");
        request["rules"] = json!({
            "evaluationRules": [],
            "blacklist": { "companyBlacklistEnabled": true, "companyBlacklist": "Acme" }
        });

        let (status, body) = send(app(provider.clone()), post_json("/api/v1/evaluate", &request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "RULES_MISSING");
        assert!(provider.seen_configs().is_empty());
        assert!(provider.completed().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_echoes_provider_name_as_sent() {
        let provider = ScriptedProvider::new()
            .answer("rust", rating_answer("rust", 4.0))
            .answer("cloud", rating_answer("cloud", 3.0))
            .text("Total score: 5")
            .into_arc();

        let (status, body) = send(
            app(provider.clone()),
            post_json("/api/v1/evaluate", &rule_based_body("Scripted")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["metadata"]["provider"], "Scripted");

        let mut freeform = freeform_body("s");
        freeform["apiConfig"]["provider"] = json!("SCRIPTED");
        let (status, body) = send(app(provider), post_json("/api/v1/evaluate-b", &freeform)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["metadata"]["provider"], "SCRIPTED");
    }

    #[tokio::test]
    async fn test_evaluate_unknown_provider_fails() {
        let (status, body) = send(
            app(ScriptedProvider::new().into_arc()),
            post_json("/api/v1/evaluate", &rule_based_body("mistral")),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "EVALUATION_FAILED");
        assert_eq!(body["error"], "Evaluation failed: Unknown provider: mistral");
    }

    #[tokio::test]
    async fn test_evaluate_rule_failure_names_rule() {
        let provider = ScriptedProvider::new()
            .answer("rust", rating_answer("rust", 4.0))
            .fail_after("cloud", 0, "Incorrect API key provided")
            .into_arc();
        let (status, body) = send(
            app(provider),
            post_json("/api/v1/evaluate", &rule_based_body("scripted")),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "EVALUATION_FAILED");
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("cloud"));
        assert!(message.contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn test_evaluate_options_reach_provider() {
        let provider = ScriptedProvider::new()
            .answer("rust", rating_answer("rust", 4.0))
            .answer("cloud", rating_answer("cloud", 3.0))
            .into_arc();
        let mut request = rule_based_body("scripted");
        request["options"] = json!({ "model": "custom-model", "temperature": 0 });

        let (status, body) = send(app(provider.clone()), post_json("/api/v1/evaluate", &request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["metadata"]["model"], "custom-model");
        for config in provider.seen_configs() {
            assert_eq!(config.model, "custom-model");
            assert_eq!(config.temperature, 0.0);
            assert_eq!(config.api_key, "sk-test");
        }
    }

    // ── free-form ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_evaluate_b_parses_labelled_text() {
        let provider = ScriptedProvider::new()
            .text("Total score: 82\nReasons: [item: Rust score: 9 reason: deep experience item: Cloud score: 7 reason: some AWS]")
            .into_arc();
        let (status, body) = send(
            app(provider.clone()),
            post_json("/api/v1/evaluate-b", &freeform_body("You are a recruiter.")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["totalScore"], 82.0);
        assert_eq!(data["reasons"].as_array().unwrap().len(), 2);
        assert_eq!(data["reasons"][1]["item"], "Cloud");
        assert_eq!(data["summary"]["averageScore"], 8.0);
        assert_eq!(data["summary"]["maxScore"], 9.0);
        assert_eq!(data["summary"]["minScore"], 7.0);
        assert_eq!(data["summary"]["aspectCount"], 2);
        assert_eq!(data["metadata"]["provider"], "scripted");
        assert_eq!(data["metadata"]["model"], "gpt-4o-mini");

        let (system, user) = provider.seen_prompts().remove(0);
        assert_eq!(system, "You are a recruiter.");
        assert_eq!(user, "Resume: Five years of Rust.\nJob: Senior backend engineer.");
    }

    #[tokio::test]
    async fn test_evaluate_b_unparseable_answer_still_succeeds() {
        let provider = ScriptedProvider::new()
            .text(r#"{"totalScore": 8, "reasons": [{"item""#)
            .into_arc();
        let (status, body) = send(
            app(provider),
            post_json("/api/v1/evaluate-b", &freeform_body("s")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalScore"], 0.0);
        assert_eq!(body["data"]["reasons"][0]["item"], "Parse Error");
    }

    #[tokio::test]
    async fn test_evaluate_b_malformed_json_aspects_fall_back() {
        let provider = ScriptedProvider::new()
            .text(r#"{"totalScore": 8, "reasons": [{"item": "Rust", "score": "high"}]}"#)
            .into_arc();
        let (status, body) = send(
            app(provider),
            post_json("/api/v1/evaluate-b", &freeform_body("s")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalScore"], 8.0);
        assert_eq!(body["data"]["reasons"][0]["item"], "Overall Evaluation");
        assert_eq!(body["data"]["summary"]["aspectCount"], 1);
    }

    #[tokio::test]
    async fn test_evaluate_b_requires_both_prompts() {
        let (status, body) = send(
            app(ScriptedProvider::new().into_arc()),
            post_json("/api/v1/evaluate-b", &freeform_body("   ")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "PROMPTS_MISSING");
    }

    #[tokio::test]
    async fn test_evaluate_b_provider_failure() {
        let provider = ScriptedProvider::new().fail_text("rate limited").into_arc();
        let (status, body) = send(
            app(provider),
            post_json("/api/v1/evaluate-b", &freeform_body("s")),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "EVALUATION_FAILED");
        assert!(body["error"].as_str().unwrap().contains("rate limited"));
    }
}
