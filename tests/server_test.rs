//! Integration tests for the DiabetaLens HTTP server

#[cfg(feature = "server")]
mod server_tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use diabetalens::advisor::{AdvisorError, Completion, RecommendationBackend};
    use diabetalens::server::{run, ServerConfig};
    use diabetalens::{FixedTierClassifier, PipelineParams, RiskPipeline, TierThresholds};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    struct CannedBackend;

    #[async_trait]
    impl RecommendationBackend for CannedBackend {
        async fn complete(&self, _prompt: &str) -> Result<Completion, AdvisorError> {
            Ok(Completion {
                text: "Take a 20 minute walk after dinner.".to_string(),
                model: "canned".to_string(),
                input_tokens: 50,
                output_tokens: 10,
                generated_at: Utc::now(),
            })
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    fn test_pipeline() -> RiskPipeline {
        let classifier = FixedTierClassifier::new(0.45, TierThresholds::default()).unwrap();
        RiskPipeline::new(Arc::new(classifier), PipelineParams::default())
    }

    async fn start(config: ServerConfig) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
        let (addr, shutdown_tx) = run(config).await.expect("Failed to start server");

        // Give server time to start
        tokio::time::sleep(Duration::from_millis(100)).await;
        (addr, shutdown_tx)
    }

    fn profile(age: i64) -> serde_json::Value {
        serde_json::json!({
            "age": age,
            "bmi": 31.2,
            "past_28_day_steps": vec![3500; 28],
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (addr, shutdown_tx) = start(ServerConfig::new(0, test_pipeline())).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["classifier"], "fixed");
        assert_eq!(body["pipeline"]["adult_age"], 30);
        assert_eq!(body["pipeline"]["sedentary_threshold"], 5000);
        assert_eq!(body["recommendations_available"], false);
        assert!(body["version"].as_str().is_some());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_assess_endpoint() {
        let (addr, shutdown_tx) = start(ServerConfig::new(0, test_pipeline())).await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/risk/assess", addr))
            .json(&profile(58))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["analysis"]["risk_calculation_method"], "activity_adjusted");
        let one = body["risk_percentages"]["1_month_risk"].as_f64().unwrap();
        let six = body["risk_percentages"]["6_month_risk"].as_f64().unwrap();
        assert!(six > one);

        // Counters reflect the request
        let stats: serde_json::Value = client
            .get(format!("http://{}/stats", addr))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(stats["assessments"], 1);
        assert_eq!(stats["activity_adjusted"], 1);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_invalid_input_is_400() {
        let (addr, shutdown_tx) = start(ServerConfig::new(0, test_pipeline())).await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/risk/assess", addr))
            .json(&serde_json::json!({ "age": 40, "bmi": 25.0, "steps": [5000, 6000] }))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["error"], "Invalid input");
        assert!(body["detail"].as_str().unwrap().contains("exactly 28"));
        assert!(body["request_id"].as_str().is_some());
        assert!(body["timestamp"].as_str().is_some());

        // Malformed JSON is rejected the same way
        let response = client
            .post(format!("http://{}/risk/assess", addr))
            .header("Content-Type", "application/json")
            .body("{ not json")
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_baseline_and_activity_endpoints() {
        let (addr, shutdown_tx) = start(ServerConfig::new(0, test_pipeline())).await;
        let client = reqwest::Client::new();

        let body: serde_json::Value = client
            .get(format!("http://{}/risk/baseline/50", addr))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(body["age"], 50);
        assert_eq!(body["age_group"], "45-54");
        assert!(body["baseline_risk_percentage"].as_f64().unwrap() > 5.0);

        let response = client
            .get(format!("http://{}/risk/baseline/0", addr))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = client
            .post(format!("http://{}/risk/activity/analyze", addr))
            .json(&vec![12000, 11000, 50, 13000, 12500, 11800, 10900])
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(body["activity_analysis"]["activity_level"], "high");
        assert_eq!(body["activity_analysis"]["outliers_removed"], 1);
        assert_eq!(body["interpretation"]["data_quality"], "6/7 valid days");

        let response = client
            .get(format!("http://{}/risk/baseline/fifty", addr))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["error"], "Invalid input");
        assert!(body["request_id"].as_str().is_some());

        let response = client
            .post(format!("http://{}/risk/activity/analyze", addr))
            .json(&vec![8000; 6])
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_batch_reports_per_patient_errors() {
        let (addr, shutdown_tx) = start(ServerConfig::new(0, test_pipeline())).await;
        let client = reqwest::Client::new();

        let body: serde_json::Value = client
            .post(format!("http://{}/risk/assess/batch", addr))
            .json(&serde_json::json!({
                "patients": [profile(25), profile(58), { "age": 200, "bmi": 25.0, "steps": vec![5000; 28] }]
            }))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");

        assert_eq!(body["summary"]["total_patients"], 3);
        assert_eq!(body["summary"]["successful"], 2);
        assert_eq!(body["summary"]["failed"], 1);
        assert_eq!(body["results"][2]["patient_id"], 3);
        assert!(body["results"][2]["error"].as_str().is_some());

        let oversized: Vec<_> = (0..11).map(|_| profile(40)).collect();
        let response = client
            .post(format!("http://{}/risk/assess/batch", addr))
            .json(&serde_json::json!({ "patients": oversized }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_recommendations_without_advisor_is_503() {
        let (addr, shutdown_tx) = start(ServerConfig::new(0, test_pipeline())).await;

        let response = reqwest::Client::new()
            .post(format!("http://{}/recommendations/generate", addr))
            .json(&profile(58))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_comprehensive_recommendations() {
        let config = ServerConfig::new(0, test_pipeline())
            .with_advisor(Arc::new(CannedBackend), Duration::from_secs(5));
        let (addr, shutdown_tx) = start(config).await;

        let response = reqwest::Client::new()
            .post(format!("http://{}/recommendations/generate/comprehensive", addr))
            .json(&profile(58))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        let recommendations = body["recommendations"].as_array().unwrap();
        assert_eq!(recommendations.len(), 3);
        assert_eq!(recommendations[2]["kind"], "risk_explanation");
        assert_eq!(body["usage"]["total_input_tokens"], 150);
        assert_eq!(body["model_used"], "canned");
        assert_eq!(
            body["risk_assessment"]["analysis"]["risk_calculation_method"],
            "activity_adjusted"
        );

        let _ = shutdown_tx.send(());
    }

    fn quick_results(recommendation_type: &str) -> serde_json::Value {
        serde_json::json!({
            "age": 45,
            "bmi": 28.5,
            "activity_level": "moderate",
            "median_steps": 7100,
            "diabetes_risk_level": "low-risk",
            "risk_1_month": 5.2,
            "risk_3_month": 5.8,
            "risk_6_month": 6.4,
            "recommendation_type": recommendation_type,
        })
    }

    #[tokio::test]
    async fn test_quick_recommendations_skip_the_pipeline() {
        let config = ServerConfig::new(0, test_pipeline())
            .with_advisor(Arc::new(CannedBackend), Duration::from_secs(5));
        let (addr, shutdown_tx) = start(config).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{}/recommendations/generate/quick", addr))
            .json(&quick_results("activity"))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        let recommendations = body["recommendations"].as_array().unwrap();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0]["kind"], "activity");
        assert_eq!(body["user_profile"]["median_steps"], 7100);
        assert_eq!(body["user_profile"]["diabetes_risk_level"], "low-risk");
        assert_eq!(body["usage"]["api_calls"], 1);

        // No assessment was recorded
        let stats: serde_json::Value = client
            .get(format!("http://{}/stats", addr))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(stats["assessments"], 0);

        let mut invalid = quick_results("comprehensive");
        invalid["risk_6_month"] = serde_json::json!(140.0);
        let response = client
            .post(format!("http://{}/recommendations/generate/quick", addr))
            .json(&invalid)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let _ = shutdown_tx.send(());
    }
}
