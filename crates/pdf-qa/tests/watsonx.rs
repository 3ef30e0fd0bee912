//! watsonx.ai wire contract, against a local mock server

use pdf_qa::providers::watsonx::{self, WatsonxEmbedder, WatsonxLlm};
use pdf_qa::providers::{EmbeddingProvider, GenerationParams, LlmProvider};
use pdf_qa::{ErrorKind, QaConfig};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn config_for(server: &MockServer) -> QaConfig {
    let mut config = QaConfig::default();
    config.watsonx.url = server.uri();
    config.watsonx.iam_url = format!("{}/identity/token", server.uri());
    config.watsonx.api_key = "test-key".to_string();
    config.watsonx.project_id = "test-project".to_string();
    config
}

fn clients(config: &QaConfig) -> (WatsonxEmbedder, WatsonxLlm) {
    watsonx::from_config(config).unwrap()
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .and(body_string_contains("apikey=test-key"))
        .and(body_string_contains("grant-type%3Aapikey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-123",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Answers every embeddings call with one vector per input
struct EmbeddingsPerInput;

impl Respond for EmbeddingsPerInput {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let results: Vec<Value> = body["inputs"]
            .as_array()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, input)| json!({ "embedding": [i as f32, 1.0], "input": input }))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({
            "model_id": body["model_id"],
            "results": results
        }))
    }
}

#[tokio::test]
async fn test_embed_batch_request_shape() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ml/v1/text/embeddings"))
        .and(query_param("version", "2024-05-01"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_partial_json(json!({
            "model_id": "ibm/slate-125m-english-rtrvr",
            "project_id": "test-project",
            "inputs": ["first chunk", "second chunk"],
            "parameters": {
                "truncate_input_tokens": 3,
                "return_options": { "input_text": true }
            }
        })))
        .respond_with(EmbeddingsPerInput)
        .expect(1)
        .mount(&server)
        .await;

    let (embedder, _) = clients(&config_for(&server));
    let vectors = embedder
        .embed_batch(&["first chunk".to_string(), "second chunk".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![0.0, 1.0], vec![1.0, 1.0]]);
}

#[tokio::test]
async fn test_embed_batch_splits_large_inputs() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ml/v1/text/embeddings"))
        .respond_with(EmbeddingsPerInput)
        .expect(3)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.embeddings.batch_size = 2;
    let (embedder, _) = clients(&config);
    let texts: Vec<String> = (0..5).map(|i| format!("chunk {}", i)).collect();

    let vectors = embedder.embed_batch(&texts).await.unwrap();

    assert_eq!(vectors.len(), 5);
    // Each batch numbers its own inputs from zero
    let firsts: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
    assert_eq!(firsts, vec![0.0, 1.0, 0.0, 1.0, 0.0]);
}

#[tokio::test]
async fn test_token_is_cached_between_calls() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ml/v1/text/embeddings"))
        .respond_with(EmbeddingsPerInput)
        .expect(2)
        .mount(&server)
        .await;

    let (embedder, _) = clients(&config_for(&server));
    embedder.embed("one").await.unwrap();
    embedder.embed("two").await.unwrap();
}

#[tokio::test]
async fn test_unauthorized_is_remote_service_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ml/v1/text/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let (embedder, _) = clients(&config_for(&server));
    let err = embedder.embed("question").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteService);
    let message = err.to_string();
    assert!(message.contains("401"), "{}", message);
    assert!(message.contains("invalid token"), "{}", message);
}

#[tokio::test]
async fn test_rejected_api_key_is_remote_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Provided API key could not be found"))
        .mount(&server)
        .await;

    let (embedder, llm) = clients(&config_for(&server));

    let err = embedder.embed("question").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteService);
    assert!(err.to_string().contains("API key could not be found"));

    assert!(llm.health_check().await.is_err());
}

#[tokio::test]
async fn test_result_count_mismatch_rejected() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ml/v1/text/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "embedding": [0.1, 0.2] }]
        })))
        .mount(&server)
        .await;

    let (embedder, _) = clients(&config_for(&server));
    let err = embedder
        .embed_batch(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteService);
}

#[tokio::test]
async fn test_generation_request_shape() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ml/v1/text/generation"))
        .and(query_param("version", "2024-05-01"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_partial_json(json!({
            "model_id": "ibm/granite-3-8b-instruct",
            "project_id": "test-project",
            "input": "Question: What color is the sky?",
            "parameters": {
                "decoding_method": "sample",
                "max_new_tokens": 512,
                "temperature": 0.5
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model_id": "ibm/granite-3-8b-instruct",
            "results": [{ "generated_text": "  The sky is blue.\n", "stop_reason": "eos_token" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_, llm) = clients(&config);
    let params = GenerationParams::from(&config.generation);

    let text = llm
        .generate("Question: What color is the sky?", &params)
        .await
        .unwrap();

    assert_eq!(text, "The sky is blue.");
    assert_eq!(llm.model(), "ibm/granite-3-8b-instruct");
}

/// Matches bodies whose parameters carry no temperature
struct NoTemperature;

impl wiremock::Match for NoTemperature {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<Value>(&request.body)
            .map(|body| body["parameters"].get("temperature").is_none())
            .unwrap_or(false)
    }
}

#[tokio::test]
async fn test_zero_temperature_uses_greedy_decoding() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ml/v1/text/generation"))
        .and(body_partial_json(json!({ "parameters": { "decoding_method": "greedy" } })))
        .and(NoTemperature)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "generated_text": "blue" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_, llm) = clients(&config_for(&server));
    let params = GenerationParams {
        max_new_tokens: 16,
        temperature: 0.0,
    };

    assert_eq!(llm.generate("sky?", &params).await.unwrap(), "blue");
}

#[tokio::test]
async fn test_malformed_generation_response() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ml/v1/text/generation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (_, llm) = clients(&config);
    let err = llm
        .generate("sky?", &GenerationParams::from(&config.generation))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteService);
    assert!(err.to_string().contains("malformed response"));
}
