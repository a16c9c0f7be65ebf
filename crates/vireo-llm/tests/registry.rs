use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use vireo_core::{Role, VireoError};
use vireo_llm::{ChatClient, EndpointProber, ModelRegistry, ProviderKind};

fn write_config(yaml: &str) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(yaml.as_bytes()).expect("write yaml");
    tmp
}

fn registry_without_probing(config: &tempfile::NamedTempFile) -> ModelRegistry {
    ModelRegistry::with_prober(config.path(), EndpointProber::with_candidates(Vec::new()))
}

/// Minimal HTTP server answering 200 to anything, for probe-backed tests.
async fn spawn_local_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let body = r#"{"data":[]}"#;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_repeat_calls_return_the_same_client() {
    let config = write_config(
        r#"
BASIC_MODEL:
  model: gpt-4o-mini
  base_url: "http://localhost:9999/v1"
  api_key: sk-test
"#,
    );
    let registry = registry_without_probing(&config);

    let first = registry.get_client(Role::Basic).await.expect("first build");
    let second = registry.get_client(Role::Basic).await.expect("cached");
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_environment_overrides_win_over_yaml() {
    std::env::set_var("VISION_MODEL__api_key", "b");

    let config = write_config(
        r#"
VISION_MODEL:
  model: gpt-4o
  base_url: "http://localhost:9999/v1"
  api_key: a
"#,
    );
    let registry = registry_without_probing(&config);
    let client = registry.get_client(Role::Vision).await.expect("build");
    assert_eq!(client.config().api_key.as_deref(), Some("b"));

    std::env::remove_var("VISION_MODEL__api_key");
}

#[tokio::test]
async fn test_missing_configuration_fails_with_role_name() {
    let config = write_config("");
    let registry = registry_without_probing(&config);

    let err = registry.get_client(Role::Code).await.unwrap_err();
    assert!(matches!(err, VireoError::ConfigMissing(Role::Code)));
    assert!(err.to_string().contains("code"));
}

#[tokio::test]
async fn test_malformed_role_section_fails_with_type_error() {
    let config = write_config("CODE_MODEL: [not, a, mapping]\n");
    let registry = registry_without_probing(&config);

    let err = registry.get_client(Role::Code).await.unwrap_err();
    assert!(matches!(err, VireoError::ConfigType { role: Role::Code, .. }));
}

#[tokio::test]
async fn test_dashscope_reasoning_enables_thinking() {
    let config = write_config(
        r#"
REASONING_MODEL:
  model: qwen-plus
  base_url: "https://dashscope.example/v1"
  api_key: sk-ds
"#,
    );
    let registry = registry_without_probing(&config);
    let client = registry.get_client(Role::Reasoning).await.expect("build");

    assert_eq!(client.kind(), ProviderKind::Dashscope);
    match client.as_ref() {
        ChatClient::Dashscope(ds) => assert!(ds.extra_body.enable_thinking),
        other => panic!("expected a dashscope client, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dashscope_basic_disables_thinking() {
    let config = write_config(
        r#"
BASIC_MODEL:
  model: qwen-turbo
  base_url: "https://dashscope.example/v1"
  api_key: sk-ds
"#,
    );
    let registry = registry_without_probing(&config);
    let client = registry.get_client(Role::Basic).await.expect("build");

    match client.as_ref() {
        ChatClient::Dashscope(ds) => assert!(!ds.extra_body.enable_thinking),
        other => panic!("expected a dashscope client, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reasoning_base_url_is_renamed() {
    let config = write_config(
        r#"
REASONING_MODEL:
  model: deepseek-reasoner
  base_url: "https://api.example.com"
  api_key: sk-r1
"#,
    );
    let registry = registry_without_probing(&config);
    let client = registry.get_client(Role::Reasoning).await.expect("build");

    assert_eq!(client.kind(), ProviderKind::DeepSeek);
    assert_eq!(client.config().api_base.as_deref(), Some("https://api.example.com"));
    assert!(client.config().extra.get("base_url").is_none());
}

#[tokio::test]
async fn test_verify_ssl_is_consumed_and_retries_defaulted() {
    let config = write_config(
        r#"
BASIC_MODEL:
  model: gpt-4o-mini
  base_url: "http://localhost:9999/v1"
  verify_ssl: false
"#,
    );
    let registry = registry_without_probing(&config);
    let client = registry.get_client(Role::Basic).await.expect("build");

    assert!(client.config().extra.get("verify_ssl").is_none());
    assert_eq!(client.config().max_retries, 3);
}

#[tokio::test]
async fn test_probe_fallback_synthesizes_local_configuration() {
    let host = spawn_local_server().await;
    let config = write_config("");
    let registry = ModelRegistry::with_prober(
        config.path(),
        EndpointProber::with_candidates(vec![host.clone()]),
    );

    let client = registry.get_client(Role::Basic).await.expect("build");
    assert_eq!(client.kind(), ProviderKind::OpenAiCompatible);
    assert_eq!(client.config().api_base.as_deref(), Some(format!("{host}/v1")).as_deref());
    assert_eq!(client.config().api_key.as_deref(), Some("lm-studio"));
    assert_eq!(client.config().streaming, Some(true));
}

#[tokio::test]
async fn test_concurrent_first_access_builds_once() {
    let config = write_config(
        r#"
CODE_MODEL:
  model: codestral
  base_url: "http://localhost:9999/v1"
  api_key: sk-code
"#,
    );
    let registry = Arc::new(registry_without_probing(&config));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry.get_client(Role::Code).await.expect("build")
        }));
    }

    let mut clients = Vec::new();
    for handle in handles {
        clients.push(handle.await.expect("join"));
    }
    for client in &clients[1..] {
        assert!(Arc::ptr_eq(&clients[0], client));
    }
}

#[test]
fn test_configured_models_lists_merged_config() {
    let config = write_config(
        r#"
REASONING_MODEL:
  model: deepseek-reasoner
BASIC_MODEL:
  model: gpt-4o-mini
"#,
    );
    let registry = registry_without_probing(&config);

    let models = registry.configured_models();
    assert_eq!(
        models.get(&Role::Reasoning),
        Some(&vec!["deepseek-reasoner".to_string()])
    );
    assert_eq!(models.get(&Role::Basic), Some(&vec!["gpt-4o-mini".to_string()]));
    assert!(models.get(&Role::Vision).is_none());
}

#[test]
fn test_configured_models_never_fails() {
    // Malformed file: degraded to an empty report, not an error.
    let config = write_config("REASONING_MODEL: [broken\n");
    let registry = registry_without_probing(&config);
    assert!(registry.configured_models().is_empty());

    // Missing file: same.
    let registry = ModelRegistry::with_prober(
        "/definitely/not/here/conf.yaml",
        EndpointProber::with_candidates(Vec::new()),
    );
    assert!(registry.configured_models().is_empty());
}
