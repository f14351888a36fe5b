//! Builds the real component graph against one mockito server standing in for the generation,
//! embedding and vector backends.

use std::time::Duration;

use mockito::Matcher;
use modbot_core::{BotError, Intent, ResponseMode};
use pipeline::{build_components, Answer, BotConfig};

fn config(base_url: &str) -> BotConfig {
    BotConfig {
        generation_base_url: base_url.to_string(),
        generation_model: "llama3.2".to_string(),
        embedding_model: "nomic-embed-text".to_string(),
        vector_db_url: base_url.to_string(),
        collection_name: "mod_docs".to_string(),
        relevance_threshold: 0.5,
        rag_top_n: 3,
        redis_url: None,
        rate_limit_per_minute: 5,
        personality_path: None,
        request_timeout: Duration::from_secs(10),
        retrieval_timeout: Duration::from_secs(2),
        log_file: "logs/test.log".to_string(),
    }
}

/// **Test: a knowledge question goes embed → query → generate, and only close documents reach the prompt.**
#[tokio::test]
async fn knowledge_question_over_http() {
    let mut server = mockito::Server::new_async().await;
    let collection = server
        .mock("GET", "/collections/mod_docs")
        .with_status(200)
        .with_body(r#"{"id":"c-1","name":"mod_docs"}"#)
        .create_async()
        .await;
    let embed = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::PartialJson(serde_json::json!({ "model": "nomic-embed-text" })))
        .with_status(200)
        .with_body(r#"{"embedding":[0.1,0.2,0.3]}"#)
        .create_async()
        .await;
    let query = server
        .mock("POST", "/collections/c-1/query")
        .match_body(Matcher::PartialJson(serde_json::json!({ "n_results": 3 })))
        .with_status(200)
        .with_body(
            r#"{"ids":[["a","b"]],"documents":[["Metabolism drains hunger hourly.","Unrelated changelog."]],
                "distances":[[0.2,0.9]],"metadatas":[[{"source":"metabolism.md"},{"source":"changelog.md"}]]}"#,
        )
        .create_async()
        .await;
    let generate = server
        .mock("POST", "/generate")
        .match_body(Matcher::Regex(r"\[1\] Metabolism drains hunger hourly\.".to_string()))
        .with_status(200)
        .with_body(r#"{"response":"Hunger drains every hour [1].","eval_count":7,"eval_duration":350000000}"#)
        .create_async()
        .await;

    let components = build_components(&config(&server.url())).await.unwrap();
    let answer = components
        .pipeline()
        .answer("user-1", "how does the metabolism system work?")
        .await
        .unwrap();

    assert_eq!(
        answer,
        Answer::Replied {
            text: "Hunger drains every hour [1].".to_string(),
            intent: Intent::Knowledge,
            mode: ResponseMode::Deep,
        }
    );
    collection.assert_async().await;
    embed.assert_async().await;
    query.assert_async().await;
    generate.assert_async().await;
}

/// **Test: a vector backend that accepts connections but never replies costs only the retrieval
/// budget; the answer still arrives without context.**
#[tokio::test]
async fn stalled_vector_backend_still_answers() {
    let stalled = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let stalled_url = format!("http://{}", stalled.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = stalled.accept().await {
            held.push(socket);
        }
    });

    let mut server = mockito::Server::new_async().await;
    let _embed = server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_body(r#"{"embedding":[0.1,0.2,0.3]}"#)
        .create_async()
        .await;
    let generate = server
        .mock("POST", "/generate")
        .with_status(200)
        .with_body(r#"{"response":"Hunger drains over time."}"#)
        .expect(1)
        .create_async()
        .await;

    let mut cfg = config(&server.url());
    cfg.vector_db_url = stalled_url;
    cfg.request_timeout = Duration::from_secs(3);
    cfg.retrieval_timeout = Duration::from_secs(1);

    let components = build_components(&cfg).await.unwrap();
    let answer = components
        .pipeline()
        .answer("user-1", "how does the metabolism system work?")
        .await
        .unwrap();

    assert_eq!(
        answer,
        Answer::Replied {
            text: "Hunger drains over time.".to_string(),
            intent: Intent::Knowledge,
            mode: ResponseMode::Standard,
        }
    );
    generate.assert_async().await;
}

#[tokio::test]
async fn greeting_only_calls_generation() {
    let mut server = mockito::Server::new_async().await;
    let generate = server
        .mock("POST", "/generate")
        .with_status(200)
        .with_body(r#"{"response":"Hi!"}"#)
        .expect(1)
        .create_async()
        .await;
    let embed = server
        .mock("POST", "/embeddings")
        .expect(0)
        .create_async()
        .await;

    let components = build_components(&config(&server.url())).await.unwrap();
    let answer = components.pipeline().answer("user-1", "hello").await.unwrap();

    assert!(matches!(answer, Answer::Replied { mode: ResponseMode::Fast, .. }));
    generate.assert_async().await;
    embed.assert_async().await;
}

#[tokio::test]
async fn personality_file_is_loaded_and_validated() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.yaml");
    std::fs::write(&good, "fast: Be quick.\nstandard: Be clear.\ndeep: Be thorough.\n").unwrap();
    let bad = dir.path().join("bad.yaml");
    std::fs::write(&bad, "fast: ''\nstandard: x\ndeep: y\n").unwrap();

    let mut cfg = config("http://127.0.0.1:9");
    cfg.personality_path = Some(good.to_string_lossy().into_owned());
    assert!(build_components(&cfg).await.is_ok());

    cfg.personality_path = Some(bad.to_string_lossy().into_owned());
    assert!(build_components(&cfg).await.is_err());
}

/// **Test: document administration talks to the vector backend and reports its failures as
/// retrieval errors.**
#[tokio::test]
async fn document_admin_through_components() {
    let mut server = mockito::Server::new_async().await;
    let _collection = server
        .mock("GET", "/collections/mod_docs")
        .with_status(200)
        .with_body(r#"{"id":"c-1","name":"mod_docs"}"#)
        .create_async()
        .await;
    let count = server
        .mock("GET", "/collections/c-1/count")
        .with_status(200)
        .with_body("42")
        .create_async()
        .await;
    let delete = server
        .mock("POST", "/collections/c-1/delete")
        .match_body(Matcher::PartialJson(serde_json::json!({ "ids": ["doc-7"] })))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let components = build_components(&config(&server.url())).await.unwrap();
    assert_eq!(components.document_count().await.unwrap(), 42);
    components.delete_document("doc-7").await.unwrap();
    count.assert_async().await;
    delete.assert_async().await;

    let offline = build_components(&config("http://127.0.0.1:9")).await.unwrap();
    assert!(matches!(offline.document_count().await, Err(BotError::Retrieval(_))));
    assert!(matches!(offline.delete_document("doc-7").await, Err(BotError::Retrieval(_))));
}

#[tokio::test]
async fn quota_admin_through_components() {
    let components = build_components(&config("http://127.0.0.1:9")).await.unwrap();
    let limiter = &components.rate_limiter;
    limiter.check_and_consume("user-1").await.unwrap();
    limiter.check_and_consume("user-1").await.unwrap();
    assert_eq!(limiter.get_count("user-1").await.unwrap(), 2);
    limiter.reset("user-1").await.unwrap();
    assert_eq!(limiter.get_count("user-1").await.unwrap(), 0);
}
