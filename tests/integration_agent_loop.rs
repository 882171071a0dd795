//! Agent loop integration tests
//!
//! Drives whole episodes through the public API with a scripted inference
//! client and an in-memory Wikipedia.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use wikihop::agent::{Agent, AgentConfig, INVALID_TOOL_CALL};
use wikihop::error::WikihopError;
use wikihop::llm::{
    ContentBlock, InferenceResponse, MockInferenceClient, Role, ToolCall, ToolInvocation, ToolResult, Turn,
};
use wikihop::tools::ToolRegistry;
use wikihop::wiki::MemorySource;

fn call(id: &str, name: &str, args: Value) -> ContentBlock {
    let arguments: Map<String, Value> = args.as_object().cloned().unwrap_or_default();
    ContentBlock::ToolCall(ToolInvocation::WellFormed(ToolCall::new(id, name, arguments)))
}

fn answer(id: &str, text: &str) -> ContentBlock {
    call(id, "answer_question", json!({ "answer": text }))
}

fn response(blocks: Vec<ContentBlock>) -> InferenceResponse {
    InferenceResponse::new("ep-1", blocks)
}

fn wikipedia() -> MemorySource {
    MemorySource::new()
        .with_search("Curie", &["Marie Curie", "Pierre Curie"])
        .with_page(
            "Marie Curie",
            "https://en.wikipedia.org/wiki/Marie_Curie",
            "<p><b>Marie Curie</b> was born in Warsaw.</p>",
        )
}

fn agent(responses: Vec<InferenceResponse>) -> (Arc<MockInferenceClient>, Agent<MockInferenceClient>) {
    let client = Arc::new(MockInferenceClient::new(responses));
    let registry = ToolRegistry::standard(Arc::new(wikipedia()));
    let agent = Agent::new(client.clone(), registry);
    (client, agent)
}

/// Tool results of the last turn of the request sent on call `n`
fn results_sent(client: &MockInferenceClient, n: usize) -> Vec<ToolResult> {
    let requests = client.requests();
    let last = requests[n].messages.last().cloned().unwrap();
    assert_eq!(last.role, Role::User);
    last.blocks()
        .iter()
        .filter_map(|b| match b {
            ContentBlock::ToolResult(r) => Some(r.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_immediate_answer_uses_one_inference() {
    let (client, agent) = agent(vec![response(vec![answer("a1", "X")])]);

    let result = agent.answer("What is X?").await.unwrap();

    assert_eq!(result, "X");
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_search_then_answer() {
    let (client, agent) = agent(vec![
        response(vec![call("t1", "search_wikipedia", json!({ "query": "Curie" }))]),
        response(vec![answer("a1", "Warsaw")]),
    ]);

    let report = agent.run_episode("Where was Marie Curie born?").await.unwrap();

    assert_eq!(report.answer, "Warsaw");
    assert_eq!(report.inferences, 2);
    assert_eq!(
        results_sent(&client, 1),
        vec![ToolResult::new("search_wikipedia", "t1", "Marie Curie\nPierre Curie")]
    );
    // Every request after the first carries the episode id
    assert_eq!(client.requests()[0].episode_id, None);
    assert_eq!(client.requests()[1].episode_id.as_deref(), Some("ep-1"));
}

#[tokio::test]
async fn test_load_page_payload() {
    let (client, agent) = agent(vec![
        response(vec![call("t1", "load_wikipedia_page", json!({ "title": "Marie Curie" }))]),
        response(vec![answer("a1", "Warsaw")]),
    ]);

    agent.answer("Where was Marie Curie born?").await.unwrap();

    let results = results_sent(&client, 1);
    assert_eq!(results.len(), 1);
    assert!(
        results[0]
            .result
            .starts_with("# URL\n\nhttps://en.wikipedia.org/wiki/Marie_Curie\n\n# CONTENT\n\n")
    );
    assert!(results[0].result.contains("**Marie Curie** was born in Warsaw."));
}

#[tokio::test]
async fn test_missing_page_is_reported_to_the_model() {
    let (client, agent) = agent(vec![
        response(vec![call("t1", "load_wikipedia_page", json!({ "title": "Xyzzy Qwerty" }))]),
        response(vec![answer("a1", "I could not find it")]),
    ]);

    let result = agent.answer("Who is Xyzzy Qwerty?").await.unwrap();

    assert_eq!(result, "I could not find it");
    assert_eq!(
        results_sent(&client, 1),
        vec![ToolResult::new(
            "load_wikipedia_page",
            "t1",
            "ERROR: page 'Xyzzy Qwerty' not found."
        )]
    );
}

#[tokio::test]
async fn test_malformed_call_then_answer() {
    let malformed = ContentBlock::ToolCall(ToolInvocation::Malformed {
        id: "m1".to_string(),
        raw_name: "search_wikipeda".to_string(),
        raw_arguments: "{\"query\": ".to_string(),
    });
    let (client, agent) = agent(vec![response(vec![malformed]), response(vec![answer("a1", "Y")])]);

    let result = agent.answer("q").await.unwrap();

    assert_eq!(result, "Y");
    assert_eq!(
        results_sent(&client, 1),
        vec![ToolResult::new("search_wikipeda", "m1", INVALID_TOOL_CALL)]
    );
}

#[tokio::test]
async fn test_multi_call_turn_keeps_order_and_ids() {
    let (client, agent) = agent(vec![
        response(vec![
            call("t1", "think", json!({ "thought": "start with a search" })),
            call("t2", "search_wikipedia", json!({ "query": "Curie" })),
            call("t3", "load_wikipedia_page", json!({ "title": "Marie Curie" })),
        ]),
        response(vec![answer("a1", "Warsaw")]),
    ]);

    agent.answer("Where was Marie Curie born?").await.unwrap();

    let results = results_sent(&client, 1);
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2", "t3"]);
    assert_eq!(names, vec!["think", "search_wikipedia", "load_wikipedia_page"]);
    assert_eq!(results[0].result, "");
}

#[tokio::test]
async fn test_parallel_dispatch_keeps_order() {
    let client = Arc::new(MockInferenceClient::new(vec![
        response(vec![
            call("t1", "load_wikipedia_page", json!({ "title": "Marie Curie" })),
            call("t2", "search_wikipedia", json!({ "query": "Curie" })),
        ]),
        response(vec![answer("a1", "Warsaw")]),
    ]));
    let registry = ToolRegistry::standard(Arc::new(wikipedia()));
    let config = AgentConfig {
        parallel_tools: true,
        ..AgentConfig::default()
    };
    let agent = Agent::with_config(client.clone(), registry, config);

    agent.answer("q").await.unwrap();

    let ids: Vec<String> = results_sent(&client, 1).into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["t1", "t2"]);
}

#[tokio::test]
async fn test_budget_exceeded() {
    let responses = (0..3)
        .map(|i| response(vec![call(&format!("t{}", i), "think", json!({ "thought": "hmm" }))]))
        .collect();
    let client = Arc::new(MockInferenceClient::new(responses));
    let registry = ToolRegistry::standard(Arc::new(wikipedia()));
    let config = AgentConfig {
        max_inferences: 3,
        ..AgentConfig::default()
    };
    let agent = Agent::with_config(client.clone(), registry, config);

    let err = agent.answer("q").await.unwrap_err();

    assert!(matches!(err, WikihopError::BoundedLoopExceeded { max_inferences: 3 }));
    assert_eq!(client.call_count(), 3);
}

#[tokio::test]
async fn test_transcript_alternates_and_grows() {
    let (_client, agent) = agent(vec![
        response(vec![call("t1", "search_wikipedia", json!({ "query": "Curie" }))]),
        response(vec![call("t2", "load_wikipedia_page", json!({ "title": "Marie Curie" }))]),
        response(vec![answer("a1", "Warsaw")]),
    ]);

    let report = agent.run_episode("Where was Marie Curie born?").await.unwrap();

    let roles: Vec<Role> = report.transcript.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant
        ]
    );
    assert_eq!(report.transcript[0], Turn::user("Where was Marie Curie born?"));
    assert_eq!(report.episode_id.as_deref(), Some("ep-1"));
}

#[tokio::test]
async fn test_episodes_are_independent() {
    let (client, agent) = agent(vec![
        response(vec![answer("a1", "first")]),
        InferenceResponse::new("ep-2", vec![answer("a2", "second")]),
    ]);

    assert_eq!(agent.answer("one").await.unwrap(), "first");
    assert_eq!(agent.answer("two").await.unwrap(), "second");

    let second = &client.requests()[1];
    assert_eq!(second.episode_id, None);
    assert_eq!(second.messages, vec![Turn::user("two")]);
}
