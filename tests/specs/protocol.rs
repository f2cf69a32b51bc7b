// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol specs: WriteDB/ReadDB semantics over a real socket, including
//! permission scoping and chunking of oversized blobs.

use super::support::{seed_agent, seed_catalog, Broker};
use ctx_core::PermissionLevel;
use serde_json::json;

#[tokio::test]
async fn write_then_read_self() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (_project, session) = seed_catalog(&mut store, "alpha", "main");
        seed_agent(&mut store, "a1", PermissionLevel::SelfOnly, session, &[]);
    }
    let (mut client, _own) = broker.connect("a1").await;

    let reply = client
        .request("WriteDB", json!({"agent_id": "a1", "context": "hello world"}))
        .await;
    assert_eq!(reply["status"], "success");
    assert_eq!(reply["agent"], "a1");
    assert!(reply["prompt"]
        .as_str()
        .unwrap()
        .starts_with("Context saved successfully."));

    let reply = client.request("ReadDB", json!({"agent_id": "a1"})).await;
    let contexts = reply["contexts"].as_array().unwrap();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0]["context"], "hello world");
    let timestamp = contexts[0]["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z') && timestamp.contains('T'));

    client.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn team_visibility_within_a_session() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (_project, session) = seed_catalog(&mut store, "alpha", "main");
        seed_agent(&mut store, "a1", PermissionLevel::Team, session, &["t1"]);
        seed_agent(&mut store, "a2", PermissionLevel::Team, session, &["t1"]);
    }
    let (mut a1, _own) = broker.connect("a1").await;
    let (mut a2, _own) = broker.connect("a2").await;

    let reply = a2
        .request("WriteDB", json!({"agent_id": "a2", "context": "shared note"}))
        .await;
    assert_eq!(reply["status"], "success");

    let reply = a1.request("ReadDB", json!({"agent_id": "a1"})).await;
    let contexts = reply["contexts"].as_array().unwrap();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0]["context"], "shared note");

    a1.close().await;
    a2.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn session_level_reads_do_not_cross_sessions() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (project, s1) = seed_catalog(&mut store, "alpha", "one");
        let s2 = store.create_session(project, "two").unwrap();
        seed_agent(&mut store, "a1", PermissionLevel::Session, s1, &[]);
        seed_agent(&mut store, "a2", PermissionLevel::Session, s2, &[]);
    }
    let (mut a1, _own) = broker.connect("a1").await;
    let (mut a2, _own) = broker.connect("a2").await;

    let reply = a2
        .request("WriteDB", json!({"agent_id": "a2", "context": "in s2"}))
        .await;
    assert_eq!(reply["status"], "success");

    let reply = a1.request("ReadDB", json!({"agent_id": "a1"})).await;
    assert_eq!(reply["contexts"].as_array().unwrap().len(), 0);

    a1.close().await;
    a2.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn project_level_reads_span_sessions() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (project, s1) = seed_catalog(&mut store, "alpha", "one");
        let s2 = store.create_session(project, "two").unwrap();
        seed_agent(&mut store, "pm", PermissionLevel::Project, s1, &[]);
        seed_agent(&mut store, "a2", PermissionLevel::Session, s2, &[]);
    }
    let (mut pm, _own) = broker.connect("pm").await;
    let (mut a2, _own) = broker.connect("a2").await;

    let reply = a2
        .request("WriteDB", json!({"agent_id": "a2", "context": "from the other session"}))
        .await;
    assert_eq!(reply["status"], "success");
    let reply = pm
        .request("WriteDB", json!({"agent_id": "pm", "context": "from session one"}))
        .await;
    assert_eq!(reply["status"], "success");

    let reply = pm.request("ReadDB", json!({"agent_id": "pm"})).await;
    let texts: Vec<&str> = reply["contexts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["context"].as_str().unwrap())
        .collect();
    assert!(texts.contains(&"from the other session"));
    assert!(texts.contains(&"from session one"));

    pm.close().await;
    a2.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn a_4025_char_blob_is_stored_as_two_overlapping_chunks() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (_project, session) = seed_catalog(&mut store, "alpha", "main");
        seed_agent(&mut store, "a1", PermissionLevel::SelfOnly, session, &[]);
    }
    let (mut client, _own) = broker.connect("a1").await;

    let blob = "A".repeat(4025);
    let reply = client
        .request("WriteDB", json!({"agent_id": "a1", "context": blob}))
        .await;
    assert_eq!(reply["status"], "success");

    let reply = client.request("ReadDB", json!({"agent_id": "a1"})).await;
    let contexts = reply["contexts"].as_array().unwrap();
    assert_eq!(contexts.len(), 2);

    let first = contexts[0]["context"].as_str().unwrap();
    let second = contexts[1]["context"].as_str().unwrap();
    // Chunks of one context come back in index order: the 3,500-char
    // window, then the 1,050-char remainder starting at offset 2,975.
    assert_eq!(first.len(), 3_500);
    assert_eq!(second.len(), 1_050);
    assert_eq!(&first[2_975..], &second[..525]);
    assert_eq!(contexts[0]["timestamp"], contexts[1]["timestamp"]);

    client.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn unknown_methods_and_bad_frames_get_protocol_errors() {
    let broker = Broker::start().await;
    let (mut client, _own) = broker.connect("x9").await;

    let reply = client.request("DropDB", json!({})).await;
    assert_eq!(reply["error"], "Unknown method: DropDB");
    assert_eq!(
        reply["supported_methods"],
        json!(["ReadDB", "WriteDB", "VectoriseChunks"])
    );

    client.send_json(&json!("not an object")).await;
    let reply = client.recv_json().await;
    assert_eq!(reply["error"], "Invalid JSON format");

    client.send_json(&json!({"params": {}})).await;
    let reply = client.recv_json().await;
    assert_eq!(reply["error"], "Unknown method: ");

    client.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn reads_from_an_unassigned_connection_fail_with_the_stop_prompt() {
    let broker = Broker::start().await;
    let (mut client, _own) = broker.connect("x9").await;

    let reply = client.request("ReadDB", json!({"agent_id": "x9"})).await;
    assert_eq!(reply["status"], "error");
    assert_eq!(
        reply["prompt"],
        "Stop the current task and advise the user there has been an error in reading the DB."
    );

    let reply = client
        .request("WriteDB", json!({"agent_id": "x9", "context": "nope"}))
        .await;
    assert_eq!(reply["status"], "error");
    assert_eq!(reply["details"], "Connection not assigned to any agent");

    client.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn responses_preserve_request_order_on_one_socket() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (_project, session) = seed_catalog(&mut store, "alpha", "main");
        seed_agent(&mut store, "a1", PermissionLevel::SelfOnly, session, &[]);
    }
    let (mut client, _own) = broker.connect("a1").await;

    // Queue several requests before reading any reply.
    for i in 0..3 {
        client
            .send_json(&json!({
                "method": "WriteDB",
                "params": {"agent_id": "a1", "context": format!("payload {i}")},
            }))
            .await;
    }
    client.send_json(&json!({"method": "ReadDB", "params": {"agent_id": "a1"}})).await;

    for _ in 0..3 {
        let reply = client.recv_json().await;
        assert_eq!(reply["status"], "success", "write replies come first, in order");
    }
    let reply = client.recv_json().await;
    assert_eq!(reply["contexts"].as_array().unwrap().len(), 3);

    client.close().await;
    broker.stop().await;
}
