// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin surface specs: enumeration, assignment, and context deletion
//! over plain HTTP against the live broker.

use super::support::{seed_agent, seed_catalog, Broker};
use ctx_core::PermissionLevel;
use serde_json::json;

#[tokio::test]
async fn root_status_and_healthz() {
    let broker = Broker::start().await;
    let (client, _own) = broker.connect("x9").await;

    let (status, body) = broker.http_get("/").await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Multi-Agent Context Broker");
    assert_eq!(body["endpoints"]["websocket"], "/ws/{connection_id}");

    let (status, body) = broker.http_get("/healthz").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");

    let (status, body) = broker.http_get("/status").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "running");
    assert_eq!(body["active_connections"], 1);
    assert_eq!(body["database"], "connected");

    client.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn catalog_enumeration_round_trips() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (_project, session) = seed_catalog(&mut store, "alpha", "main");
        store
            .create_team(&ctx_core::TeamId::new("t1"), "Team One", Some("first team"))
            .unwrap();
        seed_agent(&mut store, "a1", PermissionLevel::Team, session, &["t1"]);
    }

    let (status, body) = broker.http_get("/projects").await;
    assert_eq!(status, 200);
    let projects = body["projects"].as_array().unwrap();
    assert!(projects.iter().any(|p| p["name"] == "alpha"));

    let (status, body) = broker.http_get("/sessions").await;
    assert_eq!(status, 200);
    assert!(body["sessions"].as_array().unwrap().iter().any(|s| s["name"] == "main"));

    let (status, body) = broker.http_get("/teams").await;
    assert_eq!(status, 200);
    assert_eq!(body["teams"][0]["team_id"], "t1");

    let (status, body) = broker.http_get("/agents").await;
    assert_eq!(status, 200);
    assert_eq!(body["agents"][0]["agent_id"], "a1");
    assert_eq!(body["agents"][0]["teams"], json!(["t1"]));

    broker.stop().await;
}

#[tokio::test]
async fn assigning_a_pending_connection_enables_writes() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (_project, session) = seed_catalog(&mut store, "alpha", "main");
        seed_agent(&mut store, "a9", PermissionLevel::SelfOnly, session, &[]);
    }

    // Connection id does not match any agent, so it parks as pending.
    let (mut client, own_event) = broker.connect("laptop-7").await;
    assert_eq!(own_event["type"], "new_pending_agent");

    let reply = client
        .request("WriteDB", json!({"agent_id": "a9", "context": "early"}))
        .await;
    assert_eq!(reply["details"], "Connection not assigned to any agent");

    let (status, body) = broker.http_post("/agents/a9/assign/laptop-7").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Agent a9 assigned to connection laptop-7");

    // Idempotent: assigning the already-assigned pair is a no-op.
    let (status, _body) = broker.http_post("/agents/a9/assign/laptop-7").await;
    assert_eq!(status, 200);

    let reply = client
        .request("WriteDB", json!({"agent_id": "a9", "context": "after assignment"}))
        .await;
    assert_eq!(reply["status"], "success");
    assert_eq!(reply["agent"], "a9");

    let (status, body) = broker.http_get("/connections").await;
    assert_eq!(status, 200);
    let row = &body["connections"][0];
    assert_eq!(row["connection_id"], "laptop-7");
    assert_eq!(row["assigned_agent_id"], "a9");
    assert_eq!(row["status"], "assigned");

    client.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn assigning_an_unknown_agent_is_a_404() {
    let broker = Broker::start().await;
    let (status, body) = broker.http_post("/agents/ghost/assign/c1").await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"], "agent not found");
    broker.stop().await;
}

#[tokio::test]
async fn contexts_listing_and_cascade_delete() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (_project, session) = seed_catalog(&mut store, "alpha", "main");
        seed_agent(&mut store, "a1", PermissionLevel::SelfOnly, session, &[]);
    }
    let (mut client, _own) = broker.connect("a1").await;
    let reply = client
        .request("WriteDB", json!({"agent_id": "a1", "context": "to be deleted"}))
        .await;
    assert_eq!(reply["status"], "success");

    let (status, body) = broker.http_get("/contexts").await;
    assert_eq!(status, 200);
    let contexts = body["contexts"].as_array().unwrap();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0]["chunk_count"], 1);
    assert_eq!(contexts[0]["context_summary"], "to be deleted");
    let context_id = contexts[0]["context_id"].as_i64().unwrap();

    let (status, body) = broker.http_delete(&format!("/contexts/{context_id}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let (_, body) = broker.http_get("/contexts").await;
    assert_eq!(body["contexts"].as_array().unwrap().len(), 0);
    let reply = client.request("ReadDB", json!({"agent_id": "a1"})).await;
    assert_eq!(reply["contexts"].as_array().unwrap().len(), 0);

    let (status, body) = broker.http_delete(&format!("/contexts/{context_id}")).await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"], "Context not found");

    client.close().await;
    broker.stop().await;
}
