// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection lifecycle specs: auto-bind, pending registration,
//! disconnect bookkeeping, and the allowlist gate.

use super::support::{seed_agent, seed_catalog, Broker};
use ctx_core::{AgentId, ConnectionId, ConnectionStatus, PermissionLevel};
use serde_json::json;

#[tokio::test]
async fn auto_bind_on_matching_agent_id() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (_project, session) = seed_catalog(&mut store, "alpha", "main");
        seed_agent(&mut store, "a1", PermissionLevel::SelfOnly, session, &[]);
    }

    // An unrelated socket observes the fleet broadcasts.
    let (mut observer, _own_event) = broker.connect("obs").await;

    let (client, own_event) = broker.connect("a1").await;
    assert_eq!(
        own_event,
        json!({"type": "agent_status", "agent_id": "a1", "status": "connected"})
    );
    let seen = observer.expect_event("agent_status").await;
    assert_eq!(seen["agent_id"], "a1");
    assert_eq!(seen["status"], "connected");

    let store = broker.store();
    let row = store
        .connection(&ConnectionId::new("a1"))
        .unwrap()
        .expect("connection row");
    assert_eq!(row.status, ConnectionStatus::Assigned);
    assert_eq!(row.assigned_agent_id, Some(AgentId::new("a1")));
    let agents = store.list_agents().unwrap();
    assert_eq!(agents[0].connection_id, Some(ConnectionId::new("a1")));

    client.close().await;
    observer.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn unmatched_id_registers_as_pending() {
    let broker = Broker::start().await;

    let (client, own_event) = broker.connect("x9").await;
    assert_eq!(
        own_event,
        json!({"type": "new_pending_agent", "agent_id": "x9", "connection_id": "x9"})
    );

    let store = broker.store();
    let row = store
        .connection(&ConnectionId::new("x9"))
        .unwrap()
        .expect("connection row");
    assert_eq!(row.status, ConnectionStatus::Pending);
    assert_eq!(row.assigned_agent_id, None);
    assert!(store.list_agents().unwrap().is_empty());

    client.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn disconnect_releases_the_binding_and_broadcasts() {
    let broker = Broker::start().await;
    {
        let mut store = broker.store();
        let (_project, session) = seed_catalog(&mut store, "alpha", "main");
        seed_agent(&mut store, "a1", PermissionLevel::SelfOnly, session, &[]);
    }

    let (mut observer, _own) = broker.connect("obs").await;
    let (client, _own) = broker.connect("a1").await;
    observer.expect_event("agent_status").await;

    client.close().await;

    let gone = observer.expect_event("agent_status").await;
    assert_eq!(gone["agent_id"], "a1");
    assert_eq!(gone["status"], "disconnected");

    let store = broker.store();
    let row = store
        .connection(&ConnectionId::new("a1"))
        .unwrap()
        .expect("row kept after disconnect");
    assert_eq!(row.status, ConnectionStatus::Pending);
    assert_eq!(row.assigned_agent_id, None);
    assert_eq!(store.list_agents().unwrap()[0].connection_id, None);

    observer.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn reconnect_reuses_the_connection_row() {
    let broker = Broker::start().await;

    let (client, _own) = broker.connect("x9").await;
    client.close().await;
    let (client, _own) = broker.connect("x9").await;

    let (status, body) = broker.http_get("/connections").await;
    assert_eq!(status, 200);
    assert_eq!(body["connections"].as_array().unwrap().len(), 1);

    client.close().await;
    broker.stop().await;
}

#[tokio::test]
async fn allowlisted_ids_connect_and_others_are_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let allowfile = dir.path().join("allowlist.txt");
    std::fs::write(&allowfile, "# fleet\na1\n").unwrap();

    let broker = Broker::start_with(|config| {
        config.allowlist =
            ctx_daemon::Allowlist::new(Default::default(), Some(allowfile.clone()));
    })
    .await;
    {
        let mut store = broker.store();
        let (_project, session) = seed_catalog(&mut store, "alpha", "main");
        seed_agent(&mut store, "a1", PermissionLevel::SelfOnly, session, &[]);
    }

    let (client, own_event) = broker.connect("a1").await;
    assert_eq!(own_event["status"], "connected");
    client.close().await;

    let mut rejected = broker.connect_raw("evil").await;
    let frame = rejected.recv_json().await;
    assert_eq!(
        frame,
        json!({"type": "announce_rejected", "agent_id": "evil", "reason": "not_allowlisted"})
    );
    assert!(rejected.closed_by_server().await);

    let store = broker.store();
    let row = store
        .connection(&ConnectionId::new("evil"))
        .unwrap()
        .expect("rejected row recorded");
    assert_eq!(row.status, ConnectionStatus::Rejected);

    broker.stop().await;
}
