use serde_json::json;
use shoal::{CoordinatorReply, Message, QueryReply};

#[test]
fn test_heartbeat_wire_tag() {
    let msg = Message::Heartbeat { id: 3 };
    assert_eq!(
        serde_json::to_value(&msg).unwrap(),
        json!({"type": "HEARTBEAT", "id": 3})
    );
}

#[test]
fn test_election_wire_tags() {
    assert_eq!(
        serde_json::to_value(Message::Election { id: 0 }).unwrap(),
        json!({"type": "ELECTION", "id": 0})
    );
    assert_eq!(
        serde_json::to_value(Message::ElectionOk { id: 2 }).unwrap(),
        json!({"type": "ELECTION_OK", "id": 2})
    );
    assert_eq!(
        serde_json::to_value(Message::Coordinator { id: 2 }).unwrap(),
        json!({"type": "COORDINATOR", "id": 2})
    );
}

#[test]
fn test_replicate_round_trip() {
    let msg = Message::Replicate {
        sql: "INSERT INTO users (name) VALUES ('Test')".to_string(),
        checksum: 0xdead_beef,
        origin: 1,
    };
    let bytes = serde_json::to_vec(&msg).unwrap();
    match serde_json::from_slice::<Message>(&bytes).unwrap() {
        Message::Replicate {
            sql,
            checksum,
            origin,
        } => {
            assert_eq!(sql, "INSERT INTO users (name) VALUES ('Test')");
            assert_eq!(checksum, 0xdead_beef);
            assert_eq!(origin, 1);
        }
        other => panic!("decoded wrong variant: {:?}", other),
    }
}

#[test]
fn test_get_coordinator_decodes_without_fields() {
    let msg: Message = serde_json::from_str(r#"{"type":"GET_COORDINATOR"}"#).unwrap();
    assert!(matches!(msg, Message::GetCoordinator));
}

#[test]
fn test_client_query_decodes() {
    let msg: Message =
        serde_json::from_str(r#"{"type":"CLIENT_QUERY","sql":"SELECT * FROM users"}"#).unwrap();
    match msg {
        Message::ClientQuery { sql } => assert_eq!(sql, "SELECT * FROM users"),
        other => panic!("decoded wrong variant: {:?}", other),
    }
}

#[test]
fn test_undecodable_payloads_are_rejected() {
    assert!(serde_json::from_slice::<Message>(b"not json at all").is_err());
    assert!(serde_json::from_str::<Message>(r#"{"type":"UNKNOWN","id":1}"#).is_err());
    assert!(serde_json::from_str::<Message>(r#"{"id":1}"#).is_err());
}

#[test]
fn test_success_reply_shape() {
    let reply = QueryReply::Success {
        node: 0,
        data: None,
    };
    assert_eq!(
        serde_json::to_value(&reply).unwrap(),
        json!({"status": "success", "node": 0, "data": null})
    );
}

#[test]
fn test_success_reply_carries_rows() {
    let reply = QueryReply::Success {
        node: 1,
        data: Some(vec![json!({"id": 1, "name": "Test"})]),
    };
    assert_eq!(
        serde_json::to_value(&reply).unwrap(),
        json!({"status": "success", "node": 1, "data": [{"id": 1, "name": "Test"}]})
    );
}

#[test]
fn test_error_reply_shape() {
    let reply = QueryReply::Error {
        node: 2,
        message: "no such table: users".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&reply).unwrap(),
        json!({"status": "error", "node": 2, "message": "no such table: users"})
    );
}

#[test]
fn test_coordinator_reply_shape() {
    assert_eq!(
        serde_json::to_value(CoordinatorReply::new(Some(2))).unwrap(),
        json!({"status": "success", "coordinator_id": 2})
    );
    assert_eq!(
        serde_json::to_value(CoordinatorReply::new(None)).unwrap(),
        json!({"status": "success", "coordinator_id": null})
    );
}
