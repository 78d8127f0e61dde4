//! Integration tests for tokenguard-session

use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tokenguard_session::*;

/// Exercise a store only through the capability trait.
fn write_then_read(store: &mut dyn SessionStore) -> Option<Value> {
    store.set("csrf.tokens", json!(["a", "b"]));
    store.get("csrf.tokens")
}

#[test]
fn test_every_mapping_store_behaves_alike() {
    let mut hash_map: HashMap<String, Value> = HashMap::new();
    let mut object = serde_json::Map::new();
    let mut value = json!({});
    let mut session = Session::generate(Duration::from_secs(60));
    let mut shared = SharedSession::new(Session::generate(Duration::from_secs(60)));

    let stores: [&mut dyn SessionStore; 5] = [
        &mut hash_map,
        &mut object,
        &mut value,
        &mut session,
        &mut shared,
    ];

    for store in stores {
        assert!(store.is_mapping());
        assert!(!store.has("csrf.tokens"));
        assert_eq!(write_then_read(store), Some(json!(["a", "b"])));
        assert!(store.has("csrf.tokens"));
    }
}

#[test]
fn test_session_serde_round_trip_keeps_data() {
    let mut session = Session::generate(Duration::from_secs(60));
    session.set("csrf.tokens", json!(["t1"]));
    session.set_as("user_id", 9).unwrap();

    let encoded = serde_json::to_string(&session).unwrap();
    let decoded: Session = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, session);
    assert_eq!(decoded.get_as::<u32>("user_id").unwrap(), Some(9));
}

#[test]
fn test_shared_session_wraps_existing() {
    let mut session = Session::new("fixed-id", Duration::from_secs(60));
    session.set("k", json!(1));

    let shared: SharedSession = session.into();
    assert_eq!(shared.id(), "fixed-id");
    assert_eq!(shared.get("k"), Some(json!(1)));
}

#[test]
fn test_not_mapping_error_names_kind() {
    let err = json!(3.5).ensure_mapping().unwrap_err();
    assert_eq!(err.to_string(), "Session is not a mapping: found number");
}
