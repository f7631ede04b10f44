//! End-to-end tests for HistorySession.
//!
//! Tests drive the full stack: session -> history graph -> persistence
//! adapter -> key-value backend. Snapshots hold a small flowchart model
//! (boxes and connectors) like the ones editors record.
//!
//! Backends that touch disk get a fresh `tempfile` directory per test.

use serde::{Deserialize, Serialize};

use timeline_core::{
    ActionType, HistoryNodeId, NodeMetadata, StateSnapshot, Viewport, ViewportPolicy,
};
use timeline_session::{Backend, HistorySession, SessionConfig, SessionError};
use timeline_storage::{InMemoryStore, KeyValueStore, StorageError, StorageKey};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FlowNode {
    id: String,
    label: String,
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FlowEdge {
    source: String,
    target: String,
}

type Flow = StateSnapshot<FlowNode, FlowEdge>;
type Session<S> = HistorySession<FlowNode, FlowEdge, S>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn node(id: &str) -> FlowNode {
    FlowNode {
        id: id.to_string(),
        label: id.to_uppercase(),
        x: 0,
        y: 0,
    }
}

fn edge(source: &str, target: &str) -> FlowEdge {
    FlowEdge {
        source: source.to_string(),
        target: target.to_string(),
    }
}

fn flow(nodes: &[&str], edges: &[(&str, &str)]) -> Flow {
    StateSnapshot::new(
        nodes.iter().map(|id| node(id)).collect(),
        edges.iter().map(|(s, t)| edge(s, t)).collect(),
    )
}

fn memory_session(config: &SessionConfig) -> Session<InMemoryStore> {
    HistorySession::with_store(InMemoryStore::new(), config, flow(&[], &[]))
}

fn assert_same(actual: &Flow, expected: &Flow) {
    assert!(
        actual.same_state(expected),
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

fn add(action: ActionType) -> NodeMetadata {
    NodeMetadata::action(action)
}

/// A backend whose every call fails.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }

    fn put(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}

// ===========================================================================
// Recording and navigation
// ===========================================================================

#[test]
fn branching_walkthrough() {
    init_tracing();
    let mut session = memory_session(&SessionConfig::default());
    assert!(session.cursor().is_root());
    assert!(!session.can_undo());

    let n1 = session
        .commit("add node A", flow(&["a"], &[]), add(ActionType::NodeAdd))
        .unwrap()
        .expect("edit should be recorded");
    assert_eq!(session.cursor(), &n1);
    assert_same(session.current_state(), &flow(&["a"], &[]));

    let state = session.undo().expect("undo from n1");
    assert_same(state, &flow(&[], &[]));
    assert!(session.cursor().is_root());
    assert!(session.can_redo());
    assert_eq!(session.branch_options(), &[n1.clone()]);

    let n2 = session
        .commit("add node B", flow(&["b"], &[]), add(ActionType::NodeAdd))
        .unwrap()
        .unwrap();
    assert_eq!(session.cursor(), &n2);

    session.undo();
    assert_eq!(session.branch_options(), &[n1.clone(), n2.clone()]);

    let plan = session.plan_jump(&n1).unwrap();
    assert!(plan.undo.is_empty());
    assert_eq!(plan.redo, vec![n1.clone()]);

    let state = session.jump_to(&n1).unwrap();
    assert_same(state, &flow(&["a"], &[]));
    assert_eq!(session.cursor(), &n1);

    let stats = session.stats();
    assert_eq!(stats.total_nodes, 3);
    assert_eq!(stats.branches, 1);
    assert_eq!(stats.leaf_nodes, 2);
    assert_eq!(stats.max_depth, 1);
}

#[test]
fn record_keeps_explicit_before_state() {
    let mut session = memory_session(&SessionConfig::default());
    let before = flow(&["a"], &[]);
    let after = flow(&["a", "b"], &[("a", "b")]);
    let id = session
        .record("connect", before.clone(), after.clone(), add(ActionType::EdgeAdd))
        .unwrap()
        .unwrap();

    let recorded = session.get(&id).unwrap();
    assert_same(&recorded.before, &before);
    assert_same(&recorded.after, &after);
    assert_eq!(recorded.label, "connect");
    assert_eq!(recorded.metadata.action_type, Some(ActionType::EdgeAdd));
    assert_eq!(recorded.parent_id.as_ref(), Some(session.graph().root()));
}

#[test]
fn no_op_edits_are_skipped() {
    let mut session = memory_session(&SessionConfig::default());
    session
        .commit("add node A", flow(&["a"], &[]), NodeMetadata::new())
        .unwrap();

    let skipped = session
        .commit("touch", flow(&["a"], &[]), NodeMetadata::new())
        .unwrap();
    assert_eq!(skipped, None);
    assert_eq!(session.stats().total_nodes, 2);
}

#[test]
fn hashed_snapshots_skip_no_ops_too() {
    let mut session = memory_session(&SessionConfig::default());
    let a = flow(&["a"], &[]).with_structural_hash().unwrap();
    session.commit("add", a.clone(), NodeMetadata::new()).unwrap();

    let again = flow(&["a"], &[]).with_structural_hash().unwrap();
    assert_eq!(session.commit("again", again, NodeMetadata::new()).unwrap(), None);
}

#[test]
fn viewport_moves_are_ignored_by_default() {
    let mut session = memory_session(&SessionConfig::default());
    let panned = flow(&[], &[]).with_viewport(Viewport::new(120.0, -40.0, 1.5));
    assert_eq!(session.viewport_policy(), ViewportPolicy::Ignore);
    assert_eq!(session.commit("pan", panned, NodeMetadata::new()).unwrap(), None);
}

#[test]
fn viewport_moves_are_recorded_when_compared() {
    let config = SessionConfig {
        viewport_policy: ViewportPolicy::Compare,
        ..SessionConfig::default()
    };
    let mut session = memory_session(&config);
    let panned = flow(&[], &[]).with_viewport(Viewport::new(120.0, -40.0, 1.5));
    assert!(session
        .commit("pan", panned, NodeMetadata::new())
        .unwrap()
        .is_some());
}

#[test]
fn redo_at_branch_point_asks_for_a_choice() {
    let mut session = memory_session(&SessionConfig::default());
    let a = session
        .commit("a", flow(&["a"], &[]), NodeMetadata::new())
        .unwrap()
        .unwrap();
    session.undo();
    let b = session
        .commit("b", flow(&["b"], &[]), NodeMetadata::new())
        .unwrap()
        .unwrap();
    session.undo();

    let err = session.redo(None).unwrap_err();
    assert_eq!(err.branch_options(), Some(&[a.clone(), b.clone()][..]));
    assert!(session.cursor().is_root());

    let state = session.redo(Some(&b)).unwrap().expect("moved to b");
    assert_same(state, &flow(&["b"], &[]));
}

#[test]
fn undo_at_root_and_redo_at_leaf_do_nothing() {
    let mut session = memory_session(&SessionConfig::default());
    assert!(session.undo().is_none());
    assert!(session.redo(None).unwrap().is_none());
    assert!(session.cursor().is_root());
}

#[test]
fn jump_to_unknown_node_is_not_found() {
    let mut session = memory_session(&SessionConfig::default());
    let err = session.jump_to(&HistoryNodeId::from("missing")).unwrap_err();
    assert!(err.is_not_found());
}

// ===========================================================================
// Pruning and reset
// ===========================================================================

#[test]
fn deleting_the_active_branch_moves_the_cursor_up() {
    let mut session = memory_session(&SessionConfig::default());
    let a = session
        .commit("a", flow(&["a"], &[]), NodeMetadata::new())
        .unwrap()
        .unwrap();
    let b = session
        .commit("b", flow(&["a", "b"], &[]), NodeMetadata::new())
        .unwrap()
        .unwrap();

    let deleted = session.delete_subtree(&a).unwrap();
    assert_eq!(deleted.removed, vec![a.clone(), b.clone()]);
    assert_eq!(deleted.relocated_cursor.as_ref(), Some(session.graph().root()));
    assert!(session.cursor().is_root());
    assert!(session.get(&b).is_none());
    assert_eq!(session.reachable_from_root().len(), 1);
}

#[test]
fn deleting_the_root_is_rejected() {
    let mut session = memory_session(&SessionConfig::default());
    let root = session.graph().root().clone();
    let err = session.delete_subtree(&root).unwrap_err();
    assert!(matches!(err, SessionError::History(_)));
    assert_eq!(session.stats().total_nodes, 1);
}

#[test]
fn reset_starts_over_and_clears_storage() {
    let mut session = memory_session(&SessionConfig::default());
    session
        .commit("a", flow(&["a"], &[]), NodeMetadata::new())
        .unwrap();

    session.reset(flow(&["seed"], &[]));
    assert_eq!(session.stats().total_nodes, 1);
    assert_same(session.current_state(), &flow(&["seed"], &[]));
    assert_eq!(session.path_to_cursor().len(), 1);

    let store = session.into_store();
    let reopened: Session<InMemoryStore> =
        HistorySession::with_store(store, &SessionConfig::default(), flow(&[], &[]));
    assert_same(reopened.current_state(), &flow(&["seed"], &[]));
}

// ===========================================================================
// Persistence
// ===========================================================================

#[test]
fn history_survives_reopen_with_sqlite() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig {
        backend: Backend::Sqlite {
            path: dir.path().join("history.db"),
        },
        ..SessionConfig::default()
    };

    let (a, b) = {
        let mut session = HistorySession::open(&config, flow(&[], &[])).unwrap();
        let a = session
            .commit("a", flow(&["a"], &[]), NodeMetadata::new())
            .unwrap()
            .unwrap();
        session.undo();
        let b = session
            .commit("b", flow(&["b"], &[]), NodeMetadata::new())
            .unwrap()
            .unwrap();
        (a, b)
    };

    let mut session = HistorySession::<FlowNode, FlowEdge>::open(&config, flow(&[], &[])).unwrap();
    assert_eq!(session.cursor(), &b);
    assert_same(session.current_state(), &flow(&["b"], &[]));

    session.undo();
    assert_eq!(session.branch_options(), &[a.clone(), b.clone()]);
    session.jump_to(&a).unwrap();
    assert_same(session.current_state(), &flow(&["a"], &[]));
}

#[test]
fn history_survives_reopen_with_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig {
        backend: Backend::File {
            dir: dir.path().join("timeline"),
        },
        ..SessionConfig::default()
    };

    let id = {
        let mut session = HistorySession::open(&config, flow(&[], &[])).unwrap();
        session
            .commit("a", flow(&["a"], &[("a", "a")]), NodeMetadata::new())
            .unwrap()
            .unwrap()
    };

    let session = HistorySession::<FlowNode, FlowEdge>::open(&config, flow(&[], &[])).unwrap();
    assert_eq!(session.cursor(), &id);
    assert_same(session.current_state(), &flow(&["a"], &[("a", "a")]));
}

#[test]
fn ids_stay_unique_after_reopen() {
    let config = SessionConfig::default();
    let mut session = memory_session(&config);
    let first = session
        .commit("a", flow(&["a"], &[]), NodeMetadata::new())
        .unwrap()
        .unwrap();

    let store = session.into_store();
    let mut session: Session<InMemoryStore> =
        HistorySession::with_store(store, &config, flow(&[], &[]));
    let second = session
        .commit("b", flow(&["a", "b"], &[]), NodeMetadata::new())
        .unwrap()
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(session.stats().total_nodes, 3);
}

#[test]
fn storage_versions_are_isolated() {
    let v1 = SessionConfig::default();
    let mut session = memory_session(&v1);
    session
        .commit("a", flow(&["a"], &[]), NodeMetadata::new())
        .unwrap();

    let v2 = SessionConfig {
        storage_key: StorageKey::versioned(2),
        ..SessionConfig::default()
    };
    let session: Session<InMemoryStore> =
        HistorySession::with_store(session.into_store(), &v2, flow(&["fresh"], &[]));
    assert_eq!(session.stats().total_nodes, 1);
    assert_same(session.current_state(), &flow(&["fresh"], &[]));
}

#[test]
fn corrupt_stored_history_starts_fresh() {
    let config = SessionConfig::default();
    let mut store = InMemoryStore::new();
    store
        .put(&config.storage_key.to_string(), "{\"nodes\": 42}")
        .unwrap();

    let session: Session<InMemoryStore> =
        HistorySession::with_store(store, &config, flow(&["seed"], &[]));
    assert!(session.cursor().is_root());
    assert_same(session.current_state(), &flow(&["seed"], &[]));
}

#[test]
fn broken_backend_never_fails_edits() {
    init_tracing();
    let mut session: Session<BrokenStore> =
        HistorySession::with_store(BrokenStore, &SessionConfig::default(), flow(&[], &[]));

    let id = session
        .commit("a", flow(&["a"], &[]), NodeMetadata::new())
        .unwrap()
        .unwrap();
    session.undo();
    session.redo(None).unwrap();
    assert_eq!(session.cursor(), &id);
    session.reset(flow(&[], &[]));

    let err = session.flush().unwrap_err();
    assert!(matches!(err, StorageError::InvalidKey { .. }));
}

#[test]
fn persist_disabled_leaves_store_untouched() {
    let config = SessionConfig {
        persist_on_change: false,
        ..SessionConfig::default()
    };
    let mut session = memory_session(&config);
    session
        .commit("a", flow(&["a"], &[]), NodeMetadata::new())
        .unwrap();
    assert!(session.persistence().store().is_empty());

    session.flush().unwrap();
    assert_eq!(session.persistence().store().len(), 1);
}

#[test]
fn config_from_lookup_opens_session() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("env.db");
    let db_str = db.to_string_lossy().to_string();
    let config = SessionConfig::from_lookup(|name| match name {
        "TIMELINE_BACKEND" => Some("sqlite".to_string()),
        "TIMELINE_DB_PATH" => Some(db_str.clone()),
        "TIMELINE_COMPARE_VIEWPORT" => Some("yes".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.viewport_policy, ViewportPolicy::Compare);

    let mut session = HistorySession::open(&config, flow(&[], &[])).unwrap();
    session
        .commit("a", flow(&["a"], &[]), NodeMetadata::new())
        .unwrap();
    assert!(db.exists());
}
