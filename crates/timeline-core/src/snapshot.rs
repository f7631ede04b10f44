//! Editable document snapshots and their equality rules.
//!
//! [`StateSnapshot`] is generic over the application's node and edge
//! descriptors. The history engine only needs three things from them:
//! `Clone` for deep copies, `PartialEq` for structural comparison, and
//! `Serialize` for the structural hash and persistence.
//!
//! # Equality
//!
//! Two snapshots are the same state when both carry a structural hash and
//! the hashes match, or otherwise when their `nodes` and `edges` compare
//! equal element by element (order-sensitive). The viewport is ignored
//! under [`ViewportPolicy::Ignore`], the default, so panning and zooming
//! never produce history entries.
//!
//! # Structural hash
//!
//! The hash is the blake3 digest of the `serde_json` encoding of `nodes`
//! followed by `edges`. It is only as deterministic as that encoding:
//! descriptor types holding a `HashMap` should switch to an ordered map
//! before relying on hashes.

use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// Camera state of the editor canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Viewport { x, y, zoom }
    }

    /// Bitwise-total comparison, so a viewport holding NaN still equals itself.
    pub fn same_view(&self, other: &Viewport) -> bool {
        self.x.total_cmp(&other.x).is_eq()
            && self.y.total_cmp(&other.y).is_eq()
            && self.zoom.total_cmp(&other.zoom).is_eq()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(0.0, 0.0, 1.0)
    }
}

/// Whether viewport differences make two snapshots distinct states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportPolicy {
    /// Camera moves are not history-worthy.
    #[default]
    Ignore,
    /// A changed viewport is a changed state.
    Compare,
}

/// The full editable state of a workflow at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot<N, E> {
    /// Node descriptors, in document order.
    pub nodes: Vec<N>,
    /// Edge descriptors, in document order.
    pub edges: Vec<E>,
    /// Camera state, if the editor tracks it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    /// Precomputed digest of `nodes` + `edges`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural_hash: Option<String>,
}

impl<N, E> StateSnapshot<N, E> {
    pub fn new(nodes: Vec<N>, edges: Vec<E>) -> Self {
        StateSnapshot {
            nodes,
            edges,
            viewport: None,
            structural_hash: None,
        }
    }

    /// A document with no nodes and no edges.
    pub fn empty() -> Self {
        StateSnapshot::new(Vec::new(), Vec::new())
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Drops any attached hash. Call after editing `nodes` or `edges` in place.
    pub fn without_structural_hash(mut self) -> Self {
        self.structural_hash = None;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Same logical state, ignoring the viewport.
    pub fn same_state(&self, other: &Self) -> bool
    where
        N: PartialEq,
        E: PartialEq,
    {
        self.same_state_with(other, ViewportPolicy::Ignore)
    }

    /// Same logical state under an explicit viewport policy.
    ///
    /// Uses the O(1) hash comparison only when both sides carry a hash;
    /// a single-sided hash falls back to structural comparison.
    pub fn same_state_with(&self, other: &Self, policy: ViewportPolicy) -> bool
    where
        N: PartialEq,
        E: PartialEq,
    {
        if policy == ViewportPolicy::Compare {
            let views_match = match (&self.viewport, &other.viewport) {
                (Some(a), Some(b)) => a.same_view(b),
                (None, None) => true,
                _ => false,
            };
            if !views_match {
                return false;
            }
        }

        match (&self.structural_hash, &other.structural_hash) {
            (Some(a), Some(b)) => a == b,
            _ => self.nodes == other.nodes && self.edges == other.edges,
        }
    }
}

impl<N: Serialize, E: Serialize> StateSnapshot<N, E> {
    /// Computes the hex blake3 digest of `nodes` and `edges`.
    pub fn compute_structural_hash(&self) -> Result<String, HistoryError> {
        let mut hasher = blake3::Hasher::new();
        // Length prefixes keep ([a], [b, c]) and ([a, b], [c]) apart.
        let nodes = serde_json::to_vec(&self.nodes)?;
        hasher.update(&(nodes.len() as u64).to_le_bytes());
        hasher.update(&nodes);
        let edges = serde_json::to_vec(&self.edges)?;
        hasher.update(&(edges.len() as u64).to_le_bytes());
        hasher.update(&edges);
        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Returns the snapshot with a freshly computed structural hash attached.
    pub fn with_structural_hash(mut self) -> Result<Self, HistoryError> {
        self.structural_hash = Some(self.compute_structural_hash()?);
        Ok(self)
    }
}

impl<N, E> Default for StateSnapshot<N, E> {
    fn default() -> Self {
        StateSnapshot::empty()
    }
}
