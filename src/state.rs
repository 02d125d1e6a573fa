use crate::types::NodeId;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Inner {
    alive: HashMap<NodeId, Instant>,
    coordinator_id: Option<NodeId>,
}

/// Liveness table and coordinator id behind a single mutex. Every mutation
/// of coordination state funnels through here; the lock is never held across
/// an await point.
pub struct ClusterState {
    self_id: NodeId,
    inner: Mutex<Inner>,
}

/// What one monitor sweep removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: Vec<NodeId>,
    pub coordinator_expired: bool,
}

impl ClusterState {
    pub fn new(self_id: NodeId) -> Self {
        let mut alive = HashMap::new();
        alive.insert(self_id, Instant::now());
        Self {
            self_id,
            inner: Mutex::new(Inner {
                alive,
                coordinator_id: None,
            }),
        }
    }

    pub fn record_heartbeat(&self, node_id: NodeId) {
        let mut inner = self.inner.lock().unwrap();
        inner.alive.insert(node_id, Instant::now());
    }

    pub fn coordinator_id(&self) -> Option<NodeId> {
        self.inner.lock().unwrap().coordinator_id
    }

    /// Last writer wins: a delayed announcement overwrites a newer one.
    /// There is no epoch to compare against.
    pub fn set_coordinator(&self, id: NodeId) {
        let mut inner = self.inner.lock().unwrap();
        inner.coordinator_id = Some(id);
    }

    /// The election takeover check: claims the coordinator role only if no
    /// announcement landed during the wait. Atomic under the shared lock.
    pub fn declare_if_unset(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.coordinator_id.is_none() {
            inner.coordinator_id = Some(self.self_id);
            true
        } else {
            false
        }
    }

    /// Removes every peer not heard from within `threshold`. The local id is
    /// never removed. If the current coordinator is among the removed ids,
    /// the coordinator slot is cleared in the same critical section.
    pub fn sweep(&self, threshold: Duration) -> SweepReport {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap();
        let expired: Vec<NodeId> = inner
            .alive
            .iter()
            .filter(|(id, last_seen)| {
                **id != self.self_id && now.duration_since(**last_seen) > threshold
            })
            .map(|(id, _)| *id)
            .collect();

        let mut coordinator_expired = false;
        for id in &expired {
            inner.alive.remove(id);
            if inner.coordinator_id == Some(*id) {
                inner.coordinator_id = None;
                coordinator_expired = true;
            }
        }

        SweepReport {
            expired,
            coordinator_expired,
        }
    }

    pub fn alive_ids(&self) -> Vec<NodeId> {
        let inner = self.inner.lock().unwrap();
        let mut ids: Vec<NodeId> = inner.alive.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
