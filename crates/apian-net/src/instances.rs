/// Per-group consensus instances and the registry that routes to them.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::InstanceError;
use crate::message::ApianMessage;
use crate::types::{GroupId, PeerId};

/// A group-consensus state machine bound to one group id.
///
/// Calls arrive synchronously on the dispatching task and must return
/// promptly; expensive work belongs on the instance's own scheduler.
pub trait GroupInstance: Send + Sync {
    /// Deliver a routed protocol message (wire-originated or synthetic).
    fn on_apian_message(
        &self,
        from: &PeerId,
        to: &str,
        msg: &ApianMessage,
        latency_ms: i64,
    ) -> Result<(), InstanceError>;

    /// Transport clock measurements for a peer.
    fn on_peer_sync(&self, peer_id: &PeerId, clock_offset_ms: i64, net_lag_ms: i64);
}

/// Shared handle to a registered instance.
pub type InstanceHandle = Arc<dyn GroupInstance>;

/// group id → instance. At most one instance per group.
#[derive(Default)]
pub struct GroupInstanceRegistry {
    instances: BTreeMap<GroupId, InstanceHandle>,
}

impl GroupInstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `instance` to `group_id`, returning the handle it replaced.
    pub fn add(&mut self, group_id: GroupId, instance: InstanceHandle) -> Option<InstanceHandle> {
        self.instances.insert(group_id, instance)
    }

    pub fn get(&self, group_id: &GroupId) -> Option<&InstanceHandle> {
        self.instances.get(group_id)
    }

    pub fn contains(&self, group_id: &GroupId) -> bool {
        self.instances.contains_key(group_id)
    }

    pub fn remove(&mut self, group_id: &GroupId) -> Option<InstanceHandle> {
        self.instances.remove(group_id)
    }

    /// Release every handle at once. Returns how many were held.
    pub fn clear(&mut self) -> usize {
        let count = self.instances.len();
        self.instances.clear();
        count
    }

    /// Bindings in group-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupId, &InstanceHandle)> {
        self.instances.iter()
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        self.instances.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
