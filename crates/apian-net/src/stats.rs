/// Routing counters for observability.
///
/// Every routing decision is counted here, silent drops included.
use serde::{Deserialize, Serialize};

/// Snapshot of routing activity since the net was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingStats {
    /// Inbound client messages that reached a category handler.
    pub dispatched: u64,
    /// Messages delivered to exactly one addressed instance.
    pub delivered: u64,
    /// Per-instance deliveries of groupless broadcasts.
    pub broadcast_deliveries: u64,
    /// Group announcements handed to the application.
    pub group_announces: u64,
    /// Messages addressed to a group with no registered instance.
    pub dropped_unknown_group: u64,
    /// Groupless messages of a kind with no routing rule.
    pub dropped_groupless: u64,
    /// Synthetic `Removed` status messages delivered on peer departure.
    pub member_removals_synthesized: u64,
    /// Per-instance clock-sync relays.
    pub clock_syncs_relayed: u64,
}

impl RoutingStats {
    /// Total messages dropped without delivery.
    pub fn dropped(&self) -> u64 {
        self.dropped_unknown_group + self.dropped_groupless
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_sums_both_drop_kinds() {
        let stats = RoutingStats {
            dropped_unknown_group: 2,
            dropped_groupless: 3,
            ..Default::default()
        };
        assert_eq!(stats.dropped(), 5);
    }

    #[test]
    fn serde_snapshot() {
        let stats = RoutingStats {
            delivered: 7,
            ..Default::default()
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["delivered"], 7);
        assert_eq!(json["dropped_groupless"], 0);
    }
}
