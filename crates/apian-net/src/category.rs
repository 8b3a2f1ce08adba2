/// Message categories carried on the client-message channel.
///
/// The set is closed: the dispatch table is built from `ALL` once and a
/// tag outside it is an integration error, never a new kind of traffic.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire tag for consensus requests (peer → group leader).
pub const CLI_REQUEST: &str = "APapRq";
/// Wire tag for consensus observations.
pub const CLI_OBSERVATION: &str = "APapObs";
/// Wire tag for committed consensus commands.
pub const CLI_COMMAND: &str = "APapCmd";
/// Wire tag for clock-offset reports.
pub const CLOCK_OFFSET: &str = "APclo";
/// Wire tag for group-management traffic.
pub const GROUP_MESSAGE: &str = "APGrp";

/// Top-level category of an inbound client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageCategory {
    ClientRequest,
    ClientObservation,
    ClientCommand,
    ClockOffset,
    GroupMessage,
}

impl MessageCategory {
    /// Every category, in dispatch-table order.
    pub const ALL: [MessageCategory; 5] = [
        MessageCategory::ClientRequest,
        MessageCategory::ClientObservation,
        MessageCategory::ClientCommand,
        MessageCategory::ClockOffset,
        MessageCategory::GroupMessage,
    ];

    /// The tag this category travels under.
    pub fn wire_type(self) -> &'static str {
        match self {
            MessageCategory::ClientRequest => CLI_REQUEST,
            MessageCategory::ClientObservation => CLI_OBSERVATION,
            MessageCategory::ClientCommand => CLI_COMMAND,
            MessageCategory::ClockOffset => CLOCK_OFFSET,
            MessageCategory::GroupMessage => GROUP_MESSAGE,
        }
    }

    pub fn from_wire_type(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.wire_type() == tag)
    }

    /// Whether messages of this category go through the group sub-router.
    pub fn is_group(self) -> bool {
        self == MessageCategory::GroupMessage
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_type())
    }
}
