//! Apian network layer.
//!
//! Sits between one peer-to-peer transport and any number of per-group
//! consensus instances. Classifies inbound client messages by wire
//! category, routes them to the instance registered for their destination
//! group, relays clock sync to every instance, and turns peer departures
//! into synthetic membership messages.
//!
//! Wire format: JSON message bodies, optionally wrapped in a MessagePack
//! [`ClientFrame`] for byte-oriented transports.

pub mod category;
pub mod clock;
pub mod collab;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod instances;
pub mod lifecycle;
pub mod message;
pub mod net;
pub mod peers;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod types;

pub use category::MessageCategory;
pub use collab::{ApianApplication, P2pTransport};
pub use config::NetConfig;
pub use error::{ApianNetError, InstanceError};
pub use frame::ClientFrame;
pub use instances::{GroupInstance, GroupInstanceRegistry, InstanceHandle};
pub use message::{
    ApianBody, ApianMessage, GroupAnnounce, GroupMemberStatus, GroupMessage, MemberStatus,
    MessageFactory, ParseFn,
};
pub use net::ApianNet;
pub use peers::{Peer, PeerRegistry};
pub use runtime::{
    ChannelTransport, NetRuntime, OutboundFrame, RuntimeChannels, RuntimeCommand, RuntimeEvent,
    RuntimeHandle, TransportEvent,
};
pub use session::{GameCreationData, SessionNotice};
pub use stats::RoutingStats;
pub use types::{now_ms, GroupId, PeerClockSyncData, PeerId};
