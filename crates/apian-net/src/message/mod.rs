/// Protocol messages: model, JSON codec and the wire-type factory.
pub mod codec;
pub mod factory;
pub mod types;

pub use factory::{MessageFactory, ParseFn};
pub use types::{
    ApianBody, ApianMessage, GroupAnnounce, GroupMemberStatus, GroupMessage, MemberStatus,
    GROUPS_REQUEST, GROUP_ANNOUNCE, GROUP_MEMBER_STATUS,
};
