/// Session lifecycle: create/join/leave a game, bind instances, send.
///
/// `leave_game` resets the registries as a unit: instances first, then the
/// transport, then peers. Nothing routed after it can reach an instance
/// registered before it.
use serde::{Deserialize, Serialize};

use crate::collab::{ApianApplication, P2pTransport};
use crate::error::ApianNetError;
use crate::instances::InstanceHandle;
use crate::message::{codec, ApianMessage};
use crate::net::ApianNet;
use crate::types::GroupId;

/// Parameters for [`ApianNet::create_game`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCreationData {
    /// Use this id instead of generating one.
    pub requested_id: Option<String>,
}

/// Notifications queued for the application, delivered by `pump()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    GameCreated { game_id: String },
}

impl<T: P2pTransport, A: ApianApplication> ApianNet<T, A> {
    // ── Game session ─────────────────────────────────────────────────────

    /// Make a new game id and queue a `GameCreated` notice.
    ///
    /// Does not join the game or touch the instance registry.
    pub fn create_game(&mut self, data: &GameCreationData) -> String {
        let game_id = data
            .requested_id
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.config.game_id_prefix, uuid::Uuid::new_v4()));
        tracing::info!("create game {game_id}");
        self.notices.push_back(SessionNotice::GameCreated {
            game_id: game_id.clone(),
        });
        game_id
    }

    /// Join a game channel. Peers already there arrive via `on_peer_joined`.
    pub fn join_game(&mut self, game_channel: &str) -> Result<(), ApianNetError> {
        tracing::info!("join game {game_channel}");
        self.transport.join(game_channel, &self.config.hello_data)?;
        self.current_game = Some(game_channel.to_string());
        Ok(())
    }

    /// Leave the current game, dropping every instance and peer record.
    pub fn leave_game(&mut self) {
        let released = self.instances.clear();
        self.transport.leave();
        let peers = self.peers.clear();
        tracing::info!(
            "left game {}: released {released} instance(s), forgot {peers} peer(s)",
            self.current_game.as_deref().unwrap_or("<none>")
        );
        self.current_game = None;
    }

    /// Deliver queued session notices to the application.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(notice) = self.notices.pop_front() {
            match notice {
                SessionNotice::GameCreated { game_id } => self.app.on_game_created(&game_id),
            }
            delivered += 1;
        }
        delivered
    }

    // ── Instances ────────────────────────────────────────────────────────

    /// Bind `instance` to `group_id`, replacing any previous binding.
    pub fn add_group_instance(&mut self, instance: InstanceHandle, group_id: GroupId) {
        if self.instances.add(group_id.clone(), instance).is_some() {
            tracing::info!("replaced instance for group {group_id}");
        } else {
            tracing::info!("added instance for group {group_id}");
        }
    }

    /// Unbind the instance for `group_id`, returning its handle.
    pub fn remove_group_instance(&mut self, group_id: &GroupId) -> Option<InstanceHandle> {
        let removed = self.instances.remove(group_id);
        if removed.is_some() {
            tracing::info!("removed instance for group {group_id}");
        }
        removed
    }

    // ── Outbound ─────────────────────────────────────────────────────────

    /// Ask every group in the current game to identify itself.
    pub fn request_groups(&mut self) -> Result<(), ApianNetError> {
        let channel = self
            .current_game
            .clone()
            .ok_or(ApianNetError::NoActiveGame)?;
        tracing::debug!("request groups on {channel}");
        self.send_apian_message(&channel, &ApianMessage::groups_request())
    }

    /// Serialize `msg` and publish it on `to_channel`.
    pub fn send_apian_message(
        &mut self,
        to_channel: &str,
        msg: &ApianMessage,
    ) -> Result<(), ApianNetError> {
        tracing::debug!("send apian message: type={} to={to_channel}", msg.msg_type);
        let payload = codec::encode(msg)?;
        self.transport.send_message(to_channel, &msg.msg_type, &payload)
    }
}
