/// Configuration for an [`ApianNet`](crate::ApianNet) and its runtime.
///
/// All fields have sensible defaults. Use the builder pattern:
///
/// ```rust
/// use apian_net::NetConfig;
///
/// let config = NetConfig::new()
///     .hello_data(r#"{"name":"alice"}"#)
///     .game_id_prefix("match-");
/// ```
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Hello payload handed to remote peers when joining a game channel.
    pub(crate) hello_data: String,
    /// Prefix for synthesized game ids.
    pub(crate) game_id_prefix: String,
    /// Capacity of the runtime's inbound transport-event queue.
    pub(crate) event_buffer: usize,
    /// Capacity of the runtime's command queue.
    pub(crate) command_buffer: usize,
    /// Capacity of the runtime's outbound event channel.
    pub(crate) notice_buffer: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl NetConfig {
    /// Create a new config with defaults.
    ///
    /// If the `APIAN_HELLO_DATA` environment variable is set, it is used as
    /// the hello payload. This can be overridden with [`.hello_data()`](Self::hello_data).
    pub fn new() -> Self {
        let hello_data = std::env::var("APIAN_HELLO_DATA").unwrap_or_else(|_| "{}".to_string());

        Self {
            hello_data,
            game_id_prefix: "game-".to_string(),
            event_buffer: 256,
            command_buffer: 64,
            notice_buffer: 64,
        }
    }

    /// Set the hello payload sent to peers (default: `{}`).
    pub fn hello_data(mut self, data: impl Into<String>) -> Self {
        self.hello_data = data.into();
        self
    }

    /// Set the prefix for game ids made by `create_game` (default: `game-`).
    pub fn game_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.game_id_prefix = prefix.into();
        self
    }

    /// Set the transport-event queue capacity (default: 256).
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    /// Set the command queue capacity (default: 64).
    pub fn command_buffer(mut self, capacity: usize) -> Self {
        self.command_buffer = capacity;
        self
    }

    /// Set the outbound event channel capacity (default: 64).
    pub fn notice_buffer(mut self, capacity: usize) -> Self {
        self.notice_buffer = capacity;
        self
    }

    pub fn get_hello_data(&self) -> &str {
        &self.hello_data
    }

    pub fn get_game_id_prefix(&self) -> &str {
        &self.game_id_prefix
    }
}
