use crate::types::HostType;

/// Where a connection is in its lifecycle. Which states exist depends on the
/// role of the side holding the connection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    // Client only: waiting for the platform handshake to be accepted
    AwaitingSteamAccept,
    // Protocol check, username, world download
    Joining,
    // In the lockstep session
    Playing,
    // Terminal
    Disconnected,
}

impl ConnectionState {
    /// Non-terminal states a connection of the given role can be in
    pub fn states_for(host_type: HostType) -> &'static [ConnectionState] {
        match host_type {
            HostType::Client => &[
                ConnectionState::AwaitingSteamAccept,
                ConnectionState::Joining,
                ConnectionState::Playing,
            ],
            HostType::Server => &[ConnectionState::Joining, ConnectionState::Playing],
        }
    }

    /// Whether a connection of the given role may move from `self` to `next`
    pub fn can_enter(self, next: ConnectionState, host_type: HostType) -> bool {
        if next == ConnectionState::Disconnected {
            return true;
        }
        matches!(
            (host_type, self, next),
            (
                HostType::Client,
                ConnectionState::AwaitingSteamAccept,
                ConnectionState::Joining
            ) | (HostType::Client, ConnectionState::Joining, ConnectionState::Playing)
                | (HostType::Server, ConnectionState::Joining, ConnectionState::Playing)
        )
    }
}

/// What a packet handler asks the state machine to do after it returns
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Enter(ConnectionState),
}
