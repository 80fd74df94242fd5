use thiserror::Error;

use lockstep_shared::ConnectionError;

use crate::user::UserKey;

#[derive(Debug, Error)]
pub enum LockstepServerError {
    #[error("connection to {user_key:?} failed: {source}")]
    Connection {
        user_key: UserKey,
        source: ConnectionError,
    },

    #[error("no connected user {user_key:?}")]
    UnknownUser { user_key: UserKey },

    #[error("server full ({max_players} players)")]
    ServerFull { max_players: usize },
}

impl LockstepServerError {
    pub(crate) fn connection(user_key: UserKey, source: ConnectionError) -> Self {
        Self::Connection { user_key, source }
    }
}
