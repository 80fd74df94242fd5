use thiserror::Error;

use lockstep_shared::{ConnectionError, ConnectionState};

#[derive(Debug, Error)]
pub enum LockstepClientError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("not playing (connection is {state:?})")]
    NotPlaying { state: ConnectionState },

    #[error("connect() was already called")]
    AlreadyConnecting,
}
