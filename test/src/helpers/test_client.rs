use lockstep_client::{Client, ClientConfig, Events, LockstepClientError};
use lockstep_server::UserKey;
use lockstep_shared::{LoopbackEnd, LoopbackReceiver, NoCapture};

/// A [`Client`] on one end of a loopback pipe, plus the server's view of the
/// other end
pub struct TestClient {
    pub client: Client,
    pub user_key: UserKey,
    /// Frames the server sent to this client
    to_client: LoopbackReceiver,
    /// Frames this client sent to the server
    pub(crate) to_server: LoopbackReceiver,
    pub errors: Vec<LockstepClientError>,
}

impl TestClient {
    pub(crate) fn new(
        config: ClientConfig,
        end: LoopbackEnd,
        to_server: LoopbackReceiver,
        user_key: UserKey,
    ) -> Self {
        let to_client = end.receiver();
        Self {
            client: Client::with_stack_capture(config, end.into(), Box::new(NoCapture)),
            user_key,
            to_client,
            to_server,
            errors: Vec::new(),
        }
    }

    /// Feeds every frame the server sent to the client
    pub fn pump(&mut self) -> usize {
        let mut moved = 0;
        while let Some((frame, delivery)) = self.to_client.recv() {
            moved += 1;
            if let Err(error) = self.client.receive(&frame, delivery) {
                self.errors.push(error);
            }
        }
        moved
    }

    pub fn take_events(&mut self) -> Events {
        self.client.take_events()
    }
}
