use lockstep_server::{Events, Server, ServerConfig, UserKey};
use lockstep_shared::{LoopbackPipe, LoopbackReceiver};

use super::TestClient;
use lockstep_client::ClientConfig;

/// A [`Server`] whose users are connected through in-memory pipes
pub struct TestServer {
    pub server: Server,
}

impl TestServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            server: Server::new(config),
        }
    }

    /// Opens a pipe, registers the server end and wraps the other end in a
    /// client. Nothing is sent until the client connects.
    pub fn open_client(&mut self, config: ClientConfig) -> TestClient {
        let (server_end, client_end) = LoopbackPipe::pair();
        let from_client = server_end.receiver();
        let user_key = self
            .server
            .accept(server_end.into())
            .expect("server refused test client");
        TestClient::new(config, client_end, from_client, user_key)
    }

    /// Opens a raw pipe without a client on the other side
    pub fn open_raw(&mut self) -> (UserKey, lockstep_shared::LoopbackEnd, LoopbackReceiver) {
        let (server_end, raw_end) = LoopbackPipe::pair();
        let from_raw = server_end.receiver();
        let user_key = self
            .server
            .accept(server_end.into())
            .expect("server refused raw connection");
        (user_key, raw_end, from_raw)
    }

    /// Feeds every pending frame from `receiver` to the server
    pub fn pump(&mut self, user_key: &UserKey, receiver: &LoopbackReceiver) -> usize {
        let mut moved = 0;
        while let Some((frame, delivery)) = receiver.recv() {
            moved += 1;
            if !self.server.user_exists(user_key) {
                continue;
            }
            let _ = self.server.receive(user_key, &frame, delivery);
        }
        moved
    }

    pub fn take_events(&mut self) -> Events {
        self.server.take_events()
    }
}
