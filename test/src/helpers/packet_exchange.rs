use lockstep_client::ClientConfig;

use super::{TestClient, TestServer};

const MAX_ROUNDS: usize = 64;

/// Moves frames both ways until no side has anything left to say. Returns
/// the number of frames delivered.
pub fn exchange_packets(server: &mut TestServer, clients: &mut [&mut TestClient]) -> usize {
    let mut total = 0;
    for _ in 0..MAX_ROUNDS {
        let mut moved = 0;
        for client in clients.iter_mut() {
            let receiver = client.to_server.clone();
            moved += server.pump(&client.user_key, &receiver);
        }
        for client in clients.iter_mut() {
            moved += client.pump();
        }
        if moved == 0 {
            break;
        }
        total += moved;
    }
    total
}

/// Connects a new client and runs the handshake to completion
pub fn join(server: &mut TestServer, username: &str) -> TestClient {
    let config = ClientConfig {
        username: username.to_string(),
        ..ClientConfig::default()
    };
    join_with(server, config)
}

pub fn join_with(server: &mut TestServer, config: ClientConfig) -> TestClient {
    let mut client = server.open_client(config);
    client.client.connect().expect("connect failed");
    exchange_packets(server, &mut [&mut client]);
    client
}

/// Joins one client per name, in order, so the first is the reference player
pub fn join_all(server: &mut TestServer, usernames: &[&str]) -> Vec<TestClient> {
    usernames.iter().map(|name| join(server, name)).collect()
}
