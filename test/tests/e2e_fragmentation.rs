use lockstep_client::{ClientConfig, LockstepClientError};
use lockstep_server::ServerConfig;
use lockstep_shared::{ConnectionConfig, ConnectionState, ErrorKind, ServerCommand};
use lockstep_test::{exchange_packets, init_logging, join, join_with, TestServer};

fn world(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn large_world_data_is_fragmented_and_reassembled() {
    init_logging();
    let world_data = world(180_000);
    let mut server = TestServer::new(ServerConfig {
        world_data: world_data.clone(),
        ..ServerConfig::default()
    });
    let alice = join(&mut server, "alice");

    assert_eq!(alice.client.state(), ConnectionState::Playing);
    assert_eq!(alice.client.world_data(), world_data.as_slice());
}

#[test]
fn small_fragment_ceiling_on_both_sides() {
    init_logging();
    let connection = ConnectionConfig {
        fragment_size: 100,
        ..ConnectionConfig::default()
    };
    let mut server = TestServer::new(ServerConfig {
        connection: connection.clone(),
        world_data: world(1_000),
        ..ServerConfig::default()
    });
    let mut alice = join_with(
        &mut server,
        ClientConfig {
            connection,
            username: "alice".to_string(),
            ..ClientConfig::default()
        },
    );
    assert_eq!(alice.client.world_data(), world(1_000).as_slice());

    alice.client.send_command(world(350)).unwrap();
    exchange_packets(&mut server, &mut [&mut alice]);

    assert_eq!(
        alice.client.take_commands(),
        vec![ServerCommand {
            tick: 0,
            player_id: 0,
            data: world(350),
        }]
    );
}

#[test]
fn oversized_reassembly_closes_the_client() {
    init_logging();
    let mut server = TestServer::new(ServerConfig {
        world_data: world(5_000),
        connection: ConnectionConfig {
            fragment_size: 1_000,
            ..ConnectionConfig::default()
        },
        ..ServerConfig::default()
    });
    let mut alice = join_with(
        &mut server,
        ClientConfig {
            connection: ConnectionConfig {
                fragment_size: 1_000,
                max_message_size: 2_000,
            },
            ..ClientConfig::default()
        },
    );

    assert_eq!(alice.client.state(), ConnectionState::Disconnected);
    // later fragments only find the connection closed
    let kinds: Vec<ErrorKind> = alice
        .errors
        .iter()
        .map(|error| match error {
            LockstepClientError::Connection(error) => error.kind(),
            other => panic!("unexpected error {:?}", other),
        })
        .collect();
    assert_eq!(kinds[0], ErrorKind::OversizedMessage);
    assert!(kinds[1..].iter().all(|kind| *kind == ErrorKind::Disconnected));
}
