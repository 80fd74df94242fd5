use lockstep_client::LockstepClientError;
use lockstep_server::{DisconnectEvent, ServerConfig};
use lockstep_shared::{ConnectionState, ServerCommand};
use lockstep_test::{exchange_packets, init_logging, join, join_all, TestServer};

#[test]
fn commands_are_stamped_and_broadcast_to_everyone() {
    init_logging();
    let mut server = TestServer::new(ServerConfig::default());
    let mut clients = join_all(&mut server, &["alice", "bob"]);
    server.server.advance_tick();
    server.server.advance_tick();

    clients[1].client.send_command(b"build wall".to_vec()).unwrap();
    {
        let [alice, bob] = &mut clients[..] else {
            unreachable!()
        };
        exchange_packets(&mut server, &mut [alice, bob]);
    }

    let expected = ServerCommand {
        tick: 2,
        player_id: 1,
        data: b"build wall".to_vec(),
    };
    for client in clients.iter_mut() {
        assert_eq!(client.client.take_commands(), vec![expected.clone()]);
        assert_eq!(client.client.server_tick(), 2);
    }
}

#[test]
fn commands_keep_send_order() {
    init_logging();
    let mut server = TestServer::new(ServerConfig::default());
    let mut alice = join(&mut server, "alice");

    for i in 0..5_u8 {
        alice.client.send_command(vec![i]).unwrap();
    }
    exchange_packets(&mut server, &mut [&mut alice]);

    let data: Vec<Vec<u8>> = alice
        .client
        .take_commands()
        .into_iter()
        .map(|command| command.data)
        .collect();
    assert_eq!(data, (0..5_u8).map(|i| vec![i]).collect::<Vec<_>>());
}

#[test]
fn keep_alive_is_echoed() {
    init_logging();
    let mut server = TestServer::new(ServerConfig::default());
    let mut alice = join(&mut server, "alice");

    alice.client.send_keep_alive(41).unwrap();
    exchange_packets(&mut server, &mut [&mut alice]);

    assert_eq!(alice.client.last_keep_alive(), Some(41));
}

#[test]
fn gameplay_requires_playing() {
    let mut server = TestServer::new(ServerConfig::default());
    let mut carol = server.open_client(Default::default());

    assert!(matches!(
        carol.client.send_command(vec![1]),
        Err(LockstepClientError::NotPlaying {
            state: ConnectionState::Joining
        })
    ));
    assert!(matches!(
        carol.client.close_sync_window(10),
        Err(LockstepClientError::NotPlaying { .. })
    ));
}

#[test]
fn reference_player_moves_on_when_it_leaves() {
    init_logging();
    let mut server = TestServer::new(ServerConfig::default());
    let clients = join_all(&mut server, &["alice", "bob", "carol"]);
    assert_eq!(server.server.reference_player(), Some(clients[0].user_key));

    server.server.disconnect(&clients[0].user_key, "bye").unwrap();

    assert_eq!(server.server.reference_player(), Some(clients[1].user_key));
    assert_eq!(server.server.users_count(), 2);
    let mut events = server.take_events();
    let disconnected: Vec<_> = events.read::<DisconnectEvent>().collect();
    assert_eq!(disconnected, vec![(clients[0].user_key, Some("alice".to_string()))]);
}
