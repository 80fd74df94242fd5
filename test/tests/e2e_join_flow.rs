use lockstep_client::{
    ClientConfig, ConnectEvent, DisconnectEvent as ClientDisconnectEvent, LockstepClientError,
    SyncedEvent,
};
use lockstep_server::{
    ConnectEvent as ServerConnectEvent, DisconnectEvent, ErrorEvent, LockstepServerError,
    ServerConfig,
};
use lockstep_shared::{
    BaseConnection, ByteReader, ClientCommand, ClientProtocol, ClientUsername, ConnectionConfig,
    ConnectionError, ConnectionState, Delivery, DispatchOutcome, FragFlag, FrameHeader, PacketId,
    ProtocolViolation, Serde, ServerDisconnect, SyncConfig, Transport, TransportError,
    MAX_USERNAME_LENGTH,
    PROTOCOL_VERSION,
};
use lockstep_test::{exchange_packets, init_logging, join, join_with, TestServer};

fn server_with_seed(seed: u64) -> TestServer {
    TestServer::new(ServerConfig {
        session_seed: Some(seed),
        world_data: b"initial world".to_vec(),
        ..ServerConfig::default()
    })
}

#[test]
fn client_reaches_playing_with_join_data() {
    init_logging();
    let mut server = server_with_seed(0xDEAD_BEEF);
    let mut alice = join(&mut server, "alice");

    assert_eq!(alice.client.state(), ConnectionState::Playing);
    assert_eq!(alice.client.player_id(), Some(0));
    assert_eq!(alice.client.session_seed(), Some(0xDEAD_BEEF));
    assert_eq!(alice.client.world_data(), b"initial world");
    assert!(alice.client.session().is_some());

    let mut client_events = alice.take_events();
    assert_eq!(client_events.read::<ConnectEvent>().collect::<Vec<_>>(), vec![0]);

    let mut server_events = server.take_events();
    assert_eq!(
        server_events.read::<ServerConnectEvent>().collect::<Vec<_>>(),
        vec![alice.user_key]
    );
    assert_eq!(server.server.username(&alice.user_key), Some("alice"));
    assert_eq!(
        server.server.user_state(&alice.user_key),
        Some(ConnectionState::Playing)
    );
    assert_eq!(server.server.reference_player(), Some(alice.user_key));
}

#[test]
fn steam_handshake_precedes_protocol_check() {
    init_logging();
    let mut server = server_with_seed(1);
    let config = ClientConfig {
        username: "bob".to_string(),
        steam_handshake: true,
        ..ClientConfig::default()
    };
    let mut bob = server.open_client(config);
    assert_eq!(bob.client.state(), ConnectionState::AwaitingSteamAccept);

    bob.client.connect().unwrap();
    exchange_packets(&mut server, &mut [&mut bob]);

    assert_eq!(bob.client.state(), ConnectionState::Playing);
    assert!(bob.errors.is_empty());

    let again = join_with(&mut server, ClientConfig::default());
    assert_eq!(again.client.state(), ConnectionState::Playing);
}

#[test]
fn session_seed_is_drawn_when_not_configured() {
    let mut server = TestServer::new(ServerConfig::default());
    let seed = server.server.session_seed();
    let alice = join(&mut server, "alice");
    assert_eq!(alice.client.session_seed(), Some(seed));
}

#[test]
fn wrong_protocol_version_is_refused_with_reason() {
    init_logging();
    let mut server = server_with_seed(1);
    let (user_key, raw_end, from_raw) = server.open_raw();
    let to_raw = raw_end.receiver();
    let mut raw = BaseConnection::new(Transport::from(raw_end), &ConnectionConfig::default());

    raw.send(&ClientProtocol { version: 99 }).unwrap();
    server.pump(&user_key, &from_raw);

    let (frame, _) = to_raw.recv().expect("disconnect reason");
    let (header, body) = FrameHeader::split(&frame).unwrap();
    assert_eq!(header.packet, PacketId::ServerDisconnect);
    let ServerDisconnect { reason } =
        ServerDisconnect::de(&mut ByteReader::from_slice(body)).unwrap();
    assert!(reason.contains("protocol"));

    assert!(!server.server.user_exists(&user_key));
    let mut events = server.take_events();
    assert_eq!(events.read::<DisconnectEvent>().count(), 1);
}

#[test]
fn reliable_packet_without_handler_closes_server_connection() {
    init_logging();
    let mut server = server_with_seed(1);
    let (user_key, raw_end, from_raw) = server.open_raw();
    let mut raw = BaseConnection::new(Transport::from(raw_end), &ConnectionConfig::default());

    // commands are only handled once playing
    raw.send(&ClientCommand { data: vec![1] }).unwrap();
    server.pump(&user_key, &from_raw);

    assert!(!server.server.user_exists(&user_key));
    let mut events = server.take_events();
    let errors: Vec<LockstepServerError> = events.read::<ErrorEvent>().collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        LockstepServerError::Connection {
            source: ConnectionError::Protocol(ProtocolViolation::NoHandler {
                packet: PacketId::ClientCommand,
                state: ConnectionState::Joining,
            }),
            ..
        }
    ));
    assert_eq!(events.read::<DisconnectEvent>().count(), 1);
}

#[test]
fn empty_username_is_refused() {
    init_logging();
    let mut server = server_with_seed(1);
    let (user_key, raw_end, from_raw) = server.open_raw();
    let to_raw = raw_end.receiver();
    let mut raw = BaseConnection::new(Transport::from(raw_end), &ConnectionConfig::default());

    raw.send(&ClientProtocol {
        version: PROTOCOL_VERSION,
    })
    .unwrap();
    raw.send(&ClientUsername {
        name: "   ".to_string(),
    })
    .unwrap();
    server.pump(&user_key, &from_raw);

    let packets: Vec<PacketId> = std::iter::from_fn(|| to_raw.recv())
        .map(|(frame, _)| FrameHeader::split(&frame).unwrap().0.packet)
        .collect();
    assert_eq!(packets, vec![PacketId::ServerProtocolOk, PacketId::ServerDisconnect]);
    assert!(!server.server.user_exists(&user_key));
}

#[test]
fn over_long_username_is_refused_with_reason() {
    init_logging();
    let mut server = server_with_seed(1);
    let mut dave = join(&mut server, &"d".repeat(MAX_USERNAME_LENGTH + 1));

    assert_eq!(dave.client.state(), ConnectionState::Disconnected);
    let reason = dave.client.disconnect_reason().expect("refusal carries a reason");
    assert!(reason.contains("invalid username"));
    assert!(dave.errors.is_empty());
    assert_eq!(dave.take_events().read::<ClientDisconnectEvent>().count(), 1);

    assert!(!server.server.user_exists(&dave.user_key));
    let mut events = server.take_events();
    assert!(!events.has::<ErrorEvent>());
    assert_eq!(events.read::<DisconnectEvent>().count(), 1);
}

#[test]
fn padded_username_is_trimmed_before_validation() {
    init_logging();
    let mut server = server_with_seed(1);
    let name = "p".repeat(MAX_USERNAME_LENGTH - 2);
    let erin = join(&mut server, &format!("  {}  ", name));

    assert_eq!(erin.client.state(), ConnectionState::Playing);
    assert_eq!(server.server.username(&erin.user_key), Some(name.as_str()));
    assert_eq!(erin.client.session().unwrap().username(), name);
}

#[test]
fn raised_username_limit_applies_to_join_and_ledgers() {
    init_logging();
    let sync = SyncConfig {
        max_username_length: 64,
        ..SyncConfig::default()
    };
    let mut server = TestServer::new(ServerConfig {
        sync: sync.clone(),
        ..ServerConfig::default()
    });
    let long_name = "l".repeat(40);
    let mut reference = join_with(
        &mut server,
        ClientConfig {
            username: long_name.clone(),
            sync: sync.clone(),
            ..ClientConfig::default()
        },
    );
    let mut frank = join_with(
        &mut server,
        ClientConfig {
            username: "frank".to_string(),
            sync,
            ..ClientConfig::default()
        },
    );
    assert_eq!(reference.client.state(), ConnectionState::Playing);
    assert_eq!(frank.client.state(), ConnectionState::Playing);
    assert_eq!(server.server.username(&reference.user_key), Some(long_name.as_str()));
    frank.take_events();

    reference.client.session_mut().unwrap().record_world_draw(1 << 40);
    frank.client.session_mut().unwrap().record_world_draw(1 << 40);
    reference.client.close_sync_window(10).unwrap();
    exchange_packets(&mut server, &mut [&mut reference, &mut frank]);
    frank.client.close_sync_window(10).unwrap();
    exchange_packets(&mut server, &mut [&mut reference, &mut frank]);

    assert!(frank.errors.is_empty());
    assert!(!server.take_events().has::<ErrorEvent>());
    assert_eq!(frank.take_events().read::<SyncedEvent>().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn server_disconnect_reaches_client() {
    init_logging();
    let mut server = server_with_seed(1);
    let mut alice = join(&mut server, "alice");
    alice.take_events();

    server.server.disconnect(&alice.user_key, "server closing").unwrap();
    alice.pump();

    assert_eq!(alice.client.state(), ConnectionState::Disconnected);
    assert_eq!(alice.client.disconnect_reason(), Some("server closing"));
    let mut events = alice.take_events();
    assert_eq!(
        events.read::<ClientDisconnectEvent>().collect::<Vec<_>>(),
        vec![Some("server closing".to_string())]
    );
}

#[test]
fn failed_command_send_disconnects_client() {
    init_logging();
    let mut server = server_with_seed(1);
    let mut alice = join(&mut server, "alice");
    alice.take_events();

    // the server drops the connection before the client hears about it
    server.server.disconnect(&alice.user_key, "gone").unwrap();

    let result = alice.client.send_command(vec![1, 2]);
    assert!(matches!(
        result,
        Err(LockstepClientError::Connection(ConnectionError::Transport(
            TransportError::Closed
        )))
    ));
    assert_eq!(alice.client.state(), ConnectionState::Disconnected);
    let mut events = alice.take_events();
    assert_eq!(
        events.read::<ClientDisconnectEvent>().collect::<Vec<_>>(),
        vec![None]
    );
    assert!(matches!(
        alice.client.send_command(vec![3]),
        Err(LockstepClientError::NotPlaying {
            state: ConnectionState::Disconnected
        })
    ));
}

#[test]
fn failed_ledger_send_disconnects_client() {
    init_logging();
    let mut server = server_with_seed(1);
    let mut alice = join(&mut server, "alice");
    alice.take_events();
    server.server.disconnect(&alice.user_key, "gone").unwrap();

    alice.client.session_mut().unwrap().record_world_draw(1 << 40);
    let result = alice.client.close_sync_window(10);

    assert!(matches!(
        result,
        Err(LockstepClientError::Connection(ConnectionError::Transport(
            TransportError::Closed
        )))
    ));
    assert_eq!(alice.client.state(), ConnectionState::Disconnected);
    assert_eq!(alice.take_events().read::<ClientDisconnectEvent>().count(), 1);
}

#[test]
fn server_refuses_past_max_players() {
    let mut server = TestServer::new(ServerConfig {
        max_players: 1,
        ..ServerConfig::default()
    });
    let _alice = join(&mut server, "alice");

    let (_, end) = lockstep_shared::LoopbackPipe::pair();
    let result = server.server.accept(end.into());
    assert!(matches!(
        result,
        Err(lockstep_server::LockstepServerError::ServerFull { max_players: 1 })
    ));
}

#[test]
fn unreliable_chatter_before_playing_is_dropped() {
    init_logging();
    let mut server = server_with_seed(1);
    let mut carol = server.open_client(ClientConfig::default());
    assert_eq!(carol.client.state(), ConnectionState::Joining);

    let header = FrameHeader::new(PacketId::ServerKeepAlive, FragFlag::None).to_byte();
    let keep_alive = [header, 7, 0, 0, 0];
    let outcome = carol.client.receive(&keep_alive, Delivery::Unreliable).unwrap();

    assert_eq!(outcome, DispatchOutcome::Dropped);
    assert_eq!(carol.client.state(), ConnectionState::Joining);
    assert_eq!(carol.client.last_keep_alive(), None);
}

#[test]
fn reliable_packet_without_handler_closes_client() {
    init_logging();
    let mut server = server_with_seed(1);
    let mut carol = server.open_client(ClientConfig::default());

    let header = FrameHeader::new(PacketId::ServerDesynced, FragFlag::None).to_byte();
    let notice = [header, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let result = carol.client.receive(&notice, Delivery::Reliable);

    assert!(result.is_err());
    assert_eq!(carol.client.state(), ConnectionState::Disconnected);
}
