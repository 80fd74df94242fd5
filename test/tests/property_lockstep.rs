/// PROPERTY-BASED TESTS: lockstep session invariants
///
/// Uses proptest to drive whole server/client sessions over loopback pipes.
///
/// Key invariants:
/// 1. Every player sees the same stamped command stream, in send order
/// 2. Identical simulations never report a divergence
/// 3. The first diverging world draw is the one reported
use proptest::prelude::*;

use lockstep_client::{ClientConfig, DesyncEvent, SyncedEvent};
use lockstep_server::ServerConfig;
use lockstep_shared::{ConnectionConfig, DesyncReason, ServerCommand, Tick};
use lockstep_test::{exchange_packets, join_with, TestClient, TestServer};

const WINDOW: Tick = 10;

fn small_fragments() -> ConnectionConfig {
    ConnectionConfig {
        fragment_size: 64,
        ..ConnectionConfig::default()
    }
}

fn session(names: &[&str]) -> (TestServer, Vec<TestClient>) {
    let mut server = TestServer::new(ServerConfig {
        connection: small_fragments(),
        ..ServerConfig::default()
    });
    let clients = names
        .iter()
        .map(|name| {
            let config = ClientConfig {
                connection: small_fragments(),
                username: name.to_string(),
                ..ClientConfig::default()
            };
            join_with(&mut server, config)
        })
        .collect();
    (server, clients)
}

fn exchange_all(server: &mut TestServer, clients: &mut [TestClient]) {
    let mut refs: Vec<&mut TestClient> = clients.iter_mut().collect();
    exchange_packets(server, &mut refs);
}

fn world_state(value: u32) -> u64 {
    u64::from(value) << 32
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_all_players_see_the_same_command_stream(
        commands in prop::collection::vec(
            (0usize..3, prop::collection::vec(any::<u8>(), 0..300)),
            1..20
        )
    ) {
        let (mut server, mut clients) = session(&["alice", "bob", "carol"]);

        let mut expected = Vec::new();
        for (sender, data) in &commands {
            clients[*sender].client.send_command(data.clone()).unwrap();
            exchange_all(&mut server, &mut clients);
            expected.push(ServerCommand {
                tick: 0,
                player_id: clients[*sender].client.player_id().unwrap(),
                data: data.clone(),
            });
        }

        for client in clients.iter_mut() {
            prop_assert!(client.errors.is_empty());
            prop_assert_eq!(client.client.take_commands(), expected.clone());
        }
    }

    #[test]
    fn prop_identical_simulations_stay_in_sync(
        windows in prop::collection::vec(prop::collection::vec(any::<u32>(), 0..30), 1..6)
    ) {
        let (mut server, mut clients) = session(&["alice", "bob"]);

        for (window, draws) in windows.iter().enumerate() {
            for client in clients.iter_mut() {
                let session = client.client.session_mut().unwrap();
                for draw in draws {
                    session.record_world_draw(world_state(*draw));
                }
                client.client.close_sync_window((window as Tick + 1) * WINDOW).unwrap();
            }
            exchange_all(&mut server, &mut clients);
        }

        let mut events = clients[1].take_events();
        prop_assert!(!events.has::<DesyncEvent>());
        let synced: Vec<Tick> = events.read::<SyncedEvent>().collect();
        let expected: Vec<Tick> = (0..windows.len() as Tick).map(|w| w * WINDOW).collect();
        prop_assert_eq!(synced, expected);
    }

    #[test]
    fn prop_first_diverging_draw_is_reported(
        draws in prop::collection::vec(any::<u32>(), 1..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut server, mut clients) = session(&["alice", "bob"]);
        let index = pick.index(draws.len());

        let mut altered = draws.clone();
        altered[index] = altered[index].wrapping_add(1);

        for (client, draws) in clients.iter_mut().zip([&draws, &altered]) {
            let session = client.client.session_mut().unwrap();
            for draw in draws.iter() {
                session.record_world_draw(world_state(*draw));
            }
            client.client.close_sync_window(WINDOW).unwrap();
        }
        exchange_all(&mut server, &mut clients);

        prop_assert!(clients[1].client.is_desynced());
        let mut events = clients[1].take_events();
        let (divergence, _) = events.read::<DesyncEvent>().next().unwrap();
        prop_assert_eq!(
            &divergence.reason,
            &DesyncReason::WorldFingerprints { index }
        );
        prop_assert_eq!(divergence.last_valid_tick, None);
    }
}
