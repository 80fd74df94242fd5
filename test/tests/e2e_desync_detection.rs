use lockstep_client::{DesyncEvent, PeerDesyncedEvent, SyncedEvent};
use lockstep_server::{DesyncEvent as ServerDesyncEvent, ServerConfig, TracesEvent};
use lockstep_shared::{
    ByteReader, DesyncReason, FileSink, IncidentArchive, IncidentWorker, Ledger, Serde, Tick,
};
use lockstep_test::{exchange_packets, init_logging, join_all, TestClient, TestServer};

const WINDOW: Tick = 10;

fn setup() -> (TestServer, TestClient, TestClient) {
    init_logging();
    let mut server = TestServer::new(ServerConfig::default());
    let mut clients = join_all(&mut server, &["alice", "bob"]);
    let mut bob = clients.pop().unwrap();
    let mut alice = clients.pop().unwrap();
    alice.take_events();
    bob.take_events();
    server.take_events();
    (server, alice, bob)
}

/// Runs one window on both clients, with `alice` (the reference player)
/// closing first
fn simulate_window(
    server: &mut TestServer,
    alice: &mut TestClient,
    bob: &mut TestClient,
    next_tick: Tick,
    alice_draws: &[u64],
    bob_draws: &[u64],
) {
    for draw in alice_draws {
        alice.client.session_mut().unwrap().record_world_draw(*draw);
    }
    for draw in bob_draws {
        bob.client.session_mut().unwrap().record_world_draw(*draw);
    }
    alice.client.close_sync_window(next_tick).unwrap();
    exchange_packets(server, &mut [&mut *alice, &mut *bob]);
    bob.client.close_sync_window(next_tick).unwrap();
    exchange_packets(server, &mut [&mut *alice, &mut *bob]);
}

#[test]
fn matching_windows_advance_the_watermark() {
    let (mut server, mut alice, mut bob) = setup();

    simulate_window(&mut server, &mut alice, &mut bob, WINDOW, &[1 << 40], &[1 << 40]);
    simulate_window(&mut server, &mut alice, &mut bob, 2 * WINDOW, &[3 << 40], &[3 << 40]);

    let mut events = bob.take_events();
    assert_eq!(events.read::<SyncedEvent>().collect::<Vec<_>>(), vec![0, WINDOW]);
    assert!(!events.has::<DesyncEvent>());
    assert!(!bob.client.is_desynced());
    assert_eq!(bob.client.session().unwrap().last_valid_tick(), Some(WINDOW));

    // the reference player never receives ledgers to compare against
    assert!(!alice.take_events().has::<SyncedEvent>());
}

#[test]
fn divergence_is_reported_everywhere() {
    let (mut server, mut alice, mut bob) = setup();

    simulate_window(&mut server, &mut alice, &mut bob, WINDOW, &[1 << 40], &[1 << 40]);
    bob.take_events();
    simulate_window(&mut server, &mut alice, &mut bob, 2 * WINDOW, &[5 << 40], &[6 << 40]);

    assert!(bob.client.is_desynced());
    let mut events = bob.take_events();
    let desyncs: Vec<_> = events.read::<DesyncEvent>().collect();
    assert_eq!(desyncs.len(), 1);
    let (divergence, report) = &desyncs[0];
    assert_eq!(divergence.reason, DesyncReason::WorldFingerprints { index: 0 });
    assert_eq!(divergence.last_valid_tick, Some(0));
    assert_eq!(divergence.local.start_tick(), WINDOW);
    assert_eq!(divergence.remote.username(), "alice");
    assert!(report.summary.contains("Last valid tick: 0"));

    let mut server_events = server.take_events();
    let reports: Vec<_> = server_events.read::<ServerDesyncEvent>().collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].user_key, bob.user_key);
    assert_eq!(reports[0].player_id, 1);
    assert_eq!(reports[0].last_valid_tick, Some(0));
    let traces: Vec<_> = server_events.read::<TracesEvent>().collect();
    assert_eq!(traces.len(), 1);
    assert!(traces[0].1.contains("Local traces (bob"));

    let mut alice_events = alice.take_events();
    let notices: Vec<_> = alice_events.read::<PeerDesyncedEvent>().collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].player_id, 1);
}

#[test]
fn desync_latches_until_resync() {
    let (mut server, mut alice, mut bob) = setup();

    simulate_window(&mut server, &mut alice, &mut bob, WINDOW, &[1 << 40], &[2 << 40]);
    assert!(bob.client.is_desynced());
    bob.take_events();

    // later windows are ignored while desynced
    simulate_window(&mut server, &mut alice, &mut bob, 2 * WINDOW, &[], &[]);
    assert!(bob.take_events().is_empty());

    bob.client.resync(2 * WINDOW).unwrap();
    alice.client.resync(2 * WINDOW).unwrap();
    assert!(!bob.client.is_desynced());

    simulate_window(&mut server, &mut alice, &mut bob, 3 * WINDOW, &[7 << 40], &[7 << 40]);
    let mut events = bob.take_events();
    assert_eq!(events.read::<SyncedEvent>().collect::<Vec<_>>(), vec![2 * WINDOW]);
}

#[test]
fn bob_closing_first_still_pairs() {
    let (mut server, mut alice, mut bob) = setup();

    bob.client.session_mut().unwrap().record_command_draw(9 << 40);
    alice.client.session_mut().unwrap().record_command_draw(9 << 40);
    bob.client.close_sync_window(WINDOW).unwrap();
    alice.client.close_sync_window(WINDOW).unwrap();
    exchange_packets(&mut server, &mut [&mut alice, &mut bob]);

    let mut events = bob.take_events();
    assert_eq!(events.read::<SyncedEvent>().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn trace_only_divergence_carries_bisection() {
    let (mut server, mut alice, mut bob) = setup();

    for step in 0..60 {
        let alice_note = format!("step {}", step);
        let bob_note = if step < 45 {
            alice_note.clone()
        } else {
            format!("other {}", step)
        };
        alice
            .client
            .session_mut()
            .unwrap()
            .capture_checkpoint(Some(&alice_note), false);
        bob.client
            .session_mut()
            .unwrap()
            .capture_checkpoint(Some(&bob_note), false);
    }
    simulate_window(&mut server, &mut alice, &mut bob, WINDOW, &[], &[]);

    let mut events = bob.take_events();
    let (divergence, report) = events.read::<DesyncEvent>().next().expect("desync");
    assert_eq!(divergence.reason, DesyncReason::StackHashes { index: 45 });
    assert_eq!(divergence.divergence_index, 45);
    // bob's own window: samples 5..=59 with the marker before sample 45
    let lines: Vec<&str> = report.local_traces.lines().collect();
    assert_eq!(lines.first(), Some(&"[5] step 5"));
    assert_eq!(lines[40], "==> divergence <==");
    assert_eq!(lines[41], "[45] other 45");
    assert_eq!(lines.last(), Some(&"[59] other 59"));
}

#[test]
fn incident_archive_is_written_in_background() {
    let (mut server, mut alice, mut bob) = setup();
    simulate_window(&mut server, &mut alice, &mut bob, WINDOW, &[1 << 40], &[2 << 40]);

    let mut events = bob.take_events();
    let (divergence, report) = events.read::<DesyncEvent>().next().expect("desync");

    let path =
        std::env::temp_dir().join(format!("lockstep-e2e-incident-{}.bin", std::process::id()));
    let job = IncidentWorker::spawn(Box::new(FileSink::new(&path)), report.to_archive()).unwrap();
    job.wait().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    let archive = IncidentArchive::from_bytes(&bytes).unwrap();
    let remote = Ledger::de(&mut ByteReader::from_slice(
        archive.get("remote_ledger.bin").unwrap(),
    ))
    .unwrap();
    assert_eq!(remote.check_for_desync(&divergence.remote), Ok(()));
    assert!(archive.get("info.txt").is_some());
}
