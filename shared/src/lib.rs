//! # Lockstep Shared
//! Framing, connection state machines and desync detection shared between
//! lockstep-server & lockstep-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub use lockstep_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

mod connection;
mod constants;
mod incident;
mod protocol;
mod session;
mod sync;
mod transport;
mod types;

pub use connection::{
    base_connection::BaseConnection,
    connection_config::ConnectionConfig,
    connection_state::{ConnectionState, Transition},
    dispatch_table::{DispatchTable, Outbox, PacketHandler, StateTables},
    error::{ConnectionError, ErrorKind, FramingError},
    fragment_receiver::FragmentReceiver,
    fragmenter::split_message,
    frame_header::{FragFlag, FrameHeader},
    peer_connection::PeerConnection,
    state_machine::{DispatchOutcome, IncomingMessage, StateMachine},
};
pub use constants::{
    FRAGMENT_SIZE, MAX_FRAGMENTED_MESSAGE_SIZE, MAX_KNOWN_LEDGERS, MAX_USERNAME_LENGTH,
    TRACE_WINDOW_RADIUS,
};
pub use incident::{
    ArchiveEntry, FileSink, IncidentArchive, IncidentAssembler, IncidentError, IncidentJob,
    IncidentReport, IncidentSink, IncidentWorker, SnapshotProvider, MAX_ARCHIVE_ENTRY_SIZE,
};
pub use protocol::{
    ClientCommand, ClientDesynced, ClientKeepAlive, ClientProtocol, ClientSteamRequest,
    ClientSyncInfo, ClientTraces, ClientUsername, ClientWorldReady, Packet, PacketId,
    ProtocolViolation, ServerCommand, ServerDesynced, ServerDisconnect, ServerJoinData,
    ServerKeepAlive, ServerProtocolOk, ServerSteamAccept, ServerSyncInfo, ServerTimeControl,
    MAX_PACKET_ID, PROTOCOL_VERSION,
};
pub use session::{ClosedWindow, Session};
pub use sync::{
    divergence_index, divergence_window, fingerprint, format_trace_window, stack_hash,
    BacktraceCapture, DesyncReason, Divergence, Ledger, LedgerRecorder, LedgerRole, NoCapture,
    RegionFingerprints, StackCapture, StackSample, SyncConfig, SyncCoordinator, SyncObserver,
    SyncOutcome, TraceWindow,
};
pub use transport::{
    split_relayed, LoopbackEnd, LoopbackPipe, LoopbackReceiver, PacketSender, RelaySender,
    Transport, TransportError,
};
pub use types::{Delivery, HostType, PlayerId, RegionId, Tick};
