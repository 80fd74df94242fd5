//! # Lockstep Client
//! Joins a lockstep session, records fingerprint ledgers for the local
//! simulation, and checks them against the reference player's ledgers
//! relayed by the server.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use lockstep_shared::{
        BacktraceCapture, ConnectionConfig, Delivery, Divergence, IncidentArchive,
        IncidentReport, IncidentSink, IncidentWorker, LoopbackEnd, LoopbackPipe,
        LoopbackReceiver, NoCapture, PacketSender, PlayerId, ServerCommand, Session,
        SnapshotProvider, StackCapture, SyncConfig, Tick, Transport,
    };
}

mod client;
mod client_config;
mod connection;
mod context;
mod error;
mod events;

pub use client::Client;
pub use client_config::ClientConfig;
pub use error::LockstepClientError;
pub use events::{
    ConnectEvent, DesyncEvent, DisconnectEvent, Event, Events, PeerDesyncedEvent, SyncedEvent,
};
