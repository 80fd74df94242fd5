//! # Lockstep Server
//! Accepts players into a deterministic lockstep session, stamps and relays
//! their commands, and relays the reference player's fingerprint ledgers so
//! every other client can check itself for desyncs.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use lockstep_shared::{
        ConnectionConfig, Delivery, LoopbackEnd, LoopbackPipe, LoopbackReceiver, PacketSender,
        PlayerId, RelaySender, SyncConfig, Tick, Transport, TransportError,
    };
}

mod connection;
mod error;
mod events;
mod server;
mod user;

pub use error::LockstepServerError;
pub use events::{
    ConnectEvent, DesyncEvent, DesyncReport, DisconnectEvent, ErrorEvent, Event, Events,
    TracesEvent,
};
pub use server::{Server, ServerConfig};
pub use user::UserKey;
