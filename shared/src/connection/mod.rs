pub mod base_connection;
pub mod connection_config;
pub mod connection_state;
pub mod dispatch_table;
pub mod error;
pub mod fragment_receiver;
pub mod fragmenter;
pub mod frame_header;
pub mod peer_connection;
pub mod state_machine;

pub use connection_state::{ConnectionState, Transition};
