pub mod packet_exchange;
pub mod test_client;
pub mod test_server;

pub use packet_exchange::{exchange_packets, join, join_all, join_with};
pub use test_client::TestClient;
pub use test_server::TestServer;

/// Installs a logger for the current test binary. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
