/// Simulation tick number
pub type Tick = i32;
/// Identifier of a sub-simulation (e.g. a map) with its own fingerprint stream
pub type RegionId = i32;
/// Identifier the server assigns to each player
pub type PlayerId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    Server,
    Client,
}

/// Delivery guarantee a message was sent or received with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Delivery {
    Reliable,
    Unreliable,
}

impl Delivery {
    pub fn is_reliable(self) -> bool {
        self == Delivery::Reliable
    }
}
