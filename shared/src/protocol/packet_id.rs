// The closed catalog of packets. `Client*` packets travel client -> server
// and are dispatched by server-side states, `Server*` packets the reverse.

use crate::{protocol::ProtocolViolation, types::Delivery, HostType};

/// Highest id the 6-bit header field can carry
pub const MAX_PACKET_ID: u8 = 0b0011_1111;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketId {
    // Announces the packet catalog version the client speaks
    ClientProtocol = 0,
    // Display name the client wants to join with
    ClientUsername = 1,
    // Client has loaded the world and is ready to simulate
    ClientWorldReady = 2,
    // Opaque simulation command to be stamped and relayed to everyone
    ClientCommand = 3,
    // Client's finalized fingerprint ledger for one tick window
    ClientSyncInfo = 4,
    // Client detected a divergence
    ClientDesynced = 5,
    // Formatted trace window accompanying a divergence
    ClientTraces = 6,
    // Liveness chatter, unreliable
    ClientKeepAlive = 7,
    // Client asks to be let in through the platform handshake first
    ClientSteamRequest = 8,

    ServerSteamAccept = 32,
    ServerProtocolOk = 33,
    // Player id, session seed, start tick and world data. Usually fragmented.
    ServerJoinData = 34,
    // A command stamped with the tick it executes on
    ServerCommand = 35,
    // The reference player's ledger, relayed to everyone else
    ServerSyncInfo = 36,
    // Another player reported a divergence
    ServerDesynced = 37,
    // Authoritative tick pacing, unreliable
    ServerTimeControl = 38,
    // Liveness chatter, unreliable
    ServerKeepAlive = 39,
    ServerDisconnect = 40,
}

impl PacketId {
    pub const ALL: [PacketId; 18] = [
        PacketId::ClientProtocol,
        PacketId::ClientUsername,
        PacketId::ClientWorldReady,
        PacketId::ClientCommand,
        PacketId::ClientSyncInfo,
        PacketId::ClientDesynced,
        PacketId::ClientTraces,
        PacketId::ClientKeepAlive,
        PacketId::ClientSteamRequest,
        PacketId::ServerSteamAccept,
        PacketId::ServerProtocolOk,
        PacketId::ServerJoinData,
        PacketId::ServerCommand,
        PacketId::ServerSyncInfo,
        PacketId::ServerDesynced,
        PacketId::ServerTimeControl,
        PacketId::ServerKeepAlive,
        PacketId::ServerDisconnect,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Result<Self, ProtocolViolation> {
        let packet = match id {
            0 => PacketId::ClientProtocol,
            1 => PacketId::ClientUsername,
            2 => PacketId::ClientWorldReady,
            3 => PacketId::ClientCommand,
            4 => PacketId::ClientSyncInfo,
            5 => PacketId::ClientDesynced,
            6 => PacketId::ClientTraces,
            7 => PacketId::ClientKeepAlive,
            8 => PacketId::ClientSteamRequest,
            32 => PacketId::ServerSteamAccept,
            33 => PacketId::ServerProtocolOk,
            34 => PacketId::ServerJoinData,
            35 => PacketId::ServerCommand,
            36 => PacketId::ServerSyncInfo,
            37 => PacketId::ServerDesynced,
            38 => PacketId::ServerTimeControl,
            39 => PacketId::ServerKeepAlive,
            40 => PacketId::ServerDisconnect,
            _ => return Err(ProtocolViolation::UnknownPacketId { id }),
        };
        Ok(packet)
    }

    /// Whether payloads of this packet may be split into fragments
    pub fn is_fragmentable(self) -> bool {
        matches!(
            self,
            PacketId::ClientCommand
                | PacketId::ClientSyncInfo
                | PacketId::ClientTraces
                | PacketId::ServerJoinData
                | PacketId::ServerCommand
                | PacketId::ServerSyncInfo
        )
    }

    pub fn delivery(self) -> Delivery {
        match self {
            PacketId::ClientKeepAlive | PacketId::ServerTimeControl | PacketId::ServerKeepAlive => {
                Delivery::Unreliable
            }
            _ => Delivery::Reliable,
        }
    }

    /// Which side of a connection sends this packet
    pub fn sender(self) -> HostType {
        if self.id() < PacketId::ServerSteamAccept.id() {
            HostType::Client
        } else {
            HostType::Server
        }
    }
}
