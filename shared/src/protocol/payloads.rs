use lockstep_serde::{ByteReader, ByteWriter, Serde, SerdeErr, DEFAULT_MAX_STRING_LENGTH};

use crate::{
    constants::MAX_FRAGMENTED_MESSAGE_SIZE,
    protocol::PacketId,
    sync::Ledger,
    types::{PlayerId, Tick},
};

/// A payload type bound to exactly one entry of the packet catalog
pub trait Packet: Serde {
    const ID: PacketId;

    fn to_payload(&self) -> Box<[u8]> {
        let mut writer = ByteWriter::new();
        self.ser(&mut writer);
        writer.to_bytes()
    }
}

fn write_tick_opt(writer: &mut ByteWriter, tick: Option<Tick>) {
    writer.write_bool(tick.is_some());
    writer.write_i32(tick.unwrap_or_default());
}

fn read_tick_opt(reader: &mut ByteReader) -> Result<Option<Tick>, SerdeErr> {
    let is_some = reader.read_bool()?;
    let tick = reader.read_i32()?;
    Ok(is_some.then_some(tick))
}

macro_rules! empty_packet {
    ($name:ident, $id:expr) => {
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl Serde for $name {
            fn ser(&self, _: &mut ByteWriter) {}

            fn de(_: &mut ByteReader) -> Result<Self, SerdeErr> {
                Ok(Self)
            }
        }

        impl Packet for $name {
            const ID: PacketId = $id;
        }
    };
}

empty_packet!(ClientWorldReady, PacketId::ClientWorldReady);
empty_packet!(ClientSteamRequest, PacketId::ClientSteamRequest);
empty_packet!(ServerSteamAccept, PacketId::ServerSteamAccept);
empty_packet!(ServerProtocolOk, PacketId::ServerProtocolOk);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientProtocol {
    pub version: u32,
}

impl Serde for ClientProtocol {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.version);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            version: reader.read_u32()?,
        })
    }
}

impl Packet for ClientProtocol {
    const ID: PacketId = PacketId::ClientProtocol;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientUsername {
    pub name: String,
}

impl Serde for ClientUsername {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_string(&self.name);
    }

    /// Bounded only by the codec; the server applies its configured limit
    /// after trimming
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            name: reader.read_string_max(DEFAULT_MAX_STRING_LENGTH)?,
        })
    }
}

impl Packet for ClientUsername {
    const ID: PacketId = PacketId::ClientUsername;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCommand {
    pub data: Vec<u8>,
}

impl Serde for ClientCommand {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_prefixed_bytes(&self.data);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            data: reader.read_prefixed_bytes(MAX_FRAGMENTED_MESSAGE_SIZE)?,
        })
    }
}

impl Packet for ClientCommand {
    const ID: PacketId = PacketId::ClientCommand;
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientSyncInfo {
    pub ledger: Ledger,
}

impl Serde for ClientSyncInfo {
    fn ser(&self, writer: &mut ByteWriter) {
        self.ledger.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            ledger: Ledger::de(reader)?,
        })
    }
}

impl Packet for ClientSyncInfo {
    const ID: PacketId = PacketId::ClientSyncInfo;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientDesynced {
    pub last_valid_tick: Option<Tick>,
    pub divergence_index: u32,
}

impl Serde for ClientDesynced {
    fn ser(&self, writer: &mut ByteWriter) {
        write_tick_opt(writer, self.last_valid_tick);
        writer.write_u32(self.divergence_index);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            last_valid_tick: read_tick_opt(reader)?,
            divergence_index: reader.read_u32()?,
        })
    }
}

impl Packet for ClientDesynced {
    const ID: PacketId = PacketId::ClientDesynced;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientTraces {
    pub text: String,
}

impl Serde for ClientTraces {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_string(&self.text);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            text: reader.read_string_max(MAX_FRAGMENTED_MESSAGE_SIZE)?,
        })
    }
}

impl Packet for ClientTraces {
    const ID: PacketId = PacketId::ClientTraces;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientKeepAlive {
    pub id: u32,
}

impl Serde for ClientKeepAlive {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.id);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: reader.read_u32()?,
        })
    }
}

impl Packet for ClientKeepAlive {
    const ID: PacketId = PacketId::ClientKeepAlive;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerJoinData {
    pub player_id: PlayerId,
    pub session_seed: u64,
    pub start_tick: Tick,
    pub world: Vec<u8>,
}

impl Serde for ServerJoinData {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.player_id);
        writer.write_u64(self.session_seed);
        writer.write_i32(self.start_tick);
        writer.write_prefixed_bytes(&self.world);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            player_id: reader.read_u32()?,
            session_seed: reader.read_u64()?,
            start_tick: reader.read_i32()?,
            world: reader.read_prefixed_bytes(MAX_FRAGMENTED_MESSAGE_SIZE)?,
        })
    }
}

impl Packet for ServerJoinData {
    const ID: PacketId = PacketId::ServerJoinData;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerCommand {
    pub tick: Tick,
    pub player_id: PlayerId,
    pub data: Vec<u8>,
}

impl Serde for ServerCommand {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.tick);
        writer.write_u32(self.player_id);
        writer.write_prefixed_bytes(&self.data);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            tick: reader.read_i32()?,
            player_id: reader.read_u32()?,
            data: reader.read_prefixed_bytes(MAX_FRAGMENTED_MESSAGE_SIZE)?,
        })
    }
}

impl Packet for ServerCommand {
    const ID: PacketId = PacketId::ServerCommand;
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServerSyncInfo {
    pub ledger: Ledger,
}

impl Serde for ServerSyncInfo {
    fn ser(&self, writer: &mut ByteWriter) {
        self.ledger.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            ledger: Ledger::de(reader)?,
        })
    }
}

impl Packet for ServerSyncInfo {
    const ID: PacketId = PacketId::ServerSyncInfo;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerDesynced {
    pub player_id: PlayerId,
    pub last_valid_tick: Option<Tick>,
}

impl Serde for ServerDesynced {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.player_id);
        write_tick_opt(writer, self.last_valid_tick);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            player_id: reader.read_u32()?,
            last_valid_tick: read_tick_opt(reader)?,
        })
    }
}

impl Packet for ServerDesynced {
    const ID: PacketId = PacketId::ServerDesynced;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerTimeControl {
    pub tick: Tick,
}

impl Serde for ServerTimeControl {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.tick);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            tick: reader.read_i32()?,
        })
    }
}

impl Packet for ServerTimeControl {
    const ID: PacketId = PacketId::ServerTimeControl;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerKeepAlive {
    pub id: u32,
}

impl Serde for ServerKeepAlive {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.id);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: reader.read_u32()?,
        })
    }
}

impl Packet for ServerKeepAlive {
    const ID: PacketId = PacketId::ServerKeepAlive;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerDisconnect {
    pub reason: String,
}

impl Serde for ServerDisconnect {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_string(&self.reason);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            reason: reader.read_string_max(DEFAULT_MAX_STRING_LENGTH)?,
        })
    }
}

impl Packet for ServerDisconnect {
    const ID: PacketId = PacketId::ServerDisconnect;
}
