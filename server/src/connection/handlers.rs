use std::sync::OnceLock;

use log::{debug, info, warn};

use lockstep_shared::{
    ByteReader, ClientCommand, ClientDesynced, ClientProtocol, ClientTraces, ClientUsername,
    ClientKeepAlive, ConnectionError, ConnectionState, DispatchTable, Ledger, Outbox, PacketId,
    ProtocolViolation, Serde, ServerDisconnect, ServerJoinData, ServerKeepAlive,
    ServerProtocolOk, ServerSteamAccept, StateTables, Transition, PROTOCOL_VERSION,
};

use crate::user::{ServerAction, UserContext};

type HandlerResult = Result<Transition, ConnectionError>;

/// Dispatch tables for server-side connections, built on first use
pub(crate) fn server_tables() -> &'static StateTables<UserContext> {
    static TABLES: OnceLock<StateTables<UserContext>> = OnceLock::new();
    TABLES.get_or_init(|| {
        StateTables::new()
            .with(
                ConnectionState::Joining,
                DispatchTable::new()
                    .on(PacketId::ClientSteamRequest, on_steam_request)
                    .on(PacketId::ClientProtocol, on_protocol)
                    .on(PacketId::ClientUsername, on_username)
                    .on(PacketId::ClientWorldReady, on_world_ready),
            )
            .with(
                ConnectionState::Playing,
                DispatchTable::new()
                    .on(PacketId::ClientCommand, on_command)
                    .on(PacketId::ClientSyncInfo, on_sync_info)
                    .on(PacketId::ClientDesynced, on_desynced)
                    .on(PacketId::ClientTraces, on_traces)
                    .on(PacketId::ClientKeepAlive, on_keep_alive),
            )
    })
}

// Joining

fn on_steam_request(
    user: &mut UserContext,
    outbox: &mut Outbox,
    _: &mut ByteReader,
) -> HandlerResult {
    debug!("{:?} requested steam handshake", user.key);
    outbox.push(&ServerSteamAccept);
    Ok(Transition::Stay)
}

fn on_protocol(_: &mut UserContext, outbox: &mut Outbox, reader: &mut ByteReader) -> HandlerResult {
    let ClientProtocol { version } = ClientProtocol::de(reader)?;
    if version != PROTOCOL_VERSION {
        outbox.push(&ServerDisconnect {
            reason: format!(
                "wrong protocol version: server speaks {}, client {}",
                PROTOCOL_VERSION, version
            ),
        });
        return Err(ProtocolViolation::UnsupportedProtocolVersion {
            remote: version,
            local: PROTOCOL_VERSION,
        }
        .into());
    }
    outbox.push(&ServerProtocolOk);
    Ok(Transition::Stay)
}

fn on_username(
    user: &mut UserContext,
    outbox: &mut Outbox,
    reader: &mut ByteReader,
) -> HandlerResult {
    let ClientUsername { name } = ClientUsername::de(reader)?;
    let name = name.trim().to_string();
    let max_length = user.join.max_username_length;
    if name.is_empty() || name.len() > max_length {
        debug!("{:?} refused: username of {} bytes", user.key, name.len());
        outbox.push(&ServerDisconnect {
            reason: format!("invalid username: must be 1 to {} bytes", max_length),
        });
        return Ok(Transition::Enter(ConnectionState::Disconnected));
    }

    info!("{:?} joining as {} (player {})", user.key, name, user.player_id);
    user.username = Some(name);
    outbox.push(&ServerJoinData {
        player_id: user.player_id,
        session_seed: user.join.session_seed,
        start_tick: user.tick,
        world: user.join.world.clone(),
    });
    Ok(Transition::Stay)
}

fn on_world_ready(
    user: &mut UserContext,
    outbox: &mut Outbox,
    _: &mut ByteReader,
) -> HandlerResult {
    if user.username.is_none() {
        // world data is only sent after a username
        outbox.push(&ServerDisconnect {
            reason: "world ready before join data".to_string(),
        });
        return Ok(Transition::Enter(ConnectionState::Disconnected));
    }
    user.actions.push(ServerAction::Joined);
    Ok(Transition::Enter(ConnectionState::Playing))
}

// Playing

fn on_command(user: &mut UserContext, _: &mut Outbox, reader: &mut ByteReader) -> HandlerResult {
    let ClientCommand { data } = ClientCommand::de(reader)?;
    user.actions.push(ServerAction::Command(data));
    Ok(Transition::Stay)
}

fn on_sync_info(user: &mut UserContext, _: &mut Outbox, reader: &mut ByteReader) -> HandlerResult {
    let bytes: Box<[u8]> = reader.read_to_end().into();
    // relayed verbatim, but only once it is known to decode
    Ledger::de_with(
        &mut ByteReader::from_slice(&bytes),
        user.join.max_username_length,
    )?;
    user.actions.push(ServerAction::SyncInfo(bytes));
    Ok(Transition::Stay)
}

fn on_desynced(user: &mut UserContext, _: &mut Outbox, reader: &mut ByteReader) -> HandlerResult {
    let ClientDesynced {
        last_valid_tick,
        divergence_index,
    } = ClientDesynced::de(reader)?;
    warn!(
        "player {} desynced (last valid tick {:?}, divergence at sample {})",
        user.player_id, last_valid_tick, divergence_index
    );
    user.actions.push(ServerAction::Desynced {
        last_valid_tick,
        divergence_index,
    });
    Ok(Transition::Stay)
}

fn on_traces(user: &mut UserContext, _: &mut Outbox, reader: &mut ByteReader) -> HandlerResult {
    let ClientTraces { text } = ClientTraces::de(reader)?;
    user.actions.push(ServerAction::Traces(text));
    Ok(Transition::Stay)
}

fn on_keep_alive(
    _: &mut UserContext,
    outbox: &mut Outbox,
    reader: &mut ByteReader,
) -> HandlerResult {
    let ClientKeepAlive { id } = ClientKeepAlive::de(reader)?;
    outbox.push(&ServerKeepAlive { id });
    Ok(Transition::Stay)
}
