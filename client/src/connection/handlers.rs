use std::sync::OnceLock;

use log::{debug, info, trace};

use lockstep_shared::{
    ByteReader, ClientProtocol, ClientUsername, ClientWorldReady, ConnectionError,
    ConnectionState, DispatchTable, Outbox, PacketId, Serde, ServerCommand, ServerDesynced,
    ServerDisconnect, ServerJoinData, ServerKeepAlive, ServerTimeControl, StateTables, Transition,
    PROTOCOL_VERSION,
};

use crate::context::ClientContext;

type HandlerResult = Result<Transition, ConnectionError>;

/// Dispatch tables for the client-side connection, built on first use
pub(crate) fn client_tables() -> &'static StateTables<ClientContext> {
    static TABLES: OnceLock<StateTables<ClientContext>> = OnceLock::new();
    TABLES.get_or_init(|| {
        StateTables::new()
            .with(
                ConnectionState::AwaitingSteamAccept,
                DispatchTable::new()
                    .on(PacketId::ServerSteamAccept, on_steam_accept)
                    .on(PacketId::ServerDisconnect, on_disconnect),
            )
            .with(
                ConnectionState::Joining,
                DispatchTable::new()
                    .on(PacketId::ServerProtocolOk, on_protocol_ok)
                    .on(PacketId::ServerJoinData, on_join_data)
                    .on(PacketId::ServerDisconnect, on_disconnect),
            )
            .with(
                ConnectionState::Playing,
                DispatchTable::new()
                    .on(PacketId::ServerCommand, on_command)
                    .on(PacketId::ServerSyncInfo, on_sync_info)
                    .on(PacketId::ServerDesynced, on_peer_desynced)
                    .on(PacketId::ServerTimeControl, on_time_control)
                    .on(PacketId::ServerKeepAlive, on_keep_alive)
                    .on(PacketId::ServerDisconnect, on_disconnect),
            )
    })
}

// Every state

fn on_disconnect(
    client: &mut ClientContext,
    _: &mut Outbox,
    reader: &mut ByteReader,
) -> HandlerResult {
    let ServerDisconnect { reason } = ServerDisconnect::de(reader)?;
    info!("disconnected by server: {}", reason);
    client.disconnect_reason = Some(reason);
    Ok(Transition::Enter(ConnectionState::Disconnected))
}

// AwaitingSteamAccept

fn on_steam_accept(
    _: &mut ClientContext,
    outbox: &mut Outbox,
    _: &mut ByteReader,
) -> HandlerResult {
    outbox.push(&ClientProtocol {
        version: PROTOCOL_VERSION,
    });
    Ok(Transition::Enter(ConnectionState::Joining))
}

// Joining

fn on_protocol_ok(
    client: &mut ClientContext,
    outbox: &mut Outbox,
    _: &mut ByteReader,
) -> HandlerResult {
    outbox.push(&ClientUsername {
        name: client.username.clone(),
    });
    Ok(Transition::Stay)
}

fn on_join_data(
    client: &mut ClientContext,
    outbox: &mut Outbox,
    reader: &mut ByteReader,
) -> HandlerResult {
    let ServerJoinData {
        player_id,
        session_seed,
        start_tick,
        world,
    } = ServerJoinData::de(reader)?;
    info!(
        "joined as player {} at tick {} ({} bytes of world data)",
        player_id,
        start_tick,
        world.len()
    );

    client.player_id = Some(player_id);
    client.session_seed = Some(session_seed);
    client.world = world;
    client.server_tick = start_tick;
    client.start_session(start_tick);
    client.events.push_connection(player_id);

    outbox.push(&ClientWorldReady);
    Ok(Transition::Enter(ConnectionState::Playing))
}

// Playing

fn on_command(
    client: &mut ClientContext,
    _: &mut Outbox,
    reader: &mut ByteReader,
) -> HandlerResult {
    let command = ServerCommand::de(reader)?;
    trace!("command from player {} for tick {}", command.player_id, command.tick);
    client.commands.push_back(command);
    Ok(Transition::Stay)
}

fn on_sync_info(
    client: &mut ClientContext,
    outbox: &mut Outbox,
    reader: &mut ByteReader,
) -> HandlerResult {
    let Some(session) = client.session.as_mut() else {
        debug!("ledger arrived before the session started");
        return Ok(Transition::Stay);
    };
    let outcome = session.receive_remote_ledger(reader)?;
    client.handle_outcome(outcome, outbox);
    Ok(Transition::Stay)
}

fn on_peer_desynced(
    client: &mut ClientContext,
    _: &mut Outbox,
    reader: &mut ByteReader,
) -> HandlerResult {
    let notice = ServerDesynced::de(reader)?;
    info!(
        "player {} desynced (last valid tick {:?})",
        notice.player_id, notice.last_valid_tick
    );
    client.events.push_peer_desync(notice);
    Ok(Transition::Stay)
}

fn on_time_control(
    client: &mut ClientContext,
    _: &mut Outbox,
    reader: &mut ByteReader,
) -> HandlerResult {
    let ServerTimeControl { tick } = ServerTimeControl::de(reader)?;
    client.server_tick = client.server_tick.max(tick);
    Ok(Transition::Stay)
}

fn on_keep_alive(
    client: &mut ClientContext,
    _: &mut Outbox,
    reader: &mut ByteReader,
) -> HandlerResult {
    let ServerKeepAlive { id } = ServerKeepAlive::de(reader)?;
    client.last_keep_alive = Some(id);
    Ok(Transition::Stay)
}
