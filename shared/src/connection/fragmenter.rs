use crate::{
    connection::{
        connection_config::ConnectionConfig,
        error::FramingError,
        frame_header::{FragFlag, FrameHeader},
    },
    protocol::PacketId,
};

/// Frames a payload for transmission, splitting it into MORE/END fragments
/// when it exceeds the configured fragment size.
///
/// The first fragment carries a 4-byte total-length prefix after its header,
/// later fragments carry only payload bytes.
pub fn split_message(
    packet: PacketId,
    payload: &[u8],
    config: &ConnectionConfig,
) -> Result<Vec<Box<[u8]>>, FramingError> {
    if payload.len() > config.max_message_size {
        return Err(FramingError::OversizedMessage {
            size: payload.len(),
            limit: config.max_message_size,
        });
    }

    let fragment_size = config.fragment_size.max(1);

    if payload.len() <= fragment_size {
        let mut frame = Vec::with_capacity(payload.len() + 1);
        frame.push(FrameHeader::new(packet, FragFlag::None).to_byte());
        frame.extend_from_slice(payload);
        return Ok(vec![frame.into_boxed_slice()]);
    }

    if !packet.is_fragmentable() {
        return Err(FramingError::NotFragmentable {
            packet,
            size: payload.len(),
            limit: fragment_size,
        });
    }

    // max_message_size is far below i32::MAX in any sane config, but the
    // prefix must never wrap
    let total = i32::try_from(payload.len()).map_err(|_| FramingError::OversizedMessage {
        size: payload.len(),
        limit: i32::MAX as usize,
    })?;

    let chunk_count = payload.len().div_ceil(fragment_size);
    let mut frames = Vec::with_capacity(chunk_count);
    for (index, chunk) in payload.chunks(fragment_size).enumerate() {
        let flag = if index + 1 == chunk_count {
            FragFlag::End
        } else {
            FragFlag::More
        };
        let mut frame = Vec::with_capacity(chunk.len() + 5);
        frame.push(FrameHeader::new(packet, flag).to_byte());
        if index == 0 {
            frame.extend_from_slice(&total.to_le_bytes());
        }
        frame.extend_from_slice(chunk);
        frames.push(frame.into_boxed_slice());
    }

    Ok(frames)
}
