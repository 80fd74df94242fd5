use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use super::{PacketSender, TransportError};
use crate::types::Delivery;

type FrameQueue = Arc<Mutex<VecDeque<(Box<[u8]>, Delivery)>>>;

/// In-memory, in-order pipe between two connection ends
pub struct LoopbackPipe;

impl LoopbackPipe {
    pub fn pair() -> (LoopbackEnd, LoopbackEnd) {
        let a_to_b: FrameQueue = Arc::new(Mutex::new(VecDeque::new()));
        let b_to_a: FrameQueue = Arc::new(Mutex::new(VecDeque::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let a = LoopbackEnd {
            outgoing: a_to_b.clone(),
            incoming: b_to_a.clone(),
            closed: closed.clone(),
        };
        let b = LoopbackEnd {
            outgoing: b_to_a,
            incoming: a_to_b,
            closed,
        };
        (a, b)
    }
}

/// One end of a [`LoopbackPipe`]
pub struct LoopbackEnd {
    outgoing: FrameQueue,
    incoming: FrameQueue,
    closed: Arc<AtomicBool>,
}

impl LoopbackEnd {
    /// A handle that drains the frames the other end sent to this one
    pub fn receiver(&self) -> LoopbackReceiver {
        LoopbackReceiver {
            incoming: self.incoming.clone(),
            closed: self.closed.clone(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl PacketSender for LoopbackEnd {
    fn send(&mut self, frame: &[u8], delivery: Delivery) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut queue = self
            .outgoing
            .lock()
            .map_err(|_| TransportError::SendFailed {
                reason: "loopback queue poisoned".to_string(),
            })?;
        queue.push_back((frame.into(), delivery));
        Ok(())
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Receiving half of a [`LoopbackEnd`]
#[derive(Clone)]
pub struct LoopbackReceiver {
    incoming: FrameQueue,
    closed: Arc<AtomicBool>,
}

impl LoopbackReceiver {
    /// Pops the oldest frame sent to this end, if any
    pub fn recv(&self) -> Option<(Box<[u8]>, Delivery)> {
        self.incoming.lock().ok()?.pop_front()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
