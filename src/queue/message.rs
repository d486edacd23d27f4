//! Single-slot outbound message buffers.

use heapless::Vec;

use crate::MESSAGE_CAPACITY;

/// Bytes of one outbound message.
pub type Message = Vec<u8, MESSAGE_CAPACITY>;

/// One-deep mailbox drained by the transport.
///
/// Writing over an undrained message replaces it; the caller learns about the
/// overwrite from the return value and decides how to report it.
#[derive(Debug, Clone, Default)]
pub struct MessageSlot {
    buf: Message,
    full: bool,
}

impl MessageSlot {
    /// An empty slot.
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            full: false,
        }
    }

    /// Whether a message is waiting.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Store a message, most-recent-wins.
    ///
    /// Returns true if an undrained message was overwritten. Bytes beyond
    /// [`MESSAGE_CAPACITY`] are cut off.
    pub fn write(&mut self, bytes: &[u8]) -> bool {
        let overwrote = self.full;
        self.buf.clear();
        let n = bytes.len().min(MESSAGE_CAPACITY);
        // cannot fail: n <= capacity and the buffer was just cleared
        let _ = self.buf.extend_from_slice(&bytes[..n]);
        self.full = true;
        overwrote
    }

    /// Take the waiting message, leaving the slot empty.
    pub fn drain(&mut self) -> Option<Message> {
        if !self.full {
            return None;
        }
        self.full = false;
        let out = self.buf.clone();
        self.buf.clear();
        Some(out)
    }
}
