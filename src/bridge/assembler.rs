//! Frame reassembly
//!
//! Rebuilds length-prefixed frames from a byte stream that may be split at
//! any boundary.

use bytes::{Bytes, BytesMut};

/// Observable reassembly state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyState {
    /// No partial frame buffered
    Idle,
    /// One length byte buffered, waiting for the second
    AwaitingSecondLengthByte,
    /// Frame length known, `remain` payload bytes still missing
    AwaitingPayload {
        /// Payload bytes still missing
        remain: usize,
    },
}

#[derive(Debug)]
enum State {
    Idle,
    LengthByte(u8),
    Payload { target: usize },
}

/// Reassembly state machine for one tunnel stream
///
/// Never shared: each pooled connection owns its own assembler.
#[derive(Debug)]
pub struct FrameAssembler {
    state: State,
    payload: BytesMut,
}

impl FrameAssembler {
    /// Create an idle assembler
    pub fn new() -> Self {
        FrameAssembler {
            state: State::Idle,
            payload: BytesMut::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> ReassemblyState {
        match self.state {
            State::Idle => ReassemblyState::Idle,
            State::LengthByte(_) => ReassemblyState::AwaitingSecondLengthByte,
            State::Payload { target } => ReassemblyState::AwaitingPayload {
                remain: target - self.payload.len(),
            },
        }
    }

    /// Consume `chunk` and return every frame payload it completes, in order
    ///
    /// All bytes are always accepted. Surplus bytes after a completed frame
    /// start the next one.
    pub fn feed(&mut self, mut chunk: &[u8]) -> Vec<Bytes> {
        let mut frames = Vec::new();

        loop {
            match self.state {
                State::Idle => match chunk.len() {
                    0 => break,
                    1 => {
                        self.state = State::LengthByte(chunk[0]);
                        break;
                    }
                    _ => {
                        let target = u16::from_be_bytes([chunk[0], chunk[1]]) as usize;
                        chunk = &chunk[2..];
                        self.start_payload(target);
                    }
                },
                State::LengthByte(high) => {
                    let Some((&low, rest)) = chunk.split_first() else {
                        break;
                    };
                    chunk = rest;
                    self.start_payload(u16::from_be_bytes([high, low]) as usize);
                }
                State::Payload { target } => {
                    let take = (target - self.payload.len()).min(chunk.len());
                    self.payload.extend_from_slice(&chunk[..take]);
                    chunk = &chunk[take..];

                    if self.payload.len() < target {
                        break;
                    }
                    frames.push(self.payload.split().freeze());
                    self.state = State::Idle;
                }
            }
        }

        frames
    }

    fn start_payload(&mut self, target: usize) {
        self.payload.clear();
        self.payload.reserve(target);
        self.state = State::Payload { target };
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
