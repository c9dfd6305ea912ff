//! Framing for the panel UART link.
//!
//! - START (1 byte): 0xC5 sync byte
//! - LENGTH (1 byte): payload length (0-8)
//! - KIND (1 byte): message kind
//! - PAYLOAD (0-8 bytes)
//! - CHECKSUM (1 byte): XOR of LENGTH, KIND and every PAYLOAD byte

use heapless::Vec;

/// Frame sync byte
pub const FRAME_START: u8 = 0xC5;

/// Largest payload any panel message needs
pub const MAX_PAYLOAD_SIZE: usize = 8;

/// START + LENGTH + KIND + payload + CHECKSUM
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + 4;

/// Framing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload longer than `MAX_PAYLOAD_SIZE`
    PayloadTooLarge,
    /// Checksum byte did not match
    InvalidChecksum,
    /// Length byte out of range
    InvalidLength,
    /// Frame decoded but its kind or payload is not a known message
    UnknownMessage,
    /// Output buffer cannot hold the encoded frame
    BufferTooSmall,
}

/// One frame on the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message kind
    pub kind: u8,
    /// Message body
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Build a frame, rejecting oversized payloads
    pub fn new(kind: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { kind, payload })
    }

    /// Frame with an empty body
    pub fn bare(kind: u8) -> Self {
        Self {
            kind,
            payload: Vec::new(),
        }
    }

    fn checksum(length: u8, kind: u8, payload: &[u8]) -> u8 {
        payload.iter().fold(length ^ kind, |acc, b| acc ^ b)
    }

    /// Number of bytes `encode` will write
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + 4
    }

    /// Write the frame into `out`, returning the number of bytes written
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, FrameError> {
        let len = self.encoded_len();
        if out.len() < len {
            return Err(FrameError::BufferTooSmall);
        }

        let length = self.payload.len() as u8;
        out[0] = FRAME_START;
        out[1] = length;
        out[2] = self.kind;
        out[3..3 + self.payload.len()].copy_from_slice(&self.payload);
        out[len - 1] = Self::checksum(length, self.kind, &self.payload);

        Ok(len)
    }

    /// Encode into an owned buffer
    pub fn to_bytes(&self) -> Vec<u8, MAX_FRAME_SIZE> {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        // MAX_FRAME_SIZE always fits a valid frame
        let len = self.encode(&mut buf).unwrap_or(0);
        let mut out = Vec::new();
        let _ = out.extend_from_slice(&buf[..len]);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Sync,
    Length,
    Kind,
    Payload,
    Checksum,
}

/// Incremental decoder fed one byte at a time from the UART
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    stage: Stage,
    length: u8,
    kind: u8,
    body: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            stage: Stage::Sync,
            length: 0,
            kind: 0,
            body: Vec::new(),
        }
    }

    /// Drop any partial frame and wait for the next START byte
    pub fn reset(&mut self) {
        self.stage = Stage::Sync;
        self.length = 0;
        self.kind = 0;
        self.body.clear();
    }

    /// Feed one byte.
    ///
    /// Returns `Ok(Some(frame))` once a frame completes. Any error resets the
    /// decoder so the stream resynchronises on the next START byte.
    pub fn push(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.stage {
            Stage::Sync => {
                if byte == FRAME_START {
                    self.stage = Stage::Length;
                }
            }
            Stage::Length => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::InvalidLength);
                }
                self.length = byte;
                self.stage = Stage::Kind;
            }
            Stage::Kind => {
                self.kind = byte;
                self.body.clear();
                self.stage = if self.length == 0 {
                    Stage::Checksum
                } else {
                    Stage::Payload
                };
            }
            Stage::Payload => {
                // length was bounded in Stage::Length
                let _ = self.body.push(byte);
                if self.body.len() == self.length as usize {
                    self.stage = Stage::Checksum;
                }
            }
            Stage::Checksum => {
                let expected = Frame::checksum(self.length, self.kind, &self.body);
                if byte != expected {
                    self.reset();
                    return Err(FrameError::InvalidChecksum);
                }
                let frame = Frame {
                    kind: self.kind,
                    payload: self.body.clone(),
                };
                self.reset();
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Feed bytes until the first complete frame.
    ///
    /// Bytes after that frame are left unread.
    pub fn push_slice(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.push(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
