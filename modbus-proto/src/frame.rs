//! Fixed-capacity storage for the frame currently on the wire.
//!
//! One [`FrameBuffer`] serves both directions: it accumulates the request
//! while receiving and is rewritten in place into the response before
//! transmission. It never holds a request and a response at the same time.

use crate::crc;
use crate::error::BufferError;
use heapless::Vec;

/// Smallest supported frame capacity.
pub const MIN_FRAME_SIZE: usize = 8;

/// Largest supported frame capacity (RS-485 ADU limit).
pub const MAX_FRAME_SIZE: usize = 256;

/// Address + function code + CRC.
pub const MIN_ADU_LEN: usize = 4;

/// Address + function code + start address + quantity/value + CRC.
pub const MIN_REQUEST_LEN: usize = 8;

/// Byte buffer for one frame plus the transmit cursor.
///
/// While receiving, the write position is the buffer length. While
/// transmitting, [`next_tx_byte`](Self::next_tx_byte) walks the cursor over
/// the prepared response.
#[derive(Debug, Clone)]
pub struct FrameBuffer<const N: usize> {
    bytes: Vec<u8, N>,
    cursor: usize,
}

impl<const N: usize> FrameBuffer<N> {
    const CAPACITY_CHECK: () = assert!(
        N >= MIN_FRAME_SIZE && N <= MAX_FRAME_SIZE,
        "frame capacity must be within 8..=256 bytes"
    );

    /// Create an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_CHECK;
        Self {
            bytes: Vec::new(),
            cursor: 0,
        }
    }

    /// Total capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bytes currently held.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Read a single byte.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Overwrite a single byte within the current length.
    #[inline]
    pub fn set(&mut self, index: usize, value: u8) -> Result<(), BufferError> {
        let slot = self.bytes.get_mut(index).ok_or(BufferError::OutOfBounds)?;
        *slot = value;
        Ok(())
    }

    /// Drop all bytes and rewind the cursor.
    #[inline]
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.cursor = 0;
    }

    /// Start a new frame with `byte` at position 0.
    pub fn start(&mut self, byte: u8) {
        self.clear();
        // Capacity is at least MIN_FRAME_SIZE, so the first push always fits.
        let _ = self.bytes.push(byte);
    }

    /// Append a received byte.
    ///
    /// Fails without writing anything once the buffer is full.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Result<(), BufferError> {
        self.bytes.push(byte).map_err(|_| BufferError::Full)
    }

    /// Truncate or zero-extend to `len` bytes.
    pub fn resize(&mut self, len: usize) -> Result<(), BufferError> {
        self.bytes.resize(len, 0).map_err(|_| BufferError::Full)
    }

    /// Whether the trailing two bytes are a valid CRC of everything before them.
    #[must_use]
    pub fn crc_valid(&self) -> bool {
        match self.bytes.len().checked_sub(3) {
            Some(last_index) if self.bytes.len() >= MIN_ADU_LEN => {
                crc::validate(&self.bytes, last_index)
            }
            _ => false,
        }
    }

    /// Seal `[0, last_index]` as an outgoing frame.
    ///
    /// Anything past `last_index` is discarded, the CRC is appended and the
    /// cursor is rewound. Returns the total frame length. On error the buffer
    /// is left untouched.
    pub fn finish(&mut self, last_index: usize) -> Result<usize, BufferError> {
        let len = last_index
            .checked_add(3)
            .filter(|&len| len <= N)
            .ok_or(BufferError::Full)?;
        self.resize(len)?;
        crc::generate(&mut self.bytes, last_index)?;
        self.cursor = 0;
        Ok(len)
    }

    /// Index of the next byte to transmit.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Take the byte under the cursor and advance.
    #[inline]
    pub fn next_tx_byte(&mut self) -> Option<u8> {
        let byte = self.bytes.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(byte)
    }

    /// Whether every byte of the prepared frame has been handed out.
    #[inline]
    #[must_use]
    pub fn tx_done(&self) -> bool {
        self.cursor >= self.bytes.len()
    }
}

impl<const N: usize> Default for FrameBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut frame: FrameBuffer<8> = FrameBuffer::new();
        for b in 0..8u8 {
            assert_eq!(frame.push(b), Ok(()));
        }
        assert_eq!(frame.push(0xEE), Err(BufferError::Full));
        assert_eq!(frame.len(), 8);
        assert_eq!(frame.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_start_discards_previous_frame() {
        let mut frame: FrameBuffer<16> = FrameBuffer::new();
        frame.push(1).unwrap();
        frame.push(2).unwrap();
        frame.start(9);
        assert_eq!(frame.as_slice(), &[9]);
        assert_eq!(frame.cursor(), 0);
    }

    #[test]
    fn test_crc_valid_on_received_frame() {
        let mut frame: FrameBuffer<16> = FrameBuffer::new();
        for &b in &[0x01, 0x03, 0x00, 0x00, 0x00, 0x01, 0x84, 0x0A] {
            frame.push(b).unwrap();
        }
        assert!(frame.crc_valid());

        frame.set(3, 0x01).unwrap();
        assert!(!frame.crc_valid());
    }

    #[test]
    fn test_crc_valid_rejects_short_frames() {
        let mut frame: FrameBuffer<8> = FrameBuffer::new();
        assert!(!frame.crc_valid());
        frame.push(0x01).unwrap();
        frame.push(0x01).unwrap();
        frame.push(0x01).unwrap();
        assert!(!frame.crc_valid());
    }

    #[test]
    fn test_finish_truncates_and_appends_crc() {
        let mut frame: FrameBuffer<16> = FrameBuffer::new();
        for &b in &[0x01, 0x03, 0x00, 0x00, 0x00, 0x01, 0xAA, 0xBB, 0xCC, 0xDD] {
            frame.push(b).unwrap();
        }
        assert_eq!(frame.finish(5), Ok(8));
        assert_eq!(frame.as_slice(), &[0x01, 0x03, 0x00, 0x00, 0x00, 0x01, 0x84, 0x0A]);
    }

    #[test]
    fn test_finish_rejects_oversize_without_change() {
        let mut frame: FrameBuffer<8> = FrameBuffer::new();
        frame.push(0x11).unwrap();
        frame.push(0x03).unwrap();
        assert_eq!(frame.finish(5), Ok(8));
        assert_eq!(frame.finish(6), Err(BufferError::Full));
        assert_eq!(frame.len(), 8);
    }

    #[test]
    fn test_tx_cursor_walks_frame_once() {
        let mut frame: FrameBuffer<8> = FrameBuffer::new();
        frame.push(0x11).unwrap();
        frame.push(0x83).unwrap();
        frame.push(0x03).unwrap();
        let len = frame.finish(2).unwrap();
        assert_eq!(len, 5);

        let mut sent = [0u8; 5];
        for slot in sent.iter_mut() {
            assert!(!frame.tx_done());
            *slot = frame.next_tx_byte().unwrap();
        }
        assert!(frame.tx_done());
        assert_eq!(frame.next_tx_byte(), None);
        assert_eq!(sent, [0x11, 0x83, 0x03, frame.as_slice()[3], frame.as_slice()[4]]);
    }

    #[test]
    fn test_set_outside_length() {
        let mut frame: FrameBuffer<8> = FrameBuffer::new();
        assert_eq!(frame.set(0, 1), Err(BufferError::OutOfBounds));
        frame.resize(3).unwrap();
        assert_eq!(frame.set(2, 7), Ok(()));
        assert_eq!(frame.get(2), Some(7));
        assert_eq!(frame.resize(9), Err(BufferError::Full));
    }
}
