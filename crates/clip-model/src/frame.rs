//! Decoded video frames.

/// Bytes per pixel of a BGR24 frame.
pub const BGR_CHANNELS: usize = 3;

/// An owned BGR24 frame, rows packed without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Wrap a raw buffer. Returns `None` when its length does not match
    /// `width * height * 3`.
    pub fn from_bgr(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() == Self::byte_len(width, height) {
            Some(Self {
                width,
                height,
                data,
            })
        } else {
            None
        }
    }

    /// An all-black frame.
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
        }
    }

    /// Buffer size of a BGR24 frame with the given dimensions.
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * BGR_CHANNELS
    }

    /// The BGR triple at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BGR_CHANNELS;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ])
    }
}
