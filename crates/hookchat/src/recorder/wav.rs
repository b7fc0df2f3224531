//! Minimal RIFF/WAVE writer for the raw PCM a capture produces.

const HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Layout of 16-bit signed little-endian PCM samples
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmFormat {
    pub fn block_align(&self) -> u16 {
        self.channels * (BITS_PER_SAMPLE / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }
}

/// Wrap PCM data in a canonical 44 byte WAVE header
///
/// A trailing partial frame is dropped so the data chunk is always a whole number of
/// sample frames.
pub fn encode(pcm: &[u8], format: PcmFormat) -> Vec<u8> {
    let align = usize::from(format.block_align().max(1));
    let data = &pcm[..pcm.len() - pcm.len() % align];
    let data_len = data.len() as u32;

    let mut out = Vec::with_capacity(HEADER_LEN + data.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&format.byte_rate().to_le_bytes());
    out.extend_from_slice(&format.block_align().to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(data);
    out
}
