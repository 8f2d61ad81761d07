//! Audio chunking and pacing parameters.
//!
//! Streaming vendors expect audio delivered as if it were being captured live:
//! fixed-size chunks with a fixed inter-chunk delay. The chunk sizes and
//! spacing below are vendor requirements, not tuning knobs.

use std::time::Duration;

/// Chunk size for the recognition vendor: 3200 bytes ≈ 100ms of 16kHz/16-bit
/// mono PCM.
pub const ASR_CHUNK_BYTES: usize = 3200;

/// Inter-chunk delay for recognition audio.
pub const ASR_CHUNK_INTERVAL: Duration = Duration::from_millis(100);

/// Chunk size for the assessment vendor.
pub const ISE_CHUNK_BYTES: usize = 1280;

/// Inter-chunk delay for assessment audio (~40ms per 1280-byte frame).
pub const ISE_CHUNK_INTERVAL: Duration = Duration::from_millis(40);

/// A bounded slice of input audio sent as one outbound unit.
///
/// The first and last chunks carry markers so protocol layers that frame
/// audio explicitly (the assessment vendor) can flag stream boundaries. A
/// single-chunk stream is both first and last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioChunk<'a> {
    pub data: &'a [u8],
    pub is_first: bool,
    pub is_last: bool,
}

/// Slice `audio` into consecutive chunks of at most `chunk_size` bytes.
///
/// Ordering is preserved and every input byte appears in exactly one chunk;
/// empty input yields no chunks.
pub fn chunk_audio(audio: &[u8], chunk_size: usize) -> Vec<AudioChunk<'_>> {
    if audio.is_empty() {
        return Vec::new();
    }

    let chunk_size = chunk_size.max(1);
    let count = audio.len().div_ceil(chunk_size);

    audio
        .chunks(chunk_size)
        .enumerate()
        .map(|(i, data)| AudioChunk {
            data,
            is_first: i == 0,
            is_last: i + 1 == count,
        })
        .collect()
}
