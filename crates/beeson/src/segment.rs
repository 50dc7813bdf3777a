//! Segment alignment helpers.

use crate::constants::SEGMENT_SIZE;

/// Number of whole segments needed to hold `length` bytes.
pub fn segment_count(length: usize) -> usize {
    length.div_ceil(SEGMENT_SIZE)
}

/// Length rounded up to the next segment boundary.
pub fn padded_length(length: usize) -> usize {
    segment_count(length) * SEGMENT_SIZE
}

/// Appends zeros until `bytes` ends on a segment boundary.
pub fn pad_right(bytes: &mut Vec<u8>) {
    let target = padded_length(bytes.len());
    bytes.resize(target, 0);
}

/// Appends zeros until `bytes` spans exactly `segments` segments. Returns
/// `false`, leaving `bytes` untouched, when it is already longer than that.
pub fn pad_to_segments(bytes: &mut Vec<u8>, segments: usize) -> bool {
    let target = segments * SEGMENT_SIZE;
    if bytes.len() > target {
        return false;
    }
    bytes.resize(target, 0);
    true
}

/// Left-pads `bytes` with zeros to one full segment.
pub fn pad_left(bytes: &[u8]) -> Vec<u8> {
    let target = padded_length(bytes.len().max(1));
    let mut out = vec![0u8; target - bytes.len()];
    out.extend_from_slice(bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_round_up() {
        assert_eq!(segment_count(0), 0);
        assert_eq!(segment_count(1), 1);
        assert_eq!(segment_count(32), 1);
        assert_eq!(segment_count(33), 2);
    }

    #[test]
    fn left_padding_keeps_value_in_low_bytes() {
        let out = pad_left(&[0x12, 0x34]);
        assert_eq!(out.len(), 32);
        assert_eq!(&out[30..], &[0x12, 0x34]);
        assert!(out[..30].iter().all(|&b| b == 0));
    }

    #[test]
    fn pad_to_segments_never_truncates() {
        let mut bytes = vec![1u8; 40];
        assert!(!pad_to_segments(&mut bytes, 1));
        assert_eq!(bytes.len(), 40);
        assert!(pad_to_segments(&mut bytes, 3));
        assert_eq!(bytes.len(), 96);
    }
}
