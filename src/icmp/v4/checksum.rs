//! The Internet checksum (RFC 792, RFC 1071).

/// One's complement of the one's complement sum of all 16-bit big-endian
/// words in `data`.
///
/// A trailing odd byte is padded with a zero low-order byte. The checksum
/// field inside `data` must be zero when computing a checksum; summing a
/// packet that already carries its correct checksum yields `0`.
#[must_use]
pub fn checksum(data: &[u8]) -> u16 {
    let mut chunks = data.chunks_exact(2);
    let mut sum: u64 = chunks
        .by_ref()
        .map(|word| u64::from(u16::from_be_bytes([word[0], word[1]])))
        .sum();
    if let [last] = chunks.remainder() {
        sum += u64::from(*last) << 8;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    // truncation intended, the carries were folded above
    #[allow(clippy::cast_possible_truncation)]
    let folded = sum as u16;
    !folded
}
