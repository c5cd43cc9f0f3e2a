//! Short deterministic digests for masked identifier tokens.

/// 8-hex-digit digest of a value (FNV-1a folded to 32 bits). The same
/// input always yields the same token suffix, without keeping a
/// cleartext-adjacent form inline. Not cryptographic.
pub fn token_digest(value: &str) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in value.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    format!("{:08x}", ((hash >> 32) as u32) ^ (hash as u32))
}
