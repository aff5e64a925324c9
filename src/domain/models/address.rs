//! Address format checks

/// Length of a hex-encoded address.
pub const ADDRESS_LENGTH: usize = 40;

/// True iff `address` is exactly [`ADDRESS_LENGTH`] hex characters.
pub fn validate_address(address: &str) -> bool {
    address.len() == ADDRESS_LENGTH && address.bytes().all(|b| b.is_ascii_hexdigit())
}
