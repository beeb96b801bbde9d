//! Bech32-ish shape check for account addresses.

pub const ADDRESS_PREFIX: &str = "cosmos1";
pub const MIN_ADDRESS_LEN: usize = 39;
pub const MAX_ADDRESS_LEN: usize = 45;

/// Prefix and length only; no checksum verification.
pub fn is_valid_address(addr: &str) -> bool {
    let addr = addr.trim();
    addr.starts_with(ADDRESS_PREFIX) && (MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&addr.len())
}
