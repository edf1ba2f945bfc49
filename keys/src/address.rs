//! Address collation.
//!
//! Whenever the message format needs addresses "in lexical order" (static
//! accounts within a role group, lookup tables, competing lookup tables for
//! the same address) the comparison is made on the base58 text of the
//! address using `en` collation with lowercase sorting first. Base58 text is
//! plain ASCII alphanumerics, so that collation reduces to:
//!
//! * a primary, case-insensitive comparison, where digits sort before
//!   letters and a prefix sorts before any longer string;
//! * on a primary tie, the first position whose case differs decides, with
//!   the lowercase letter first.
//!
//! This is not the byte order of the addresses, nor the ASCII order of their
//! text: `ARc8…` < `Awft…` < `AZE3…`.

use {solana_pubkey::Pubkey, std::cmp::Ordering};

/// Precomputed collation key for an address. Sorting by this key is
/// equivalent to sorting with [`compare_addresses`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AddressSortKey {
    primary: Vec<u8>,
    tertiary: Vec<bool>,
}

impl AddressSortKey {
    pub fn new(address: &Pubkey) -> Self {
        let text = address.to_string();
        let primary = text.bytes().map(|b| b.to_ascii_lowercase()).collect();
        let tertiary = text.bytes().map(|b| b.is_ascii_uppercase()).collect();
        Self { primary, tertiary }
    }
}

impl From<&Pubkey> for AddressSortKey {
    fn from(address: &Pubkey) -> Self {
        Self::new(address)
    }
}

/// Compare two addresses by the collation of their base58 text.
pub fn compare_addresses(a: &Pubkey, b: &Pubkey) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    AddressSortKey::new(a).cmp(&AddressSortKey::new(b))
}

/// Sort addresses in place by collation.
pub fn sort_addresses(addresses: &mut [Pubkey]) {
    addresses.sort_by_cached_key(AddressSortKey::new);
}
