//! Address map -> canonical account list.
//!
//! The runtime derives every account's privileges from its position, so the
//! list must follow one fixed order: the fee payer, then static accounts,
//! then lookup table accounts, each group sorted by role and then by address.

use {
    crate::{
        address::AddressSortKey,
        keys::{AddressMap, AddressMapEntry},
        role::AccountRole,
    },
    log::debug,
    solana_pubkey::Pubkey,
};

/// A single slot in the ordered account list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderedAccount {
    pub pubkey: Pubkey,
    pub entry: AddressMapEntry,
}

impl OrderedAccount {
    pub const fn role(&self) -> AccountRole {
        self.entry.role()
    }

    pub const fn is_static(&self) -> bool {
        self.entry.is_static()
    }

    pub fn lookup_table_address(&self) -> Option<&Pubkey> {
        match &self.entry {
            AddressMapEntry::LookupTable {
                lookup_table_address,
                ..
            } => Some(lookup_table_address),
            _ => None,
        }
    }

    fn sort_key(&self) -> (u8, bool, bool, Option<AddressSortKey>, AddressSortKey) {
        let role = self.role();
        let group = match self.entry {
            AddressMapEntry::FeePayer => 0,
            AddressMapEntry::Static { .. } => 1,
            AddressMapEntry::LookupTable { .. } => 2,
        };
        (
            group,
            !role.is_signer(),
            !role.is_writable(),
            self.lookup_table_address().map(AddressSortKey::new),
            AddressSortKey::new(&self.pubkey),
        )
    }
}

/// The canonical account list of a single message. Indices into this list
/// are the account indices used by compiled instructions, header counts and
/// signature slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedAccounts(Vec<OrderedAccount>);

impl OrderedAccounts {
    /// Sort every entry of the address map into canonical order.
    pub fn new(address_map: &AddressMap) -> Self {
        let mut accounts = address_map
            .iter()
            .map(|(pubkey, entry)| OrderedAccount {
                pubkey: *pubkey,
                entry: *entry,
            })
            .collect::<Vec<_>>();
        accounts.sort_by_cached_key(OrderedAccount::sort_key);
        let ordered = Self(accounts);
        debug!(
            "Ordered {} accounts ({} static)",
            ordered.len(),
            ordered.num_static()
        );
        ordered
    }

    /// Get the position of a key in the list.
    pub fn position(&self, key: &Pubkey) -> Option<usize> {
        self.0.iter().position(|account| &account.pubkey == key)
    }

    /// Get the key at a given position.
    pub fn key_at_index(&self, index: usize) -> Option<&Pubkey> {
        self.0.get(index).map(|account| &account.pubkey)
    }

    /// Query the `is_signer` role of the key at a given position.
    pub fn is_signer_at_index(&self, index: usize) -> bool {
        self.0.get(index).is_some_and(|a| a.role().is_signer())
    }

    /// Query the `is_writable` role of the key at a given position.
    pub fn is_writable_at_index(&self, index: usize) -> bool {
        self.0.get(index).is_some_and(|a| a.role().is_writable())
    }

    pub fn keys(&self) -> impl Iterator<Item = &Pubkey> {
        self.0.iter().map(|account| &account.pubkey)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderedAccount> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[OrderedAccount] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length of the static prefix: the fee payer and every static entry.
    pub fn num_static(&self) -> usize {
        self.0
            .iter()
            .position(|account| !account.is_static())
            .unwrap_or(self.0.len())
    }

    /// The static prefix of the list.
    pub fn static_accounts(&self) -> &[OrderedAccount] {
        &self.0[..self.num_static()]
    }

    /// The lookup table suffix of the list.
    pub fn lookup_accounts(&self) -> &[OrderedAccount] {
        &self.0[self.num_static()..]
    }
}

impl From<&AddressMap> for OrderedAccounts {
    fn from(address_map: &AddressMap) -> Self {
        Self::new(address_map)
    }
}

impl<'a> IntoIterator for &'a OrderedAccounts {
    type Item = &'a OrderedAccount;
    type IntoIter = std::slice::Iter<'a, OrderedAccount>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl AddressMap {
    /// Produce the canonical account list for this map.
    pub fn order(&self) -> OrderedAccounts {
        OrderedAccounts::new(self)
    }
}
