//! Instructions and the account references they carry.

use {crate::role::AccountRole, solana_pubkey::Pubkey};

/// An account listed directly in the message's static account list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub role: AccountRole,
}

impl AccountMeta {
    /// A writable account reference.
    pub const fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            role: AccountRole::from_flags(is_signer, true),
        }
    }

    /// A readonly account reference.
    pub const fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            role: AccountRole::from_flags(is_signer, false),
        }
    }

    pub const fn with_role(pubkey: Pubkey, role: AccountRole) -> Self {
        Self { pubkey, role }
    }
}

/// An account loaded from an on-chain address lookup table.
///
/// Lookup table accounts can never sign, so only the writable flag is
/// carried; the role is always one of `Readonly` or `Writable`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccountLookupMeta {
    pub pubkey: Pubkey,
    pub lookup_table_address: Pubkey,
    pub address_index: u8,
    is_writable: bool,
}

impl AccountLookupMeta {
    /// A writable lookup table account reference.
    pub const fn new(pubkey: Pubkey, lookup_table_address: Pubkey, address_index: u8) -> Self {
        Self {
            pubkey,
            lookup_table_address,
            address_index,
            is_writable: true,
        }
    }

    /// A readonly lookup table account reference.
    pub const fn new_readonly(
        pubkey: Pubkey,
        lookup_table_address: Pubkey,
        address_index: u8,
    ) -> Self {
        Self {
            pubkey,
            lookup_table_address,
            address_index,
            is_writable: false,
        }
    }

    pub const fn is_writable(&self) -> bool {
        self.is_writable
    }

    pub const fn role(&self) -> AccountRole {
        AccountRole::from_flags(false, self.is_writable)
    }
}

/// A single account reference within an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccountReference {
    Static(AccountMeta),
    Lookup(AccountLookupMeta),
}

impl AccountReference {
    pub const fn pubkey(&self) -> &Pubkey {
        match self {
            Self::Static(meta) => &meta.pubkey,
            Self::Lookup(meta) => &meta.pubkey,
        }
    }

    pub const fn role(&self) -> AccountRole {
        match self {
            Self::Static(meta) => meta.role,
            Self::Lookup(meta) => meta.role(),
        }
    }
}

impl From<AccountMeta> for AccountReference {
    fn from(meta: AccountMeta) -> Self {
        Self::Static(meta)
    }
}

impl From<AccountLookupMeta> for AccountReference {
    fn from(meta: AccountLookupMeta) -> Self {
        Self::Lookup(meta)
    }
}

impl From<solana_instruction::AccountMeta> for AccountReference {
    fn from(meta: solana_instruction::AccountMeta) -> Self {
        Self::Static(AccountMeta {
            pubkey: meta.pubkey,
            role: AccountRole::from_flags(meta.is_signer, meta.is_writable),
        })
    }
}

/// A program invocation: the program, the accounts it touches and opaque
/// instruction data. Empty `accounts` and `data` are omitted on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountReference>,
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new(program_id: Pubkey, accounts: Vec<AccountReference>, data: Vec<u8>) -> Self {
        Self {
            program_id,
            accounts,
            data,
        }
    }

    /// An instruction with no accounts and no data.
    pub fn new_empty(program_id: Pubkey) -> Self {
        Self {
            program_id,
            ..Self::default()
        }
    }
}

impl From<solana_instruction::Instruction> for Instruction {
    fn from(instruction: solana_instruction::Instruction) -> Self {
        Self {
            program_id: instruction.program_id,
            accounts: instruction.accounts.into_iter().map(Into::into).collect(),
            data: instruction.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let key = Pubkey::new_unique();
        let table = Pubkey::new_unique();

        assert_eq!(AccountMeta::new(key, true).role, AccountRole::WritableSigner);
        assert_eq!(AccountMeta::new(key, false).role, AccountRole::Writable);
        assert_eq!(
            AccountMeta::new_readonly(key, true).role,
            AccountRole::ReadonlySigner
        );
        assert_eq!(
            AccountMeta::new_readonly(key, false).role,
            AccountRole::Readonly
        );

        let lookup = AccountLookupMeta::new(key, table, 3);
        assert_eq!(lookup.role(), AccountRole::Writable);
        let lookup = AccountLookupMeta::new_readonly(key, table, 3);
        assert_eq!(lookup.role(), AccountRole::Readonly);
        assert_eq!(AccountReference::from(lookup).pubkey(), &key);
    }

    #[test]
    fn test_from_sdk_instruction() {
        let program_id = Pubkey::new_unique();
        let key1 = Pubkey::new_unique();
        let key2 = Pubkey::new_unique();
        let sdk = solana_instruction::Instruction::new_with_bytes(
            program_id,
            &[1, 2, 3],
            vec![
                solana_instruction::AccountMeta::new(key1, true),
                solana_instruction::AccountMeta::new_readonly(key2, false),
            ],
        );
        let instruction = Instruction::from(sdk);
        assert_eq!(instruction.program_id, program_id);
        assert_eq!(instruction.data, vec![1, 2, 3]);
        assert_eq!(
            instruction.accounts,
            vec![
                AccountReference::Static(AccountMeta::new(key1, true)),
                AccountReference::Static(AccountMeta::new_readonly(key2, false)),
            ]
        );
    }
}
