//! Instruction <-> Message key deduplication and privilege handling.
//!
//! Instructions are intentionally verbose: each one names every account it
//! touches along with the role it needs. When a message is _compiled_, many
//! steps occur:
//! * Ensuring the fee payer is present, first, and a writable signer.
//! * Deduplicating account keys.
//! * Configuring the highest role awarded to each account key.
//! * Deciding whether each key is listed statically or loaded from an
//!   address lookup table.
//! * Rejecting configurations the runtime will not accept.
//!
//! This module handles all of the above, producing one [`AddressMapEntry`]
//! per address. Ordering the entries is left to [`crate::accounts`].

use {
    crate::{
        address::compare_addresses,
        instruction::{AccountReference, Instruction},
        role::AccountRole,
    },
    log::trace,
    solana_pubkey::Pubkey,
    std::{
        cmp::Ordering,
        collections::{HashMap, HashSet},
    },
    txforge_error::CompileError,
};

/// How an address will be represented in the compiled message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressMapEntry {
    /// The fee payer. Always a writable signer, always first.
    FeePayer,
    /// Listed in the message's static account list.
    Static { role: AccountRole },
    /// Loaded from an address lookup table. Never a signer.
    LookupTable {
        role: AccountRole,
        lookup_table_address: Pubkey,
        address_index: u8,
    },
}

impl AddressMapEntry {
    pub const fn role(&self) -> AccountRole {
        match self {
            Self::FeePayer => AccountRole::WritableSigner,
            Self::Static { role } | Self::LookupTable { role, .. } => *role,
        }
    }

    pub const fn is_static(&self) -> bool {
        !matches!(self, Self::LookupTable { .. })
    }
}

/// Wrapper around a hashmap of account keys and their corresponding entries.
///
/// On compilation, keys are awarded the highest role they are assigned in the
/// message, and the hash map provides deduplication.
///
/// The map can be queried by key for its entry, `is_signer` and `is_writable`
/// roles, and whether it is invoked as a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressMap {
    fee_payer: Pubkey,
    map: HashMap<Pubkey, AddressMapEntry>,
    program_ids: HashSet<Pubkey>,
}

impl AddressMap {
    /// Create a new address map holding only the fee payer.
    pub fn new(fee_payer: Pubkey) -> Self {
        let mut map = HashMap::new();
        map.insert(fee_payer, AddressMapEntry::FeePayer);
        Self {
            fee_payer,
            map,
            program_ids: HashSet::new(),
        }
    }

    /// Add a single program ID to the address map.
    ///
    /// Programs are readonly and statically listed. An address already
    /// present as a static entry keeps its role; a readonly lookup table
    /// entry is pulled back into the static list.
    pub fn add_program(&mut self, program_id: Pubkey) -> Result<(), CompileError> {
        self.program_ids.insert(program_id);
        let next = match self.map.get(&program_id) {
            Some(AddressMapEntry::FeePayer) => {
                return Err(CompileError::InvokedProgramCannotPayFees {
                    program_address: program_id,
                });
            }
            Some(entry) if entry.role().is_writable() => {
                return Err(CompileError::InvokedProgramMustNotBeWritable {
                    program_address: program_id,
                });
            }
            Some(AddressMapEntry::Static { .. }) => return Ok(()),
            Some(AddressMapEntry::LookupTable { .. }) | None => AddressMapEntry::Static {
                role: AccountRole::Readonly,
            },
        };
        trace!("program {program_id} -> {next:?}");
        self.map.insert(program_id, next);
        Ok(())
    }

    /// Add a single account reference to the address map.
    pub fn add_account(&mut self, account: &AccountReference) -> Result<(), CompileError> {
        let pubkey = *account.pubkey();
        let next = match self.map.get(&pubkey) {
            None => match account {
                AccountReference::Static(meta) => AddressMapEntry::Static { role: meta.role },
                AccountReference::Lookup(meta) => AddressMapEntry::LookupTable {
                    role: meta.role(),
                    lookup_table_address: meta.lookup_table_address,
                    address_index: meta.address_index,
                },
            },
            // The fee payer already has the highest role.
            Some(AddressMapEntry::FeePayer) => return Ok(()),
            Some(AddressMapEntry::LookupTable {
                role,
                lookup_table_address,
                address_index,
            }) => {
                let role = role.merge(account.role());
                match account {
                    AccountReference::Lookup(meta)
                        if compare_addresses(&meta.lookup_table_address, lookup_table_address)
                            == Ordering::Less =>
                    {
                        AddressMapEntry::LookupTable {
                            role,
                            lookup_table_address: meta.lookup_table_address,
                            address_index: meta.address_index,
                        }
                    }
                    // Signers must be listed statically.
                    AccountReference::Static(meta) if meta.role.is_signer() => {
                        AddressMapEntry::Static { role }
                    }
                    _ => AddressMapEntry::LookupTable {
                        role,
                        lookup_table_address: *lookup_table_address,
                        address_index: *address_index,
                    },
                }
            }
            Some(AddressMapEntry::Static { role }) => {
                let role = role.merge(account.role());
                if self.program_ids.contains(&pubkey) {
                    if account.role().is_writable() {
                        return Err(CompileError::InvokedProgramMustNotBeWritable {
                            program_address: pubkey,
                        });
                    }
                    AddressMapEntry::Static { role }
                } else {
                    match account {
                        // Non-signers may move into a lookup table.
                        AccountReference::Lookup(meta) if !role.is_signer() => {
                            AddressMapEntry::LookupTable {
                                role,
                                lookup_table_address: meta.lookup_table_address,
                                address_index: meta.address_index,
                            }
                        }
                        _ => AddressMapEntry::Static { role },
                    }
                }
            }
        };
        trace!("account {pubkey} -> {next:?}");
        self.map.insert(pubkey, next);
        Ok(())
    }

    /// Add a list of account references to the address map.
    pub fn add_accounts<'a>(
        &mut self,
        accounts: impl Iterator<Item = &'a AccountReference>,
    ) -> Result<(), CompileError> {
        for account in accounts {
            self.add_account(account)?;
        }
        Ok(())
    }

    /// Add keys from a single instruction to the address map.
    pub fn add_instruction(&mut self, instruction: &Instruction) -> Result<(), CompileError> {
        self.add_program(instruction.program_id)?;
        self.add_accounts(instruction.accounts.iter())
    }

    /// Add keys from multiple instructions to the address map.
    pub fn add_instructions<'a>(
        &mut self,
        instructions: impl Iterator<Item = &'a Instruction>,
    ) -> Result<(), CompileError> {
        for instruction in instructions {
            self.add_instruction(instruction)?;
        }
        Ok(())
    }

    /// Compile a new address map for the fee payer and the keys from
    /// multiple instructions.
    pub fn compile<'a>(
        fee_payer: Pubkey,
        instructions: impl Iterator<Item = &'a Instruction>,
    ) -> Result<Self, CompileError> {
        let mut map = Self::new(fee_payer);
        map.add_instructions(instructions)?;
        Ok(map)
    }

    pub fn fee_payer(&self) -> &Pubkey {
        &self.fee_payer
    }

    /// Get the entry for a key.
    pub fn get(&self, key: &Pubkey) -> Option<&AddressMapEntry> {
        self.map.get(key)
    }

    /// Query the address map for the `is_invoked` role of a key.
    ///
    /// This role is only for program IDs designated in an instruction.
    pub fn is_invoked(&self, key: &Pubkey) -> bool {
        self.program_ids.contains(key)
    }

    /// Query the address map for the `is_signer` role of a key.
    pub fn is_signer(&self, key: &Pubkey) -> bool {
        self.map.get(key).is_some_and(|e| e.role().is_signer())
    }

    /// Query the address map for the `is_writable` role of a key.
    pub fn is_writable(&self, key: &Pubkey) -> bool {
        self.map.get(key).is_some_and(|e| e.role().is_writable())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over the entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pubkey, &AddressMapEntry)> {
        self.map.iter()
    }
}
