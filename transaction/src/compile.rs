//! Message compilation.
//!
//! Compiling runs the address map and the account orderer, then derives
//! everything the wire format needs from the ordered account list: the
//! header counts, each instruction's indices into the list, and the address
//! table lookups for the accounts loaded from tables.

use {
    crate::{
        codec::encode_message,
        lifetime::{assert_is_durable_nonce_message, LifetimeConstraint},
        message::{TransactionMessage, TransactionVersion},
        signatures::{SignaturesMap, Transaction},
    },
    log::debug,
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    std::collections::HashMap,
    txforge_error::{CompileError, Result},
    txforge_keys::{compare_addresses, AddressMap, AddressMapEntry, Instruction, OrderedAccounts},
};

/// The largest number of accounts a `u8` index can address.
const MAX_ACCOUNTS: usize = u8::MAX as usize + 1;

/// Positional privilege counts for the static accounts.
///
/// Static accounts are laid out as writable signers, readonly signers,
/// writable non-signers and finally readonly non-signers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MessageHeader {
    pub num_signer_accounts: u8,
    pub num_readonly_signer_accounts: u8,
    pub num_readonly_non_signer_accounts: u8,
}

/// An instruction whose addresses have been replaced by account indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompiledInstruction {
    /// Index into the static accounts.
    pub program_address_index: u8,
    /// Indices into the full account list: static accounts followed by the
    /// accounts loaded from lookup tables.
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// Accounts a versioned message loads from one lookup table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AddressTableLookup {
    pub lookup_table_address: Pubkey,
    pub writable_indices: Vec<u8>,
    pub readable_indices: Vec<u8>,
}

/// A message in the exact shape of the wire format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompiledMessage {
    pub version: TransactionVersion,
    pub header: MessageHeader,
    pub static_accounts: Vec<Pubkey>,
    /// A blockhash or a nonce value.
    pub lifetime_token: Hash,
    pub instructions: Vec<CompiledInstruction>,
    /// Always empty for legacy messages.
    pub address_table_lookups: Vec<AddressTableLookup>,
}

impl CompiledMessage {
    /// Compile a fee payer, instructions and lifetime into a message.
    pub fn compile(
        fee_payer: &Pubkey,
        instructions: &[Instruction],
        lifetime_constraint: &LifetimeConstraint,
        version: TransactionVersion,
    ) -> std::result::Result<Self, CompileError> {
        let address_map = AddressMap::compile(*fee_payer, instructions.iter())?;
        let ordered = address_map.order();

        if ordered.len() > MAX_ACCOUNTS {
            return Err(CompileError::TooManyAccounts {
                count: ordered.len(),
            });
        }
        if version.is_legacy() && !ordered.lookup_accounts().is_empty() {
            return Err(CompileError::AddressTableLookupsInLegacyMessage);
        }

        let header = compile_header(&ordered)?;
        let instructions = compile_instructions(&ordered, instructions);
        let address_table_lookups = compile_address_table_lookups(&ordered);
        debug!(
            "Compiled message: {} accounts ({} static), {} instructions, {} lookup tables",
            ordered.len(),
            ordered.num_static(),
            instructions.len(),
            address_table_lookups.len(),
        );

        Ok(Self {
            version,
            header,
            static_accounts: ordered.static_accounts().iter().map(|a| a.pubkey).collect(),
            lifetime_token: *lifetime_constraint.lifetime_token(),
            instructions,
            address_table_lookups,
        })
    }

    /// The addresses expected to sign, in signature slot order.
    pub fn signer_addresses(&self) -> &[Pubkey] {
        let num_signers = usize::from(self.header.num_signer_accounts);
        &self.static_accounts[..num_signers.min(self.static_accounts.len())]
    }
}

fn compile_header(ordered: &OrderedAccounts) -> std::result::Result<MessageHeader, CompileError> {
    let mut num_signers = 0usize;
    let mut num_readonly_signers = 0usize;
    let mut num_readonly_non_signers = 0usize;
    for account in ordered.static_accounts() {
        let role = account.role();
        match (role.is_signer(), role.is_writable()) {
            (true, true) => num_signers += 1,
            (true, false) => {
                num_signers += 1;
                num_readonly_signers += 1;
            }
            (false, true) => {}
            (false, false) => num_readonly_non_signers += 1,
        }
    }
    let to_u8 = |count: usize| {
        u8::try_from(count).map_err(|_| CompileError::TooManyAccounts { count })
    };
    Ok(MessageHeader {
        num_signer_accounts: to_u8(num_signers)?,
        num_readonly_signer_accounts: to_u8(num_readonly_signers)?,
        num_readonly_non_signer_accounts: to_u8(num_readonly_non_signers)?,
    })
}

fn compile_instructions(
    ordered: &OrderedAccounts,
    instructions: &[Instruction],
) -> Vec<CompiledInstruction> {
    // Every instruction address is in the list, which holds at most
    // `MAX_ACCOUNTS` entries.
    let positions = ordered
        .keys()
        .enumerate()
        .map(|(index, key)| (*key, index as u8))
        .collect::<HashMap<_, _>>();
    let index_of = |key: &Pubkey| positions.get(key).copied().unwrap_or_default();
    instructions
        .iter()
        .map(|instruction| CompiledInstruction {
            program_address_index: index_of(&instruction.program_id),
            account_indices: instruction
                .accounts
                .iter()
                .map(|account| index_of(account.pubkey()))
                .collect(),
            data: instruction.data.clone(),
        })
        .collect()
}

fn compile_address_table_lookups(ordered: &OrderedAccounts) -> Vec<AddressTableLookup> {
    let mut lookups: Vec<AddressTableLookup> = vec![];
    for account in ordered.lookup_accounts() {
        let AddressMapEntry::LookupTable {
            role,
            lookup_table_address,
            address_index,
        } = account.entry
        else {
            continue;
        };
        let lookup = match lookups
            .iter()
            .position(|l| l.lookup_table_address == lookup_table_address)
        {
            Some(position) => &mut lookups[position],
            None => {
                lookups.push(AddressTableLookup {
                    lookup_table_address,
                    ..AddressTableLookup::default()
                });
                let last = lookups.len() - 1;
                &mut lookups[last]
            }
        };
        if role.is_writable() {
            lookup.writable_indices.push(address_index);
        } else {
            lookup.readable_indices.push(address_index);
        }
    }
    lookups.sort_by(|a, b| compare_addresses(&a.lookup_table_address, &b.lookup_table_address));
    lookups
}

/// Compile a message. The message needs a fee payer and a lifetime, and a
/// durable nonce message must lead with its advance-nonce instruction.
pub fn compile_message(message: &TransactionMessage) -> Result<CompiledMessage> {
    let fee_payer = message.fee_payer.ok_or(CompileError::FeePayerMissing)?;
    let lifetime_constraint = message
        .lifetime_constraint
        .ok_or(CompileError::LifetimeConstraintMissing)?;
    if let LifetimeConstraint::DurableNonce { .. } = lifetime_constraint {
        assert_is_durable_nonce_message(message)?;
    }
    Ok(CompiledMessage::compile(
        &fee_payer,
        &message.instructions,
        &lifetime_constraint,
        message.version,
    )?)
}

/// Compile and encode a message into an unsigned transaction with one empty
/// signature slot per signer.
pub fn compile_transaction(message: &TransactionMessage) -> Result<Transaction> {
    let compiled = compile_message(message)?;
    let message_bytes = encode_message(&compiled)?;
    let signatures = SignaturesMap::new(compiled.signer_addresses().iter().copied());
    Ok(Transaction {
        message_bytes,
        signatures,
        lifetime_constraint: message.lifetime_constraint,
    })
}
