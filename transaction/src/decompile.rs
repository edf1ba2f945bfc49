//! Compiled message -> transaction message.
//!
//! Roles are recovered from the header's positional counts, accounts loaded
//! from lookup tables are resolved against caller-supplied table contents,
//! and a leading advance-nonce instruction marks a durable nonce lifetime.

use {
    crate::{
        codec::decode_message,
        compile::CompiledMessage,
        lifetime::{is_advance_nonce_account_instruction, LifetimeConstraint},
        message::TransactionMessage,
        signatures::{Signature, Transaction},
    },
    log::debug,
    solana_pubkey::Pubkey,
    std::collections::HashMap,
    txforge_error::{DecompileError, Result},
    txforge_keys::{AccountLookupMeta, AccountMeta, AccountReference, AccountRole, Instruction},
};

/// Context the compiled message does not carry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecompileConfig {
    /// Used for a blockhash lifetime. Defaults to `u64::MAX`.
    pub last_valid_block_height: Option<u64>,
    /// Contents of the lookup tables the message loads from. Without them a
    /// message with address table lookups cannot be decompiled.
    pub addresses_by_lookup_table: Option<HashMap<Pubkey, Vec<Pubkey>>>,
}

/// A decompiled message plus the signatures present on the transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecompiledTransaction {
    pub message: TransactionMessage,
    /// Non-empty signatures in signer order, `None` if there are none.
    pub signatures: Option<Vec<(Pubkey, Signature)>>,
}

fn static_account_role(message: &CompiledMessage, index: usize) -> AccountRole {
    let header = &message.header;
    let num_signers = usize::from(header.num_signer_accounts);
    let num_writable_signers =
        num_signers.saturating_sub(usize::from(header.num_readonly_signer_accounts));
    let num_writable_non_signers = message
        .static_accounts
        .len()
        .saturating_sub(num_signers)
        .saturating_sub(usize::from(header.num_readonly_non_signer_accounts));

    if index < num_writable_signers {
        AccountRole::WritableSigner
    } else if index < num_signers {
        AccountRole::ReadonlySigner
    } else if index < num_signers + num_writable_non_signers {
        AccountRole::Writable
    } else {
        AccountRole::Readonly
    }
}

/// Resolve the accounts loaded from lookup tables, in account index order:
/// every table's writable accounts, then every table's readonly accounts.
fn lookup_accounts(
    message: &CompiledMessage,
    addresses_by_lookup_table: &HashMap<Pubkey, Vec<Pubkey>>,
) -> std::result::Result<Vec<AccountReference>, DecompileError> {
    let missing = message
        .address_table_lookups
        .iter()
        .map(|lookup| lookup.lookup_table_address)
        .filter(|address| !addresses_by_lookup_table.contains_key(address))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(DecompileError::LookupTableContentsMissing {
            lookup_table_addresses: missing,
        });
    }

    let resolve = |lookup_table_address: Pubkey,
                   index: u8,
                   is_writable: bool|
     -> std::result::Result<AccountReference, DecompileError> {
        let table = addresses_by_lookup_table
            .get(&lookup_table_address)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let pubkey = table.get(usize::from(index)).copied().ok_or(
            DecompileError::LookupTableIndexOutOfRange {
                lookup_table_address,
                table_len: table.len(),
                index,
            },
        )?;
        Ok(if is_writable {
            AccountLookupMeta::new(pubkey, lookup_table_address, index)
        } else {
            AccountLookupMeta::new_readonly(pubkey, lookup_table_address, index)
        }
        .into())
    };

    let writable = message.address_table_lookups.iter().flat_map(|lookup| {
        lookup
            .writable_indices
            .iter()
            .map(|index| (lookup.lookup_table_address, *index, true))
    });
    let readable = message.address_table_lookups.iter().flat_map(|lookup| {
        lookup
            .readable_indices
            .iter()
            .map(|index| (lookup.lookup_table_address, *index, false))
    });
    writable
        .chain(readable)
        .map(|(table, index, is_writable)| resolve(table, index, is_writable))
        .collect()
}

/// Rebuild the transaction message a compiled message was produced from.
pub fn decompile_message(
    message: &CompiledMessage,
    config: &DecompileConfig,
) -> Result<TransactionMessage> {
    let fee_payer = *message
        .static_accounts
        .first()
        .ok_or(DecompileError::FeePayerMissing)?;

    let mut accounts = message
        .static_accounts
        .iter()
        .enumerate()
        .map(|(index, pubkey)| {
            AccountReference::from(AccountMeta::with_role(
                *pubkey,
                static_account_role(message, index),
            ))
        })
        .collect::<Vec<_>>();
    if !message.address_table_lookups.is_empty() {
        let addresses_by_lookup_table = config
            .addresses_by_lookup_table
            .as_ref()
            .ok_or(DecompileError::AddressTableLookupsUnsupported)?;
        accounts.extend(lookup_accounts(message, addresses_by_lookup_table)?);
    }

    let instructions = message
        .instructions
        .iter()
        .map(|instruction| -> std::result::Result<_, DecompileError> {
            let index = instruction.program_address_index;
            let program_id = *message
                .static_accounts
                .get(usize::from(index))
                .ok_or(DecompileError::ProgramAddressNotFound { index })?;
            let instruction_accounts = instruction
                .account_indices
                .iter()
                .map(|index| {
                    accounts
                        .get(usize::from(*index))
                        .copied()
                        .ok_or(DecompileError::AccountIndexNotFound { index: *index })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(Instruction::new(
                program_id,
                instruction_accounts,
                instruction.data.clone(),
            ))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let lifetime_token = message.lifetime_token;
    let lifetime_constraint = match instructions.first() {
        Some(first) if is_advance_nonce_account_instruction(first) => {
            LifetimeConstraint::DurableNonce {
                nonce: lifetime_token,
                nonce_account_address: *first.accounts[0].pubkey(),
                nonce_authority_address: *first.accounts[2].pubkey(),
            }
        }
        _ => LifetimeConstraint::Blockhash {
            blockhash: lifetime_token,
            last_valid_block_height: config.last_valid_block_height.unwrap_or(u64::MAX),
        },
    };
    debug!(
        "Decompiled message: {} accounts, {} instructions",
        accounts.len(),
        instructions.len(),
    );

    Ok(TransactionMessage {
        version: message.version,
        fee_payer: Some(fee_payer),
        instructions,
        lifetime_constraint: Some(lifetime_constraint),
    })
}

/// Decode a transaction's message, decompile it and collect the signatures
/// present on it.
pub fn decompile_transaction(
    transaction: &Transaction,
    config: &DecompileConfig,
) -> Result<DecompiledTransaction> {
    let compiled = decode_message(&transaction.message_bytes)?;
    let message = decompile_message(&compiled, config)?;
    let signatures = transaction
        .signatures
        .iter()
        .filter_map(|(address, signature)| {
            signature
                .filter(|s| !s.is_zero())
                .map(|s| (*address, *s))
        })
        .collect::<Vec<_>>();
    Ok(DecompiledTransaction {
        message,
        signatures: (!signatures.is_empty()).then_some(signatures),
    })
}
