//! Transaction lifetimes: a recent blockhash or a durable nonce.

use {
    crate::message::TransactionMessage,
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    solana_sdk_ids::system_program,
    txforge_error::LifetimeError,
    txforge_keys::{AccountMeta, AccountRole, Instruction},
};

/// The deprecated recent blockhashes sysvar, still required by
/// `AdvanceNonceAccount`.
pub const RECENT_BLOCKHASHES_SYSVAR: Pubkey =
    Pubkey::from_str_const("SysvarRecentB1ockHashes11111111111111111111");

/// `SystemInstruction::AdvanceNonceAccount`, a little-endian `u32` tag.
const ADVANCE_NONCE_ACCOUNT_DATA: [u8; 4] = [4, 0, 0, 0];

/// How long a transaction stays valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifetimeConstraint {
    /// Valid until the chain passes `last_valid_block_height`.
    Blockhash {
        blockhash: Hash,
        last_valid_block_height: u64,
    },
    /// Valid until the nonce stored in `nonce_account_address` is advanced.
    DurableNonce {
        nonce: Hash,
        nonce_account_address: Pubkey,
        nonce_authority_address: Pubkey,
    },
}

impl LifetimeConstraint {
    /// The 32-byte value written into the message. The wire format cannot
    /// tell a blockhash from a nonce.
    pub const fn lifetime_token(&self) -> &Hash {
        match self {
            Self::Blockhash { blockhash, .. } => blockhash,
            Self::DurableNonce { nonce, .. } => nonce,
        }
    }
}

/// Build the system program's `AdvanceNonceAccount` instruction.
pub fn advance_nonce_account_instruction(
    nonce_account_address: Pubkey,
    nonce_authority_address: Pubkey,
) -> Instruction {
    Instruction::new(
        system_program::ID,
        vec![
            AccountMeta::new(nonce_account_address, false).into(),
            AccountMeta::new_readonly(RECENT_BLOCKHASHES_SYSVAR, false).into(),
            AccountMeta::new_readonly(nonce_authority_address, true).into(),
        ],
        ADVANCE_NONCE_ACCOUNT_DATA.to_vec(),
    )
}

/// Whether the instruction has the exact shape of `AdvanceNonceAccount`: a
/// writable nonce account, the recent blockhashes sysvar and a signing
/// authority.
pub fn is_advance_nonce_account_instruction(instruction: &Instruction) -> bool {
    instruction.program_id == system_program::ID
        && instruction.data == ADVANCE_NONCE_ACCOUNT_DATA
        && match instruction.accounts.as_slice() {
            [nonce_account, sysvar, authority] => {
                nonce_account.role() == AccountRole::Writable
                    && sysvar.pubkey() == &RECENT_BLOCKHASHES_SYSVAR
                    && sysvar.role() == AccountRole::Readonly
                    && authority.role().is_signer()
            }
            _ => false,
        }
}

/// Whether the instruction advances the given nonce account with the given
/// authority.
pub fn is_advance_nonce_account_instruction_for(
    instruction: &Instruction,
    nonce_account_address: &Pubkey,
    nonce_authority_address: &Pubkey,
) -> bool {
    is_advance_nonce_account_instruction(instruction)
        && instruction.accounts[0].pubkey() == nonce_account_address
        && instruction.accounts[2].pubkey() == nonce_authority_address
}

/// Return the blockhash and last valid block height, or fail if the message
/// does not have a blockhash lifetime.
pub fn assert_is_blockhash_lifetime(
    message: &TransactionMessage,
) -> Result<(Hash, u64), LifetimeError> {
    match message.lifetime_constraint {
        Some(LifetimeConstraint::Blockhash {
            blockhash,
            last_valid_block_height,
        }) => Ok((blockhash, last_valid_block_height)),
        _ => Err(LifetimeError::ExpectedBlockhashLifetime),
    }
}

/// Fail unless the message has a durable nonce lifetime and its first
/// instruction advances that nonce.
pub fn assert_is_durable_nonce_message(message: &TransactionMessage) -> Result<(), LifetimeError> {
    let Some(LifetimeConstraint::DurableNonce {
        nonce_account_address,
        nonce_authority_address,
        ..
    }) = message.lifetime_constraint
    else {
        return Err(LifetimeError::ExpectedNonceLifetime);
    };
    match message.instructions.first() {
        Some(first)
            if is_advance_nonce_account_instruction_for(
                first,
                &nonce_account_address,
                &nonce_authority_address,
            ) =>
        {
            Ok(())
        }
        _ => Err(LifetimeError::InvalidAdvanceNonceInstruction {
            nonce_account_address,
            nonce_authority_address,
        }),
    }
}
