//! The transaction message builder.

use {
    crate::lifetime::{
        advance_nonce_account_instruction, is_advance_nonce_account_instruction,
        is_advance_nonce_account_instruction_for, LifetimeConstraint,
    },
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    std::fmt,
    txforge_keys::Instruction,
};

/// Message framing. Legacy messages carry no version byte and cannot load
/// accounts from lookup tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionVersion {
    Legacy,
    /// Encoded as `0x80 | n`, valid for `n` in `[0, 127]`.
    Number(u8),
}

impl TransactionVersion {
    pub const V0: Self = Self::Number(0);

    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy)
    }
}

impl Default for TransactionVersion {
    fn default() -> Self {
        Self::V0
    }
}

impl fmt::Display for TransactionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A transaction described by its fee payer, instructions and lifetime.
///
/// Every transform consumes the message and returns a new one; nothing is
/// mutated behind a shared reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionMessage {
    pub version: TransactionVersion,
    pub fee_payer: Option<Pubkey>,
    pub instructions: Vec<Instruction>,
    pub lifetime_constraint: Option<LifetimeConstraint>,
}

impl TransactionMessage {
    /// An empty message of the given version.
    pub fn new(version: TransactionVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn with_fee_payer(self, fee_payer: Pubkey) -> Self {
        Self {
            fee_payer: Some(fee_payer),
            ..self
        }
    }

    pub fn append_instruction(self, instruction: Instruction) -> Self {
        self.append_instructions([instruction])
    }

    pub fn append_instructions(
        mut self,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> Self {
        self.instructions.extend(instructions);
        self
    }

    pub fn prepend_instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.insert(0, instruction);
        self
    }

    pub fn with_blockhash_lifetime(self, blockhash: Hash, last_valid_block_height: u64) -> Self {
        Self {
            lifetime_constraint: Some(LifetimeConstraint::Blockhash {
                blockhash,
                last_valid_block_height,
            }),
            ..self
        }
    }

    /// Set a durable nonce lifetime and make sure the first instruction
    /// advances that nonce. A leading advance-nonce instruction for the same
    /// account and authority is kept, one for a different nonce is replaced,
    /// and otherwise a new one is prepended.
    pub fn with_durable_nonce_lifetime(
        mut self,
        nonce: Hash,
        nonce_account_address: Pubkey,
        nonce_authority_address: Pubkey,
    ) -> Self {
        let leading = self.instructions.first();
        let is_current = leading.is_some_and(|first| {
            is_advance_nonce_account_instruction_for(
                first,
                &nonce_account_address,
                &nonce_authority_address,
            )
        });
        if !is_current {
            let instruction =
                advance_nonce_account_instruction(nonce_account_address, nonce_authority_address);
            if leading.is_some_and(is_advance_nonce_account_instruction) {
                self.instructions[0] = instruction;
            } else {
                self.instructions.insert(0, instruction);
            }
        }
        self.lifetime_constraint = Some(LifetimeConstraint::DurableNonce {
            nonce,
            nonce_account_address,
            nonce_authority_address,
        });
        self
    }
}
