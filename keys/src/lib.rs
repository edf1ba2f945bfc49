//! Transaction account keys.
//!
//! Instructions name the accounts they touch one by one, and the same
//! address may appear many times across a transaction with different
//! privileges. Before a message can be compiled, every reference must be
//! folded into a single entry per address carrying the highest role it was
//! awarded, and the entries must be laid out in the one order the runtime
//! accepts.
//!
//! * [`role`]: the four account roles and how they merge.
//! * [`instruction`]: instructions and the account references they carry.
//! * [`address`]: the collation used whenever addresses are compared.
//! * [`keys`]: the address map, built from a fee payer and instructions.
//! * [`accounts`]: the canonical ordered account list derived from the map.

pub mod accounts;
pub mod address;
pub mod instruction;
pub mod keys;
pub mod role;

pub use {
    accounts::{OrderedAccount, OrderedAccounts},
    address::compare_addresses,
    instruction::{AccountLookupMeta, AccountMeta, AccountReference, Instruction},
    keys::{AddressMap, AddressMapEntry},
    role::AccountRole,
};
