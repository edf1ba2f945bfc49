//! txforge turns a high-level transaction description (a fee payer, an
//! ordered list of instructions and a lifetime constraint) into the exact
//! bytes a validator will accept, and manages the signatures attached to
//! those bytes.
//!
//! The pipeline runs in one direction:
//!
//! * [`TransactionMessage`]: an immutable builder for the description.
//! * [`compile_message`]: folds every account reference into the canonical
//!   account list (see `txforge_keys`) and derives the header, compact
//!   instructions and address table lookups.
//! * [`codec`]: encodes the compiled message and the full transaction to and
//!   from the wire format.
//! * [`signatures`]: the signature container, partial and full signing.
//!
//! [`decompile_message`] and [`decompile_transaction`] run it in reverse for
//! inspection tools.
//!
//! Every operation is a pure function over immutable inputs. Only signing
//! may suspend, since a signer can live behind an asynchronous boundary.

pub mod codec;
pub mod compile;
pub mod compress;
pub mod decompile;
pub mod lifetime;
pub mod message;
pub mod signatures;
pub mod signer;

pub use {
    compile::{
        compile_message, compile_transaction, AddressTableLookup, CompiledInstruction,
        CompiledMessage, MessageHeader,
    },
    compress::compress_with_lookup_tables,
    decompile::{decompile_message, decompile_transaction, DecompileConfig, DecompiledTransaction},
    lifetime::LifetimeConstraint,
    message::{TransactionMessage, TransactionVersion},
    signatures::{
        assert_transaction_is_fully_signed, partially_sign_transaction, sign_transaction,
        transaction_signature, Signature, SignaturesMap, Transaction,
    },
    signer::{Keypair, TransactionSigner},
    txforge_error::{Result, TransactionError},
    txforge_keys::{
        AccountLookupMeta, AccountMeta, AccountReference, AccountRole, AddressMap, Instruction,
        OrderedAccounts,
    },
};
