//! Transaction errors. Every error here represents misconfigured input: an
//! illegal instruction set, a malformed lifetime, a signing mistake or bytes
//! that do not follow the wire format. None of them are transient.

use {solana_pubkey::Pubkey, thiserror::Error};

fn join(addresses: &[Pubkey]) -> String {
    addresses
        .iter()
        .map(Pubkey::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while building the address map or compiling a message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// An instruction invokes the fee payer as its program.
    #[error("Invoked program cannot pay fees: {program_address}")]
    InvokedProgramCannotPayFees { program_address: Pubkey },
    /// An invoked program is also referenced as a writable account.
    #[error("Invoked program must not be writable: {program_address}")]
    InvokedProgramMustNotBeWritable { program_address: Pubkey },
    /// The message references more accounts than a `u8` index can address.
    #[error("Too many accounts in message: {count}")]
    TooManyAccounts { count: usize },
    /// Lookup table accounts were supplied for a legacy message.
    #[error("Address table lookups are not supported by legacy messages")]
    AddressTableLookupsInLegacyMessage,
    /// The message has no fee payer.
    #[error("Transaction message has no fee payer")]
    FeePayerMissing,
    /// The message has no lifetime constraint.
    #[error("Transaction message has no lifetime constraint")]
    LifetimeConstraintMissing,
}

/// Errors raised while validating a message's lifetime constraint.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LifetimeError {
    /// A blockhash lifetime was expected.
    #[error("Transaction message does not have a blockhash lifetime")]
    ExpectedBlockhashLifetime,
    /// A durable nonce lifetime was expected.
    #[error("Transaction message does not have a durable nonce lifetime")]
    ExpectedNonceLifetime,
    /// A durable nonce message must lead with the matching `AdvanceNonceAccount`
    /// instruction.
    #[error(
        "First instruction must advance nonce account {nonce_account_address} with authority \
         {nonce_authority_address}"
    )]
    InvalidAdvanceNonceInstruction {
        nonce_account_address: Pubkey,
        nonce_authority_address: Pubkey,
    },
}

/// Errors raised while attaching or inspecting signatures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// One or more signers are not required by the transaction.
    #[error(
        "Addresses cannot sign transaction: {}. Expected one of: {}",
        join(.unexpected),
        join(.expected)
    )]
    UnexpectedSigner {
        expected: Vec<Pubkey>,
        unexpected: Vec<Pubkey>,
    },
    /// The transaction is missing signatures for the listed addresses.
    #[error("Transaction is missing signatures for addresses: {}", join(.addresses))]
    SignaturesMissing { addresses: Vec<Pubkey> },
    /// The fee payer has not signed.
    #[error("Transaction is missing the fee payer signature")]
    FeePayerSignatureMissing,
    /// The signer backend failed.
    #[error("Signer {address} failed: {message}")]
    Signer { address: Pubkey, message: String },
}

/// Errors raised by the wire codec.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The number of encoded signatures differs from the header's signer count.
    #[error("Transaction has {actual} signatures but its message requires {expected}")]
    SignatureCountMismatch { expected: usize, actual: usize },
    /// Versions are encoded in the low seven bits of the prefix byte.
    #[error("Transaction version {0} is out of range [0, 127]")]
    VersionOutOfRange(u8),
    /// A transaction needs at least one signature slot.
    #[error("Cannot encode a transaction with an empty signatures map")]
    CannotEncodeWithEmptySignatures,
    /// Ran out of bytes while decoding `what`.
    #[error("Unexpected end of input while decoding {what} at offset {offset}")]
    UnexpectedEndOfInput { what: &'static str, offset: usize },
    /// A compact-u16 value was overlong, aliased or overflowed.
    #[error("Invalid compact-u16 at offset {offset}")]
    InvalidShortU16 { offset: usize },
    /// Bytes remained after decoding a complete message.
    #[error("{count} trailing bytes after message")]
    TrailingBytes { count: usize },
    /// An array is too long for a compact-u16 length prefix.
    #[error("Length {0} does not fit in a compact-u16")]
    LengthTooLarge(usize),
}

/// Errors raised while decompiling a message into instructions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecompileError {
    /// The message loads accounts from lookup tables whose contents were not
    /// supplied.
    #[error("Decompiling messages with address table lookups is not supported")]
    AddressTableLookupsUnsupported,
    /// The message has no static accounts.
    #[error("Compiled message has no fee payer")]
    FeePayerMissing,
    /// An instruction's program index does not resolve to an account.
    #[error("No program address at account index {index}")]
    ProgramAddressNotFound { index: u8 },
    /// An instruction's account index does not resolve to an account.
    #[error("No account at account index {index}")]
    AccountIndexNotFound { index: u8 },
    /// Contents were supplied for some but not all referenced lookup tables.
    #[error("Missing contents for lookup tables: {}", join(.lookup_table_addresses))]
    LookupTableContentsMissing { lookup_table_addresses: Vec<Pubkey> },
    /// A lookup index points past the end of the supplied table contents.
    #[error(
        "Lookup table {lookup_table_address} has {table_len} addresses, index {index} requested"
    )]
    LookupTableIndexOutOfRange {
        lookup_table_address: Pubkey,
        table_len: usize,
        index: u8,
    },
}

/// Any error produced by this workspace.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Lifetime(#[from] LifetimeError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Decompile(#[from] DecompileError),
}

pub type Result<T> = std::result::Result<T, TransactionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_addresses() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let err = SignatureError::SignaturesMissing {
            addresses: vec![a, b],
        };
        assert_eq!(
            err.to_string(),
            format!("Transaction is missing signatures for addresses: {a}, {b}")
        );

        let err: TransactionError =
            CompileError::InvokedProgramCannotPayFees { program_address: a }.into();
        assert_eq!(err.to_string(), format!("Invoked program cannot pay fees: {a}"));
    }
}
