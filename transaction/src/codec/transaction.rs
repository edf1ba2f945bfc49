//! Signed transaction <-> bytes.

use {
    super::{message::read_message, short_vec, Reader},
    crate::signatures::{Signature, SignaturesMap, Transaction},
    log::debug,
    txforge_error::CodecError,
};

/// Encode the signature slots followed by the message bytes. Missing
/// signatures are written as 64 zero bytes.
pub fn encode_transaction(transaction: &Transaction) -> Result<Vec<u8>, CodecError> {
    if transaction.signatures.is_empty() {
        return Err(CodecError::CannotEncodeWithEmptySignatures);
    }
    let mut out = Vec::with_capacity(
        3 + transaction.signatures.len() * Signature::LEN + transaction.message_bytes.len(),
    );
    short_vec::encode_len(transaction.signatures.len(), &mut out)?;
    for (_, signature) in transaction.signatures.iter() {
        match signature {
            Some(signature) => out.extend_from_slice(signature.as_ref()),
            None => out.extend_from_slice(&[0; Signature::LEN]),
        }
    }
    out.extend_from_slice(&transaction.message_bytes);
    Ok(out)
}

/// Decode a transaction. Signature slots are assigned to the message's
/// signers in order; all-zero slots are treated as missing. The decoded
/// transaction has no lifetime constraint, since the message alone cannot
/// tell a blockhash from a nonce.
pub fn decode_transaction(bytes: &[u8]) -> Result<Transaction, CodecError> {
    let mut reader = Reader::new(bytes);
    let num_signatures = reader.read_len()?;
    let slots = (0..num_signatures)
        .map(|_| reader.read_array::<{ Signature::LEN }>("signature"))
        .collect::<Result<Vec<_>, _>>()?;
    let message_bytes = reader.remaining().to_vec();

    let mut message_reader = Reader::new(&message_bytes);
    let message = read_message(&mut message_reader)?;
    if !message_reader.remaining().is_empty() {
        return Err(CodecError::TrailingBytes {
            count: message_reader.remaining().len(),
        });
    }
    let num_signers = usize::from(message.header.num_signer_accounts);
    if slots.len() != num_signers {
        return Err(CodecError::SignatureCountMismatch {
            expected: num_signers,
            actual: slots.len(),
        });
    }
    if message.static_accounts.len() < num_signers {
        return Err(CodecError::UnexpectedEndOfInput {
            what: "signer address",
            offset: message_reader.offset(),
        });
    }

    let signatures = SignaturesMap::from_slots(
        message.static_accounts[..num_signers]
            .iter()
            .zip(slots)
            .map(|(address, slot)| {
                let signature = Signature::from(slot);
                (*address, (!signature.is_zero()).then_some(signature))
            }),
    );
    debug!(
        "Decoded transaction: {} signers, {} signatures present",
        num_signers,
        signatures.iter().filter(|(_, s)| s.is_some()).count(),
    );
    Ok(Transaction {
        message_bytes,
        signatures,
        lifetime_constraint: None,
    })
}
