//! The signature container and signing.
//!
//! A transaction owns its message bytes and one signature slot per signer
//! the message requires. The set of slots is fixed when the transaction is
//! created; signing fills slots in, it never adds or removes them. Signing
//! operations take the transaction by reference and return a new one.

use {
    crate::{codec::encode_transaction, lifetime::LifetimeConstraint, signer::TransactionSigner},
    base64::{prelude::BASE64_STANDARD, Engine},
    ed25519_dalek::Verifier,
    futures::future::try_join_all,
    log::debug,
    solana_pubkey::Pubkey,
    std::fmt,
    txforge_error::{Result, SignatureError},
};

const SIGNATURE_BYTES: usize = 64;

/// A 64-byte ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_BYTES]);

impl Signature {
    pub const LEN: usize = SIGNATURE_BYTES;

    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// The placeholder written for a missing signature.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Verify this signature over `message` with `pubkey`.
    pub fn verify(&self, pubkey: &Pubkey, message: &[u8]) -> bool {
        let Ok(public_key) = ed25519_dalek::PublicKey::from_bytes(pubkey.as_ref()) else {
            return false;
        };
        let Ok(signature) = ed25519_dalek::Signature::try_from(&self.0[..]) else {
            return false;
        };
        public_key.verify(message, &signature).is_ok()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0; Self::LEN])
    }
}

impl From<[u8; SIGNATURE_BYTES]> for Signature {
    fn from(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

/// Signer address -> signature, if present. Iteration follows signer order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignaturesMap(Vec<(Pubkey, Option<Signature>)>);

impl SignaturesMap {
    /// A map with an empty slot for each signer.
    pub fn new(signers: impl IntoIterator<Item = Pubkey>) -> Self {
        Self(signers.into_iter().map(|address| (address, None)).collect())
    }

    /// A map with the given slots, in order.
    pub fn from_slots(slots: impl IntoIterator<Item = (Pubkey, Option<Signature>)>) -> Self {
        Self(slots.into_iter().collect())
    }

    /// `None` if `address` has no slot, `Some(None)` if its slot is empty.
    pub fn get(&self, address: &Pubkey) -> Option<Option<&Signature>> {
        self.0
            .iter()
            .find(|(a, _)| a == address)
            .map(|(_, signature)| signature.as_ref())
    }

    pub fn contains(&self, address: &Pubkey) -> bool {
        self.0.iter().any(|(a, _)| a == address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Pubkey> {
        self.0.iter().map(|(address, _)| address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pubkey, Option<&Signature>)> {
        self.0
            .iter()
            .map(|(address, signature)| (address, signature.as_ref()))
    }

    /// Addresses whose slot is empty, in signer order.
    pub fn missing(&self) -> Vec<Pubkey> {
        self.0
            .iter()
            .filter(|(_, signature)| signature.is_none())
            .map(|(address, _)| *address)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fill the slot for `address`. Addresses without a slot are ignored.
    fn with_signature(mut self, address: &Pubkey, signature: Signature) -> Self {
        if let Some((_, slot)) = self.0.iter_mut().find(|(a, _)| a == address) {
            *slot = Some(signature);
        }
        self
    }
}

/// Encoded message bytes plus the signatures over them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub message_bytes: Vec<u8>,
    pub signatures: SignaturesMap,
    /// Known when the transaction was compiled locally, `None` when decoded.
    pub lifetime_constraint: Option<LifetimeConstraint>,
}

impl Transaction {
    /// The full transaction in wire format.
    pub fn wire_bytes(&self) -> Result<Vec<u8>> {
        Ok(encode_transaction(self)?)
    }

    /// The wire format as base64, as expected by `sendTransaction`.
    pub fn to_base64(&self) -> Result<String> {
        Ok(BASE64_STANDARD.encode(self.wire_bytes()?))
    }
}

/// Sign the transaction with every signer and return the result. Existing
/// signatures from other signers are kept, signatures from these signers are
/// replaced.
///
/// Fails without signing anything if a signer's address has no slot. All
/// signers run concurrently; if any fails, the whole call fails.
pub async fn partially_sign_transaction<S: TransactionSigner>(
    signers: &[S],
    transaction: &Transaction,
) -> Result<Transaction> {
    let mut unexpected = Vec::<Pubkey>::new();
    for address in signers.iter().map(TransactionSigner::pubkey) {
        if !transaction.signatures.contains(&address) && !unexpected.contains(&address) {
            unexpected.push(address);
        }
    }
    if !unexpected.is_empty() {
        return Err(SignatureError::UnexpectedSigner {
            expected: transaction.signatures.addresses().copied().collect(),
            unexpected,
        }
        .into());
    }

    let message = transaction.message_bytes.as_slice();
    let signed = try_join_all(signers.iter().map(|signer| async move {
        let signature = signer.sign_message(message).await?;
        Ok::<_, SignatureError>((signer.pubkey(), signature))
    }))
    .await?;
    debug!("Collected {} signatures", signed.len());

    let signatures = signed
        .iter()
        .fold(transaction.signatures.clone(), |map, (address, signature)| {
            map.with_signature(address, *signature)
        });
    Ok(Transaction {
        signatures,
        ..transaction.clone()
    })
}

/// Sign the transaction and require that every slot is then filled.
pub async fn sign_transaction<S: TransactionSigner>(
    signers: &[S],
    transaction: &Transaction,
) -> Result<Transaction> {
    let transaction = partially_sign_transaction(signers, transaction).await?;
    assert_transaction_is_fully_signed(&transaction)?;
    Ok(transaction)
}

/// Fail with every address whose slot is empty.
pub fn assert_transaction_is_fully_signed(
    transaction: &Transaction,
) -> std::result::Result<(), SignatureError> {
    let addresses = transaction.signatures.missing();
    if addresses.is_empty() {
        Ok(())
    } else {
        Err(SignatureError::SignaturesMissing { addresses })
    }
}

/// The fee payer's signature, which identifies the transaction.
pub fn transaction_signature(
    transaction: &Transaction,
) -> std::result::Result<Signature, SignatureError> {
    transaction
        .signatures
        .iter()
        .next()
        .and_then(|(_, signature)| signature.copied())
        .ok_or(SignatureError::FeePayerSignatureMissing)
}
