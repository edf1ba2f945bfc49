//! Signers.

use {
    crate::signatures::Signature,
    ed25519_dalek::Signer,
    rand0_7::thread_rng,
    solana_pubkey::Pubkey,
    std::{
        fmt,
        future::{ready, Future},
    },
    txforge_error::SignatureError,
};

/// Something that can sign message bytes on behalf of an address.
///
/// Signing may suspend, for example when the key lives in a hardware
/// wallet or a remote key store.
pub trait TransactionSigner {
    fn pubkey(&self) -> Pubkey;

    fn sign_message(
        &self,
        message: &[u8],
    ) -> impl Future<Output = Result<Signature, SignatureError>> + Send;
}

/// An in-memory ed25519 keypair.
pub struct Keypair(ed25519_dalek::Keypair);

impl Keypair {
    /// Generate a new random keypair.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(ed25519_dalek::Keypair::generate(&mut thread_rng()))
    }

    /// Load a keypair from its 64 bytes: the secret key then the public key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ed25519_dalek::SignatureError> {
        ed25519_dalek::Keypair::from_bytes(bytes).map(Self)
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from(self.0.sign(message).to_bytes())
    }
}

impl TransactionSigner for Keypair {
    fn pubkey(&self) -> Pubkey {
        Pubkey::from(self.0.public.to_bytes())
    }

    fn sign_message(
        &self,
        message: &[u8],
    ) -> impl Future<Output = Result<Signature, SignatureError>> + Send {
        ready(Ok(self.sign(message)))
    }
}

impl<T: TransactionSigner> TransactionSigner for &T {
    fn pubkey(&self) -> Pubkey {
        (**self).pubkey()
    }

    fn sign_message(
        &self,
        message: &[u8],
    ) -> impl Future<Output = Result<Signature, SignatureError>> + Send {
        (**self).sign_message(message)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({})", self.pubkey())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_bytes() {
        let keypair = Keypair::new();
        let restored = Keypair::from_bytes(&keypair.to_bytes()).unwrap();
        assert_eq!(keypair.pubkey(), restored.pubkey());
        assert!(Keypair::from_bytes(&[0; 12]).is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = Keypair::new();
        let signature = keypair.sign(b"hello");
        assert!(signature.verify(&keypair.pubkey(), b"hello"));
        assert!(!signature.verify(&keypair.pubkey(), b"goodbye"));
        assert!(!signature.verify(&Keypair::new().pubkey(), b"hello"));
    }
}
