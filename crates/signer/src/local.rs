//! A signer holding the master key of a BIP-39 mnemonic in memory.

use std::fmt;

use bip39::{Language, Mnemonic, Seed};
use hmac::{Hmac, Mac};
use k256::ecdsa::{Signature, SigningKey, signature::hazmat::PrehashSigner};
use post_office_networks::NamedNetwork;
use post_office_postage::InputSigner;
use post_office_primitives::{CashAddress, Script, SighashType, Transaction, hash160};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::SignerError;

type HmacSha512 = Hmac<Sha512>;

/// HMAC key of BIP-32 master key generation.
const MASTER_KEY_DOMAIN: &[u8] = b"Bitcoin seed";

/// Signs post office inputs with a key derived from a mnemonic.
///
/// The key is the BIP-32 master key of the mnemonic's seed (empty
/// passphrase), so the post office address is the one wallets show for the
/// root node. The secret scalar is wiped when the signer is dropped.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
    public_key: [u8; 33],
    address: CashAddress,
}

impl LocalSigner {
    /// Derives the signer from an English BIP-39 phrase.
    ///
    /// # Errors
    ///
    /// - [`SignerError::InvalidMnemonic`] if the phrase does not parse or its checksum fails
    /// - [`SignerError::InvalidKey`] if the derived secret is not a valid scalar
    pub fn from_mnemonic(phrase: &str, network: NamedNetwork) -> Result<Self, SignerError> {
        let mnemonic = Mnemonic::from_phrase(phrase, Language::English)
            .map_err(|err| SignerError::InvalidMnemonic(err.to_string()))?;
        let seed = Seed::new(&mnemonic, "");
        Self::from_seed(seed.as_bytes(), network)
    }

    /// Derives the signer from a BIP-32 seed.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidKey`] if the derived secret is zero or
    /// not below the curve order.
    pub fn from_seed(seed: &[u8], network: NamedNetwork) -> Result<Self, SignerError> {
        let mut mac =
            HmacSha512::new_from_slice(MASTER_KEY_DOMAIN).map_err(|_| SignerError::InvalidKey)?;
        mac.update(seed);

        let mut derived = Zeroizing::new([0u8; 64]);
        derived.copy_from_slice(&mac.finalize().into_bytes());

        Self::from_secret(&derived[..32], network)
    }

    /// Creates a signer from a raw 32-byte secret key.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidKey`] if `secret` is not a valid scalar.
    pub fn from_secret(secret: &[u8], network: NamedNetwork) -> Result<Self, SignerError> {
        let key = SigningKey::from_slice(secret).map_err(|_| SignerError::InvalidKey)?;

        let point = key.verifying_key().to_encoded_point(true);
        let public_key: [u8; 33] =
            point.as_bytes().try_into().map_err(|_| SignerError::InvalidKey)?;
        let address = CashAddress::p2pkh(network.cash_prefix(), hash160(&public_key));

        Ok(Self { key, public_key, address })
    }

    /// Returns the compressed SEC1 public key.
    #[inline]
    pub const fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    /// Signs a 32-byte digest, returning a low-S DER signature.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::Ecdsa`] if signing fails.
    pub fn sign_digest(&self, digest: &[u8]) -> Result<Vec<u8>, SignerError> {
        let signature: Signature = self.key.sign_prehash(digest)?;
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &format_args!("{}", self.address))
            .finish_non_exhaustive()
    }
}

impl InputSigner for LocalSigner {
    type Error = SignerError;

    fn address(&self) -> CashAddress {
        self.address.clone()
    }

    fn sign_input(
        &self,
        transaction: &Transaction,
        index: usize,
        value: u64,
        sighash_type: SighashType,
    ) -> Result<Script, Self::Error> {
        let script_code = self.address.to_script();
        let digest = transaction.signature_hash(index, &script_code, value, sighash_type)?;

        let mut signature = self.sign_digest(digest.as_slice())?;
        signature.push(sighash_type.to_byte());

        Ok(Script::builder().push(&signature).push(&self.public_key).into_script())
    }
}
