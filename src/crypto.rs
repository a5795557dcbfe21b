//! Cryptographic primitives for StarLedger
//!
//! Ownership is proven with secp256k1 message signatures in the Bitcoin
//! signed-message layout: a 65-byte recoverable signature, base64 encoded,
//! whose first byte carries the recovery id. The verifier recovers the signing
//! key from the signature and compares its address with the claimed one.

use crate::error::{LedgerError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE},
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};

/// A thread-safe, lazily initialized Secp256k1 context.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Prefix mixed into every signed message, keeping ledger signatures apart from ones made for other uses.
pub const MESSAGE_MAGIC: &str = "Star Ledger Signed Message:\n";

/// Header byte plus the compact signature.
pub const MESSAGE_SIGNATURE_SIZE: usize = COMPACT_SIGNATURE_SIZE + 1;

const HEADER_MIN: u8 = 27;
const HEADER_MAX: u8 = 34;
/// Header base for signatures made with a compressed public key.
const HEADER_COMPRESSED: u8 = 31;

/// Checks that `signature` proves control of `address` over `message`.
///
/// `Ok(false)` means the signature is well formed but was made by someone else.
/// Malformed input is an `Err`.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, message: &str, address: &str, signature: &str) -> Result<bool>;
}

/// Address of a public key: hex SHA-256 of its compressed encoding.
pub fn address_from_public_key(public_key: &PublicKey) -> String {
    let pubkey_bytes: [u8; PUBLIC_KEY_SIZE] = public_key.serialize();
    hex::encode(Sha256::digest(pubkey_bytes))
}

fn write_varint(buf: &mut Vec<u8>, n: usize) {
    let n = n as u64;
    match n {
        0..=0xfc => buf.push(n as u8),
        0xfd..=0xffff => {
            buf.push(0xfd);
            buf.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(0xfe);
            buf.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            buf.push(0xff);
            buf.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Double SHA-256 over the length-prefixed magic and message.
pub fn message_digest(message: &str) -> [u8; 32] {
    let mut buf = Vec::with_capacity(MESSAGE_MAGIC.len() + message.len() + 10);
    write_varint(&mut buf, MESSAGE_MAGIC.len());
    buf.extend_from_slice(MESSAGE_MAGIC.as_bytes());
    write_varint(&mut buf, message.len());
    buf.extend_from_slice(message.as_bytes());
    Sha256::digest(Sha256::digest(&buf)).into()
}

fn to_message(message: &str) -> Result<Message> {
    let digest = message_digest(message);
    Message::from_digest_slice(&digest)
        .map_err(|e| LedgerError::CryptoError(format!("Failed to create message: {}", e)))
}

/// Recovers the public key that produced `signature` over `message`.
pub fn recover_public_key(message: &str, signature: &str) -> Result<PublicKey> {
    let bytes = STANDARD
        .decode(signature.trim())
        .map_err(|e| LedgerError::CryptoError(format!("Signature is not valid base64: {}", e)))?;
    if bytes.len() != MESSAGE_SIGNATURE_SIZE {
        return Err(LedgerError::CryptoError(format!(
            "Signature must be exactly {} bytes, got {}",
            MESSAGE_SIGNATURE_SIZE,
            bytes.len()
        )));
    }

    let header = bytes[0];
    if !(HEADER_MIN..=HEADER_MAX).contains(&header) {
        return Err(LedgerError::CryptoError(format!(
            "Invalid signature header byte: {}",
            header
        )));
    }
    let recovery_id = RecoveryId::from_i32(((header - HEADER_MIN) & 3) as i32)
        .map_err(|e| LedgerError::CryptoError(format!("Invalid recovery id: {}", e)))?;
    let signature = RecoverableSignature::from_compact(&bytes[1..], recovery_id)
        .map_err(|e| LedgerError::CryptoError(format!("Invalid signature: {}", e)))?;

    SECP256K1_CONTEXT
        .recover_ecdsa(&to_message(message)?, &signature)
        .map_err(|e| LedgerError::CryptoError(format!("Public key recovery failed: {}", e)))
}

/// Verifies signatures produced by [`KeyPair::sign_message`] or any wallet using the same layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1MessageVerifier;

impl SignatureVerifier for Secp256k1MessageVerifier {
    fn verify(&self, message: &str, address: &str, signature: &str) -> Result<bool> {
        let public_key = recover_public_key(message, signature)?;
        Ok(address_from_public_key(&public_key) == address)
    }
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Self {
        Self::from_secret_key(SecretKey::new(&mut OsRng))
    }

    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| {
            if bytes.len() != SECRET_KEY_SIZE {
                LedgerError::CryptoError(format!(
                    "Secret key must be {} bytes, got {}",
                    SECRET_KEY_SIZE,
                    bytes.len()
                ))
            } else {
                LedgerError::CryptoError(format!("Invalid secret key bytes: {}", e))
            }
        })?;

        Ok(Self::from_secret_key(secret_key))
    }

    pub fn address(&self) -> String {
        address_from_public_key(&self.public_key)
    }

    /// Signs `message` and returns the base64 signature the verifier expects.
    pub fn sign_message(&self, message: &str) -> Result<String> {
        let signature =
            SECP256K1_CONTEXT.sign_ecdsa_recoverable(&to_message(message)?, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut bytes = [0u8; MESSAGE_SIGNATURE_SIZE];
        bytes[0] = HEADER_COMPRESSED + recovery_id.to_i32() as u8;
        bytes[1..].copy_from_slice(&compact);
        Ok(STANDARD.encode(bytes))
    }
}
