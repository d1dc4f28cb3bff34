//! ECIES encryption to the DON public key.
//!
//! Wire layout of an encrypted payload:
//!
//! ```text
//! iv (16) ‖ ephemeral public key, compressed (33) ‖ mac (32) ‖ ciphertext
//! ```
//!
//! Key derivation: `sha512(x(ephemeral_secret · recipient_public))`, first half
//! is the AES-256-CBC key, second half the HMAC-SHA256 key. The MAC covers
//! `iv ‖ ephemeral public key (uncompressed, 65) ‖ ciphertext`.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::RngCore;
use secp256k1::{ecdh, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256, Sha512};

use crate::secrets::types::SecretsError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

const IV_LEN: usize = 16;
const COMPRESSED_KEY_LEN: usize = 33;
const MAC_LEN: usize = 32;
const HEADER_LEN: usize = IV_LEN + COMPRESSED_KEY_LEN + MAC_LEN;

/// The oracle network's secp256k1 encryption key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonPublicKey(PublicKey);

impl DonPublicKey {
    /// Parse a key as returned on-chain: 64 raw bytes (x ‖ y), or a 65-byte
    /// uncompressed / 33-byte compressed SEC1 encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SecretsError> {
        let key = match bytes.len() {
            64 => {
                let mut sec1 = [0u8; 65];
                sec1[0] = 0x04;
                sec1[1..].copy_from_slice(bytes);
                PublicKey::from_slice(&sec1)
            }
            _ => PublicKey::from_slice(bytes),
        };
        key.map(Self)
            .map_err(|e| SecretsError::InvalidKey(format!("DON public key: {}", e)))
    }

    /// The key of a secret held by the reader, mainly for tests and tooling.
    pub fn from_secret(secret: &SecretKey) -> Self {
        Self(PublicKey::from_secret_key(&Secp256k1::new(), secret))
    }
}

struct DerivedKeys {
    encryption: [u8; 32],
    mac: [u8; 32],
}

fn derive_keys(public: &PublicKey, secret: &SecretKey) -> DerivedKeys {
    let point = ecdh::shared_secret_point(public, secret);
    let hash = Sha512::digest(&point[..32]);

    let mut keys = DerivedKeys {
        encryption: [0u8; 32],
        mac: [0u8; 32],
    };
    keys.encryption.copy_from_slice(&hash[..32]);
    keys.mac.copy_from_slice(&hash[32..]);
    keys
}

fn compute_mac(key: &[u8], iv: &[u8], ephemeral: &[u8], ciphertext: &[u8]) -> Result<HmacSha256, SecretsError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| SecretsError::Cipher(e.to_string()))?;
    mac.update(iv);
    mac.update(ephemeral);
    mac.update(ciphertext);
    Ok(mac)
}

fn random_secret_key() -> SecretKey {
    let mut rng = rand::thread_rng();
    loop {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        // out-of-range scalars are astronomically rare; draw again
        if let Ok(key) = SecretKey::from_slice(&bytes) {
            return key;
        }
    }
}

/// Encrypt `message` so only the holder of the DON secret key can read it.
pub fn encrypt(recipient: &DonPublicKey, message: &[u8]) -> Result<Vec<u8>, SecretsError> {
    let secp = Secp256k1::new();
    let ephemeral_secret = random_secret_key();
    let ephemeral_public = PublicKey::from_secret_key(&secp, &ephemeral_secret);
    let keys = derive_keys(&recipient.0, &ephemeral_secret);

    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new_from_slices(&keys.encryption, &iv)
        .map_err(|e| SecretsError::Cipher(e.to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(message);

    let tag = compute_mac(
        &keys.mac,
        &iv,
        &ephemeral_public.serialize_uncompressed(),
        &ciphertext,
    )?
    .finalize()
    .into_bytes();

    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ephemeral_public.serialize());
    out.extend_from_slice(&tag);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a payload produced by [`encrypt`] with the recipient's secret key.
pub fn decrypt(recipient: &SecretKey, payload: &[u8]) -> Result<Vec<u8>, SecretsError> {
    if payload.len() <= HEADER_LEN {
        return Err(SecretsError::Cipher("payload too short".to_string()));
    }
    let (iv, rest) = payload.split_at(IV_LEN);
    let (ephemeral, rest) = rest.split_at(COMPRESSED_KEY_LEN);
    let (tag, ciphertext) = rest.split_at(MAC_LEN);

    let ephemeral = PublicKey::from_slice(ephemeral)
        .map_err(|e| SecretsError::Cipher(format!("ephemeral key: {}", e)))?;
    let keys = derive_keys(&ephemeral, recipient);

    compute_mac(&keys.mac, iv, &ephemeral.serialize_uncompressed(), ciphertext)?
        .verify_slice(tag)
        .map_err(|_| SecretsError::Cipher("MAC mismatch".to_string()))?;

    Aes256CbcDec::new_from_slices(&keys.encryption, iv)
        .map_err(|e| SecretsError::Cipher(e.to_string()))?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| SecretsError::Cipher("invalid padding".to_string()))
}
