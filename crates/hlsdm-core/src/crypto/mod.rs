//! Segment decryption capability and per-job crypto state.
//!
//! The core never implements a cipher itself: it drives a [`BlockDecryptor`]
//! supplied by the caller. [`Aes128CbcDecryptor`] is the default one.

mod aes;

pub use self::aes::Aes128CbcDecryptor;

use bytes::Bytes;

use crate::error::HlsError;
use crate::manifest::KeyTag;

/// Decrypts whole segments with a key expanded once per job.
pub trait BlockDecryptor: Send {
    /// Expands raw key bytes into the decryptor's key schedule.
    fn expand_key(&mut self, key: &[u8]) -> Result<(), HlsError>;

    /// Decrypts one segment payload with `iv`, removing padding.
    fn decrypt(&self, data: &[u8], iv: &[u8; 16]) -> Result<Bytes, HlsError>;
}

/// Creates fresh decryptors, one per job.
pub trait DecryptorFactory: Send + Sync {
    fn create(&self, method: &str) -> Result<Box<dyn BlockDecryptor>, HlsError>;
}

/// Factory for [`Aes128CbcDecryptor`]; accepts `AES-128` (or no method).
#[derive(Debug, Default, Clone, Copy)]
pub struct Aes128Factory;

impl DecryptorFactory for Aes128Factory {
    fn create(&self, method: &str) -> Result<Box<dyn BlockDecryptor>, HlsError> {
        if method.is_empty() || method.eq_ignore_ascii_case("AES-128") {
            Ok(Box::new(Aes128CbcDecryptor::new()))
        } else {
            Err(HlsError::UnsupportedEncryption(method.to_string()))
        }
    }
}

/// Encryption parameters of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoConfig {
    pub method: String,
    pub key_uri: String,
    /// Raw key bytes, fetched once and shared by every segment.
    pub key: Bytes,
    /// Static IV; `None` derives one per segment.
    pub iv: Option<[u8; 16]>,
}

impl CryptoConfig {
    pub fn from_tag(tag: &KeyTag, key: Bytes) -> Self {
        CryptoConfig {
            method: tag.method.clone(),
            key_uri: tag.uri.clone(),
            key,
            iv: tag.iv,
        }
    }

    /// IV for the segment at zero-based `ordinal`.
    pub fn iv_for(&self, ordinal: usize) -> [u8; 16] {
        self.iv.unwrap_or_else(|| derive_iv(ordinal))
    }
}

/// Fallback IV: the ordinal as a big-endian 128-bit integer (the HLS media
/// sequence rule). Below 256 only the last byte is set; from 256 on the
/// higher bytes carry too, so `256` gives `..01 00` rather than a last byte
/// truncated to `00`.
pub fn derive_iv(ordinal: usize) -> [u8; 16] {
    (ordinal as u128).to_be_bytes()
}

/// Job-scoped crypto: the configuration plus its expanded decryptor.
pub struct JobCrypto {
    pub config: CryptoConfig,
    decryptor: Box<dyn BlockDecryptor>,
}

impl JobCrypto {
    /// Expands the config's key into `decryptor`.
    pub fn new(config: CryptoConfig, mut decryptor: Box<dyn BlockDecryptor>) -> Result<Self, HlsError> {
        decryptor.expand_key(&config.key)?;
        Ok(JobCrypto { config, decryptor })
    }

    pub fn decrypt_segment(&self, data: &[u8], ordinal: usize) -> Result<Bytes, HlsError> {
        let iv = self.config.iv_for(ordinal);
        self.decryptor.decrypt(data, &iv)
    }
}

impl std::fmt::Debug for JobCrypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobCrypto")
            .field("method", &self.config.method)
            .field("key_uri", &self.config.key_uri)
            .finish_non_exhaustive()
    }
}
