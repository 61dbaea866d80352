//! AES-128-CBC with PKCS#7 padding, the HLS `METHOD=AES-128` cipher.

use aes::Aes128;
use bytes::Bytes;
use cipher::{block_padding::Pkcs7, BlockDecryptMut, InnerIvInit, KeyInit};

use super::BlockDecryptor;
use crate::error::HlsError;

type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Default [`BlockDecryptor`]: keeps the expanded AES key schedule and
/// builds a CBC decryptor per segment from it.
#[derive(Default)]
pub struct Aes128CbcDecryptor {
    cipher: Option<Aes128>,
}

impl Aes128CbcDecryptor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockDecryptor for Aes128CbcDecryptor {
    fn expand_key(&mut self, key: &[u8]) -> Result<(), HlsError> {
        let cipher = Aes128::new_from_slice(key).map_err(|_| {
            HlsError::InvalidKey(format!("AES-128 key must be 16 bytes, got {}", key.len()))
        })?;
        self.cipher = Some(cipher);
        Ok(())
    }

    fn decrypt(&self, data: &[u8], iv: &[u8; 16]) -> Result<Bytes, HlsError> {
        let cipher = self
            .cipher
            .clone()
            .ok_or_else(|| HlsError::Decrypt("key not expanded".to_string()))?;
        let decryptor = Aes128CbcDec::inner_iv_slice_init(cipher, iv)
            .map_err(|e| HlsError::Decrypt(format!("IV: {}", e)))?;
        let mut buffer = data.to_vec();
        let len = decryptor
            .decrypt_padded_mut::<Pkcs7>(&mut buffer)
            .map_err(|e| HlsError::Decrypt(e.to_string()))?
            .len();
        buffer.truncate(len);
        Ok(Bytes::from(buffer))
    }
}
