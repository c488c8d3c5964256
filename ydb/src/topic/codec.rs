use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{ClientError, Error};
use ydb_apis::topic::Codec;

/// Decodes one compressed message payload.
pub trait Decompressor: Send + Sync {
    fn decompress(
        &self,
        payload: &[u8],
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

struct RawCodec;

impl Decompressor for RawCodec {
    fn decompress(
        &self,
        payload: &[u8],
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(payload.to_vec())
    }
}

/// Registry of decompressors keyed by wire codec. RAW is registered out of
/// the box; other codecs fail fast until the application registers one.
pub struct CodecRegistry {
    decompressors: HashMap<i32, Arc<dyn Decompressor>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut decompressors: HashMap<i32, Arc<dyn Decompressor>> = HashMap::new();
        decompressors.insert(Codec::Raw as i32, Arc::new(RawCodec));
        Self { decompressors }
    }
}

impl CodecRegistry {
    pub fn register(&mut self, codec: Codec, decompressor: Arc<dyn Decompressor>) {
        self.decompressors.insert(codec as i32, decompressor);
    }

    pub(crate) fn decompress(&self, codec: i32, payload: &[u8]) -> Result<Vec<u8>, Error> {
        if codec == Codec::Unspecified as i32 {
            return Ok(payload.to_vec());
        }
        let decompressor = self.decompressors.get(&codec).ok_or_else(|| {
            ClientError::InvalidConfig(format!("no decompressor registered for codec {codec}"))
        })?;
        decompressor
            .decompress(payload)
            .map_err(|e| ClientError::MalformedResult(format!("decompression failed: {e}")).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_is_preregistered() {
        let registry = CodecRegistry::default();
        let payload = registry.decompress(Codec::Raw as i32, b"data").unwrap();
        assert_eq!(payload, b"data");
    }

    #[test]
    fn test_unspecified_passes_through() {
        let registry = CodecRegistry::default();
        let payload = registry.decompress(Codec::Unspecified as i32, b"data").unwrap();
        assert_eq!(payload, b"data");
    }

    #[test]
    fn test_unregistered_codec_fails_fast() {
        let registry = CodecRegistry::default();
        assert!(registry.decompress(Codec::Gzip as i32, b"data").is_err());
    }

    #[test]
    fn test_custom_decompressor() {
        struct Reverse;
        impl Decompressor for Reverse {
            fn decompress(
                &self,
                payload: &[u8],
            ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
                Ok(payload.iter().rev().copied().collect())
            }
        }
        let mut registry = CodecRegistry::default();
        registry.register(Codec::Gzip, Arc::new(Reverse));
        assert_eq!(registry.decompress(Codec::Gzip as i32, b"abc").unwrap(), b"cba");
    }
}
