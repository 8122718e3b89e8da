//! Solidity ABI Codec
//!
//! Covers the handful of types the registry contract uses: `address`,
//! `bool`, `uint256` (values that fit in `u128`), `bytes32` and `string`,
//! plus `address[]` on the decode side. Layout is the standard Solidity
//! one: a head of 32-byte words, with dynamic values stored in a
//! tail and referenced from the head by byte offset.

use kernel::primitives::{Address, Hash32};
use thiserror::Error;

use crate::crypto::selector;

const WORD: usize = 32;

/// ABI decoding failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("read past end of data: offset {offset}, length {len}")]
    OutOfBounds { offset: usize, len: usize },

    #[error("word is not a valid bool")]
    InvalidBool,

    #[error("integer does not fit in target type")]
    Overflow,

    #[error("string is not valid UTF-8")]
    InvalidUtf8,
}

/// A single ABI argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Bool(bool),
    Uint(u128),
    FixedBytes(Hash32),
    String(String),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        matches!(self, Token::String(_))
    }

    fn head_word(&self) -> [u8; 32] {
        match self {
            Token::Address(addr) => addr.to_word(),
            Token::Bool(b) => uint_word(u128::from(*b)),
            Token::Uint(v) => uint_word(*v),
            Token::FixedBytes(h) => h.into_bytes(),
            Token::String(_) => [0u8; 32],
        }
    }
}

fn uint_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn encode_bytes_tail(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&uint_word(bytes.len() as u128));
    out.extend_from_slice(bytes);
    let pad = (WORD - bytes.len() % WORD) % WORD;
    out.extend(std::iter::repeat_n(0u8, pad));
}

/// Encode a tuple of tokens
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
            if let Token::String(s) = token {
                encode_bytes_tail(s.as_bytes(), &mut tail);
            }
        } else {
            head.extend_from_slice(&token.head_word());
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Calldata: selector of `signature` followed by the encoded arguments
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend_from_slice(&encode(tokens));
    data
}

/// Positional reader over ABI-encoded return data or event data
#[derive(Debug, Clone, Copy)]
pub struct AbiDecoder<'a> {
    data: &'a [u8],
}

impl<'a> AbiDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], AbiError> {
        let end = offset
            .checked_add(len)
            .ok_or(AbiError::OutOfBounds { offset, len })?;
        self.data
            .get(offset..end)
            .ok_or(AbiError::OutOfBounds { offset, len })
    }

    fn word_at(&self, offset: usize) -> Result<&'a [u8; 32], AbiError> {
        self.slice(offset, WORD)?
            .try_into()
            .map_err(|_| AbiError::OutOfBounds { offset, len: WORD })
    }

    fn usize_at(&self, offset: usize) -> Result<usize, AbiError> {
        let value = self.uint_at(offset)?;
        usize::try_from(value).map_err(|_| AbiError::Overflow)
    }

    fn uint_at(&self, offset: usize) -> Result<u128, AbiError> {
        let word = self.word_at(offset)?;
        if word[..16].iter().any(|&b| b != 0) {
            return Err(AbiError::Overflow);
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&word[16..]);
        Ok(u128::from_be_bytes(low))
    }

    /// Raw head word at position `index`
    pub fn word(&self, index: usize) -> Result<&'a [u8; 32], AbiError> {
        self.word_at(index * WORD)
    }

    pub fn address(&self, index: usize) -> Result<Address, AbiError> {
        Ok(Address::from_word(self.word(index)?))
    }

    pub fn bool(&self, index: usize) -> Result<bool, AbiError> {
        match self.uint_at(index * WORD) {
            Ok(0) => Ok(false),
            Ok(1) => Ok(true),
            Ok(_) | Err(AbiError::Overflow) => Err(AbiError::InvalidBool),
            Err(e) => Err(e),
        }
    }

    pub fn uint(&self, index: usize) -> Result<u128, AbiError> {
        self.uint_at(index * WORD)
    }

    pub fn uint_u64(&self, index: usize) -> Result<u64, AbiError> {
        u64::try_from(self.uint(index)?).map_err(|_| AbiError::Overflow)
    }

    pub fn fixed_bytes(&self, index: usize) -> Result<Hash32, AbiError> {
        Ok(Hash32::from_bytes(*self.word(index)?))
    }

    pub fn string(&self, index: usize) -> Result<String, AbiError> {
        let offset = self.usize_at(index * WORD)?;
        let len = self.usize_at(offset)?;
        let bytes = self.slice(offset + WORD, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    #[test]
    fn test_encode_call_static_argument() {
        let data = encode_call("isRegistered(address)", &[Token::Address(addr(0x11))]);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &selector("isRegistered(address)"));
        assert!(data[4..16].iter().all(|&b| b == 0));
        assert!(data[16..].iter().all(|&b| b == 0x11));
    }

    #[test]
    fn test_encode_dynamic_layout() {
        // (string "abc", bool true): offset 0x40 in the head, then tail
        let data = encode(&[Token::String("abc".into()), Token::Bool(true)]);
        assert_eq!(data.len(), 4 * 32);

        let decoder = AbiDecoder::new(&data);
        assert_eq!(decoder.uint(0).unwrap(), 64);
        assert!(decoder.bool(1).unwrap());
        assert_eq!(decoder.uint(2).unwrap(), 3);
        assert_eq!(&data[96..99], b"abc");
        assert!(data[99..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_mixed_tuple() {
        let hash = Hash32::from_bytes([7u8; 32]);
        let data = encode(&[
            Token::Bool(true),
            Token::String("Institute of Testing".into()),
            Token::Uint(1_700_000_000),
            Token::FixedBytes(hash),
            Token::String(String::new()),
            Token::Address(addr(0xaa)),
        ]);

        let decoder = AbiDecoder::new(&data);
        assert!(decoder.bool(0).unwrap());
        assert_eq!(decoder.string(1).unwrap(), "Institute of Testing");
        assert_eq!(decoder.uint_u64(2).unwrap(), 1_700_000_000);
        assert_eq!(decoder.fixed_bytes(3).unwrap(), hash);
        assert_eq!(decoder.string(4).unwrap(), "");
        assert_eq!(decoder.address(5).unwrap(), addr(0xaa));
    }

    #[test]
    fn test_decode_rejects_truncated_data() {
        let data = encode(&[Token::String("hello".into())]);
        let truncated = &data[..40];
        assert!(matches!(
            AbiDecoder::new(truncated).string(0),
            Err(AbiError::OutOfBounds { .. })
        ));
        assert!(matches!(
            AbiDecoder::new(&[]).bool(0),
            Err(AbiError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_bool() {
        let data = uint_word(2);
        assert_eq!(AbiDecoder::new(&data).bool(0), Err(AbiError::InvalidBool));
    }
}
