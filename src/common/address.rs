//! TON 地址解析
//!
//! 支持两种格式：
//! - raw：`<workchain>:<64 位 hex>`
//! - user-friendly：48 字符 base64 / base64url（flags + workchain + hash + crc16）
//!
//! 事件 API 返回 raw 格式，调用方通常传 user-friendly 格式，
//! 比较之前必须统一解析。

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use super::error::SwapError;

const FRIENDLY_LEN: usize = 48;
const FRIENDLY_BYTES: usize = 36;

/// 规范化的 TON 地址，相等性只看 workchain + hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TonAddress {
    pub workchain: i32,
    pub hash: [u8; 32],
}

impl TonAddress {
    /// raw 格式：`0:4c20...`
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    fn parse_raw(s: &str) -> Result<Self, SwapError> {
        let (wc, hash_hex) = s
            .split_once(':')
            .ok_or_else(|| SwapError::InvalidAddress(s.to_string()))?;
        let workchain = wc
            .parse::<i32>()
            .map_err(|e| SwapError::InvalidAddress(format!("{s}: bad workchain: {e}")))?;
        let bytes = hex::decode(hash_hex)
            .map_err(|e| SwapError::InvalidAddress(format!("{s}: bad hash hex: {e}")))?;
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SwapError::InvalidAddress(format!("{s}: hash must be 32 bytes")))?;
        Ok(Self { workchain, hash })
    }

    fn parse_friendly(s: &str) -> Result<Self, SwapError> {
        if s.len() != FRIENDLY_LEN {
            return Err(SwapError::InvalidAddress(format!("{s}: expected {FRIENDLY_LEN} chars")));
        }
        let engine = if s.contains(['-', '_']) { &URL_SAFE } else { &STANDARD };
        let data = engine
            .decode(s)
            .map_err(|e| SwapError::InvalidAddress(format!("{s}: bad base64: {e}")))?;
        if data.len() != FRIENDLY_BYTES {
            return Err(SwapError::InvalidAddress(format!("{s}: expected {FRIENDLY_BYTES} bytes")));
        }

        let expected = u16::from_be_bytes([data[34], data[35]]);
        if crc16(&data[..34]) != expected {
            return Err(SwapError::InvalidAddress(format!("{s}: checksum mismatch")));
        }

        let workchain = data[1] as i8 as i32;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&data[2..34]);
        Ok(Self { workchain, hash })
    }
}

impl FromStr for TonAddress {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains(':') { Self::parse_raw(s) } else { Self::parse_friendly(s) }
    }
}

impl fmt::Display for TonAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

impl<'de> Deserialize<'de> for TonAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// CRC16-XMODEM（poly 0x1021, init 0）
fn crc16(data: &[u8]) -> u16 {
    let mut reg: u16 = 0;
    for &byte in data {
        reg ^= (byte as u16) << 8;
        for _ in 0..8 {
            reg = if reg & 0x8000 != 0 { (reg << 1) ^ 0x1021 } else { reg << 1 };
        }
    }
    reg
}
