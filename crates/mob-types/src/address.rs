//! MobileCoin public address parsing, validation, and creation.
//!
//! The printable form is a protobuf `PrintableWrapper` holding the address,
//! prefixed with its little-endian CRC-32 checksum and base58 encoded.

use crate::constants::{CHECKSUM_SIZE, KEY_SIZE};
use crc::{Crc, CRC_32_ISO_HDLC};
use prost::Message;
use thiserror::Error;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address must be a non-empty string")]
    Empty,

    #[error("base58 decode error: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("decoded address too short ({0} bytes)")]
    TooShort(usize),

    #[error("checksum mismatch: expected 0x{expected:08x}, computed 0x{actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("protobuf decode error: {0}")]
    Protobuf(#[from] prost::DecodeError),

    #[error("printable wrapper does not hold a public address")]
    NotPublicAddress,

    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidKeySize {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// A recipient's public address, with optional fog (hint service) info.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicAddress {
    pub view_public_key: [u8; KEY_SIZE],
    pub spend_public_key: [u8; KEY_SIZE],
    /// Fog report server URL; empty when the address has no hint service.
    pub fog_report_url: String,
    pub fog_report_id: String,
    pub fog_authority_sig: Vec<u8>,
}

impl PublicAddress {
    /// Address without fog info.
    pub fn new(view_public_key: [u8; KEY_SIZE], spend_public_key: [u8; KEY_SIZE]) -> Self {
        Self {
            view_public_key,
            spend_public_key,
            ..Default::default()
        }
    }

    /// Attach fog report info.
    pub fn with_fog(mut self, report_url: &str, report_id: &str, authority_sig: &[u8]) -> Self {
        self.fog_report_url = report_url.to_string();
        self.fog_report_id = report_id.to_string();
        self.fog_authority_sig = authority_sig.to_vec();
        self
    }

    pub fn has_fog(&self) -> bool {
        !self.fog_report_url.is_empty()
    }

    /// The fog report URL, if the address declares one.
    pub fn fog_report_url(&self) -> Option<&str> {
        if self.has_fog() {
            Some(&self.fog_report_url)
        } else {
            None
        }
    }

    /// Re-encode this address to its printable string.
    pub fn to_address_string(&self) -> String {
        encode_address(self)
    }
}

/// Parse and validate a printable address string.
pub fn decode_address(address: &str) -> Result<PublicAddress, AddressError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(AddressError::Empty);
    }

    let decoded = bs58::decode(address).into_vec()?;
    if decoded.len() < CHECKSUM_SIZE {
        return Err(AddressError::TooShort(decoded.len()));
    }

    let (checksum, payload) = decoded.split_at(CHECKSUM_SIZE);
    let expected = u32::from_le_bytes([checksum[0], checksum[1], checksum[2], checksum[3]]);
    let actual = CRC32.checksum(payload);
    if expected != actual {
        return Err(AddressError::ChecksumMismatch { expected, actual });
    }

    let wrapper = proto::PrintableWrapper::decode(payload)?;
    match wrapper.wrapper {
        Some(proto::printable_wrapper::Wrapper::PublicAddress(addr)) => from_proto(addr),
        None => Err(AddressError::NotPublicAddress),
    }
}

/// Validate a printable address string.
///
/// Checks encoding, checksum and key sizes only. The fog authority signature
/// is carried through unverified; checking it needs the fog report server's
/// certificate chain, which this crate never fetches.
pub fn is_valid_address(address: &str) -> bool {
    decode_address(address).is_ok()
}

/// Encode an address to its printable string.
pub fn encode_address(address: &PublicAddress) -> String {
    let wrapper = proto::PrintableWrapper {
        wrapper: Some(proto::printable_wrapper::Wrapper::PublicAddress(to_proto(address))),
    };
    let payload = wrapper.encode_to_vec();

    let mut bytes = Vec::with_capacity(CHECKSUM_SIZE + payload.len());
    bytes.extend_from_slice(&CRC32.checksum(&payload).to_le_bytes());
    bytes.extend_from_slice(&payload);
    bs58::encode(bytes).into_string()
}

fn to_proto(src: &PublicAddress) -> proto::PublicAddress {
    proto::PublicAddress {
        view_public_key: Some(proto::CompressedRistretto {
            data: src.view_public_key.to_vec(),
        }),
        spend_public_key: Some(proto::CompressedRistretto {
            data: src.spend_public_key.to_vec(),
        }),
        fog_report_url: src.fog_report_url.clone(),
        fog_report_id: src.fog_report_id.clone(),
        fog_authority_sig: src.fog_authority_sig.clone(),
    }
}

fn from_proto(src: proto::PublicAddress) -> Result<PublicAddress, AddressError> {
    Ok(PublicAddress {
        view_public_key: key_from_proto("view_public_key", src.view_public_key)?,
        spend_public_key: key_from_proto("spend_public_key", src.spend_public_key)?,
        fog_report_url: src.fog_report_url,
        fog_report_id: src.fog_report_id,
        fog_authority_sig: src.fog_authority_sig,
    })
}

fn key_from_proto(
    field: &'static str,
    key: Option<proto::CompressedRistretto>,
) -> Result<[u8; KEY_SIZE], AddressError> {
    let data = key.map(|k| k.data).unwrap_or_default();
    data.as_slice()
        .try_into()
        .map_err(|_| AddressError::InvalidKeySize {
            field,
            expected: KEY_SIZE,
            actual: data.len(),
        })
}

// Printable wire messages (subset of printable.proto / external.proto).
mod proto {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CompressedRistretto {
        #[prost(bytes = "vec", tag = "1")]
        pub data: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PublicAddress {
        #[prost(message, optional, tag = "1")]
        pub view_public_key: Option<CompressedRistretto>,
        #[prost(message, optional, tag = "2")]
        pub spend_public_key: Option<CompressedRistretto>,
        #[prost(string, tag = "3")]
        pub fog_report_url: String,
        #[prost(string, tag = "4")]
        pub fog_report_id: String,
        #[prost(bytes = "vec", tag = "5")]
        pub fog_authority_sig: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PrintableWrapper {
        #[prost(oneof = "printable_wrapper::Wrapper", tags = "1")]
        pub wrapper: Option<printable_wrapper::Wrapper>,
    }

    pub mod printable_wrapper {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Wrapper {
            #[prost(message, tag = "1")]
            PublicAddress(super::PublicAddress),
        }
    }
}
