//! Core types and constants for MobileCoin transaction building.
//!
//! This crate provides the foundational types used across the workspace:
//! fee and amount constants, masked-amount versions, and the printable
//! (base58 + CRC-32) public address encoding.

pub mod address;
pub mod constants;

pub use address::{decode_address, encode_address, is_valid_address, AddressError, PublicAddress};
pub use constants::MaskedAmountVersion;
