//! Off-chain construction and signing of account `execute` invocations.
//!
//! Everything the remote account contract verifies is assembled here: the
//! Pedersen chain hash over calldata, the five-field invoke message, the
//! Stark-curve ECDSA signature, and the positional `execute` input layout.
//! The dispatch transport lives with the caller; this crate only produces
//! values the network's verifier will accept.

pub mod envelope;
pub mod error;
pub mod felt;
pub mod hash;
pub mod message;
pub mod signer;

#[cfg(test)]
mod tests;

pub use envelope::{build_signed_envelope, InvokeEnvelope};
pub use error::EncodeError;
pub use felt::parse_felt;
pub use hash::hash_elements;
pub use message::{selector_for, InvokeMessage};
pub use signer::{verify_signature, InvokeSignature, StarkSigner};
