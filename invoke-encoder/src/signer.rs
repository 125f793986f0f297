use starknet::core::crypto::{ecdsa_sign, ecdsa_verify, Signature};
use starknet::core::types::FieldElement;
use starknet_crypto::get_public_key;
use starknet_curve::curve_params::EC_ORDER;

use crate::error::EncodeError;

/// An `(r, s)` signature pair bound to exactly one message hash and key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvokeSignature {
    pub r: FieldElement,
    pub s: FieldElement,
}

/// Stark-curve ECDSA signer over a validated private scalar.
///
/// Holds only the key it was constructed with; nothing is persisted. The
/// signing nonce is deterministic (RFC 6979), so signing the same message
/// hash twice yields the same pair.
#[derive(Clone)]
pub struct StarkSigner {
    secret: FieldElement,
}

impl StarkSigner {
    /// Validate and wrap a private scalar.
    ///
    /// Zero and values at or above the curve order are unusable as signing
    /// keys and are rejected up front, before any step runs.
    pub fn new(secret: FieldElement) -> Result<Self, EncodeError> {
        if secret == FieldElement::ZERO || secret >= EC_ORDER {
            return Err(EncodeError::InvalidKey);
        }
        Ok(Self { secret })
    }

    /// The public key the account contract checks signatures against.
    pub fn public_key(&self) -> FieldElement {
        get_public_key(&self.secret)
    }

    /// Sign a message hash.
    pub fn sign(&self, message_hash: &FieldElement) -> Result<InvokeSignature, EncodeError> {
        let signature = ecdsa_sign(&self.secret, message_hash)?;
        Ok(InvokeSignature {
            r: signature.r,
            s: signature.s,
        })
    }
}

impl std::fmt::Debug for StarkSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarkSigner")
            .field("public_key", &self.public_key())
            .finish()
    }
}

/// Check an `(r, s)` pair against a public key and message hash.
///
/// Out-of-range components count as a failed check, not an error.
pub fn verify_signature(
    public_key: &FieldElement,
    message_hash: &FieldElement,
    signature: &InvokeSignature,
) -> bool {
    let signature = Signature {
        r: signature.r,
        s: signature.s,
    };
    ecdsa_verify(public_key, message_hash, &signature).unwrap_or(false)
}
