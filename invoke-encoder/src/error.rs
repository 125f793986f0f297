use thiserror::Error;

/// Errors raised while constructing or signing an invocation.
///
/// All of these are structural: they abort the enclosing step before any
/// network call is made.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A configured value does not fit in the scalar field.
    #[error("value `{value}` is not a valid field element")]
    FieldOverflow { value: String },

    /// The signing key is zero or not below the curve order.
    #[error("private key is outside the valid scalar range")]
    InvalidKey,

    /// Selector derivation rejected the function name.
    #[error("function name `{name}` cannot be hashed into a selector")]
    InvalidFunctionName { name: String },

    /// The ECDSA primitive rejected the message hash.
    #[error("signature generation failed: {0}")]
    Signing(#[from] starknet::core::crypto::EcdsaSignError),
}
