use starknet::core::types::FieldElement;

use crate::error::EncodeError;

/// Parse a felt from its configuration form: `0x`-prefixed hex or decimal.
///
/// Values at or above the field modulus are rejected, never wrapped.
pub fn parse_felt(value: &str) -> Result<FieldElement, EncodeError> {
    let trimmed = value.trim();
    let parsed = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        FieldElement::from_hex_be(hex)
    } else {
        FieldElement::from_dec_str(trimmed)
    };
    parsed.map_err(|_| EncodeError::FieldOverflow {
        value: trimmed.to_owned(),
    })
}
