use starknet::core::types::FieldElement;
use starknet_crypto::pedersen_hash;

/// Pedersen chain hash over an ordered sequence of felts.
///
/// Folds `h = pedersen(h, e)` from zero, then compresses the element count in
/// as the final link. This is the convention the account contract uses for
/// both calldata digests and message hashes, so any deviation produces
/// signatures the remote verifier silently rejects.
pub fn hash_elements(elements: &[FieldElement]) -> FieldElement {
    let running = elements
        .iter()
        .fold(FieldElement::ZERO, |acc, e| pedersen_hash(&acc, e));
    pedersen_hash(&running, &FieldElement::from(elements.len() as u64))
}
