use starknet::core::types::FieldElement;

use crate::envelope::build_signed_envelope;
use crate::error::EncodeError;
use crate::felt::parse_felt;
use crate::hash::hash_elements;
use crate::message::{selector_for, InvokeMessage};
use crate::signer::{verify_signature, StarkSigner};

fn felts(values: &[u64]) -> Vec<FieldElement> {
    values.iter().map(|&v| FieldElement::from(v)).collect()
}

fn test_signer() -> StarkSigner {
    StarkSigner::new(FieldElement::from(12345u64)).unwrap()
}

#[test]
fn hash_is_deterministic() {
    let data = felts(&[7, 11, 13]);
    assert_eq!(hash_elements(&data), hash_elements(&data));
}

#[test]
fn hash_is_order_sensitive() {
    let forward = hash_elements(&felts(&[1, 2, 3]));
    let swapped = hash_elements(&felts(&[1, 3, 2]));
    let reversed = hash_elements(&felts(&[3, 2, 1]));
    assert_ne!(forward, swapped);
    assert_ne!(forward, reversed);
    assert_ne!(swapped, reversed);
}

#[test]
fn hash_binds_length() {
    // A trailing zero must not collapse into the shorter sequence.
    let short = hash_elements(&felts(&[5, 6]));
    let padded = hash_elements(&felts(&[5, 6, 0]));
    assert_ne!(short, padded);
    assert_ne!(hash_elements(&[]), hash_elements(&felts(&[0])));
}

#[test]
fn selector_is_deterministic_and_name_bound() {
    let a = selector_for("create_pool").unwrap();
    let b = selector_for("create_pool").unwrap();
    let other = selector_for("add_pool_token").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, other);
}

#[test]
fn selector_rejects_non_ascii_names() {
    assert!(matches!(
        selector_for("créate_pool"),
        Err(EncodeError::InvalidFunctionName { .. })
    ));
}

#[test]
fn message_hash_binds_every_field() {
    let base = InvokeMessage::new(
        FieldElement::from(101u64),
        FieldElement::from(202u64),
        "create_pool",
        &felts(&[1, 2, 3]),
        FieldElement::from(4u64),
    )
    .unwrap();

    let mut variants = Vec::new();
    for index in 0..5 {
        let mut m = base.clone();
        match index {
            0 => m.sender = m.sender + FieldElement::ONE,
            1 => m.target = m.target + FieldElement::ONE,
            2 => m.selector = m.selector + FieldElement::ONE,
            3 => m.calldata_hash = m.calldata_hash + FieldElement::ONE,
            _ => m.nonce = m.nonce + FieldElement::ONE,
        }
        variants.push(m.hash());
    }

    for hash in &variants {
        assert_ne!(*hash, base.hash());
    }
}

#[test]
fn sign_verify_round_trip() {
    let signer = test_signer();
    let message_hash = hash_elements(&felts(&[42, 43]));
    let signature = signer.sign(&message_hash).unwrap();

    assert!(verify_signature(
        &signer.public_key(),
        &message_hash,
        &signature
    ));

    // The same pair must not validate any other message.
    let other_hash = hash_elements(&felts(&[42, 44]));
    assert!(!verify_signature(
        &signer.public_key(),
        &other_hash,
        &signature
    ));
}

#[test]
fn zero_key_is_rejected() {
    assert!(matches!(
        StarkSigner::new(FieldElement::ZERO),
        Err(EncodeError::InvalidKey)
    ));
}

#[test]
fn out_of_range_key_is_rejected() {
    assert!(matches!(
        StarkSigner::new(starknet_curve::curve_params::EC_ORDER),
        Err(EncodeError::InvalidKey)
    ));
}

#[test]
fn felt_parsing_accepts_both_radixes() {
    assert_eq!(parse_felt("255").unwrap(), FieldElement::from(255u64));
    assert_eq!(parse_felt("0xff").unwrap(), FieldElement::from(255u64));
    assert_eq!(parse_felt(" 0xFF ").unwrap(), FieldElement::from(255u64));
}

#[test]
fn felt_parsing_rejects_overflow() {
    // Far above the field modulus.
    let above_modulus = format!("0x{}", "f".repeat(64));
    assert!(matches!(
        parse_felt(&above_modulus),
        Err(EncodeError::FieldOverflow { .. })
    ));
    assert!(parse_felt("not a felt").is_err());
}

#[test]
fn envelope_lays_out_execute_inputs() {
    let signer = test_signer();
    let calldata = felts(&[10, 20, 30, 40]);
    let envelope = build_signed_envelope(
        FieldElement::from(101u64),
        FieldElement::from(202u64),
        "create_pool",
        calldata.clone(),
        FieldElement::from(7u64),
        &signer,
    )
    .unwrap();

    let inputs = envelope.execute_inputs();
    assert_eq!(inputs[0], FieldElement::from(202u64));
    assert_eq!(inputs[1], selector_for("create_pool").unwrap());
    assert_eq!(inputs[2], FieldElement::from(4u64));
    assert_eq!(&inputs[3..7], calldata.as_slice());
    assert_eq!(inputs[7], FieldElement::from(7u64));
    assert_eq!(inputs.len(), 8);
}

#[test]
fn envelope_signature_covers_the_message() {
    let signer = test_signer();
    let envelope = build_signed_envelope(
        FieldElement::from(101u64),
        FieldElement::from(202u64),
        "add_pool_token",
        felts(&[1, 2, 3, 4]),
        FieldElement::from(9u64),
        &signer,
    )
    .unwrap();

    let message = InvokeMessage {
        sender: envelope.account,
        target: envelope.target,
        selector: envelope.selector,
        calldata_hash: hash_elements(&envelope.calldata),
        nonce: envelope.nonce,
    };
    assert!(verify_signature(
        &signer.public_key(),
        &message.hash(),
        &envelope.signature
    ));
}
