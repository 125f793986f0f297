use starknet::core::types::FieldElement;

use crate::error::EncodeError;
use crate::message::InvokeMessage;
use crate::signer::{InvokeSignature, StarkSigner};

/// A fully signed invocation, ready for submission through the account's
/// `execute` entry point.
#[derive(Clone, Debug)]
pub struct InvokeEnvelope {
    /// The account contract the `execute` transaction is addressed to.
    pub account: FieldElement,
    /// The contract the account forwards the call to.
    pub target: FieldElement,
    pub selector: FieldElement,
    pub calldata: Vec<FieldElement>,
    pub nonce: FieldElement,
    pub signature: InvokeSignature,
}

impl InvokeEnvelope {
    /// Positional inputs for the account's `execute` entry point:
    /// `[target, selector, calldata_len, calldata..., nonce]`.
    ///
    /// The signature rides outside this list, in the transaction's signature
    /// slot.
    pub fn execute_inputs(&self) -> Vec<FieldElement> {
        let mut inputs = Vec::with_capacity(3 + self.calldata.len() + 1);
        inputs.push(self.target);
        inputs.push(self.selector);
        inputs.push(FieldElement::from(self.calldata.len() as u64));
        inputs.extend_from_slice(&self.calldata);
        inputs.push(self.nonce);
        inputs
    }
}

/// Build, hash, and sign one invocation against the given account and nonce.
pub fn build_signed_envelope(
    account: FieldElement,
    target: FieldElement,
    function_name: &str,
    calldata: Vec<FieldElement>,
    nonce: FieldElement,
    signer: &StarkSigner,
) -> Result<InvokeEnvelope, EncodeError> {
    let message = InvokeMessage::new(account, target, function_name, &calldata, nonce)?;
    let signature = signer.sign(&message.hash())?;
    Ok(InvokeEnvelope {
        account,
        target,
        selector: message.selector,
        calldata,
        nonce,
        signature,
    })
}
