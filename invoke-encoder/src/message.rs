use starknet::core::types::FieldElement;
use starknet::core::utils::get_selector_from_name;

use crate::error::EncodeError;
use crate::hash::hash_elements;

/// Derive the entry-point selector for a function name.
pub fn selector_for(function_name: &str) -> Result<FieldElement, EncodeError> {
    get_selector_from_name(function_name).map_err(|_| EncodeError::InvalidFunctionName {
        name: function_name.to_owned(),
    })
}

/// The canonical message an account signs for one invocation.
///
/// Binds the signature to the exact account, contract, entry point, argument
/// sequence, and nonce. The hash field order is fixed by the account
/// contract's verifier; reordering it invalidates every signature produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvokeMessage {
    pub sender: FieldElement,
    pub target: FieldElement,
    pub selector: FieldElement,
    pub calldata_hash: FieldElement,
    pub nonce: FieldElement,
}

impl InvokeMessage {
    /// Assemble the message for one call: digest the calldata, derive the
    /// selector, and bind both to the sender, target, and current nonce.
    pub fn new(
        sender: FieldElement,
        target: FieldElement,
        function_name: &str,
        calldata: &[FieldElement],
        nonce: FieldElement,
    ) -> Result<Self, EncodeError> {
        Ok(Self {
            sender,
            target,
            selector: selector_for(function_name)?,
            calldata_hash: hash_elements(calldata),
            nonce,
        })
    }

    /// Hash over `[sender, target, selector, calldata_hash, nonce]`, in that
    /// order.
    pub fn hash(&self) -> FieldElement {
        hash_elements(&[
            self.sender,
            self.target,
            self.selector,
            self.calldata_hash,
            self.nonce,
        ])
    }
}
