//! The two-phase bootstrap workflow: create the pool, then register each
//! approved token against it, strictly in list order.
//!
//! Every step re-reads the account nonce from the network before signing.
//! The remote counter is the only authority on sequencing; a prior step that
//! landed has already advanced it, and a locally incremented copy would be
//! rejected. Steps from one account are never submitted concurrently.

use std::fmt;

use basin_invoke_encoder::{build_signed_envelope, EncodeError, StarkSigner};
use starknet::core::types::FieldElement;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Ratio;
use crate::gateway::{GatewayError, InvokeGateway};

/// A token to register, with its pool weight.
#[derive(Clone, Debug)]
pub struct TokenSpec {
    pub address: FieldElement,
    pub weight: Ratio,
}

/// Everything a run needs: the acting account, the contracts it talks to,
/// and the pool parameters.
#[derive(Clone, Debug)]
pub struct BootstrapPlan {
    pub account: FieldElement,
    pub router: FieldElement,
    pub pool: FieldElement,
    pub lp_token: FieldElement,
    pub swap_fee: Ratio,
    pub exit_fee: Ratio,
    pub tokens: Vec<TokenSpec>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    CreatePool,
    RegisterToken(usize),
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::CreatePool => write!(f, "create_pool"),
            StepKind::RegisterToken(index) => write!(f, "register_token[{index}]"),
        }
    }
}

/// Acknowledged outcome of one applied step.
#[derive(Clone, Debug)]
pub struct StepReceipt {
    pub step: StepKind,
    pub nonce: FieldElement,
    pub tx_hash: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    CreatingPool,
    RegisteringToken(usize),
    Completed,
    Failed,
}

/// Whether step success requires more than the submission acknowledgment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfirmPolicy {
    /// Treat the acknowledgment as success (the network may still reject the
    /// transaction later).
    #[default]
    Skip,
    /// Query the transaction status after each acknowledgment and fail the
    /// step if the network reports it rejected.
    CheckStatus,
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Terminal failure of a run.
///
/// Carries the failed step and the receipts of everything already applied:
/// earlier invocations stay applied on-chain, and diagnosing that partial
/// state needs both halves.
#[derive(Debug, Error)]
#[error("workflow failed at step `{step}` after {} applied step(s): {source}", .applied.len())]
pub struct WorkflowError {
    pub step: StepKind,
    pub applied: Vec<StepReceipt>,
    #[source]
    pub source: StepError,
}

/// A registered token as persisted in the pool record.
#[derive(Clone, Debug, serde::Serialize)]
pub struct RegisteredToken {
    pub address: String,
    pub weight: Ratio,
    pub tx_hash: String,
}

/// The durable artifact of a successful run.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PoolRecord {
    pub pool: String,
    pub router: String,
    pub lp_token: String,
    pub swap_fee: Ratio,
    pub exit_fee: Ratio,
    pub create_tx_hash: String,
    pub tokens: Vec<RegisteredToken>,
}

/// Sequences the bootstrap steps against one account.
pub struct PoolBootstrap<'a, G> {
    gateway: &'a G,
    signer: &'a StarkSigner,
    plan: BootstrapPlan,
    confirm: ConfirmPolicy,
    state: WorkflowState,
}

impl<'a, G: InvokeGateway> PoolBootstrap<'a, G> {
    pub fn new(
        gateway: &'a G,
        signer: &'a StarkSigner,
        plan: BootstrapPlan,
        confirm: ConfirmPolicy,
    ) -> Self {
        Self {
            gateway,
            signer,
            plan,
            confirm,
            state: WorkflowState::Idle,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Drive the workflow to completion, or to the first failed step.
    ///
    /// Already-applied steps are not rolled back; they are returned inside
    /// the error instead.
    pub fn run(&mut self) -> Result<PoolRecord, WorkflowError> {
        let mut applied: Vec<StepReceipt> = Vec::new();

        self.state = WorkflowState::CreatingPool;
        let create_calldata = vec![
            self.plan.lp_token,
            self.plan.pool,
            FieldElement::from(self.plan.swap_fee.numerator),
            FieldElement::from(self.plan.swap_fee.denominator),
            FieldElement::from(self.plan.exit_fee.numerator),
            FieldElement::from(self.plan.exit_fee.denominator),
        ];
        match self.step(StepKind::CreatePool, "create_pool", create_calldata) {
            Ok(receipt) => applied.push(receipt),
            Err(source) => {
                self.state = WorkflowState::Failed;
                return Err(WorkflowError {
                    step: StepKind::CreatePool,
                    applied,
                    source,
                });
            }
        }

        for index in 0..self.plan.tokens.len() {
            self.state = WorkflowState::RegisteringToken(index);
            let token = &self.plan.tokens[index];
            let calldata = vec![
                self.plan.pool,
                token.address,
                FieldElement::from(token.weight.numerator),
                FieldElement::from(token.weight.denominator),
            ];
            match self.step(StepKind::RegisterToken(index), "add_pool_token", calldata) {
                Ok(receipt) => applied.push(receipt),
                Err(source) => {
                    self.state = WorkflowState::Failed;
                    return Err(WorkflowError {
                        step: StepKind::RegisterToken(index),
                        applied,
                        source,
                    });
                }
            }
        }

        self.state = WorkflowState::Completed;
        Ok(self.record(applied))
    }

    fn step(
        &self,
        kind: StepKind,
        function_name: &str,
        calldata: Vec<FieldElement>,
    ) -> Result<StepReceipt, StepError> {
        // Fresh remote read every step, never a cached or locally advanced
        // value.
        let nonce = self.gateway.nonce(self.plan.account)?;
        let envelope = build_signed_envelope(
            self.plan.account,
            self.plan.router,
            function_name,
            calldata,
            nonce,
            self.signer,
        )?;
        debug!(step = %kind, nonce = %nonce, public_key = %format!("{:#x}", self.signer.public_key()), "signed invocation");

        let receipt = self.gateway.submit(&envelope)?;
        if self.confirm == ConfirmPolicy::CheckStatus {
            let status = self.gateway.transaction_status(&receipt.tx_hash)?;
            if status == "REJECTED" {
                return Err(StepError::Gateway(GatewayError::Rejected(format!(
                    "transaction {} reported status {status}",
                    receipt.tx_hash
                ))));
            }
        }
        info!(step = %kind, tx_hash = %receipt.tx_hash, "invocation acknowledged");
        Ok(StepReceipt {
            step: kind,
            nonce,
            tx_hash: receipt.tx_hash,
        })
    }

    fn record(&self, applied: Vec<StepReceipt>) -> PoolRecord {
        let mut receipts = applied.into_iter();
        let create_tx_hash = receipts
            .next()
            .map(|r| r.tx_hash)
            .unwrap_or_default();
        let tokens = self
            .plan
            .tokens
            .iter()
            .zip(receipts)
            .map(|(token, receipt)| RegisteredToken {
                address: format!("{:#x}", token.address),
                weight: token.weight,
                tx_hash: receipt.tx_hash,
            })
            .collect();
        PoolRecord {
            pool: format!("{:#x}", self.plan.pool),
            router: format!("{:#x}", self.plan.router),
            lp_token: format!("{:#x}", self.plan.lp_token),
            swap_fee: self.plan.swap_fee,
            exit_fee: self.plan.exit_fee,
            create_tx_hash,
            tokens,
        }
    }
}
