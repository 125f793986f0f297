//! Remote reads and invocation submission through the `starknet` CLI.
//!
//! The network's wire protocol is owned by the CLI; this module only formats
//! the signed envelope into CLI arguments and parses the acknowledgment back
//! into structured form.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use basin_invoke_encoder::{parse_felt, InvokeEnvelope};
use regex::Regex;
use starknet::core::types::FieldElement;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The CLI could not be run, or the network was unreachable. Retryable by
    /// the caller, with a freshly fetched nonce.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The network refused the invocation (stale nonce, failed signature
    /// check). The step must be rebuilt before any resubmission.
    #[error("invocation rejected: {0}")]
    Rejected(String),

    /// The acknowledgment did not match the expected shape.
    #[error("malformed acknowledgment: {0}")]
    MalformedResponse(String),
}

/// Parsed submission acknowledgment.
#[derive(Clone, Debug)]
pub struct InvokeReceipt {
    pub address: String,
    pub tx_hash: String,
}

/// Blocking access to the remote invocation interface.
///
/// `nonce` must be called freshly before each submission; the remote counter
/// advances as earlier invocations land, and a cached value is rejected.
pub trait InvokeGateway {
    fn nonce(&self, account: FieldElement) -> Result<FieldElement, GatewayError>;
    fn submit(&self, envelope: &InvokeEnvelope) -> Result<InvokeReceipt, GatewayError>;
    fn transaction_status(&self, tx_hash: &str) -> Result<String, GatewayError>;
}

/// Gateway backed by the `starknet` command-line client.
pub struct StarknetCliGateway {
    network: String,
    interfaces_dir: PathBuf,
    re_address: Regex,
    re_tx: Regex,
}

impl StarknetCliGateway {
    pub fn new(
        network: impl Into<String>,
        interfaces_dir: impl Into<PathBuf>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            network: network.into(),
            interfaces_dir: interfaces_dir.into(),
            re_address: Regex::new(r"Contract address:\s*(0x[0-9a-fA-F]+)")?,
            re_tx: Regex::new(r"Transaction hash:\s*(0x[0-9a-fA-F]+)")?,
        })
    }

    fn abi_arg(&self, contract: &str) -> String {
        self.interfaces_dir
            .join(format!("{contract}_abi.json"))
            .display()
            .to_string()
    }

    fn run(&self, cmd: &mut Command) -> Result<String, GatewayError> {
        let output = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| GatewayError::Transport(format!("failed to run starknet CLI: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(classify_failure(&format!(
                "{} {}",
                stdout.trim(),
                stderr.trim()
            )));
        }
        Ok(stdout)
    }

    fn parse_invoke_ack(&self, reply: &str) -> Result<InvokeReceipt, GatewayError> {
        let address = self
            .re_address
            .captures(reply)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let tx_hash = self
            .re_tx
            .captures(reply)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        match (address, tx_hash) {
            (Some(address), Some(tx_hash)) => Ok(InvokeReceipt { address, tx_hash }),
            _ => Err(GatewayError::MalformedResponse(format!(
                "no contract address / transaction hash in: {}",
                reply.trim()
            ))),
        }
    }
}

impl InvokeGateway for StarknetCliGateway {
    fn nonce(&self, account: FieldElement) -> Result<FieldElement, GatewayError> {
        let mut cmd = Command::new("starknet");
        cmd.arg("call")
            .arg("--address")
            .arg(format!("{account:#x}"))
            .arg("--abi")
            .arg(self.abi_arg("account"))
            .arg("--function")
            .arg("get_nonce")
            .arg(format!("--network={}", self.network));

        let reply = self.run(&mut cmd)?;
        parse_nonce_reply(&reply)
    }

    fn submit(&self, envelope: &InvokeEnvelope) -> Result<InvokeReceipt, GatewayError> {
        let mut cmd = Command::new("starknet");
        cmd.arg("invoke")
            .arg("--address")
            .arg(format!("{:#x}", envelope.account))
            .arg("--abi")
            .arg(self.abi_arg("account"))
            .arg("--function")
            .arg("execute")
            .arg(format!("--network={}", self.network))
            .arg("--inputs");
        for input in envelope.execute_inputs() {
            cmd.arg(input.to_string());
        }
        cmd.arg("--signature")
            .arg(envelope.signature.r.to_string())
            .arg(envelope.signature.s.to_string());

        debug!(contract = %format!("{:#x}", envelope.target), nonce = %envelope.nonce, "submitting invocation");
        let reply = self.run(&mut cmd)?;
        self.parse_invoke_ack(&reply)
    }

    fn transaction_status(&self, tx_hash: &str) -> Result<String, GatewayError> {
        let mut cmd = Command::new("starknet");
        cmd.arg("tx_status")
            .arg("--hash")
            .arg(tx_hash)
            .arg(format!("--network={}", self.network));

        let reply = self.run(&mut cmd)?;
        let value: serde_json::Value = serde_json::from_str(reply.trim()).map_err(|e| {
            GatewayError::MalformedResponse(format!("tx_status is not JSON: {e}"))
        })?;
        value["tx_status"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| {
                GatewayError::MalformedResponse(format!(
                    "no tx_status field in: {}",
                    reply.trim()
                ))
            })
    }
}

/// The CLI reports network unavailability and remote validation failures
/// through the same exit code; only the message distinguishes them.
fn classify_failure(detail: &str) -> GatewayError {
    let lowered = detail.to_lowercase();
    let transient = ["connection", "timed out", "unreachable", "temporarily unavailable"];
    if transient.iter().any(|needle| lowered.contains(needle)) {
        GatewayError::Transport(detail.to_owned())
    } else {
        GatewayError::Rejected(detail.to_owned())
    }
}

fn parse_nonce_reply(reply: &str) -> Result<FieldElement, GatewayError> {
    let token = reply
        .split_whitespace()
        .next()
        .ok_or_else(|| GatewayError::MalformedResponse("empty get_nonce reply".to_owned()))?;
    parse_felt(token)
        .map_err(|_| GatewayError::MalformedResponse(format!("get_nonce returned `{token}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> StarknetCliGateway {
        StarknetCliGateway::new("alpha-goerli", "interfaces").unwrap()
    }

    #[test]
    fn invoke_ack_parses_address_and_hash() {
        let reply = "Invoke transaction was sent.\n\
                     Contract address: 0x0621732f44e94f87ea7bdf661b91c673c3474f5435f525841b22546a110b1575\n\
                     Transaction hash: 0x526f1452ee713fd8e6c7f48356f55f710bc6068e9fc030fa902fb8bc2d8d54b\n";
        let receipt = gateway().parse_invoke_ack(reply).unwrap();
        assert!(receipt.address.starts_with("0x0621732f"));
        assert!(receipt.tx_hash.starts_with("0x526f1452"));
    }

    #[test]
    fn invoke_ack_shape_mismatch_is_malformed() {
        let err = gateway().parse_invoke_ack("Invoke transaction was sent.").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[test]
    fn nonce_reply_accepts_decimal_and_hex() {
        assert_eq!(
            parse_nonce_reply("3\n").unwrap(),
            FieldElement::from(3u64)
        );
        assert_eq!(
            parse_nonce_reply("0x10").unwrap(),
            FieldElement::from(16u64)
        );
        assert!(parse_nonce_reply("").is_err());
        assert!(parse_nonce_reply("nope").is_err());
    }

    #[test]
    fn failures_classify_by_message() {
        assert!(matches!(
            classify_failure("Error: Connection refused"),
            GatewayError::Transport(_)
        ));
        assert!(matches!(
            classify_failure("Error: request timed out"),
            GatewayError::Transport(_)
        ));
        assert!(matches!(
            classify_failure("Error: invalid transaction nonce"),
            GatewayError::Rejected(_)
        ));
    }
}
