//! State files and parameter parsing for a bootstrap run.
//!
//! The deployment harness that provisioned the contracts leaves their
//! addresses behind in small JSON state files; this module reads them and
//! parses the fee/weight ratios supplied on the command line.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Fee or weight expressed as an explicit numerator/denominator pair.
///
/// Kept as a pair end to end; the pool contract consumes both halves and the
/// persisted record stores them unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub numerator: u64,
    pub denominator: u64,
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Ratio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num, den) = s
            .split_once('/')
            .ok_or_else(|| format!("expected `numerator/denominator`, got `{s}`"))?;
        let numerator = num
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("bad numerator `{num}`: {e}"))?;
        let denominator = den
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("bad denominator `{den}`: {e}"))?;
        if denominator == 0 {
            return Err(format!("denominator must be nonzero in `{s}`"));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
}

/// `account.json`: the account contract submitting the invocations.
#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ContractEntry {
    pub address: String,
}

/// `deployment.json`: addresses left behind by the deployment harness.
#[derive(Debug, Deserialize)]
pub struct DeploymentInfo {
    pub router: ContractEntry,
    pub pool: ContractEntry,
    pub lp_token: ContractEntry,
}

/// One entry of `tokens.json`: a token to register, with its pool weight.
#[derive(Debug, Deserialize)]
pub struct TokenEntry {
    pub address: String,
    pub weight: Ratio,
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed parsing JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::Ratio;

    #[test]
    fn ratio_parses_pair_syntax() {
        let fee: Ratio = "1/1000".parse().unwrap();
        assert_eq!(fee.numerator, 1);
        assert_eq!(fee.denominator, 1000);
        assert_eq!(fee.to_string(), "1/1000");

        let weight: Ratio = " 1 / 3 ".trim().parse().unwrap();
        assert_eq!((weight.numerator, weight.denominator), (1, 3));
    }

    #[test]
    fn ratio_rejects_malformed_input() {
        assert!("1".parse::<Ratio>().is_err());
        assert!("a/b".parse::<Ratio>().is_err());
        assert!("1/0".parse::<Ratio>().is_err());
    }
}
