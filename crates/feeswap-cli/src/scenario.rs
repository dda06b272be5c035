//! Scenario files: an ordered list of steps run against a simulation.

use anyhow::Context;
use feeswap_core::{Address, SwapLeg};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Scenario {
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One scenario step. Amounts are TOML integers, hence `u64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Swap {
        caller: Address,
        token_in: Address,
        token_out: Address,
        amount_in: u64,
        #[serde(default)]
        min_out: u64,
        #[serde(default)]
        deadline: u64,
    },
    Batch {
        caller: Address,
        legs: Vec<LegStep>,
    },
    Multihop {
        caller: Address,
        path: Vec<Address>,
        amount_in: u64,
        #[serde(default)]
        min_out: u64,
        #[serde(default)]
        deadline: u64,
    },
    Quote {
        path: Vec<Address>,
        amount_in: u64,
    },
    QuoteNet {
        path: Vec<Address>,
        amount_in: u64,
    },
    SetRouter {
        caller: Address,
        address: Address,
    },
    Seal {
        caller: Address,
        epoch_id: u64,
    },
    Pause {
        caller: Address,
        paused: bool,
    },
    Advance {
        #[serde(default)]
        blocks: u64,
        #[serde(default)]
        seconds: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegStep {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: u64,
    #[serde(default)]
    pub min_out: u64,
    #[serde(default)]
    pub deadline: u64,
}

impl From<&LegStep> for SwapLeg {
    fn from(leg: &LegStep) -> Self {
        SwapLeg::new(
            leg.token_in,
            leg.token_out,
            u128::from(leg.amount_in),
            u128::from(leg.min_out),
            leg.deadline,
        )
    }
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::Swap { .. } => "swap",
            Step::Batch { .. } => "batch",
            Step::Multihop { .. } => "multihop",
            Step::Quote { .. } => "quote",
            Step::QuoteNet { .. } => "quote_net",
            Step::SetRouter { .. } => "set_router",
            Step::Seal { .. } => "seal",
            Step::Pause { .. } => "pause",
            Step::Advance { .. } => "advance",
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing scenario {}", path.display()))
    }
}

/// Scenario written by `feeswap init` next to the sample config.
pub const SAMPLE_SCENARIO: &str = r#"# Feeswap simulation scenario
#
# Steps run in order; a failing step is reported and the run continues.

[[steps]]
op = "quote_net"
path = ["0x000000000000000000000000000000000000000a", "0x0000000000000000000000000000000000000001"]
amount_in = 1000000

[[steps]]
op = "swap"
caller = "0x0000000000000000000000000000000000000077"
token_in = "0x000000000000000000000000000000000000000a"
token_out = "0x0000000000000000000000000000000000000001"
amount_in = 1000000

[[steps]]
op = "multihop"
caller = "0x0000000000000000000000000000000000000077"
path = [
    "0x000000000000000000000000000000000000000a",
    "0x0000000000000000000000000000000000000001",
    "0x000000000000000000000000000000000000000b",
]
amount_in = 5000000

[[steps]]
op = "batch"
caller = "0x0000000000000000000000000000000000000077"
legs = [
    { token_in = "0x000000000000000000000000000000000000000a", token_out = "0x0000000000000000000000000000000000000001", amount_in = 250000 },
    { token_in = "0x000000000000000000000000000000000000000a", token_out = "0x0000000000000000000000000000000000000001", amount_in = 750000 },
]

[[steps]]
op = "advance"
blocks = 10
seconds = 120

[[steps]]
op = "seal"
caller = "0x00000000000000000000000000000000000000ad"
epoch_id = 1

[[steps]]
op = "pause"
caller = "0x00000000000000000000000000000000000000ad"
paused = true

[[steps]]
op = "swap"
caller = "0x0000000000000000000000000000000000000077"
token_in = "0x000000000000000000000000000000000000000a"
token_out = "0x0000000000000000000000000000000000000001"
amount_in = 1000
"#;
