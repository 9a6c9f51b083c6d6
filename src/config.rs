use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::ConfigError;

/// Cost of an edge that does not repeat the assistant's previous course.
pub const DEFAULT_CHANGE_COST: i64 = 1;

/// Upper bound for both solver weights. Keeps every path cost and the
/// objective well inside `i64` for any `u32` hour counts.
pub const MAX_WEIGHT: i64 = 1_000_000;

/// Most hours a load-balanced solve may place. The flow backend augments one
/// hour at a time when load balancing is on.
pub const MAX_LOAD_BALANCED_HOURS: u64 = 100_000;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const ADDR_ENV: &str = "TA_SOLVER_ADDR";

/// How required pairs that cannot be honoured are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequiredPolicy {
    /// Record a conflict and return the best partial assignment.
    #[default]
    BestEffort,
    /// Fail the solve if any required pair ends without hours.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Successive shortest augmenting paths.
    #[default]
    Flow,
    /// Linear program solved with HiGHS. Needs the `lp` feature.
    Lp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverConfig {
    pub change_cost: i64,
    /// Extra cost per hour already carried by an assistant; zero disables
    /// load balancing.
    pub load_balance_weight: i64,
    pub backend: Backend,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            change_cost: DEFAULT_CHANGE_COST,
            load_balance_weight: 0,
            backend: Backend::Flow,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.change_cost <= 0 {
            return Err(ConfigError::NonPositiveChangeCost(self.change_cost));
        }
        if self.change_cost > MAX_WEIGHT {
            return Err(ConfigError::ChangeCostTooLarge(self.change_cost));
        }
        if self.load_balance_weight < 0 {
            return Err(ConfigError::NegativeLoadWeight(self.load_balance_weight));
        }
        if self.load_balance_weight > MAX_WEIGHT {
            return Err(ConfigError::LoadWeightTooLarge(self.load_balance_weight));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub required_policy: RequiredPolicy,
    /// Solve even when the validator reports errors.
    pub proceed_on_errors: bool,
    pub solver: SolverConfig,
}

impl EngineConfig {
    pub fn strict() -> Self {
        Self {
            required_policy: RequiredPolicy::Strict,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solver.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        Self::parse(&addr)
    }

    pub fn parse(addr: &str) -> Result<Self, ConfigError> {
        let addr = addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidAddress {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { addr })
    }
}
