use std::{
    fmt::{self, Display},
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use ethers::types::{Address, U256};

pub const PANCAKESWAP_TESTNET_ROUTER: &str = "0x6725F303b657a9451d8BA641348b6761A6CC7a17";
pub const PANCAKESWAP_MAINNET_ROUTER: &str = "0x10ED43C718714eb63d5aA57B78B54704E256024E";
pub const AJIRA_PAY_TREASURY: &str = "0x4F6c0B945D00f55B6D5a7cEd1eCAA0690675527A";

/// 90 days
pub const PRESALE_DURATION_SECS: u64 = 90 * 24 * 60 * 60;

/// Largest reward a single airdrop claim may pay out, in whole tokens
pub const MAX_REWARD_PER_CLAIM: u64 = 2_000;

/// Total rewards the airdrop contract may ever distribute, in whole tokens
pub const TOTAL_REWARD_CAP: u64 = 10_000_000;

pub const TOKEN_DECIMALS: u8 = 18;

/// BSC network the contracts are deployed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    /// PancakeSwap router the token pairs against on this network
    pub fn router(self) -> Result<Address> {
        match self {
            Network::Testnet => parse_address(PANCAKESWAP_TESTNET_ROUTER),
            Network::Mainnet => parse_address(PANCAKESWAP_MAINNET_ROUTER),
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParams {
    pub router: Address,
    pub treasury: Address,
    /// Call `initDex(router)` on the token once it is deployed
    pub init_dex: bool,
}

impl TokenParams {
    pub fn resolve(
        network: Network,
        router: Option<Address>,
        treasury: Option<Address>,
        init_dex: bool,
    ) -> Result<Self> {
        Ok(Self {
            router: resolve_router(network, router)?,
            treasury: resolve_treasury(treasury)?,
            init_dex,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresaleParams {
    pub router: Address,
    pub treasury: Address,
    pub presale_duration: U256,
    /// Scaled to the token's base units
    pub max_reward_per_claim: U256,
    /// Scaled to the token's base units
    pub total_reward_cap: U256,
}

impl PresaleParams {
    pub fn resolve(
        network: Network,
        router: Option<Address>,
        treasury: Option<Address>,
        presale_duration_secs: u64,
        max_reward_per_claim: u64,
        total_reward_cap: u64,
        decimals: u8,
    ) -> Result<Self> {
        Ok(Self {
            router: resolve_router(network, router)?,
            treasury: resolve_treasury(treasury)?,
            presale_duration: U256::from(presale_duration_secs),
            max_reward_per_claim: scale_tokens(max_reward_per_claim, decimals)?,
            total_reward_cap: scale_tokens(total_reward_cap, decimals)?,
        })
    }
}

/// Converts a whole-token amount into base units for a token with `decimals` decimals
pub fn scale_tokens(amount: u64, decimals: u8) -> Result<U256> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .and_then(|unit| unit.checked_mul(U256::from(amount)))
        .ok_or_else(|| anyhow!("cannot scale {amount} tokens to {decimals} decimals"))
}

fn resolve_router(network: Network, router: Option<Address>) -> Result<Address> {
    match router {
        Some(router) => Ok(router),
        None => network.router(),
    }
}

fn resolve_treasury(treasury: Option<Address>) -> Result<Address> {
    match treasury {
        Some(treasury) => Ok(treasury),
        None => parse_address(AJIRA_PAY_TREASURY),
    }
}

fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address).with_context(|| format!("invalid address constant {address}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_selects_router() {
        assert_eq!(
            Network::Testnet.router().unwrap(),
            Address::from_str(PANCAKESWAP_TESTNET_ROUTER).unwrap()
        );
        assert_eq!(
            Network::Mainnet.router().unwrap(),
            Address::from_str(PANCAKESWAP_MAINNET_ROUTER).unwrap()
        );
    }

    #[test]
    fn token_params_fall_back_to_constants() {
        let params = TokenParams::resolve(Network::Mainnet, None, None, false).unwrap();

        assert_eq!(params.router, parse_address(PANCAKESWAP_MAINNET_ROUTER).unwrap());
        assert_eq!(params.treasury, parse_address(AJIRA_PAY_TREASURY).unwrap());
        assert!(!params.init_dex);
    }

    #[test]
    fn overrides_win_over_constants() {
        let router = Address::from_low_u64_be(1);
        let treasury = Address::from_low_u64_be(2);

        let params =
            TokenParams::resolve(Network::Testnet, Some(router), Some(treasury), true).unwrap();

        assert_eq!(params.router, router);
        assert_eq!(params.treasury, treasury);
        assert!(params.init_dex);
    }

    #[test]
    fn presale_caps_are_scaled_by_decimals() {
        let params = PresaleParams::resolve(
            Network::Mainnet,
            None,
            None,
            PRESALE_DURATION_SECS,
            MAX_REWARD_PER_CLAIM,
            TOTAL_REWARD_CAP,
            TOKEN_DECIMALS,
        )
        .unwrap();

        let one_token = U256::exp10(TOKEN_DECIMALS as usize);
        assert_eq!(params.presale_duration, U256::from(7_776_000u64));
        assert_eq!(params.max_reward_per_claim, one_token * U256::from(2_000u64));
        assert_eq!(params.total_reward_cap, one_token * U256::from(10_000_000u64));
    }

    #[test]
    fn zero_decimals_leave_amount_untouched() {
        assert_eq!(scale_tokens(42, 0).unwrap(), U256::from(42u64));
    }

    #[test]
    fn overflowing_scale_is_rejected() {
        assert!(scale_tokens(1, 78).is_err());
        assert!(scale_tokens(u64::MAX, 77).is_err());
    }
}
