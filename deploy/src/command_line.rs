use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ethers::types::Address;

use crate::{
    contracts::ArtifactStore,
    deploy::{Deploy, EthersDeployer},
    params::{
        Network, PresaleParams, TokenParams, MAX_REWARD_PER_CLAIM, PRESALE_DURATION_SECS,
        TOKEN_DECIMALS, TOTAL_REWARD_CAP,
    },
    utils::record_deployments,
};

/// Deploys the Ajira Pay contracts to BSC
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandLine {
    /// JSON-RPC endpoint of the target network
    #[clap(short, long, env = "RPC_URL")]
    rpc: String,

    /// Deployer secret key in hex
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    sk: String,

    /// Compiler output directory holding the contract artifacts
    #[clap(short, long, env = "ARTIFACTS_PATH", default_value = "artifacts")]
    artifacts_path: PathBuf,

    #[clap(short, long, env = "NETWORK", value_enum, default_value_t = Network::Mainnet)]
    network: Network,

    /// Blocks to wait for after each transaction is mined
    #[clap(long, default_value_t = 1)]
    confirmations: usize,

    /// JSON file in which to record the deployed addresses
    #[clap(short, long)]
    deployments_path: Option<PathBuf>,

    #[command(subcommand)]
    script: Script,
}

#[derive(Debug, Subcommand)]
enum Script {
    /// Deploy the Ajira Pay token
    Token(TokenArgs),
    /// Deploy the token along with its presale and airdrop contracts
    Presale(PresaleArgs),
}

#[derive(Debug, Args)]
struct TokenArgs {
    /// PancakeSwap router, defaults to the one on the selected network
    #[clap(long)]
    router: Option<Address>,

    /// Treasury receiving the token's fees
    #[clap(long)]
    treasury: Option<Address>,

    /// Call `initDex` on the token with the router after deploying it
    #[clap(long)]
    init_dex: bool,
}

#[derive(Debug, Args)]
struct PresaleArgs {
    #[clap(long)]
    router: Option<Address>,

    #[clap(long)]
    treasury: Option<Address>,

    /// Presale duration in seconds
    #[clap(long, default_value_t = PRESALE_DURATION_SECS)]
    presale_duration: u64,

    /// Largest reward a single airdrop claim pays, in whole tokens
    #[clap(long, default_value_t = MAX_REWARD_PER_CLAIM)]
    max_reward_per_claim: u64,

    /// Total rewards the airdrop may distribute, in whole tokens
    #[clap(long, default_value_t = TOTAL_REWARD_CAP)]
    total_reward_cap: u64,

    #[clap(long, default_value_t = TOKEN_DECIMALS)]
    decimals: u8,
}

enum ScriptParams {
    Token(TokenParams),
    Presale(PresaleParams),
}

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        let params = self.script_params()?;

        let backend = EthersDeployer::new(&self.rpc, &self.sk, self.confirmations).await?;
        let deploy = Deploy::new(backend, ArtifactStore::new(&self.artifacts_path));

        let deployed = match &params {
            ScriptParams::Token(params) => deploy.run_token(params).await?,
            ScriptParams::Presale(params) => deploy.run_presale(params).await?,
        };

        if let Some(path) = &self.deployments_path {
            record_deployments(path, self.network, &deployed)?;
        }
        Ok(())
    }

    fn script_params(&self) -> Result<ScriptParams> {
        Ok(match &self.script {
            Script::Token(args) => ScriptParams::Token(TokenParams::resolve(
                self.network,
                args.router,
                args.treasury,
                args.init_dex,
            )?),
            Script::Presale(args) => ScriptParams::Presale(PresaleParams::resolve(
                self.network,
                args.router,
                args.treasury,
                args.presale_duration,
                args.max_reward_per_claim,
                args.total_reward_cap,
                args.decimals,
            )?),
        })
    }
}
