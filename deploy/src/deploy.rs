use std::{
    fmt::{self, Display},
    sync::Arc,
};

use crate::{
    contracts::{
        Artifact, ArtifactStore, AJIRA_PAY_FINANCE_AIRDROP, AJIRA_PAY_FINANCE_PRESALE,
        AJIRA_PAY_FINANCE_TOKEN,
    },
    params::{PresaleParams, TokenParams},
    utils::parse_signing_key,
};

use anyhow::{anyhow, bail, Result};
use ethers::{
    abi::Token,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, Bytes, TransactionReceipt, TransactionRequest, U64},
    utils::to_checksum,
};

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Sends deployments and contract calls to a chain, waiting for each to be mined
#[allow(async_fn_in_trait)]
pub trait DeployBackend {
    /// Deploys `artifact` with the given constructor arguments, returning its address
    async fn deploy(&self, artifact: &Artifact, args: Vec<Token>) -> Result<Address>;

    async fn call(
        &self,
        artifact: &Artifact,
        address: Address,
        function: &str,
        args: Vec<Token>,
    ) -> Result<()>;
}

/// Creation bytecode followed by the ABI encoded constructor arguments
pub fn creation_code(artifact: &Artifact, args: &[Token]) -> Result<Bytes> {
    let code = match artifact.abi.constructor() {
        Some(constructor) => constructor.encode_input(artifact.bytecode.to_vec(), args)?,
        None if args.is_empty() => artifact.bytecode.to_vec(),
        None => bail!(
            "{} has no constructor but {} arguments were given",
            artifact.contract_name,
            args.len()
        ),
    };
    Ok(code.into())
}

pub fn function_calldata(artifact: &Artifact, function: &str, args: &[Token]) -> Result<Bytes> {
    let calldata = artifact.abi.function(function)?.encode_input(args)?;
    Ok(calldata.into())
}

pub struct EthersDeployer {
    client: Arc<Client>,
    confirmations: usize,
}

impl EthersDeployer {
    pub async fn new(rpc: &str, sk: &str, confirmations: usize) -> Result<Self> {
        let wallet = parse_signing_key(sk)?;
        let provider = Provider::<Http>::try_from(rpc)?;
        let chain_id = provider.get_chainid().await?.as_u64();
        log::info!("deployer {:?} on chain {}", wallet.address(), chain_id);

        let client = Arc::new(SignerMiddleware::new(
            provider,
            wallet.with_chain_id(chain_id),
        ));

        Ok(Self {
            client,
            confirmations,
        })
    }

    /// Sends a legacy transaction and waits for a successful receipt
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TransactionReceipt> {
        let pending = self.client.send_transaction(tx, None).await?;
        log::info!("transaction hash:{:?}", pending.tx_hash());

        let receipt = pending
            .confirmations(self.confirmations)
            .await?
            .ok_or(anyhow!("transaction receipt not found"))?;
        if receipt.status != Some(U64::from(1)) {
            bail!("transaction {:?} reverted", receipt.transaction_hash);
        }
        Ok(receipt)
    }
}

impl DeployBackend for EthersDeployer {
    async fn deploy(&self, artifact: &Artifact, args: Vec<Token>) -> Result<Address> {
        let code = creation_code(artifact, &args)?;

        let receipt = self
            .send_transaction(TransactionRequest::new().data(code))
            .await?;

        receipt.contract_address.ok_or(anyhow!(
            "{} deployment receipt has no contract address",
            artifact.contract_name
        ))
    }

    async fn call(
        &self,
        artifact: &Artifact,
        address: Address,
        function: &str,
        args: Vec<Token>,
    ) -> Result<()> {
        let calldata = function_calldata(artifact, function, &args)?;

        self.send_transaction(TransactionRequest::new().to(address).data(calldata))
            .await?;
        log::info!("{}.{} confirmed", artifact.contract_name, function);

        Ok(())
    }
}

/// A contract deployed by one of the scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployed {
    pub label: &'static str,
    pub contract: &'static str,
    pub address: Address,
}

impl Display for Deployed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} deployed to: {}",
            self.label,
            to_checksum(&self.address, None)
        )
    }
}

pub struct Deploy<D> {
    backend: D,
    artifacts: ArtifactStore,
}

impl<D: DeployBackend> Deploy<D> {
    pub fn new(backend: D, artifacts: ArtifactStore) -> Self {
        Self { backend, artifacts }
    }

    /// Deploys the Ajira Pay token on its own
    pub async fn run_token(&self, params: &TokenParams) -> Result<Vec<Deployed>> {
        let token_artifact = self.artifacts.load(AJIRA_PAY_FINANCE_TOKEN)?;

        let token = self.deploy_token(&token_artifact, params).await?;

        if params.init_dex {
            self.backend
                .call(
                    &token_artifact,
                    token.address,
                    "initDex",
                    vec![Token::Address(params.router)],
                )
                .await?;
            log::info!("initDex called with router {:?}", params.router);
        }

        Ok(vec![token])
    }

    /// Deploys the token, then the presale and airdrop contracts that distribute it.
    /// Every artifact is loaded before the first transaction is sent.
    pub async fn run_presale(&self, params: &PresaleParams) -> Result<Vec<Deployed>> {
        let token_artifact = self.artifacts.load(AJIRA_PAY_FINANCE_TOKEN)?;
        let presale_artifact = self.artifacts.load(AJIRA_PAY_FINANCE_PRESALE)?;
        let airdrop_artifact = self.artifacts.load(AJIRA_PAY_FINANCE_AIRDROP)?;

        let token = self
            .deploy_token(
                &token_artifact,
                &TokenParams {
                    router: params.router,
                    treasury: params.treasury,
                    init_dex: false,
                },
            )
            .await?;

        let presale = self
            .deploy_contract(
                "Ajira Pay presale",
                AJIRA_PAY_FINANCE_PRESALE,
                &presale_artifact,
                vec![
                    Token::Address(token.address),
                    Token::Address(params.treasury),
                    Token::Address(params.router),
                    Token::Uint(params.presale_duration),
                ],
            )
            .await?;

        let airdrop = self
            .deploy_contract(
                "Ajira Pay airdrop",
                AJIRA_PAY_FINANCE_AIRDROP,
                &airdrop_artifact,
                vec![
                    Token::Address(token.address),
                    Token::Uint(params.max_reward_per_claim),
                    Token::Uint(params.total_reward_cap),
                ],
            )
            .await?;

        Ok(vec![token, presale, airdrop])
    }

    async fn deploy_token(&self, artifact: &Artifact, params: &TokenParams) -> Result<Deployed> {
        self.deploy_contract(
            "Ajira Pay",
            AJIRA_PAY_FINANCE_TOKEN,
            artifact,
            vec![
                Token::Address(params.router),
                Token::Address(params.treasury),
            ],
        )
        .await
    }

    async fn deploy_contract(
        &self,
        label: &'static str,
        contract: &'static str,
        artifact: &Artifact,
        args: Vec<Token>,
    ) -> Result<Deployed> {
        log::debug!("deploying {contract} with {} constructor args", args.len());

        let address = self.backend.deploy(artifact, args).await?;
        let deployed = Deployed {
            label,
            contract,
            address,
        };
        println!("{deployed}");

        Ok(deployed)
    }
}
