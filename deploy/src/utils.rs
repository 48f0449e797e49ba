use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use ethers::{
    signers::LocalWallet,
    utils::{hex, to_checksum},
};
use serde_json::{json, Map, Value};

use crate::{deploy::Deployed, params::Network};

const SECRET_KEY_LEN: usize = 32;

pub fn parse_signing_key(sk: &str) -> Result<LocalWallet> {
    let bytes = hex::decode(sk.strip_prefix("0x").unwrap_or(sk))
        .context("secret key is not valid hex")?;
    if bytes.len() != SECRET_KEY_LEN {
        bail!(
            "secret key must be {SECRET_KEY_LEN} bytes, got {}",
            bytes.len()
        );
    }
    Ok(LocalWallet::from_bytes(&bytes)?)
}

/// Merges the deployed addresses into the JSON record at `path`, keyed by network then
/// contract name. The file is created if it does not exist.
pub fn record_deployments(path: &Path, network: Network, deployed: &[Deployed]) -> Result<()> {
    let mut record: Value = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?
    } else {
        json!({})
    };

    let section = record
        .as_object_mut()
        .ok_or(anyhow!("deployments record is not a JSON object"))?
        .entry(network.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or(anyhow!("{network} deployments are not a JSON object"))?;
    for contract in deployed {
        section.insert(
            contract.contract.to_string(),
            Value::String(to_checksum(&contract.address, None)),
        );
    }

    fs::write(path, serde_json::to_string_pretty(&record)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("recorded {} deployments in {}", deployed.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use ethers::{signers::Signer, types::Address};

    use super::*;
    use crate::contracts::{AJIRA_PAY_FINANCE_PRESALE, AJIRA_PAY_FINANCE_TOKEN};

    const ANVIL_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn deployed(contract: &'static str, address: u64) -> Deployed {
        Deployed {
            label: "test",
            contract,
            address: Address::from_low_u64_be(address),
        }
    }

    #[test]
    fn signing_key_prefix_is_optional() {
        let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
            .parse()
            .unwrap();

        assert_eq!(parse_signing_key(ANVIL_KEY).unwrap().address(), expected);
        assert_eq!(
            parse_signing_key(&format!("0x{ANVIL_KEY}"))
                .unwrap()
                .address(),
            expected
        );
    }

    #[test]
    fn malformed_signing_key_is_rejected() {
        assert!(parse_signing_key("0xnot-a-key").is_err());
        assert!(parse_signing_key("0x1234").is_err());
        assert!(parse_signing_key(&ANVIL_KEY[2..]).is_err());
        assert!(parse_signing_key(&format!("{ANVIL_KEY}00")).is_err());
    }

    #[test]
    fn record_is_created_and_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");

        record_deployments(
            &path,
            Network::Testnet,
            &[deployed(AJIRA_PAY_FINANCE_TOKEN, 1)],
        )
        .unwrap();
        record_deployments(
            &path,
            Network::Mainnet,
            &[
                deployed(AJIRA_PAY_FINANCE_TOKEN, 2),
                deployed(AJIRA_PAY_FINANCE_PRESALE, 3),
            ],
        )
        .unwrap();

        let record: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            record,
            json!({
                "testnet": {
                    "AjiraPayFinanceToken": "0x0000000000000000000000000000000000000001"
                },
                "mainnet": {
                    "AjiraPayFinanceToken": "0x0000000000000000000000000000000000000002",
                    "AjiraPayFinancePresale": "0x0000000000000000000000000000000000000003"
                }
            })
        );
    }

    #[test]
    fn non_object_record_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, "[]").unwrap();

        assert!(record_deployments(&path, Network::Mainnet, &[]).is_err());
    }
}
