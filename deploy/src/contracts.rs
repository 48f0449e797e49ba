use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;

pub const AJIRA_PAY_FINANCE_TOKEN: &str = "AjiraPayFinanceToken";
pub const AJIRA_PAY_FINANCE_PRESALE: &str = "AjiraPayFinancePresale";
pub const AJIRA_PAY_FINANCE_AIRDROP: &str = "AjiraPayFinanceAirdrop";

/// A compiled contract: the ABI and creation bytecode a factory needs to deploy it
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

/// Hardhat writes `bytecode` as a hex string, Foundry as `{ "object": "0x.." }`
#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeJson {
    Hex(Bytes),
    Object { object: Bytes },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactJson {
    #[serde(default)]
    contract_name: Option<String>,
    abi: Abi,
    bytecode: BytecodeJson,
}

/// Resolves contract artifacts by name below a compiler output directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn load(&self, name: &str) -> Result<Artifact> {
        let file_name = format!("{name}.json");
        let path = find_file(&self.root, &file_name)?.ok_or_else(|| {
            anyhow!(
                "artifact for {name} not found under {}",
                self.root.display()
            )
        })?;
        log::debug!("loading {name} from {}", path.display());

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let json: ArtifactJson = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let bytecode = match json.bytecode {
            BytecodeJson::Hex(bytes) | BytecodeJson::Object { object: bytes } => bytes,
        };
        if bytecode.is_empty() {
            return Err(anyhow!(
                "{name} has no creation bytecode, is it an interface or abstract contract?"
            ));
        }

        Ok(Artifact {
            contract_name: json.contract_name.unwrap_or_else(|| name.to_string()),
            abi: json.abi,
            bytecode,
        })
    }
}

fn find_file(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read artifacts directory {}", dir.display()))?
        .map(|entry| entry.and_then(|entry| Ok((entry.path(), entry.file_type()?))))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    // `file_type` does not follow symlinks, so linked directories are never entered
    for (path, file_type) in entries {
        if file_type.is_dir() {
            if let Some(found) = find_file(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name().is_some_and(|name| name == file_name) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}
