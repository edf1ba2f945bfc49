//! CLI config files.

use {
    base64::{prelude::BASE64_STANDARD, Engine},
    serde::{de::DeserializeOwned, Deserialize, Serialize},
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    std::{collections::HashMap, error::Error, path::Path, str::FromStr},
    txforge::{
        AccountLookupMeta, AccountMeta, AccountReference, AccountRole, Instruction, Keypair,
        LifetimeConstraint, Signature, TransactionMessage, TransactionVersion,
    },
};

/// Load a config file from a JSON or YAML file at the given path, picked by
/// extension.
pub fn try_load<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn Error>> {
    let ext = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let file = std::fs::read_to_string(path)?;
    match ext {
        "json" => Ok(serde_json::from_str(&file)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(&file)?),
        _ => Err(format!("Unsupported config file format: {}", ext).into()),
    }
}

/// Load a keypair from the common 64-byte JSON array format.
pub fn load_keypair(path: &str) -> Result<Keypair, Box<dyn Error>> {
    let bytes: Vec<u8> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    Keypair::from_bytes(&bytes).map_err(|e| format!("Invalid keypair file {path}: {e}").into())
}

fn parse_pubkey(s: &str) -> Result<Pubkey, Box<dyn Error>> {
    Pubkey::from_str(s).map_err(|e| format!("Invalid address {s}: {e}").into())
}

fn parse_hash(s: &str) -> Result<Hash, Box<dyn Error>> {
    Hash::from_str(s).map_err(|e| format!("Invalid hash {s}: {e}").into())
}

/// `"legacy"` or a version number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Version {
    Number(u8),
    Name(String),
}

impl Default for Version {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl TryFrom<&Version> for TransactionVersion {
    type Error = Box<dyn Error>;

    fn try_from(version: &Version) -> Result<Self, Self::Error> {
        match version {
            Version::Number(n) => Ok(TransactionVersion::Number(*n)),
            Version::Name(name) if name == "legacy" => Ok(TransactionVersion::Legacy),
            Version::Name(name) => Err(format!("Unknown transaction version: {name}").into()),
        }
    }
}

impl From<TransactionVersion> for Version {
    fn from(version: TransactionVersion) -> Self {
        match version {
            TransactionVersion::Legacy => Self::Name("legacy".to_string()),
            TransactionVersion::Number(n) => Self::Number(n),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum Lifetime {
    Blockhash {
        blockhash: String,
        last_valid_block_height: u64,
    },
    DurableNonce {
        nonce: String,
        nonce_account_address: String,
        nonce_authority_address: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Readonly,
    Writable,
    ReadonlySigner,
    WritableSigner,
}

impl From<Role> for AccountRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Readonly => AccountRole::Readonly,
            Role::Writable => AccountRole::Writable,
            Role::ReadonlySigner => AccountRole::ReadonlySigner,
            Role::WritableSigner => AccountRole::WritableSigner,
        }
    }
}

impl From<AccountRole> for Role {
    fn from(role: AccountRole) -> Self {
        match role {
            AccountRole::Readonly => Role::Readonly,
            AccountRole::Writable => Role::Writable,
            AccountRole::ReadonlySigner => Role::ReadonlySigner,
            AccountRole::WritableSigner => Role::WritableSigner,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_table_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_index: Option<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionFile {
    pub program_address: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<Account>,
    /// Base64.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureEntry {
    pub address: String,
    pub signature: String,
}

/// Transaction description file, read by `compile` and written by `inspect`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFile {
    #[serde(default)]
    pub version: Version,
    pub fee_payer: String,
    pub lifetime: Option<Lifetime>,
    #[serde(default)]
    pub instructions: Vec<InstructionFile>,
    /// Lookup table address -> table contents.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub address_lookup_tables: HashMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<SignatureEntry>,
}

/// Parse a lookup table address -> contents map.
pub fn parse_lookup_tables(
    tables: &HashMap<String, Vec<String>>,
) -> Result<HashMap<Pubkey, Vec<Pubkey>>, Box<dyn Error>> {
    tables
        .iter()
        .map(|(table, addresses)| {
            let addresses = addresses
                .iter()
                .map(|a| parse_pubkey(a))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((parse_pubkey(table)?, addresses))
        })
        .collect()
}

impl Account {
    fn to_reference(&self) -> Result<AccountReference, Box<dyn Error>> {
        let pubkey = parse_pubkey(&self.address)?;
        let role = AccountRole::from(self.role);
        match (&self.lookup_table_address, self.address_index) {
            (Some(table), Some(index)) => {
                let table = parse_pubkey(table)?;
                match role {
                    AccountRole::Readonly => {
                        Ok(AccountLookupMeta::new_readonly(pubkey, table, index).into())
                    }
                    AccountRole::Writable => {
                        Ok(AccountLookupMeta::new(pubkey, table, index).into())
                    }
                    _ => Err(format!("Lookup table account {pubkey} cannot be a signer").into()),
                }
            }
            (None, None) => Ok(AccountMeta::with_role(pubkey, role).into()),
            _ => Err(format!(
                "Account {pubkey} needs both lookupTableAddress and addressIndex"
            )
            .into()),
        }
    }

    fn from_reference(reference: &AccountReference) -> Self {
        let (lookup_table_address, address_index) = match reference {
            AccountReference::Static(_) => (None, None),
            AccountReference::Lookup(meta) => (
                Some(meta.lookup_table_address.to_string()),
                Some(meta.address_index),
            ),
        };
        Self {
            address: reference.pubkey().to_string(),
            role: reference.role().into(),
            lookup_table_address,
            address_index,
        }
    }
}

impl InstructionFile {
    fn to_instruction(&self) -> Result<Instruction, Box<dyn Error>> {
        Ok(Instruction::new(
            parse_pubkey(&self.program_address)?,
            self.accounts
                .iter()
                .map(Account::to_reference)
                .collect::<Result<Vec<_>, _>>()?,
            BASE64_STANDARD.decode(&self.data)?,
        ))
    }

    fn from_instruction(instruction: &Instruction) -> Self {
        Self {
            program_address: instruction.program_id.to_string(),
            accounts: instruction
                .accounts
                .iter()
                .map(Account::from_reference)
                .collect(),
            data: BASE64_STANDARD.encode(&instruction.data),
        }
    }
}

impl TransactionFile {
    /// Build the transaction message this file describes.
    pub fn to_message(&self) -> Result<TransactionMessage, Box<dyn Error>> {
        let message = TransactionMessage::new(TransactionVersion::try_from(&self.version)?)
            .with_fee_payer(parse_pubkey(&self.fee_payer)?)
            .append_instructions(
                self.instructions
                    .iter()
                    .map(InstructionFile::to_instruction)
                    .collect::<Result<Vec<_>, _>>()?,
            );
        Ok(match &self.lifetime {
            None => message,
            Some(Lifetime::Blockhash {
                blockhash,
                last_valid_block_height,
            }) => message.with_blockhash_lifetime(parse_hash(blockhash)?, *last_valid_block_height),
            Some(Lifetime::DurableNonce {
                nonce,
                nonce_account_address,
                nonce_authority_address,
            }) => message.with_durable_nonce_lifetime(
                parse_hash(nonce)?,
                parse_pubkey(nonce_account_address)?,
                parse_pubkey(nonce_authority_address)?,
            ),
        })
    }

    /// Describe a transaction message.
    pub fn from_message(message: &TransactionMessage) -> Self {
        let lifetime = message.lifetime_constraint.map(|lifetime| match lifetime {
            LifetimeConstraint::Blockhash {
                blockhash,
                last_valid_block_height,
            } => Lifetime::Blockhash {
                blockhash: blockhash.to_string(),
                last_valid_block_height,
            },
            LifetimeConstraint::DurableNonce {
                nonce,
                nonce_account_address,
                nonce_authority_address,
            } => Lifetime::DurableNonce {
                nonce: nonce.to_string(),
                nonce_account_address: nonce_account_address.to_string(),
                nonce_authority_address: nonce_authority_address.to_string(),
            },
        });
        Self {
            version: message.version.into(),
            fee_payer: message
                .fee_payer
                .map(|fee_payer| fee_payer.to_string())
                .unwrap_or_default(),
            lifetime,
            instructions: message
                .instructions
                .iter()
                .map(InstructionFile::from_instruction)
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_signatures(self, signatures: &[(Pubkey, Signature)]) -> Self {
        Self {
            signatures: signatures
                .iter()
                .map(|(address, signature)| SignatureEntry {
                    address: address.to_string(),
                    signature: signature.to_string(),
                })
                .collect(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let fee_payer = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let blockhash = Hash::new_unique();
        let yaml = format!(
            r#"
version: legacy
feePayer: {fee_payer}
lifetime:
  blockhash: {blockhash}
  lastValidBlockHeight: 300
instructions:
  - programAddress: "11111111111111111111111111111111"
    accounts:
      - address: {fee_payer}
        role: writableSigner
      - address: {recipient}
        role: writable
    data: AgAAAAEAAAAAAAAA
"#
        );
        let file: TransactionFile = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(file.version, Version::Name("legacy".to_string()));
        let message = file.to_message().unwrap();
        assert_eq!(message.version, TransactionVersion::Legacy);
        assert_eq!(message.fee_payer, Some(fee_payer));
        assert_eq!(message.instructions.len(), 1);
        assert_eq!(
            message.instructions[0].data,
            vec![2, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            message.instructions[0].accounts[1].role(),
            AccountRole::Writable
        );
        assert_eq!(
            message.lifetime_constraint,
            Some(LifetimeConstraint::Blockhash {
                blockhash,
                last_valid_block_height: 300,
            })
        );

        // Round trip through the description.
        let described = TransactionFile::from_message(&message);
        assert_eq!(described.to_message().unwrap(), message);
    }

    #[test]
    fn test_parse_json_durable_nonce_and_lookups() {
        let fee_payer = Pubkey::new_unique();
        let nonce_account = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let loaded = Pubkey::new_unique();
        let table = Pubkey::new_unique();
        let nonce = Hash::new_unique();
        let json = serde_json::json!({
            "version": 0,
            "feePayer": fee_payer.to_string(),
            "lifetime": {
                "nonce": nonce.to_string(),
                "nonceAccountAddress": nonce_account.to_string(),
                "nonceAuthorityAddress": fee_payer.to_string(),
            },
            "instructions": [{
                "programAddress": program.to_string(),
                "accounts": [{
                    "address": loaded.to_string(),
                    "role": "readonly",
                    "lookupTableAddress": table.to_string(),
                    "addressIndex": 3,
                }],
            }],
            "addressLookupTables": {
                table.to_string(): [loaded.to_string()],
            },
        });
        let file: TransactionFile = serde_json::from_value(json).unwrap();
        let message = file.to_message().unwrap();
        assert_eq!(message.version, TransactionVersion::V0);
        // The advance-nonce instruction is prepended.
        assert_eq!(message.instructions.len(), 2);
        assert_eq!(
            message.instructions[1].accounts[0],
            AccountReference::from(AccountLookupMeta::new_readonly(loaded, table, 3))
        );
        assert_eq!(
            parse_lookup_tables(&file.address_lookup_tables).unwrap(),
            HashMap::from([(table, vec![loaded])])
        );
    }

    #[test]
    fn test_rejects_bad_accounts() {
        let signing_lookup = Account {
            address: Pubkey::new_unique().to_string(),
            role: Role::ReadonlySigner,
            lookup_table_address: Some(Pubkey::new_unique().to_string()),
            address_index: Some(0),
        };
        assert!(signing_lookup.to_reference().is_err());

        let missing_index = Account {
            address_index: None,
            role: Role::Writable,
            ..signing_lookup
        };
        assert!(missing_index.to_reference().is_err());
    }

    #[test]
    fn test_unknown_version() {
        assert!(TransactionVersion::try_from(&Version::Name("v2".to_string())).is_err());
        assert_eq!(
            Version::from(TransactionVersion::Number(5)),
            Version::Number(5)
        );
    }

    #[test]
    fn test_load_keypair_and_tables() {
        use txforge::TransactionSigner;

        let dir = std::env::temp_dir();
        let keypair = Keypair::new();
        let keypair_path = dir.join(format!("txforge-{}.json", keypair.pubkey()));
        std::fs::write(
            &keypair_path,
            serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap(),
        )
        .unwrap();
        let loaded = load_keypair(keypair_path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());

        let table = Pubkey::new_unique();
        let tables_path = dir.join(format!("txforge-{table}.yaml"));
        std::fs::write(&tables_path, format!("{table}:\n  - {}\n", keypair.pubkey())).unwrap();
        let tables: HashMap<String, Vec<String>> = try_load(tables_path.to_str().unwrap()).unwrap();
        assert_eq!(
            parse_lookup_tables(&tables).unwrap(),
            HashMap::from([(table, vec![keypair.pubkey()])])
        );

        let unsupported = dir.join(format!("txforge-{table}.toml"));
        std::fs::write(&unsupported, "").unwrap();
        assert!(try_load::<TransactionFile>(unsupported.to_str().unwrap()).is_err());

        for path in [keypair_path, tables_path, unsupported] {
            std::fs::remove_file(path).unwrap();
        }
    }
}
