//! CLI runners. `compile` goes description -> wire, `inspect` goes back.

use {
    crate::config::{parse_lookup_tables, TransactionFile},
    base64::{prelude::BASE64_STANDARD, Engine},
    clap::ValueEnum,
    log::{debug, info, warn},
    std::{collections::HashMap, error::Error},
    txforge::{
        codec::{decode_transaction, encode_transaction},
        compile_transaction, compress_with_lookup_tables, decompile_transaction,
        partially_sign_transaction, sign_transaction, DecompileConfig, Keypair,
    },
};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum WireFormat {
    /// Base64, as accepted by `sendTransaction`.
    #[default]
    Base64,
    /// Lowercase hex.
    Hex,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum DescriptionFormat {
    #[default]
    Yaml,
    Json,
}

pub struct Compiler {
    keypairs: Vec<Keypair>,
    partial: bool,
    format: WireFormat,
}

impl Compiler {
    pub fn new(keypairs: Vec<Keypair>, partial: bool, format: WireFormat) -> Self {
        Self {
            keypairs,
            partial,
            format,
        }
    }

    pub async fn run(&self, file: &TransactionFile) -> Result<String, Box<dyn Error>> {
        let mut message = file.to_message()?;

        if !file.address_lookup_tables.is_empty() {
            let tables = parse_lookup_tables(&file.address_lookup_tables)?;
            debug!("Compressing with {} lookup tables", tables.len());
            message = compress_with_lookup_tables(&message, &tables)?;
        }

        let mut transaction = compile_transaction(&message)?;
        info!(
            "Compiled {} message with {} signers",
            message.version,
            transaction.signatures.len()
        );

        if self.keypairs.is_empty() {
            warn!("No keypairs given, emitting an unsigned transaction");
        } else if self.partial {
            transaction = partially_sign_transaction(&self.keypairs, &transaction).await?;
        } else {
            transaction = sign_transaction(&self.keypairs, &transaction).await?;
        }

        let missing = transaction.signatures.missing();
        if !missing.is_empty() {
            info!("Missing signatures: {:?}", missing);
        }

        let bytes = encode_transaction(&transaction)?;
        Ok(match self.format {
            WireFormat::Base64 => BASE64_STANDARD.encode(bytes),
            WireFormat::Hex => hex::encode(bytes),
        })
    }
}

pub struct Inspector {
    last_valid_block_height: Option<u64>,
    lookup_tables: HashMap<String, Vec<String>>,
    format: DescriptionFormat,
}

impl Inspector {
    pub fn new(
        last_valid_block_height: Option<u64>,
        lookup_tables: HashMap<String, Vec<String>>,
        format: DescriptionFormat,
    ) -> Self {
        Self {
            last_valid_block_height,
            lookup_tables,
            format,
        }
    }

    pub fn run(&self, encoded: &str) -> Result<String, Box<dyn Error>> {
        let bytes = BASE64_STANDARD.decode(encoded.trim())?;
        let transaction = decode_transaction(&bytes)?;
        debug!(
            "Decoded transaction with {} signature slots",
            transaction.signatures.len()
        );

        let config = DecompileConfig {
            last_valid_block_height: self.last_valid_block_height,
            addresses_by_lookup_table: if self.lookup_tables.is_empty() {
                None
            } else {
                Some(parse_lookup_tables(&self.lookup_tables)?)
            },
        };
        let decompiled = decompile_transaction(&transaction, &config)?;

        let mut file = TransactionFile::from_message(&decompiled.message)
            .with_signatures(decompiled.signatures.as_deref().unwrap_or_default());
        file.address_lookup_tables = self.lookup_tables.clone();

        Ok(match self.format {
            DescriptionFormat::Yaml => serde_yaml::to_string(&file)?,
            DescriptionFormat::Json => serde_json::to_string_pretty(&file)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::config::{Account, InstructionFile, Lifetime, Role, Version},
        solana_hash::Hash,
        solana_pubkey::Pubkey,
        txforge::TransactionSigner,
    };

    fn transfer_file(fee_payer: &Pubkey, recipient: &Pubkey) -> TransactionFile {
        TransactionFile {
            version: Version::Name("legacy".to_string()),
            fee_payer: fee_payer.to_string(),
            lifetime: Some(Lifetime::Blockhash {
                blockhash: Hash::new_unique().to_string(),
                last_valid_block_height: 42,
            }),
            instructions: vec![InstructionFile {
                program_address: Pubkey::default().to_string(),
                accounts: vec![
                    Account {
                        address: fee_payer.to_string(),
                        role: Role::WritableSigner,
                        lookup_table_address: None,
                        address_index: None,
                    },
                    Account {
                        address: recipient.to_string(),
                        role: Role::Writable,
                        lookup_table_address: None,
                        address_index: None,
                    },
                ],
                data: "AgAAAAEAAAAAAAAA".to_string(),
            }],
            ..TransactionFile::default()
        }
    }

    #[tokio::test]
    async fn test_compile_then_inspect() {
        let keypair = Keypair::new();
        let file = transfer_file(&keypair.pubkey(), &Pubkey::new_unique());

        let pubkey = keypair.pubkey();
        let encoded = Compiler::new(vec![keypair], false, WireFormat::Base64)
            .run(&file)
            .await
            .unwrap();

        let output = Inspector::new(Some(42), HashMap::new(), DescriptionFormat::Yaml)
            .run(&encoded)
            .unwrap();
        let inspected: TransactionFile = serde_yaml::from_str(&output).unwrap();

        assert_eq!(inspected.signatures.len(), 1);
        assert_eq!(inspected.signatures[0].address, pubkey.to_string());
        assert_eq!(inspected.to_message().unwrap(), file.to_message().unwrap());
    }

    #[tokio::test]
    async fn test_compile_unsigned_hex() {
        let fee_payer = Pubkey::new_unique();
        let file = transfer_file(&fee_payer, &Pubkey::new_unique());
        let encoded = Compiler::new(vec![], false, WireFormat::Hex)
            .run(&file)
            .await
            .unwrap();
        // One empty signature slot.
        assert!(encoded.starts_with(&format!("01{}", "00".repeat(64))));

        let output = Inspector::new(None, HashMap::new(), DescriptionFormat::Json)
            .run(&BASE64_STANDARD.encode(hex::decode(&encoded).unwrap()))
            .unwrap();
        let inspected: TransactionFile = serde_json::from_str(&output).unwrap();
        assert!(inspected.signatures.is_empty());
        assert_eq!(inspected.fee_payer, fee_payer.to_string());
    }

    #[tokio::test]
    async fn test_full_signing_requires_every_signer() {
        let file = transfer_file(&Pubkey::new_unique(), &Pubkey::new_unique());
        let stranger = Keypair::new();
        assert!(Compiler::new(vec![stranger], false, WireFormat::Base64)
            .run(&file)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_compile_compresses_with_lookup_tables() {
        let keypair = Keypair::new();
        let recipient = Pubkey::new_unique();
        let table = Pubkey::new_unique();
        let mut file = transfer_file(&keypair.pubkey(), &recipient);
        file.version = Version::Number(0);
        file.address_lookup_tables =
            HashMap::from([(table.to_string(), vec![recipient.to_string()])]);

        let encoded = Compiler::new(vec![keypair], true, WireFormat::Base64)
            .run(&file)
            .await
            .unwrap();

        // Without the table contents the lookup cannot be resolved.
        assert!(Inspector::new(None, HashMap::new(), DescriptionFormat::Yaml)
            .run(&encoded)
            .is_err());

        let output = Inspector::new(
            None,
            file.address_lookup_tables.clone(),
            DescriptionFormat::Yaml,
        )
        .run(&encoded)
        .unwrap();
        let inspected: TransactionFile = serde_yaml::from_str(&output).unwrap();
        let account = &inspected.instructions[0].accounts[1];
        assert_eq!(account.address, recipient.to_string());
        assert_eq!(account.lookup_table_address, Some(table.to_string()));
        assert_eq!(account.address_index, Some(0));
    }
}
