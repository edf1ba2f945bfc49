//! txforge CLI.

mod config;
mod runner;

use {
    crate::runner::{Compiler, DescriptionFormat, Inspector, WireFormat},
    clap::{Parser, Subcommand},
    config::TransactionFile,
    std::collections::HashMap,
};

#[derive(Subcommand)]
enum SubCommand {
    /// Compile a transaction description into a wire transaction, signing it
    /// with the given keypairs.
    Compile {
        /// Path to a transaction description (`.json`, `.yaml` or `.yml`).
        #[arg(required = true)]
        file: String,

        /// Path to a keypair file (64-byte JSON array). May be repeated.
        #[arg(short, long = "keypair")]
        keypairs: Vec<String>,
        /// Sign with whatever keypairs were given and leave other signature
        /// slots empty. By default every signer must be provided.
        #[arg(long)]
        partial: bool,
        /// Output encoding of the wire transaction.
        #[arg(long, default_value = "base64")]
        format: WireFormat,
        /// Enable debug logs.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Decode a base64 wire transaction and print its description.
    Inspect {
        /// The base64-encoded wire transaction.
        #[arg(required = true)]
        transaction: String,

        /// Last valid block height to report for a blockhash lifetime.
        #[arg(long)]
        last_valid_block_height: Option<u64>,
        /// Path to a file mapping lookup table addresses to their contents.
        #[arg(long)]
        lookup_tables: Option<String>,
        /// Output format of the description.
        #[arg(long, default_value = "yaml")]
        format: DescriptionFormat,
        /// Enable debug logs.
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Parser)]
struct Cli {
    #[clap(subcommand)]
    pub command: SubCommand,
}

fn setup_logger(verbose: bool) {
    if verbose {
        solana_logger::setup_with_default("txforge=debug");
    } else {
        solana_logger::setup_with_default("txforge=info");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        SubCommand::Compile {
            file,
            keypairs,
            partial,
            format,
            verbose,
        } => {
            setup_logger(verbose);

            let description: TransactionFile = config::try_load(&file)?;
            let keypairs = keypairs
                .iter()
                .map(|path| config::load_keypair(path))
                .collect::<Result<Vec<_>, _>>()?;

            let runner = Compiler::new(keypairs, partial, format);
            println!("{}", runner.run(&description).await?);
        }
        SubCommand::Inspect {
            transaction,
            last_valid_block_height,
            lookup_tables,
            format,
            verbose,
        } => {
            setup_logger(verbose);

            let lookup_tables: HashMap<String, Vec<String>> = match lookup_tables {
                Some(path) => config::try_load(&path)?,
                None => HashMap::new(),
            };

            let runner = Inspector::new(last_valid_block_height, lookup_tables, format);
            print!("{}", runner.run(&transaction)?);
        }
    }
    Ok(())
}
