use std::io::{self, Write};

use clap::{Parser, Subcommand};
use hearth_app::config::AppConfig;

mod quote;
mod refund;
mod signature;

#[derive(Debug, Parser)]
#[command(name = "hearth-app", about = "Hearth booking CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a stay with the configured policy
    Quote(quote::QuoteArgs),

    /// Compute the refund owed for a cancellation
    Refund(refund::RefundArgs),

    /// Sign a payment the way the gateway does
    Sign(signature::SignArgs),

    /// Verify a payment signature
    Verify(signature::VerifyArgs),
}

impl Cli {
    /// Parse arguments, reading a `.env` file first if present.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Quote(args) => quote::run(&self.config, &args),
            Commands::Refund(args) => refund::run(&self.config, &args),
            Commands::Sign(args) => signature::sign(&self.config, &args),
            Commands::Verify(args) => signature::verify(&self.config, &args),
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to render output: {error}"))?;

    print_line(&rendered)
}

fn print_line(line: &str) -> Result<(), String> {
    writeln!(io::stdout().lock(), "{line}")
        .map_err(|error| format!("failed to write output: {error}"))
}
