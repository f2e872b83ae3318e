//! Command-line arguments for `quote_fetch`.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quote_core::CommodityId;
use quote_core::config::{
    API_KEY_ENV, DEFAULT_CURRENCY, DEFAULT_CURRENCY_ENV, DEFAULT_WRAPPER, INTERPRETER_ENV,
    NAMESPACE_REGEX_ENV, QuoteConfig, WRAPPER_ENV,
};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Finance::Quote wrapper script (path, or a name searched on PATH).
    #[clap(long, env = WRAPPER_ENV, default_value = DEFAULT_WRAPPER)]
    pub wrapper: PathBuf,

    /// Interpreter running the wrapper; `perl` from PATH when omitted.
    #[clap(long, env = INTERPRETER_ENV)]
    pub interpreter: Option<PathBuf>,

    /// Alpha Vantage API key handed to Finance::Quote.
    #[clap(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// ISO code of the book's default currency.
    #[clap(long, env = DEFAULT_CURRENCY_ENV, default_value = DEFAULT_CURRENCY)]
    pub default_currency: String,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the Finance::Quote version and its quote sources.
    Check,
    /// Fetch quotes into a book file.
    Fetch(FetchArgs),
}

/// Arguments of `fetch`.
#[derive(Debug, clap::Args)]
pub struct FetchArgs {
    /// JSON book file with commodities and prices.
    #[clap(long)]
    pub book: String,

    /// Only quote namespaces matching this case-insensitive expression.
    #[clap(long, env = NAMESPACE_REGEX_ENV)]
    pub namespace_regex: Option<String>,

    /// Quote only these commodities (repeatable), as NAMESPACE:MNEMONIC.
    #[clap(long = "commodity", value_name = "NS:MNEMONIC")]
    pub commodities: Vec<CommodityId>,

    /// Where to write the updated book; the input file when omitted.
    #[clap(long)]
    pub output: Option<String>,
}

impl Args {
    /// Quote core settings described by the arguments.
    pub fn quote_config(&self) -> QuoteConfig {
        let namespace_filter = match &self.command {
            Command::Fetch(fetch) => fetch.namespace_regex.clone(),
            Command::Check => None,
        };
        QuoteConfig {
            interpreter: self.interpreter.clone(),
            wrapper: self.wrapper.clone(),
            api_key: self.api_key.clone().filter(|key| !key.is_empty()),
            namespace_filter,
            default_currency: self.default_currency.trim().to_uppercase(),
        }
    }
}
