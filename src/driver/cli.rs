//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 商品写真の背景除去ツール
#[derive(Parser, Debug, Clone)]
#[command(name = "productai")]
#[command(about = "Upload product photos and remove their background", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, global = true, default_value = "./productai.json")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the background-removal endpoint
    Serve {
        /// Override the bind address from the config file
        #[arg(long)]
        bind: Option<String>,
    },

    /// Upload a photo and remove its background
    Process {
        /// Image files to select (exactly one is accepted)
        files: Vec<PathBuf>,

        /// Session token sent to the processing endpoint
        #[arg(long, env = "PRODUCTAI_SESSION_TOKEN")]
        session_token: Option<String>,

        /// Override the processing endpoint URL from the config file
        #[arg(long)]
        endpoint: Option<String>,
    },
}
