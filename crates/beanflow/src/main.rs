mod args;
mod commands;

use args::OptionArgs;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bean")]
#[command(about = "YAML一枚で、Elastic Beanstalk へ。", long_about = None)]
struct Cli {
    /// 詳細なログを出力（RUST_LOG が優先される）
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// アーカイブを作成してアップロードし、環境を新しいバージョンに更新
    Deploy {
        #[command(flatten)]
        options: OptionArgs,
    },
    /// デプロイ用アーカイブのみを作成（アップロードしない）
    Bundle {
        /// 出力先のZIPファイル
        output: PathBuf,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// オプションを解決して表示（リモートへの操作は行わない）
    Validate {
        #[command(flatten)]
        options: OptionArgs,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Version => {
            println!("beanflow {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Deploy { options } => {
            let sources = options.load_sources()?;
            commands::deploy::handle(sources).await?;
        }
        Commands::Bundle { output, options } => {
            let sources = options.load_sources()?;
            commands::bundle::handle(sources, &output)?;
        }
        Commands::Validate { options } => {
            let sources = options.load_sources()?;
            commands::validate::handle(sources)?;
        }
    }

    Ok(())
}

/// ログはstderrに出力（デフォルト: warn、-v で debug）
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
