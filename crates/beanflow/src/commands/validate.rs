use beanflow_core::{OptionSources, require};
use colored::Colorize;

/// オプションを解決して表示する（リモートへの操作は行わない）
pub fn handle(sources: OptionSources) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let options = sources.resolve();
    let rendered = serde_yaml::to_string(&options)?;

    match require(&options, &beanflow_deploy::deploy_keys()) {
        Ok(()) => {
            println!("{}", "✓ デプロイに必要なオプションは揃っています！".green().bold());
            println!();
            print!("{}", rendered);
            Ok(())
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            println!();
            print!("{}", rendered);
            Err(e.into())
        }
    }
}
