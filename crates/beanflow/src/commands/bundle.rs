use beanflow_core::OptionSources;
use colored::Colorize;
use std::path::Path;

pub fn handle(sources: OptionSources, output: &Path) -> anyhow::Result<()> {
    println!("{}", "アーカイブを作成中...".blue());

    match beanflow_deploy::bundle(sources, output) {
        Ok(options) => {
            println!(
                "{}",
                format!("✓ アーカイブを作成しました: {}", output.display())
                    .green()
                    .bold()
            );
            if let Some(image) = &options.image_name {
                println!("  イメージ: {}:{}", image.cyan(), options.tag);
            }
            println!("  ポート:   {}", options.container_port);
            Ok(())
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ アーカイブの作成に失敗しました".red().bold());
            eprintln!("  {}", e.source.user_message());
            Err(e.into())
        }
    }
}
