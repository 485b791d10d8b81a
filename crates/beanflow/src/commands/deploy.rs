use beanflow_cloud_aws::{BeanstalkService, S3Storage, load_sdk_config};
use beanflow_core::OptionSources;
use beanflow_deploy::{DeploymentOrchestrator, PipelineError, PipelineState, prepare_deploy};
use colored::Colorize;
use std::sync::Arc;

pub async fn handle(sources: OptionSources) -> anyhow::Result<()> {
    println!("{}", "デプロイを開始します...".blue().bold());

    // 必須オプションの確認はクライアント初期化（リージョン解決など）より先に行う
    let options = prepare_deploy(sources).map_err(report_failure)?;

    let sdk_config = load_sdk_config(options.credentials.as_ref()).await?;
    if let Some(region) = sdk_config.region() {
        println!("リージョン: {}", region.to_string().cyan());
    }

    let storage = Arc::new(S3Storage::new(&sdk_config));
    let service = Arc::new(BeanstalkService::new(&sdk_config));
    let mut orchestrator = DeploymentOrchestrator::new(storage, service);

    println!();
    println!(
        "{}",
        "検証 → アーカイブ作成 → アップロード → バージョン登録 → 環境更新".yellow()
    );

    let report = orchestrator
        .deploy_resolved(options)
        .await
        .map_err(report_failure)?;

    println!();
    println!("{}", "✓ デプロイが完了しました！".green().bold());
    println!();
    println!("  アプリケーション: {}", report.version.application_name.cyan());
    println!("  バージョン:       {}", report.version_label().cyan());
    println!("  アーカイブ:       {}", report.object);
    println!(
        "  環境:             {}",
        report.environment.environment_name.cyan()
    );
    if let Some(status) = &report.environment.status {
        println!("  ステータス:       {}", status);
    }
    Ok(())
}

fn report_failure(e: PipelineError) -> anyhow::Error {
    eprintln!();
    eprintln!(
        "{}",
        format!("✗ デプロイに失敗しました（{}）", e.stage).red().bold()
    );
    eprintln!("  {}", e.source.user_message());
    if e.stage == PipelineState::PromotingEnvironment {
        eprintln!();
        eprintln!(
            "{}",
            "警告: バージョンは登録済みですが、環境は更新されていません。".yellow()
        );
    }
    e.into()
}
