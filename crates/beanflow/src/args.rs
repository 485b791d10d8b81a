//! コマンドライン引数からオプションレイヤーへの変換

use beanflow_config::OPTIONS_FILE_ENV;
use beanflow_core::{Credentials, OptionLayer, OptionSources, VolumeBinding};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// 全コマンド共通のオプション
///
/// ここで指定した値は設定ファイルより優先される。
#[derive(Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// 設定ファイルのパス（デフォルト: .beanflow.yml）
    #[arg(short, long, env = OPTIONS_FILE_ENV)]
    pub config: Option<PathBuf>,

    /// Dockerイメージ名
    #[arg(long)]
    pub image_name: Option<String>,

    /// イメージタグ（デフォルト: latest）
    #[arg(long)]
    pub tag: Option<String>,

    /// コンテナが公開するポート（デフォルト: 3000）
    #[arg(long)]
    pub container_port: Option<String>,

    /// アーカイブのアップロード先バケット
    #[arg(long)]
    pub bucket_name: Option<String>,

    /// アップロード先のキー（".zip" が付与される。デフォルト: version-label）
    #[arg(long)]
    pub bucket_key: Option<String>,

    /// Elastic Beanstalk のアプリケーション名
    #[arg(long)]
    pub application_name: Option<String>,

    /// Elastic Beanstalk の環境名
    #[arg(long)]
    pub env_name: Option<String>,

    /// バージョンラベル（デフォルト: ランダムなUUID）
    #[arg(long)]
    pub version_label: Option<String>,

    /// バージョンの説明
    #[arg(long)]
    pub version_description: Option<String>,

    /// ボリュームのバインド（HOST:CONTAINER、複数指定可）
    #[arg(long = "volume", value_name = "HOST:CONTAINER", value_parser = parse_volume)]
    pub volumes: Vec<VolumeBinding>,

    /// プライベートレジストリ認証情報のバケット
    #[arg(long)]
    pub auth_bucket_name: Option<String>,

    /// プライベートレジストリ認証情報のキー
    #[arg(long)]
    pub auth_bucket_key: Option<String>,

    /// アーカイブに含める拡張設定ディレクトリ（デフォルト: .ebextensions）
    #[arg(long)]
    pub extensions_dir: Option<PathBuf>,

    /// AWSアクセスキーID
    #[arg(long)]
    pub access_key_id: Option<String>,

    /// AWSシークレットアクセスキー
    #[arg(long)]
    pub secret_access_key: Option<String>,

    /// AWSリージョン
    #[arg(long)]
    pub region: Option<String>,
}

impl OptionArgs {
    /// 設定ファイルを読み込み、3つの入力元を揃える
    pub fn load_sources(&self) -> anyhow::Result<OptionSources> {
        let path = beanflow_config::find_options_file(self.config.as_deref());
        if path.exists() {
            println!("設定ファイル: {}", path.display().to_string().cyan());
        } else {
            tracing::debug!("Options file not found, using flags only: {}", path.display());
        }

        let file = beanflow_config::load_options_file(&path)?;
        Ok(OptionSources::new(file, self.to_layer()))
    }

    /// 最優先レイヤーに変換
    ///
    /// 指定されなかった引数は None のまま残し、下位レイヤーの値を隠さない。
    pub fn to_layer(&self) -> OptionLayer {
        let credentials = Credentials {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            region: self.region.clone(),
        };

        OptionLayer {
            image_name: self.image_name.clone(),
            tag: self.tag.clone(),
            container_port: self.container_port.clone(),
            bucket_name: self.bucket_name.clone(),
            bucket_key: self.bucket_key.clone(),
            application_name: self.application_name.clone(),
            env_name: self.env_name.clone(),
            version_label: self.version_label.clone(),
            version_description: self.version_description.clone(),
            volumes: (!self.volumes.is_empty()).then(|| self.volumes.clone()),
            auth_bucket_name: self.auth_bucket_name.clone(),
            auth_bucket_key: self.auth_bucket_key.clone(),
            extensions_dir: self.extensions_dir.clone(),
            credentials: (!credentials.is_empty()).then_some(credentials),
        }
    }
}

/// "HOST:CONTAINER" 形式のボリューム指定をパース
fn parse_volume(value: &str) -> Result<VolumeBinding, String> {
    match value.split_once(':') {
        Some((host, container)) if !host.is_empty() && !container.is_empty() => {
            Ok(VolumeBinding::new(host, container))
        }
        _ => Err(format!(
            "ボリュームは HOST:CONTAINER 形式で指定してください: {}",
            value
        )),
    }
}
