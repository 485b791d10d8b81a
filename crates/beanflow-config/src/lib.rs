pub mod error;

pub use error::*;

use beanflow_core::OptionLayer;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 設定ファイルのデフォルト名（カレントディレクトリからの相対パス）
pub const DEFAULT_OPTIONS_FILE: &str = ".beanflow.yml";

/// 設定ファイルのパスを指定する環境変数
pub const OPTIONS_FILE_ENV: &str = "BEANFLOW_CONFIG_PATH";

/// 設定ファイルのパスを決定
///
/// 以下の優先順位で決定:
/// 1. 明示的に指定されたパス
/// 2. 環境変数 BEANFLOW_CONFIG_PATH
/// 3. カレントディレクトリの .beanflow.yml
///
/// ファイルの存在は確認しない（存在しない場合は空として扱う）。
pub fn find_options_file(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(OPTIONS_FILE_ENV)
        && !path.is_empty()
    {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_OPTIONS_FILE)
}

/// 設定ファイルを読み込んでオプションレイヤーを生成
///
/// ファイルが存在しない場合や空の場合は空のレイヤーを返す。
pub fn load_options_file(path: &Path) -> Result<OptionLayer> {
    if !path.exists() {
        debug!(path = %path.display(), "Options file not found, using empty layer");
        return Ok(OptionLayer::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let layer = parse_options(&content).map_err(|e| ConfigError::InvalidDocument {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    debug!(path = %path.display(), "Options file loaded");
    Ok(layer)
}

/// YAML文字列をオプションレイヤーとしてパース
pub fn parse_options(content: &str) -> std::result::Result<OptionLayer, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(OptionLayer::default());
    }

    // `~` や `null` のみのドキュメントは空として扱う
    let layer: Option<OptionLayer> = serde_yaml::from_str(content)?;
    Ok(layer.unwrap_or_default())
}
