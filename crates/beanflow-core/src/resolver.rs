//! オプションの解決
//!
//! 優先順位（低 → 高）: 組み込みデフォルト < 設定ファイル < コマンドライン引数

use crate::error::MissingOptionError;
use crate::options::{OptionKey, OptionLayer, OptionSet};
use tracing::debug;
use uuid::Uuid;

/// タグ未指定時のデフォルト
pub const DEFAULT_TAG: &str = "latest";

/// コンテナポート未指定時のデフォルト
pub const DEFAULT_CONTAINER_PORT: &str = "3000";

/// 3つのレイヤーを統合して解決済みオプションを生成
///
/// マージ後に以下を補完する:
/// 1. `tag` → `"latest"`
/// 2. `container-port` → `"3000"`
/// 3. `version-label` → ランダムなUUID
/// 4. `bucket-key` → `version-label`
pub fn resolve(defaults: OptionLayer, file: OptionLayer, overrides: OptionLayer) -> OptionSet {
    let mut merged = defaults;
    merged.merge(file);
    merged.merge(overrides);

    // 空文字列は未指定として補完する
    let version_label = non_empty(merged.version_label)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let bucket_key = non_empty(merged.bucket_key).unwrap_or_else(|| version_label.clone());

    let resolved = OptionSet {
        image_name: merged.image_name,
        tag: non_empty(merged.tag).unwrap_or_else(|| DEFAULT_TAG.to_string()),
        container_port: non_empty(merged.container_port)
            .unwrap_or_else(|| DEFAULT_CONTAINER_PORT.to_string()),
        bucket_name: merged.bucket_name,
        bucket_key,
        application_name: merged.application_name,
        env_name: merged.env_name,
        version_label,
        version_description: merged.version_description,
        volumes: merged.volumes,
        auth_bucket_name: merged.auth_bucket_name,
        auth_bucket_key: merged.auth_bucket_key,
        extensions_dir: merged.extensions_dir,
        credentials: merged.credentials,
    };

    debug!(options = ?resolved, "Resolved options");
    resolved
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// 1回の実行で使う3つの入力元
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSources {
    pub defaults: OptionLayer,
    pub file: OptionLayer,
    pub overrides: OptionLayer,
}

impl OptionSources {
    /// 組み込みデフォルトを最下層に置いて作成
    pub fn new(file: OptionLayer, overrides: OptionLayer) -> Self {
        Self {
            defaults: OptionLayer::builtin_defaults(),
            file,
            overrides,
        }
    }

    pub fn resolve(self) -> OptionSet {
        resolve(self.defaults, self.file, self.overrides)
    }
}

/// 指定したキーが全て設定されていることを確認
///
/// 不足しているキーは最初の1つだけでなく全てを報告する。
pub fn require(options: &OptionSet, keys: &[OptionKey]) -> Result<(), MissingOptionError> {
    let missing: Vec<OptionKey> = keys
        .iter()
        .copied()
        .filter(|key| !options.is_set(*key))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingOptionError::new(missing))
    }
}
