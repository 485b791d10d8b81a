//! beanflow デプロイパイプライン
//!
//! 解決済みオプションからアーカイブを作成し、オブジェクトストレージへの
//! アップロード、アプリケーションバージョンの登録、環境への反映までを
//! 順番に実行します。
//!
//! リモートサービスは [`beanflow_cloud`] の trait 越しに扱うため、
//! このクレート自体は特定のクラウドSDKに依存しません。

pub mod error;
pub mod orchestrator;
pub mod pipeline;

pub use error::{DeployError, PipelineError, Result};
pub use orchestrator::{
    ARCHIVE_KEYS, DeploymentOrchestrator, DeploymentReport, PROMOTION_KEYS, REGISTRATION_KEYS,
    bundle, deploy_keys, object_key, prepare_deploy,
};
pub use pipeline::{Pipeline, PipelineState};
