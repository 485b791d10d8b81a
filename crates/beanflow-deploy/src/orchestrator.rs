//! デプロイの実行
//!
//! 検証 → アーカイブ作成 → アップロード → バージョン登録 → 環境への反映
//! を順番に実行する。リトライ・ロールバックは行わない。

use crate::error::{PipelineError, Result};
use crate::pipeline::{Pipeline, PipelineState};
use beanflow_bundle::{ArchiveAssembler, ArchiveDescriptor};
use beanflow_cloud::{
    DeploymentService, EnvironmentInfo, ObjectLocation, ObjectStorage, PromotionRequest,
    VersionInfo, VersionRequest,
};
use beanflow_core::{OptionKey, OptionSet, OptionSources, require};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// アーカイブ作成に必要なキー
pub const ARCHIVE_KEYS: &[OptionKey] = &[
    OptionKey::ImageName,
    OptionKey::BucketName,
    OptionKey::BucketKey,
];

/// バージョン登録に必要なキー
pub const REGISTRATION_KEYS: &[OptionKey] = &[
    OptionKey::ApplicationName,
    OptionKey::VersionLabel,
    OptionKey::BucketName,
    OptionKey::BucketKey,
];

/// 環境への反映に必要なキー
pub const PROMOTION_KEYS: &[OptionKey] = &[
    OptionKey::ApplicationName,
    OptionKey::VersionLabel,
    OptionKey::EnvName,
];

/// 複数ステージのキーを重複なく順序を保って結合
pub fn union_keys(sets: &[&[OptionKey]]) -> Vec<OptionKey> {
    let mut keys = Vec::new();
    for key in sets.iter().flat_map(|set| set.iter().copied()) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// デプロイ全体で必要なキー
pub fn deploy_keys() -> Vec<OptionKey> {
    union_keys(&[ARCHIVE_KEYS, REGISTRATION_KEYS, PROMOTION_KEYS])
}

/// アップロード先のオブジェクトキー
pub fn object_key(bucket_key: &str) -> String {
    format!("{}.zip", bucket_key)
}

/// 完了したデプロイの結果
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub options: OptionSet,
    pub object: ObjectLocation,
    pub version: VersionInfo,
    pub environment: EnvironmentInfo,
}

impl DeploymentReport {
    pub fn version_label(&self) -> &str {
        &self.options.version_label
    }
}

/// デプロイパイプラインの実行者
///
/// ストレージとデプロイサービスは trait オブジェクトとして注入する。
pub struct DeploymentOrchestrator {
    storage: Arc<dyn ObjectStorage>,
    service: Arc<dyn DeploymentService>,
    pipeline: Pipeline,
}

impl DeploymentOrchestrator {
    pub fn new(storage: Arc<dyn ObjectStorage>, service: Arc<dyn DeploymentService>) -> Self {
        Self {
            storage,
            service,
            pipeline: Pipeline::new(),
        }
    }

    /// 現在の状態
    pub fn state(&self) -> PipelineState {
        self.pipeline.state()
    }

    /// これまでに通過した状態
    pub fn trail(&self) -> &[PipelineState] {
        self.pipeline.trail()
    }

    /// パイプライン全体を実行
    ///
    /// 呼び出しごとに状態機械を初期化する。
    pub async fn deploy(
        &mut self,
        sources: OptionSources,
    ) -> std::result::Result<DeploymentReport, PipelineError> {
        self.deploy_resolved(sources.resolve()).await
    }

    /// 解決済みのオプションでパイプラインを実行
    ///
    /// [`prepare_deploy`] の結果をそのまま渡せる。Validating で必要なキーを再確認する。
    pub async fn deploy_resolved(
        &mut self,
        options: OptionSet,
    ) -> std::result::Result<DeploymentReport, PipelineError> {
        self.pipeline = Pipeline::new();

        match self.run(options).await {
            Ok(report) => Ok(report),
            Err(source) => {
                let stage = self.pipeline.fail();
                if stage == PipelineState::PromotingEnvironment {
                    warn!(
                        "Application version was registered but the environment was not updated; \
                         the version is left in place"
                    );
                }
                tracing::error!(stage = %stage, error = %source, "Deployment failed");
                Err(PipelineError::new(stage, source))
            }
        }
    }

    async fn run(&mut self, options: OptionSet) -> Result<DeploymentReport> {
        // Validating
        self.pipeline.advance(PipelineState::Validating)?;
        require(&options, &deploy_keys())?;

        // Assembling
        self.pipeline.advance(PipelineState::Assembling)?;
        let bytes = assemble_archive(&options)?;

        // Uploading
        self.pipeline.advance(PipelineState::Uploading)?;
        options.require(ARCHIVE_KEYS)?;
        let object = ObjectLocation::new(
            options.value(OptionKey::BucketName)?,
            object_key(&options.bucket_key),
        );
        info!(
            storage = self.storage.name(),
            location = %object,
            bytes = bytes.len(),
            "Uploading archive"
        );
        self.storage.put(&object.bucket, &object.key, bytes).await?;

        // RegisteringVersion
        self.pipeline.advance(PipelineState::RegisteringVersion)?;
        options.require(REGISTRATION_KEYS)?;
        let request = VersionRequest {
            application_name: options.value(OptionKey::ApplicationName)?.to_string(),
            version_label: options.version_label.clone(),
            description: options.version_description.clone(),
            source: object.clone(),
        };
        info!(
            service = self.service.name(),
            application = %request.application_name,
            version = %request.version_label,
            "Registering application version"
        );
        let version = self.service.create_version(&request).await?;

        // PromotingEnvironment
        self.pipeline.advance(PipelineState::PromotingEnvironment)?;
        options.require(PROMOTION_KEYS)?;
        let request = PromotionRequest {
            application_name: request.application_name,
            environment_name: options.value(OptionKey::EnvName)?.to_string(),
            version_label: options.version_label.clone(),
        };
        info!(
            environment = %request.environment_name,
            version = %request.version_label,
            "Promoting environment"
        );
        let environment = self.service.promote(&request).await?;

        self.pipeline.advance(PipelineState::Done)?;
        info!(version = %options.version_label, "Deployment completed");

        Ok(DeploymentReport {
            options,
            object,
            version,
            environment,
        })
    }
}

/// デプロイ前の検証
///
/// オプションを解決し、全ステージで必要なキーが揃っていることを確認する。
/// I/O は一切行わないため、クラウドクライアントの初期化より先に呼び出す。
pub fn prepare_deploy(sources: OptionSources) -> std::result::Result<OptionSet, PipelineError> {
    let options = sources.resolve();
    match require(&options, &deploy_keys()) {
        Ok(()) => Ok(options),
        Err(e) => {
            tracing::error!(stage = %PipelineState::Validating, error = %e, "Deployment failed");
            Err(PipelineError::new(PipelineState::Validating, e.into()))
        }
    }
}

/// アーカイブのみを作成して destination に配置
///
/// リモートへの操作は一切行わない。成功時は解決済みオプションを返す。
pub fn bundle(
    sources: OptionSources,
    destination: &Path,
) -> std::result::Result<OptionSet, PipelineError> {
    let mut pipeline = Pipeline::new();

    let run = |pipeline: &mut Pipeline| -> Result<OptionSet> {
        pipeline.advance(PipelineState::Validating)?;
        let options = sources.resolve();
        require(&options, ARCHIVE_KEYS)?;

        pipeline.advance(PipelineState::Assembling)?;
        let descriptor = ArchiveDescriptor::from_options(&options)?;
        ArchiveAssembler::assemble(&descriptor, options.extensions_dir.as_deref(), destination)?;

        pipeline.advance(PipelineState::Done)?;
        Ok(options)
    };

    run(&mut pipeline).map_err(|source| {
        let stage = pipeline.fail();
        tracing::error!(stage = %stage, error = %source, "Bundle failed");
        PipelineError::new(stage, source)
    })
}

fn assemble_archive(options: &OptionSet) -> Result<Vec<u8>> {
    options.require(ARCHIVE_KEYS)?;
    let descriptor = ArchiveDescriptor::from_options(options)?;
    let bytes =
        ArchiveAssembler::assemble_to_bytes(&descriptor, options.extensions_dir.as_deref())?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_keys_union_keeps_order() {
        assert_eq!(
            deploy_keys(),
            vec![
                OptionKey::ImageName,
                OptionKey::BucketName,
                OptionKey::BucketKey,
                OptionKey::ApplicationName,
                OptionKey::VersionLabel,
                OptionKey::EnvName,
            ]
        );
    }

    #[test]
    fn test_object_key() {
        assert_eq!(object_key("v1"), "v1.zip");
        assert_eq!(object_key("releases/app-v1"), "releases/app-v1.zip");
    }
}
