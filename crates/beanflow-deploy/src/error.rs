use crate::pipeline::PipelineState;
use beanflow_bundle::BundleError;
use beanflow_cloud::CloudError;
use beanflow_core::MissingOptionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    MissingOptions(#[from] MissingOptionError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Remote(#[from] CloudError),

    #[error("不正な状態遷移です: {from} → {to}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },
}

impl DeployError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            DeployError::Bundle(e) => e.user_message(),
            DeployError::Remote(CloudError::ApplicationNotFound(name)) => {
                format!(
                    "アプリケーション '{}' が見つかりません。\n\
                     \n\
                     beanflow はアプリケーションを自動作成しません。\n\
                     事前に作成するか --application-name を確認してください。",
                    name
                )
            }
            _ => format!("{}", self),
        }
    }
}

/// パイプラインがどのステージで中断したかを伴うエラー
#[derive(Debug, Error)]
#[error("{stage} ステージで中断しました: {source}")]
pub struct PipelineError {
    pub stage: PipelineState,
    #[source]
    pub source: DeployError,
}

impl PipelineError {
    pub fn new(stage: PipelineState, source: DeployError) -> Self {
        Self { stage, source }
    }

    /// 不足しているオプションによる中断かどうか
    pub fn missing_options(&self) -> Option<&MissingOptionError> {
        match &self.source {
            DeployError::MissingOptions(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;
    use beanflow_core::OptionKey;

    #[test]
    fn test_pipeline_error_names_stage() {
        let err = PipelineError::new(
            PipelineState::Validating,
            MissingOptionError::new(vec![OptionKey::BucketName]).into(),
        );
        let message = err.to_string();
        assert!(message.contains("validating"));
        assert!(message.contains("bucket-name"));
        assert!(err.missing_options().is_some());
    }

    #[test]
    fn test_application_not_found_message() {
        let err = DeployError::from(CloudError::ApplicationNotFound("shop".to_string()));
        assert!(err.user_message().contains("'shop'"));
    }
}
