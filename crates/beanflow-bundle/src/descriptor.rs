//! OptionSet から Dockerrun.aws.json（実行定義）への変換

use beanflow_core::{MissingOptionError, OptionKey, OptionSet};
use serde::{Deserialize, Serialize};

/// Dockerrun.aws.json のフォーマットバージョン（単一コンテナ）
pub const DOCKERRUN_VERSION: &str = "1";

/// コンテナ実行定義
///
/// 任意セクション（Volumes / Authentication）は値がない場合キーごと出力しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDescriptor {
    #[serde(rename = "AWSEBDockerrunVersion")]
    pub version: String,
    #[serde(rename = "Image")]
    pub image: ImageRef,
    #[serde(rename = "Ports")]
    pub ports: Vec<PortMapping>,
    #[serde(rename = "Volumes", default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<VolumeMount>>,
    #[serde(
        rename = "Authentication",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub authentication: Option<AuthPointer>,
}

/// イメージ参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageRef {
    pub name: String,
    pub update: String,
}

/// ポート定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortMapping {
    pub container_port: String,
}

/// ボリューム定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeMount {
    pub host_directory: String,
    pub container_directory: String,
}

/// プライベートレジストリ認証ファイルの場所
///
/// Key が未指定の場合は null として出力する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthPointer {
    pub bucket: String,
    pub key: Option<String>,
}

impl ArchiveDescriptor {
    /// 解決済みオプションから実行定義を生成
    ///
    /// 副作用なし。同じ OptionSet からは常に同じ結果を返す。
    pub fn from_options(options: &OptionSet) -> Result<Self, MissingOptionError> {
        let image_name = options.value(OptionKey::ImageName)?;

        let volumes = options
            .volumes
            .as_ref()
            .filter(|volumes| !volumes.is_empty())
            .map(|volumes| {
                volumes
                    .iter()
                    .map(|v| VolumeMount {
                        host_directory: v.host.clone(),
                        container_directory: v.container.clone(),
                    })
                    .collect()
            });

        let authentication = options
            .auth_bucket_name
            .as_ref()
            .filter(|bucket| !bucket.is_empty())
            .map(|bucket| AuthPointer {
                bucket: bucket.clone(),
                key: options.auth_bucket_key.clone(),
            });

        Ok(Self {
            version: DOCKERRUN_VERSION.to_string(),
            image: ImageRef {
                name: format!("{}:{}", image_name, options.tag),
                update: "true".to_string(),
            },
            ports: vec![PortMapping {
                container_port: options.container_port.clone(),
            }],
            volumes,
            authentication,
        })
    }

    /// JSON文字列に変換（フィールド順は固定）
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
