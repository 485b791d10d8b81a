//! オプション定義
//!
//! - [`OptionLayer`]: 1つの入力元（デフォルト・ファイル・引数）が持つ部分的な値
//! - [`OptionSet`]: 3レイヤーを統合・補完した解決済みの値

use crate::error::MissingOptionError;
use crate::scalar;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// 拡張設定ディレクトリのデフォルト
pub const DEFAULT_EXTENSIONS_DIR: &str = ".ebextensions";

/// オプションキー
///
/// 設定ファイル・コマンドライン・エラーメッセージで共通のケバブケース名を持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    ImageName,
    Tag,
    ContainerPort,
    BucketName,
    BucketKey,
    ApplicationName,
    EnvName,
    VersionLabel,
    VersionDescription,
    Volumes,
    AuthBucketName,
    AuthBucketKey,
    ExtensionsDir,
    Credentials,
}

impl OptionKey {
    pub const ALL: [OptionKey; 14] = [
        OptionKey::ImageName,
        OptionKey::Tag,
        OptionKey::ContainerPort,
        OptionKey::BucketName,
        OptionKey::BucketKey,
        OptionKey::ApplicationName,
        OptionKey::EnvName,
        OptionKey::VersionLabel,
        OptionKey::VersionDescription,
        OptionKey::Volumes,
        OptionKey::AuthBucketName,
        OptionKey::AuthBucketKey,
        OptionKey::ExtensionsDir,
        OptionKey::Credentials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImageName => "image-name",
            Self::Tag => "tag",
            Self::ContainerPort => "container-port",
            Self::BucketName => "bucket-name",
            Self::BucketKey => "bucket-key",
            Self::ApplicationName => "application-name",
            Self::EnvName => "env-name",
            Self::VersionLabel => "version-label",
            Self::VersionDescription => "version-description",
            Self::Volumes => "volumes",
            Self::AuthBucketName => "auth-bucket-name",
            Self::AuthBucketKey => "auth-bucket-key",
            Self::ExtensionsDir => "extensions-dir",
            Self::Credentials => "credentials",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ボリュームのバインド定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VolumeBinding {
    pub host: String,
    pub container: String,
}

impl VolumeBinding {
    pub fn new(host: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
        }
    }
}

/// 明示的に指定されたクラウド認証情報
///
/// 未指定のフィールドは環境の認証情報チェーンにフォールバックする。
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "mask_secret"
    )]
    pub secret_access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.access_key_id.is_none() && self.secret_access_key.is_none() && self.region.is_none()
    }

    /// フィールド単位でマージ（otherがSomeなら上書き）
    pub fn merge(&mut self, other: Credentials) {
        if other.access_key_id.is_some() {
            self.access_key_id = other.access_key_id;
        }
        if other.secret_access_key.is_some() {
            self.secret_access_key = other.secret_access_key;
        }
        if other.region.is_some() {
            self.region = other.region;
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "********"),
            )
            .field("region", &self.region)
            .finish()
    }
}

fn mask_secret<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_some("********"),
        None => serializer.serialize_none(),
    }
}

/// 1つの入力元が持つオプション
///
/// 全フィールドが任意。未知のキーはデシリアライズ時にエラーとなる。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OptionLayer {
    #[serde(default, deserialize_with = "scalar::optional")]
    pub image_name: Option<String>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub container_port: Option<String>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub bucket_name: Option<String>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub bucket_key: Option<String>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub application_name: Option<String>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub env_name: Option<String>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub version_label: Option<String>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub version_description: Option<String>,
    #[serde(default)]
    pub volumes: Option<Vec<VolumeBinding>>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub auth_bucket_name: Option<String>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub auth_bucket_key: Option<String>,
    #[serde(default)]
    pub extensions_dir: Option<PathBuf>,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

impl OptionLayer {
    /// 組み込みのデフォルトレイヤー
    pub fn builtin_defaults() -> Self {
        Self {
            extensions_dir: Some(PathBuf::from(DEFAULT_EXTENSIONS_DIR)),
            ..Default::default()
        }
    }

    /// より優先度の高いレイヤーを重ねる
    ///
    /// キー単位の浅いマージ。`volumes` は配列ごと置き換え、
    /// `credentials` はフィールド単位でマージする。
    pub fn merge(&mut self, other: OptionLayer) {
        // Option<T>フィールド: otherがSomeなら上書き
        if other.image_name.is_some() {
            self.image_name = other.image_name;
        }
        if other.tag.is_some() {
            self.tag = other.tag;
        }
        if other.container_port.is_some() {
            self.container_port = other.container_port;
        }
        if other.bucket_name.is_some() {
            self.bucket_name = other.bucket_name;
        }
        if other.bucket_key.is_some() {
            self.bucket_key = other.bucket_key;
        }
        if other.application_name.is_some() {
            self.application_name = other.application_name;
        }
        if other.env_name.is_some() {
            self.env_name = other.env_name;
        }
        if other.version_label.is_some() {
            self.version_label = other.version_label;
        }
        if other.version_description.is_some() {
            self.version_description = other.version_description;
        }
        if other.volumes.is_some() {
            self.volumes = other.volumes;
        }
        if other.auth_bucket_name.is_some() {
            self.auth_bucket_name = other.auth_bucket_name;
        }
        if other.auth_bucket_key.is_some() {
            self.auth_bucket_key = other.auth_bucket_key;
        }
        if other.extensions_dir.is_some() {
            self.extensions_dir = other.extensions_dir;
        }

        if let Some(incoming) = other.credentials {
            self.credentials
                .get_or_insert_with(Credentials::default)
                .merge(incoming);
        }
    }
}

/// 解決済みのオプション
///
/// `tag`・`container_port`・`version_label`・`bucket_key` は解決時に必ず補完される。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    pub tag: String,
    pub container_port: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    pub bucket_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_name: Option<String>,
    pub version_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<VolumeBinding>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_bucket_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

impl OptionSet {
    /// 文字列値を持つキーの値を取得
    ///
    /// `volumes` と `credentials` は文字列値を持たないため常に None。
    pub fn get(&self, key: OptionKey) -> Option<&str> {
        match key {
            OptionKey::ImageName => self.image_name.as_deref(),
            OptionKey::Tag => Some(&self.tag),
            OptionKey::ContainerPort => Some(&self.container_port),
            OptionKey::BucketName => self.bucket_name.as_deref(),
            OptionKey::BucketKey => Some(&self.bucket_key),
            OptionKey::ApplicationName => self.application_name.as_deref(),
            OptionKey::EnvName => self.env_name.as_deref(),
            OptionKey::VersionLabel => Some(&self.version_label),
            OptionKey::VersionDescription => self.version_description.as_deref(),
            OptionKey::AuthBucketName => self.auth_bucket_name.as_deref(),
            OptionKey::AuthBucketKey => self.auth_bucket_key.as_deref(),
            OptionKey::ExtensionsDir => self.extensions_dir.as_deref().and_then(|p| p.to_str()),
            OptionKey::Volumes | OptionKey::Credentials => None,
        }
    }

    /// キーに値が設定されているか（空文字列は未設定扱い）
    pub fn is_set(&self, key: OptionKey) -> bool {
        match key {
            OptionKey::Volumes => self.volumes.as_ref().is_some_and(|v| !v.is_empty()),
            OptionKey::Credentials => self.credentials.as_ref().is_some_and(|c| !c.is_empty()),
            OptionKey::ExtensionsDir => self.extensions_dir.is_some(),
            _ => self.get(key).is_some_and(|v| !v.is_empty()),
        }
    }

    /// 必須の文字列値を取得
    pub fn value(&self, key: OptionKey) -> Result<&str, MissingOptionError> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| MissingOptionError::new(vec![key]))
    }

    /// 指定したキーが全て設定されていることを確認
    pub fn require(&self, keys: &[OptionKey]) -> Result<(), MissingOptionError> {
        crate::resolver::require(self, keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_present_keys_only() {
        let mut base = OptionLayer {
            image_name: Some("base".to_string()),
            tag: Some("v1".to_string()),
            ..Default::default()
        };
        base.merge(OptionLayer {
            tag: Some("v2".to_string()),
            ..Default::default()
        });

        assert_eq!(base.image_name.as_deref(), Some("base"));
        assert_eq!(base.tag.as_deref(), Some("v2"));
    }

    #[test]
    fn test_merge_replaces_volumes_wholesale() {
        let mut base = OptionLayer {
            volumes: Some(vec![
                VolumeBinding::new("/a", "/a"),
                VolumeBinding::new("/b", "/b"),
            ]),
            ..Default::default()
        };
        base.merge(OptionLayer {
            volumes: Some(vec![VolumeBinding::new("/c", "/c")]),
            ..Default::default()
        });

        assert_eq!(base.volumes, Some(vec![VolumeBinding::new("/c", "/c")]));
    }

    #[test]
    fn test_merge_credentials_field_by_field() {
        let mut base = OptionLayer {
            credentials: Some(Credentials {
                access_key_id: Some("AKIA".to_string()),
                secret_access_key: Some("secret".to_string()),
                region: Some("us-east-1".to_string()),
            }),
            ..Default::default()
        };
        base.merge(OptionLayer {
            credentials: Some(Credentials {
                region: Some("ap-northeast-1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });

        let credentials = base.credentials.unwrap();
        assert_eq!(credentials.access_key_id.as_deref(), Some("AKIA"));
        assert_eq!(credentials.region.as_deref(), Some("ap-northeast-1"));
    }

    #[test]
    fn test_credentials_debug_masks_secret() {
        let credentials = Credentials {
            access_key_id: Some("AKIA".to_string()),
            secret_access_key: Some("super-secret".to_string()),
            region: None,
        };
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("AKIA"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_layer_from_yaml_accepts_numeric_scalars() {
        let layer: OptionLayer = serde_yaml::from_str(
            r#"
image-name: app
container-port: 8080
volumes:
  - host: /var/data
    container: /data
"#,
        )
        .unwrap();

        assert_eq!(layer.image_name.as_deref(), Some("app"));
        assert_eq!(layer.container_port.as_deref(), Some("8080"));
        assert_eq!(
            layer.volumes,
            Some(vec![VolumeBinding::new("/var/data", "/data")])
        );
    }

    #[test]
    fn test_layer_from_yaml_rejects_unknown_key() {
        let result: Result<OptionLayer, _> = serde_yaml::from_str("imagename: app\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_option_key_names_are_unique() {
        let mut names: Vec<_> = OptionKey::ALL.iter().map(|k| k.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), OptionKey::ALL.len());
    }
}
