use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("拡張設定ディレクトリの読み込みに失敗しました: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("ZIPアーカイブの書き込みに失敗しました: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("実行定義のシリアライズに失敗しました: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("拡張設定ディレクトリのパスにディレクトリ名がありません: {path}")]
    InvalidExtensionsDir { path: PathBuf },

    #[error("アーカイブを配置できませんでした: {path}\n理由: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BundleError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BundleError::Walk(e) => {
                format!(
                    "拡張設定ディレクトリを読み込めませんでした: {}\n\
                     \n\
                     --extensions-dir のパスと権限を確認してください。",
                    e
                )
            }
            BundleError::InvalidExtensionsDir { path } => {
                format!(
                    "拡張設定ディレクトリ {} はディレクトリ名を持たないため使用できません。\n\
                     \n\
                     --extensions-dir には .ebextensions のような名前付きのパスを指定してください。",
                    path.display()
                )
            }
            BundleError::Persist { path, .. } => {
                format!(
                    "アーカイブを {} に書き込めませんでした。\n\
                     \n\
                     出力先ディレクトリが存在し、書き込み可能か確認してください。",
                    path.display()
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type BundleResult<T> = std::result::Result<T, BundleError>;
