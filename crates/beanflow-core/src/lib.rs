//! beanflow のオプションモデルと解決ロジック
//!
//! デフォルト値・設定ファイル・コマンドライン引数の3レイヤーを
//! 1つの [`OptionSet`] に統合します。

pub mod error;
pub mod options;
pub mod resolver;
mod scalar;

pub use error::MissingOptionError;
pub use options::{
    Credentials, DEFAULT_EXTENSIONS_DIR, OptionKey, OptionLayer, OptionSet, VolumeBinding,
};
pub use resolver::{DEFAULT_CONTAINER_PORT, DEFAULT_TAG, OptionSources, require, resolve};
