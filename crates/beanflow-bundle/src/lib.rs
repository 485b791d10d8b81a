//! beanflow デプロイアーカイブ
//!
//! コンテナ実行定義（Dockerrun.aws.json）の生成と、
//! 拡張設定ディレクトリを含むZIPアーカイブの組み立てを提供します。

pub mod assembler;
pub mod descriptor;
pub mod error;

pub use assembler::{ArchiveAssembler, DESCRIPTOR_FILE_NAME};
pub use descriptor::{ArchiveDescriptor, AuthPointer, ImageRef, PortMapping, VolumeMount};
pub use error::{BundleError, BundleResult};
