use crate::options::OptionKey;
use thiserror::Error;

/// 必須オプションの不足
///
/// 要求されたキーのうち不足しているものを全て保持する。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("必須オプションが指定されていません: {}", join_keys(.missing))]
pub struct MissingOptionError {
    missing: Vec<OptionKey>,
}

impl MissingOptionError {
    pub fn new(missing: Vec<OptionKey>) -> Self {
        Self { missing }
    }

    /// 不足しているキー（要求順）
    pub fn missing(&self) -> &[OptionKey] {
        &self.missing
    }
}

fn join_keys(keys: &[OptionKey]) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, MissingOptionError>;
