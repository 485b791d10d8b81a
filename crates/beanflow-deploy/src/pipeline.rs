//! デプロイパイプラインの状態機械
//!
//! ```text
//! Idle → Validating → Assembling → Uploading → RegisteringVersion
//!                         │                         → PromotingEnvironment → Done
//!                         └→ Done（アーカイブのみ）
//! 終端以外の全状態 → Failed
//! ```

use crate::error::DeployError;
use std::fmt;

/// パイプラインの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    Validating,
    Assembling,
    Uploading,
    RegisteringVersion,
    PromotingEnvironment,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Assembling => "assembling",
            Self::Uploading => "uploading",
            Self::RegisteringVersion => "registering-version",
            Self::PromotingEnvironment => "promoting-environment",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;

        match (self, next) {
            (Idle, Validating)
            | (Validating, Assembling)
            | (Assembling, Uploading)
            | (Assembling, Done)
            | (Uploading, RegisteringVersion)
            | (RegisteringVersion, PromotingEnvironment)
            | (PromotingEnvironment, Done) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 状態遷移の管理
#[derive(Debug, Clone)]
pub struct Pipeline {
    state: PipelineState,
    trail: Vec<PipelineState>,
    failed_at: Option<PipelineState>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            trail: vec![PipelineState::Idle],
            failed_at: None,
        }
    }

    /// 現在の状態
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// これまでに通過した状態（開始時の Idle を含む）
    pub fn trail(&self) -> &[PipelineState] {
        &self.trail
    }

    /// 失敗した時点の状態
    pub fn failed_at(&self) -> Option<PipelineState> {
        self.failed_at
    }

    /// 次の状態へ進む
    pub fn advance(&mut self, next: PipelineState) -> Result<(), DeployError> {
        if !self.state.can_transition_to(next) {
            return Err(DeployError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!(from = %self.state, to = %next, "Pipeline transition");
        self.state = next;
        self.trail.push(next);
        Ok(())
    }

    /// Failed へ遷移し、失敗した時点の状態を返す
    ///
    /// 既に終端状態の場合は状態を変えずにその状態を返す。
    pub fn fail(&mut self) -> PipelineState {
        let at = self.state;
        if at.is_terminal() {
            return self.failed_at.unwrap_or(at);
        }

        self.state = PipelineState::Failed;
        self.trail.push(PipelineState::Failed);
        self.failed_at = Some(at);
        at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn test_full_deploy_path() {
        let mut pipeline = Pipeline::new();
        for next in [
            Validating,
            Assembling,
            Uploading,
            RegisteringVersion,
            PromotingEnvironment,
            Done,
        ] {
            pipeline.advance(next).unwrap();
        }

        assert_eq!(pipeline.state(), Done);
        assert_eq!(pipeline.trail().len(), 7);
        assert_eq!(pipeline.failed_at(), None);
    }

    #[test]
    fn test_bundle_only_path() {
        let mut pipeline = Pipeline::new();
        pipeline.advance(Validating).unwrap();
        pipeline.advance(Assembling).unwrap();
        pipeline.advance(Done).unwrap();

        assert_eq!(pipeline.trail(), &[Idle, Validating, Assembling, Done]);
    }

    #[test]
    fn test_stages_cannot_be_skipped() {
        let mut pipeline = Pipeline::new();
        pipeline.advance(Validating).unwrap();

        let err = pipeline.advance(Uploading).unwrap_err();
        assert!(matches!(
            err,
            DeployError::InvalidTransition {
                from: Validating,
                to: Uploading
            }
        ));
        assert_eq!(pipeline.state(), Validating);
    }

    #[test]
    fn test_promotion_requires_registration() {
        let mut pipeline = Pipeline::new();
        pipeline.advance(Validating).unwrap();
        pipeline.advance(Assembling).unwrap();
        pipeline.advance(Uploading).unwrap();

        assert!(pipeline.advance(PromotingEnvironment).is_err());
    }

    #[test]
    fn test_fail_records_stage() {
        let mut pipeline = Pipeline::new();
        pipeline.advance(Validating).unwrap();
        pipeline.advance(Assembling).unwrap();

        assert_eq!(pipeline.fail(), Assembling);
        assert_eq!(pipeline.state(), Failed);
        assert_eq!(pipeline.failed_at(), Some(Assembling));

        // 終端状態からは遷移しない
        assert_eq!(pipeline.fail(), Assembling);
        assert!(pipeline.advance(Uploading).is_err());
        assert_eq!(pipeline.trail().last(), Some(&Failed));
    }

    #[test]
    fn test_done_is_terminal() {
        let mut pipeline = Pipeline::new();
        pipeline.advance(Validating).unwrap();
        pipeline.advance(Assembling).unwrap();
        pipeline.advance(Done).unwrap();

        assert!(pipeline.advance(Failed).is_err());
        assert_eq!(pipeline.fail(), Done);
        assert_eq!(pipeline.state(), Done);
    }
}
