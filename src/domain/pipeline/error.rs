use super::model::PipelineReport;
use crate::domain::assembly::AssemblyError;
use crate::domain::segment::SegmentationError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("document is empty")]
    EmptyDocument,
    #[error("segmentation failed: {0}")]
    Segmentation(#[from] SegmentationError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

impl PipelineError {
    /// Report of a run that got as far as assembly without producing audio
    pub fn report(&self) -> Option<&PipelineReport> {
        match self {
            PipelineError::Assembly(AssemblyError::NoAudioProduced { report }) => Some(report),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::InvalidConfig(_)
            | PipelineError::EmptyDocument
            | PipelineError::Segmentation(_)
            | PipelineError::Assembly(AssemblyError::SilenceTooLong(_)) => 2,
            PipelineError::Assembly(AssemblyError::NoAudioProduced { report })
                if report.cancelled =>
            {
                130
            }
            PipelineError::Assembly(_) => 1,
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Pipeline(err)
    }
}
