pub mod geometry;
pub mod knowledge;
pub mod types;

pub use geometry::{LogicalRect, PhysicalRect, ScaleFactor, SurfaceGeometry, WindowOrigin};
pub use knowledge::{
    Answer, AnswerPayload, Category, KnowledgeEntry, MatchResult, MatchTier, OptionItem,
};
pub use types::{CaptureMode, Command, FailureKind, Outcome};
