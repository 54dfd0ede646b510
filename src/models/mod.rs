pub mod artifact;
pub mod extraction;
pub mod job;
pub mod level;
pub mod loaders;
pub mod params;
pub mod reports;
pub mod rtti;
pub mod stage;

pub use artifact::{ArtifactConsistency, ExamArtifact, Source, StudentItem, TeacherItem};
pub use extraction::{ExtractionOutput, NormalizedOutput};
pub use job::{ExamJob, RevisionStep};
pub use level::LevelProfile;
pub use loaders::{load_all_toml_files, load_toml_to_exam_job};
pub use params::{GeneratorParams, QuestionType, RttiMode};
pub use reports::{AuditReport, ChangeItem, CoConstructResult, QualityDelta, ValidationReport};
pub use rtti::{Category, RttiCounts, RttiWeights};
pub use stage::Stage;
