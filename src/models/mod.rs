pub mod loaders;
pub mod question;
pub mod test;

pub use loaders::{load_manifest, ManifestModule, UploadManifest};
pub use question::{ParsedRow, Question, QuestionType, RawRow};
pub use test::{section_id, MathSectionPatch, Module, NewTest, NewTestQuestion, UploadOutcome};
