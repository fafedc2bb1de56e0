pub mod config;
pub mod error;
pub mod labels;
pub mod plan;
pub mod sections;
pub mod workflow;

pub use config::{
    Author, Language, Pages, RepositoryDeclaration, Settings, WorkflowFlags,
};
pub use error::AppError;
pub use labels::{Label, merge_catalogs};
pub use plan::{SyncPlan, SyncStep};
pub use sections::{rewrite_sections, section_template};
pub use workflow::{
    MatrixEntry, RequiredCheck, build_matrix, code_scanning, required_checks, workflow_files,
};
