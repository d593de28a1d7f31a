pub mod json;
pub mod options;
pub mod project;

pub use json::strip_json_comments;
pub use options::CheckerOptions;
pub use project::ProjectConfiguration;
