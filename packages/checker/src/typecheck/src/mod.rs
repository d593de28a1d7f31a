pub mod adapter;
pub mod capability;

pub use adapter::TypeCheckerAdapter;
pub use capability::TypeCheckCapability;
