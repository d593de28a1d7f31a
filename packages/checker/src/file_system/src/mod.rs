pub mod checksum;
pub mod memory_file_system;
pub mod native_file_system;
pub mod types;
pub mod util;

pub use checksum::content_fingerprint;
pub use memory_file_system::MemoryFileSystem;
pub use native_file_system::NativeFileSystem;
pub use types::FileSystem;
pub use util::{dirname, is_absolute, join, normalize_path};
