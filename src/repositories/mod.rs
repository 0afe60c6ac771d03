pub mod remote_file_repository;

pub use remote_file_repository::{GeminiFileStore, RemoteFileStore};
