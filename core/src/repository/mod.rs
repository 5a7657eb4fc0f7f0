pub mod file;
pub mod snapshot;
pub mod traits;

pub use file::FileStateRepository;
pub use snapshot::Snapshot;
pub use traits::StateRepository;
