use crate::model::school::SchoolState;
use anyhow::Result;

pub trait StateRepository {
    /// Loads the stored state. Keys that are missing or unreadable fall back
    /// to their defaults independently of each other.
    fn load(&self) -> Result<SchoolState>;
    fn save(&self, state: &SchoolState) -> Result<()>;
}
