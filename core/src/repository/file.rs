use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::school::SchoolState;
use crate::repository::traits::StateRepository;

pub const SCHOOL_NAME_FILE: &str = "school_name.json";
pub const ACADEMIC_YEAR_FILE: &str = "academic_year.json";
pub const ENTITIES_FILE: &str = "entities.json";
pub const STUDENTS_FILE: &str = "students.json";
pub const TIME_SLOTS_FILE: &str = "time_slots.json";
pub const ATTENDANCE_FILE: &str = "attendance.json";

/// Stores each part of the state in its own JSON file under one directory.
#[derive(Clone)]
pub struct FileStateRepository {
    dir: PathBuf,
}

impl FileStateRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Could not create data directory {}", dir.display()))?;
        Ok(FileStateRepository { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_key<T: DeserializeOwned>(&self, file_name: &str) -> Option<T> {
        let path = self.dir.join(file_name);
        if !path.exists() {
            debug!(file = file_name, "no stored value, using default");
            return None;
        }
        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from));
        match parsed {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(file = file_name, error = %e, "stored value unreadable, using default");
                None
            }
        }
    }

    fn write_key<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file_name);
        let file = File::create(&path)
            .with_context(|| format!("Could not write {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        Ok(())
    }
}

impl StateRepository for FileStateRepository {
    fn load(&self) -> Result<SchoolState> {
        let defaults = SchoolState::default();
        Ok(SchoolState {
            school_name: self.read_key(SCHOOL_NAME_FILE).unwrap_or(defaults.school_name),
            academic_year: self.read_key(ACADEMIC_YEAR_FILE).unwrap_or(defaults.academic_year),
            entities: self.read_key(ENTITIES_FILE).unwrap_or(defaults.entities),
            students: self.read_key(STUDENTS_FILE).unwrap_or(defaults.students),
            time_slots: self.read_key(TIME_SLOTS_FILE).unwrap_or(defaults.time_slots),
            attendance_records: self.read_key(ATTENDANCE_FILE).unwrap_or(defaults.attendance_records),
        })
    }

    fn save(&self, state: &SchoolState) -> Result<()> {
        self.write_key(SCHOOL_NAME_FILE, &state.school_name)?;
        self.write_key(ACADEMIC_YEAR_FILE, &state.academic_year)?;
        self.write_key(ENTITIES_FILE, &state.entities)?;
        self.write_key(STUDENTS_FILE, &state.students)?;
        self.write_key(TIME_SLOTS_FILE, &state.time_slots)?;
        self.write_key(ATTENDANCE_FILE, &state.attendance_records)?;
        Ok(())
    }
}
