mod assistant;
mod render;

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, Timelike};
use clap::{Parser, Subcommand};
use timetable_core::config::{self, AppConfig};
use timetable_core::input::{expand_key, parse_pairs};
use timetable_core::model::time_slot::TimeSlot;
use timetable_core::resolver;
use timetable_core::service::attendance_service::{resolve_register_class, toggled_status};
use timetable_core::service::dashboard_service::dashboard;
use timetable_core::service::export_service::{daily_csv, register_csv, subject_csv};
use timetable_core::service::report_service::{daily_matrix, subject_rollup};
use timetable_core::service::schedule_service::SlotInput;
use timetable_core::service::school_service::{EntityPatch, StudentPatch};
use timetable_core::time::{parse_clock, parse_date};
use timetable_core::{
    AttendanceStatus, Day, Entity, EntityKind, FileStateRepository, SchoolService, SchoolState,
    Snapshot, Student,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "timetable")]
#[command(about = "School timetable, attendance and reports", long_about = None)]
struct Cli {
    /// Data directory (defaults to $TIMETABLE_HOME or ~/.timetable)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Edit password, required for changes to schedules and rosters
    #[arg(long, global = true)]
    password: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default configuration
    Init,
    /// Show or change the school name and academic year
    School {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        year: Option<String>,
    },
    /// Manage teachers and classes
    #[command(subcommand)]
    Entity(EntityCommand),
    /// Show the weekly timetable of a teacher or class
    Show {
        /// Id, short code or name
        entity: String,
    },
    /// Edit timetable slots
    #[command(subcommand)]
    Slot(SlotCommand),
    /// List the period times, or replace them (usage: periods 1="6:45 - 7:45" 2=...)
    Periods {
        slots: Vec<String>,
    },
    /// Manage students
    #[command(subcommand)]
    Student(StudentCommand),
    /// Take attendance for one period (usage: attend 10A 3 date:mon 04:absent 07:late)
    Attend {
        /// Class, or a teacher whose slot names the class
        entity: String,
        period: u32,
        /// Per-student overrides as roll:status (or roll:next to toggle), plus an optional date:<when>
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        /// Also write the register as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Attendance reports
    #[command(subcommand)]
    Report(ReportCommand),
    /// What is happening in school right now
    Now {
        /// Clock time as H:MM instead of the current time
        #[arg(long)]
        at: Option<String>,
        /// School day instead of today
        #[arg(long)]
        day: Option<String>,
    },
    /// Extract a timetable from a document with the AI command and merge it
    Import {
        /// PDF, image or text file; `-` reads text from stdin
        file: String,
        #[arg(long)]
        mime: Option<String>,
        /// Name an unknown code: CODE=Real Name (repeatable)
        #[arg(long = "map")]
        map: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Ask the AI assistant about the timetable
    Ask {
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Write a backup of everything to a JSON file
    Export { file: PathBuf },
    /// Restore a backup; only the parts present in the file are replaced
    Restore { file: PathBuf },
    /// Wipe all data and start over with the defaults
    Reset,
}

#[derive(Subcommand)]
enum EntityCommand {
    /// Add a teacher or class (usage: entity add teacher --code JD John Doe)
    Add {
        kind: String,
        #[arg(trailing_var_arg = true)]
        name: Vec<String>,
        #[arg(long)]
        code: Option<String>,
    },
    List {
        #[arg(long)]
        kind: Option<String>,
    },
    Edit {
        entity: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        code: Option<String>,
    },
    Delete { entity: String },
}

#[derive(Subcommand)]
enum SlotCommand {
    /// Set a slot (usage: slot set JD mon 3 math room:R1 with:10A)
    Set {
        entity: String,
        day: String,
        period: u32,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Clear a slot. The counterpart's slot is left as it is.
    Clear {
        entity: String,
        day: String,
        period: u32,
    },
}

#[derive(Subcommand)]
enum StudentCommand {
    Add {
        class: String,
        roll: String,
        #[arg(trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// Import a roster of `roll, name` lines from a file, or `-` for stdin
    Import { class: String, file: String },
    List { class: String },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        roll: Option<String>,
        #[arg(long)]
        class: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Per-period statuses of a class on one day
    Daily {
        class: String,
        #[arg(long, default_value = "today")]
        date: String,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Subject-wise attendance percentages of a class
    Subjects {
        class: String,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// Finds an entity by id, then by short code or name (teachers first).
fn find_entity<'a>(state: &'a SchoolState, key: &str) -> Result<&'a Entity> {
    state
        .entity(key)
        .or_else(|| resolver::resolve(&state.entities, key, EntityKind::Teacher))
        .or_else(|| resolver::resolve(&state.entities, key, EntityKind::Class))
        .ok_or_else(|| anyhow!("No teacher or class matches '{}'", key))
}

fn find_class<'a>(state: &'a SchoolState, key: &str) -> Result<&'a Entity> {
    state
        .entity(key)
        .filter(|e| e.kind == EntityKind::Class)
        .or_else(|| resolver::resolve(&state.entities, key, EntityKind::Class))
        .ok_or_else(|| anyhow!("No class matches '{}'", key))
}

fn require_unlocked(config: &AppConfig, password: Option<&str>) -> Result<()> {
    if config.unlocks(password) {
        Ok(())
    } else {
        bail!("Editing is locked. Pass the edit password with --password.")
    }
}

fn read_text(file: &str) -> Result<String> {
    if file == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(file).with_context(|| format!("Could not read {}", file))
}

fn write_csv(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Could not write {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

fn joined(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => config::default_data_dir()?,
    };
    debug!(data_dir = %data_dir.display(), "opening data directory");
    let repo = FileStateRepository::new(&data_dir)?;
    let config = config::load_or_init(&data_dir)?;
    let service = SchoolService::new(repo);
    let password = cli.password.as_deref();

    match cli.command {
        Commands::Init => {
            println!("Data directory: {}", data_dir.display());
            println!("Configuration:  {}", data_dir.join(config::CONFIG_FILE_NAME).display());
            if config.ai.command.is_none() {
                println!("Set ai.command in the configuration to enable import and ask.");
            }
        }
        Commands::School { name, year } => {
            if name.is_some() || year.is_some() {
                require_unlocked(&config, password)?;
                service.apply(|state| -> Result<()> {
                    if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
                        state.school_name = name.trim().to_string();
                    }
                    if let Some(year) = year.filter(|y| !y.trim().is_empty()) {
                        state.academic_year = year.trim().to_string();
                    }
                    Ok(())
                })?;
            }
            let state = service.state()?;
            println!("{} ({})", state.school_name, state.academic_year);
        }
        Commands::Entity(cmd) => entity_command(&service, &config, password, cmd)?,
        Commands::Show { entity } => {
            let state = service.state()?;
            render::schedule(find_entity(&state, &entity)?, &state.time_slots);
        }
        Commands::Slot(cmd) => {
            require_unlocked(&config, password)?;
            slot_command(&service, cmd)?;
        }
        Commands::Periods { slots } => {
            if !slots.is_empty() {
                require_unlocked(&config, password)?;
                let parsed = slots
                    .iter()
                    .map(|s| {
                        let (period, range) = s
                            .split_once('=')
                            .ok_or_else(|| anyhow!("Period must look like 1=\"6:45 - 7:45\", got '{}'", s))?;
                        let period: u32 = period
                            .trim()
                            .parse()
                            .map_err(|_| anyhow!("Invalid period number: '{}'", period))?;
                        Ok(TimeSlot::new(period, range.trim()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                service.apply(|state| state.set_time_slots(parsed))?;
            }
            render::time_slots(&service.state()?.time_slots);
        }
        Commands::Student(cmd) => student_command(&service, &config, password, cmd)?,
        Commands::Attend { entity, period, args, csv } => {
            attend(&service, &entity, period, &args, csv)?;
        }
        Commands::Report(cmd) => report_command(&service, cmd)?,
        Commands::Now { at, day } => {
            let state = service.state()?;
            let now = Local::now();
            let minutes = match at {
                Some(at) => parse_clock(&at).ok_or_else(|| anyhow!("Invalid time: '{}'", at))?,
                None => now.hour() * 60 + now.minute(),
            };
            let day = match day {
                Some(day) => Some(day.parse::<Day>()?),
                None => Day::of_date(now.date_naive()),
            };
            let view = dashboard(&state.entities, &state.time_slots, day, minutes);
            render::dashboard(&state.school_name, &view);
        }
        Commands::Import { file, mime, map, dry_run } => {
            require_unlocked(&config, password)?;
            assistant::import(&service, &config, &file, mime, &map, dry_run)?;
        }
        Commands::Ask { question } => {
            assistant::ask(&service, &config, &joined(&question))?;
        }
        Commands::Export { file } => {
            Snapshot::of(&service.state()?).write(&file)?;
            println!("Backup written to {}", file.display());
        }
        Commands::Restore { file } => {
            require_unlocked(&config, password)?;
            let snapshot = Snapshot::read(&file)?;
            service.apply(|state| -> Result<()> {
                snapshot.apply_to(state);
                Ok(())
            })?;
            println!("Restored from {}", file.display());
        }
        Commands::Reset => {
            require_unlocked(&config, password)?;
            service.apply(|state| -> Result<()> {
                state.reset();
                Ok(())
            })?;
            println!("All data reset to defaults.");
        }
    }
    Ok(())
}

fn entity_command(
    service: &SchoolService<FileStateRepository>,
    config: &AppConfig,
    password: Option<&str>,
    cmd: EntityCommand,
) -> Result<()> {
    match cmd {
        EntityCommand::Add { kind, name, code } => {
            require_unlocked(config, password)?;
            let kind: EntityKind = kind.parse()?;
            let entity = service.apply(|state| state.add_entity(&joined(&name), code.as_deref(), kind))?;
            println!("{} added: {} ({})", entity.kind, entity.name, entity.identifier());
        }
        EntityCommand::List { kind } => {
            let kind = kind.map(|k| k.parse::<EntityKind>()).transpose()?;
            let state = service.state()?;
            render::entities(
                state
                    .entities
                    .iter()
                    .filter(|e| kind.map_or(true, |k| e.kind == k)),
            );
        }
        EntityCommand::Edit { entity, name, code } => {
            require_unlocked(config, password)?;
            let id = find_entity(&service.state()?, &entity)?.id.clone();
            let patch = EntityPatch { name, short_code: code };
            service.apply(|state| state.update_entity(&id, patch))?;
            println!("Updated {}", entity);
        }
        EntityCommand::Delete { entity } => {
            require_unlocked(config, password)?;
            let id = find_entity(&service.state()?, &entity)?.id.clone();
            service.apply(|state| -> Result<()> {
                state.delete_entity(&id);
                Ok(())
            })?;
            println!("Deleted {} and its attendance records", entity);
        }
    }
    Ok(())
}

fn slot_command(service: &SchoolService<FileStateRepository>, cmd: SlotCommand) -> Result<()> {
    match cmd {
        SlotCommand::Set { entity, day, period, args } => {
            let day: Day = day.parse()?;
            let (pairs, words) = parse_pairs(&args);
            let mut input = SlotInput {
                subject: joined(&words),
                ..SlotInput::default()
            };
            for (key, value) in pairs {
                match expand_key(&key, &["room", "with"])?.as_str() {
                    "room" => input.room = Some(value),
                    _ => input.counterpart = Some(value),
                }
            }
            let id = find_entity(&service.state()?, &entity)?.id.clone();
            service.apply(|state| state.edit_slot(&id, day, period, Some(input)))?;
            let state = service.state()?;
            render::schedule(find_entity(&state, &id)?, &state.time_slots);
        }
        SlotCommand::Clear { entity, day, period } => {
            let day: Day = day.parse()?;
            let id = find_entity(&service.state()?, &entity)?.id.clone();
            service.apply(|state| state.edit_slot(&id, day, period, None))?;
            println!("Cleared {} period {} for {}", day, period, entity);
        }
    }
    Ok(())
}

fn student_command(
    service: &SchoolService<FileStateRepository>,
    config: &AppConfig,
    password: Option<&str>,
    cmd: StudentCommand,
) -> Result<()> {
    match cmd {
        StudentCommand::Add { class, roll, name } => {
            require_unlocked(config, password)?;
            let class_id = find_class(&service.state()?, &class)?.id.clone();
            let student = service.apply(|state| state.add_student(&joined(&name), &roll, &class_id))?;
            println!("Student added: {} (roll {})", student.name, student.roll_number);
        }
        StudentCommand::Import { class, file } => {
            require_unlocked(config, password)?;
            let class_id = find_class(&service.state()?, &class)?.id.clone();
            let text = read_text(&file)?;
            let imported = service.apply(|state| state.import_roster(&text, &class_id))?;
            println!("Imported {} students into {}", imported.len(), class);
        }
        StudentCommand::List { class } => {
            let state = service.state()?;
            let class = find_class(&state, &class)?;
            render::students(state.students_in(&class.id));
        }
        StudentCommand::Edit { id, name, roll, class } => {
            require_unlocked(config, password)?;
            let class_id = match class {
                Some(class) => Some(find_class(&service.state()?, &class)?.id.clone()),
                None => None,
            };
            let patch = StudentPatch {
                name,
                roll_number: roll,
                class_id,
            };
            if !service.apply(|state| state.update_student(&id, patch))? {
                bail!("No student with id '{}'", id);
            }
            println!("Updated student {}", id);
        }
        StudentCommand::Delete { id } => {
            require_unlocked(config, password)?;
            let removed = service.apply(|state| -> Result<bool> { Ok(state.delete_student(&id)) })?;
            if !removed {
                bail!("No student with id '{}'", id);
            }
            println!("Deleted student {} and their attendance records", id);
        }
    }
    Ok(())
}

fn attend(
    service: &SchoolService<FileStateRepository>,
    entity: &str,
    period: u32,
    args: &[String],
    csv: Option<PathBuf>,
) -> Result<()> {
    let state = service.state()?;
    let root = find_entity(&state, entity)?;

    let (pairs, words) = parse_pairs(args);
    if !words.is_empty() {
        println!("Warning: ignoring '{}'", words.join(" "));
    }

    let today = Local::now().date_naive();
    let mut date = today;
    // `None` toggles the stored status.
    let mut by_roll: Vec<(String, Option<AttendanceStatus>)> = Vec::new();
    for (key, value) in pairs {
        if key == "date" {
            date = parse_date(&value, today)?;
        } else if value.eq_ignore_ascii_case("next") {
            by_roll.push((key, None));
        } else {
            by_roll.push((key, Some(value.parse()?)));
        }
    }

    let day = Day::of_date(date);
    let class = match root.kind {
        EntityKind::Class => root,
        EntityKind::Teacher => {
            let day = day.ok_or_else(|| anyhow!("{} is not a school day", date))?;
            resolve_register_class(&state.entities, &root.id, day, period)
                .ok_or_else(|| anyhow!("Could not identify the class for {} period {}", day, period))?
        }
    };
    let roster: Vec<&Student> = state.students_in(&class.id).collect();
    if roster.is_empty() {
        bail!("There are no students registered in {} yet.", class.name);
    }

    let mut overrides = HashMap::new();
    for (roll, status) in by_roll {
        match roster.iter().find(|s| s.roll_number == roll) {
            Some(student) => {
                let status = status.unwrap_or_else(|| {
                    toggled_status(&state.attendance_records, &class.id, date, period, &student.id)
                });
                overrides.insert(student.id.clone(), status);
            }
            None => println!("Warning: no student with roll '{}' in {}", roll, class.name),
        }
    }

    let subject = day
        .and_then(|day| root.schedule.get(day, period))
        .map(|entry| entry.subject.clone())
        .unwrap_or_default();
    let class_id = class.id.clone();
    let register = service.apply(|state| state.take_attendance(&class_id, date, period, &overrides))?;

    println!("{} - Period {} - {} {}", class.name, period, date, subject);
    render::register(&roster, &register);
    if let Some(path) = csv {
        write_csv(&path, &register_csv(&roster, &register, &subject))?;
    }
    Ok(())
}

fn report_command(service: &SchoolService<FileStateRepository>, cmd: ReportCommand) -> Result<()> {
    let state = service.state()?;
    match cmd {
        ReportCommand::Daily { class, date, csv } => {
            let class = find_class(&state, &class)?;
            let date = parse_date(&date, Local::now().date_naive())?;
            let matrix = daily_matrix(
                &state.students,
                &state.attendance_records,
                &state.time_slots,
                &class.id,
                date,
            );
            println!("{} - {}", class.name, date);
            render::daily(&matrix);
            if let Some(path) = csv {
                write_csv(&path, &daily_csv(&matrix))?;
            }
        }
        ReportCommand::Subjects { class, csv } => {
            let class = find_class(&state, &class)?;
            let report = subject_rollup(&state.entities, &state.students, &state.attendance_records, &class.id);
            println!("{} - subject attendance", class.name);
            render::subjects(&report);
            if let Some(path) = csv {
                write_csv(&path, &subject_csv(&report))?;
            }
        }
    }
    Ok(())
}
