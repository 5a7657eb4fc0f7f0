use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use timetable_core::model::import::AiImportResult;
use timetable_core::service::dashboard_service::Dashboard;
use timetable_core::service::report_service::{DailyMatrix, SubjectReport, Tally};
use timetable_core::{AttendanceRecord, Day, Entity, Student, TimeSlot};

fn styled(mut table: Table) -> Table {
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Slots")]
    slots: usize,
    #[tabled(rename = "ID")]
    id: String,
}

pub fn entities<'a>(entities: impl IntoIterator<Item = &'a Entity>) {
    let rows: Vec<EntityRow> = entities
        .into_iter()
        .map(|e| EntityRow {
            code: e.short_code.clone().unwrap_or_else(|| "-".to_string()),
            name: e.name.clone(),
            kind: e.kind.to_string(),
            slots: e.schedule.slots().count(),
            id: e.id.clone(),
        })
        .collect();
    if rows.is_empty() {
        println!("No teachers or classes found.");
        return;
    }
    println!("{}", styled(Table::new(rows)));
}

/// Weekly grid: one row per day, one column per configured period.
pub fn schedule(entity: &Entity, time_slots: &[TimeSlot]) {
    println!("\x1b[1;36m{}\x1b[0m ({}, {})", entity.name, entity.identifier(), entity.kind);

    let mut builder = Builder::default();
    let mut header = vec!["Day".to_string()];
    header.extend(time_slots.iter().map(|s| format!("P{}\n{}", s.period, s.time_range)));
    builder.push_record(header);

    for day in Day::ALL {
        let slots = entity.schedule.day(day);
        let mut row = vec![day.to_string()];
        row.extend(time_slots.iter().map(|slot| {
            match slots.and_then(|slots| slots.get(&slot.period)) {
                Some(entry) => {
                    let mut cell = entry.subject.clone();
                    if let Some(code) = &entry.teacher_or_class {
                        cell.push('\n');
                        cell.push_str(code);
                    }
                    if let Some(room) = &entry.room {
                        cell.push_str(&format!("\n@{}", room));
                    }
                    cell
                }
                None => String::new(),
            }
        }));
        builder.push_record(row);
    }
    println!("{}", styled(builder.build()));
}

#[derive(Tabled)]
struct StudentRow {
    #[tabled(rename = "Roll")]
    roll: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
}

pub fn students<'a>(students: impl IntoIterator<Item = &'a Student>) {
    let rows: Vec<StudentRow> = students
        .into_iter()
        .map(|s| StudentRow {
            roll: s.roll_number.clone(),
            name: s.name.clone(),
            id: s.id.clone(),
        })
        .collect();
    if rows.is_empty() {
        println!("No students in this class.");
        return;
    }
    println!("{}", styled(Table::new(rows)));
}

#[derive(Tabled)]
struct PeriodRow {
    #[tabled(rename = "Period")]
    period: u32,
    #[tabled(rename = "Time")]
    time: String,
}

pub fn time_slots(slots: &[TimeSlot]) {
    let rows: Vec<PeriodRow> = slots
        .iter()
        .map(|s| PeriodRow {
            period: s.period,
            time: s.time_range.clone(),
        })
        .collect();
    println!("{}", styled(Table::new(rows)));
}

#[derive(Tabled)]
struct RegisterRow {
    #[tabled(rename = "Roll")]
    roll: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn register(students: &[&Student], register: &[AttendanceRecord]) {
    let rows: Vec<RegisterRow> = students
        .iter()
        .filter_map(|s| {
            let record = register.iter().find(|r| r.student_id == s.id)?;
            Some(RegisterRow {
                roll: s.roll_number.clone(),
                name: s.name.clone(),
                status: record.status.to_string(),
            })
        })
        .collect();
    println!("{}", styled(Table::new(rows)));
}

pub fn daily(matrix: &DailyMatrix<'_>) {
    if matrix.rows.is_empty() {
        println!("No students in this class.");
        return;
    }
    let mut builder = Builder::default();
    let mut header = vec!["Roll".to_string(), "Name".to_string()];
    header.extend(matrix.periods.iter().map(|p| format!("P{}", p)));
    builder.push_record(header);

    for row in &matrix.rows {
        let mut cells = vec![row.student.roll_number.clone(), row.student.name.clone()];
        cells.extend(matrix.periods.iter().map(|period| {
            row.statuses
                .get(period)
                .map(|status| status.to_string())
                .unwrap_or_else(|| "-".to_string())
        }));
        builder.push_record(cells);
    }
    println!("{}", styled(builder.build()));
}

fn percent_cell(tally: &Tally) -> String {
    match tally.percentage() {
        Some(p) if p.is_flagged() => format!("\x1b[31m{}\x1b[0m", p),
        Some(p) => p.to_string(),
        None => "-".to_string(),
    }
}

pub fn subjects(report: &SubjectReport<'_>) {
    if report.subjects.is_empty() {
        println!("This class has no subjects on its timetable.");
        return;
    }
    let mut builder = Builder::default();
    let mut header = vec!["Roll".to_string(), "Name".to_string()];
    header.extend(report.subjects.iter().cloned());
    header.push("Overall".to_string());
    builder.push_record(header);

    for rollup in &report.students {
        let mut cells = vec![rollup.student.roll_number.clone(), rollup.student.name.clone()];
        cells.extend(rollup.subjects.iter().map(percent_cell));
        cells.push(percent_cell(&rollup.overall));
        builder.push_record(cells);
    }

    let mut footer = vec![String::new(), "Class average".to_string()];
    footer.extend(report.class_subjects.iter().map(percent_cell));
    footer.push(percent_cell(&report.class_overall));
    builder.push_record(footer);

    println!("{}", styled(builder.build()));
}

#[derive(Tabled)]
struct NowRow {
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Teacher")]
    teacher: String,
    #[tabled(rename = "Room")]
    room: String,
}

pub fn dashboard(school_name: &str, dashboard: &Dashboard<'_>) {
    println!("\x1b[1;36m{}\x1b[0m", school_name);
    match dashboard.day {
        Some(day) => println!("Today: {}", day),
        None => println!("No school today."),
    }
    match dashboard.current {
        Some(slot) => println!("Current: Period {} ({})", slot.period, slot.time_range),
        None => println!("Current: no period in progress"),
    }
    if let Some(slot) = dashboard.next {
        println!("Next:    Period {} ({})", slot.period, slot.time_range);
    }

    if dashboard.classes.is_empty() {
        return;
    }
    let rows: Vec<NowRow> = dashboard
        .classes
        .iter()
        .map(|c| NowRow {
            class: c.class.name.clone(),
            subject: c.entry.map(|e| e.subject.clone()).unwrap_or_else(|| "Free".to_string()),
            teacher: c.teacher.clone(),
            room: c.entry.and_then(|e| e.room.clone()).unwrap_or_default(),
        })
        .collect();
    println!("{}", styled(Table::new(rows)));
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Slots")]
    slots: usize,
}

pub fn import_review(result: &AiImportResult, unresolved: &[&str]) {
    println!("Detected layout: {:?}", result.detected_type);
    let rows: Vec<ProfileRow> = result
        .profiles
        .iter()
        .map(|p| ProfileRow {
            name: p.name.clone(),
            slots: p.schedule.slots().count(),
        })
        .collect();
    println!("{}", styled(Table::new(rows)));
    if !unresolved.is_empty() {
        println!(
            "Unknown {} codes: {}",
            result.detected_type.secondary_kind(),
            unresolved.join(", ")
        );
    }
}
