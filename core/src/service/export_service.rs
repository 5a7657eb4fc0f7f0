use crate::model::attendance::AttendanceRecord;
use crate::model::student::Student;
use crate::service::report_service::{DailyMatrix, SubjectReport, Tally};

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn plain(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        quoted(value)
    } else {
        value.to_string()
    }
}

fn push_row(out: &mut String, cells: Vec<String>) {
    out.push_str(&cells.join(","));
    out.push('\n');
}

/// `Student Name,Roll Number,Period 1..N`; unmarked cells are `N/A`.
pub fn daily_csv(matrix: &DailyMatrix<'_>) -> String {
    let mut out = String::new();
    let mut header = vec!["Student Name".to_string(), "Roll Number".to_string()];
    header.extend(matrix.periods.iter().map(|p| format!("Period {}", p)));
    push_row(&mut out, header);

    for row in &matrix.rows {
        let mut cells = vec![quoted(&row.student.name), plain(&row.student.roll_number)];
        cells.extend(matrix.periods.iter().map(|period| {
            row.statuses
                .get(period)
                .map(|status| status.as_str().to_string())
                .unwrap_or_else(|| "N/A".to_string())
        }));
        push_row(&mut out, cells);
    }
    out
}

fn percent_cell(tally: &Tally) -> String {
    tally
        .percentage()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "0%".to_string())
}

/// `Student Name,Roll Number,<subjects...>,Overall %`.
pub fn subject_csv(report: &SubjectReport<'_>) -> String {
    let mut out = String::new();
    let mut header = vec!["Student Name".to_string(), "Roll Number".to_string()];
    header.extend(report.subjects.iter().map(|s| plain(s)));
    header.push("Overall %".to_string());
    push_row(&mut out, header);

    for rollup in &report.students {
        let mut cells = vec![quoted(&rollup.student.name), plain(&rollup.student.roll_number)];
        cells.extend(rollup.subjects.iter().map(percent_cell));
        cells.push(percent_cell(&rollup.overall));
        push_row(&mut out, cells);
    }
    out
}

/// The register of a single period, one line per student.
pub fn register_csv(students: &[&Student], register: &[AttendanceRecord], subject: &str) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        ["Student Name", "Roll Number", "Status", "Date", "Period", "Subject"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
    );

    for student in students {
        let Some(record) = register.iter().find(|r| r.student_id == student.id) else {
            continue;
        };
        push_row(
            &mut out,
            vec![
                quoted(&student.name),
                plain(&student.roll_number),
                record.status.as_str().to_string(),
                record.date.format("%Y-%m-%d").to_string(),
                format!("Period {}", record.period),
                quoted(subject),
            ],
        );
    }
    out
}
