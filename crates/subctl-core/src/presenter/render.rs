//! Pure text rendering for the agent table and inspection view.
//!
//! Every function returns a finished `String`, so a cycle is written to the
//! terminal in one piece. Padding is measured with `console` so styled cells
//! stay aligned.

use chrono::Local;
use console::{measure_text_width, pad_str, style, Alignment, Style};

use crate::domain::{AgentEvent, AgentRecord, Snapshot};

pub const TABLE_TITLE: &str = "Sub-Agent Status";

/// Tickets shown per row; the rest are dropped without a marker.
pub const MAX_TICKETS_SHOWN: usize = 3;

const COLUMN_GAP: &str = " │ ";

/// Severity band of a package-compliance fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceBand {
    /// Below 80%.
    Severe,
    /// Below 95%.
    Warning,
    Neutral,
}

impl ComplianceBand {
    pub fn of(compliance: f64) -> Self {
        if compliance < 0.8 {
            ComplianceBand::Severe
        } else if compliance < 0.95 {
            ComplianceBand::Warning
        } else {
            ComplianceBand::Neutral
        }
    }

    fn style(self) -> Style {
        match self {
            ComplianceBand::Severe => Style::new().red(),
            ComplianceBand::Warning => Style::new().yellow(),
            ComplianceBand::Neutral => Style::new(),
        }
    }
}

/// Display treatment of a status string. Unknown statuses are neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Working,
    Failing,
    Completed,
    Neutral,
}

impl StatusTone {
    pub fn of(status: &str) -> Self {
        match status {
            "working" => StatusTone::Working,
            "stalled" | "error" => StatusTone::Failing,
            "completed" => StatusTone::Completed,
            _ => StatusTone::Neutral,
        }
    }

    fn style(self) -> Style {
        match self {
            StatusTone::Working => Style::new().green(),
            StatusTone::Failing => Style::new().red(),
            StatusTone::Completed => Style::new().blue(),
            StatusTone::Neutral => Style::new().white(),
        }
    }
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `0.973` -> `"97.3%"`.
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

pub fn tickets_cell(tickets: &[String]) -> String {
    tickets
        .iter()
        .take(MAX_TICKETS_SHOWN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

struct Column {
    name: &'static str,
    align: Alignment,
}

const COLUMNS: [Column; 6] = [
    Column {
        name: "Agent",
        align: Alignment::Left,
    },
    Column {
        name: "Status",
        align: Alignment::Left,
    },
    Column {
        name: "Tokens",
        align: Alignment::Right,
    },
    Column {
        name: "Package Compliance",
        align: Alignment::Right,
    },
    Column {
        name: "Tickets",
        align: Alignment::Left,
    },
    Column {
        name: "Last Update",
        align: Alignment::Left,
    },
];

struct Cell {
    text: String,
    style: Style,
}

fn row(record: &AgentRecord) -> [Cell; 6] {
    [
        Cell {
            text: record.label.clone(),
            style: Style::new().cyan(),
        },
        Cell {
            text: record.status.clone(),
            style: StatusTone::of(&record.status).style(),
        },
        Cell {
            text: group_thousands(record.total_tokens),
            style: Style::new().green(),
        },
        Cell {
            text: percent(record.package_compliance),
            style: ComplianceBand::of(record.package_compliance).style(),
        },
        Cell {
            text: tickets_cell(&record.assigned_tickets),
            style: Style::new().blue(),
        },
        Cell {
            text: record
                .last_update
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string(),
            style: Style::new().dim(),
        },
    ]
}

fn join_line(cells: impl Iterator<Item = String>) -> String {
    cells.collect::<Vec<_>>().join(COLUMN_GAP)
}

/// Render `snapshot` as a table, rows in snapshot order.
pub fn render_table(snapshot: &Snapshot) -> String {
    let rows: Vec<[Cell; 6]> = snapshot.iter().map(row).collect();

    let mut widths = COLUMNS.map(|c| measure_text_width(c.name));
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(measure_text_width(&cell.text));
        }
    }
    let total = widths.iter().sum::<usize>() + COLUMN_GAP.chars().count() * (widths.len() - 1);

    let mut out = String::new();
    out.push_str(&pad_str(
        &style(TABLE_TITLE).italic().to_string(),
        total,
        Alignment::Center,
        None,
    ));
    out.push('\n');

    out.push_str(&join_line(COLUMNS.iter().zip(widths).map(|(c, w)| {
        pad_str(&style(c.name).bold().to_string(), w, c.align, None).into_owned()
    })));
    out.push('\n');
    out.push_str(&style("─".repeat(total)).dim().to_string());
    out.push('\n');

    for cells in &rows {
        out.push_str(&join_line(cells.iter().zip(&COLUMNS).zip(widths).map(
            |((cell, column), width)| {
                let styled = cell.style.apply_to(&cell.text).to_string();
                pad_str(&styled, width, column.align, None).into_owned()
            },
        )));
        out.push('\n');
    }
    out
}

/// Notice printed instead of an empty table.
pub fn render_empty_notice(include_stale: bool) -> String {
    if include_stale {
        format!("{}\n", style("No agent data found in store").yellow())
    } else {
        format!(
            "{}\n{}\n",
            style("No active agents found").yellow(),
            style("Use --stale to see historical data").dim()
        )
    }
}

/// Identity block shown for every inspected agent.
pub fn render_identity(record: &AgentRecord) -> String {
    format!(
        "{}\nStatus: {}\nTokens: {}\nPackage Compliance: {}\nLast Update: {}\n",
        style(format!("Agent: {}", record.label)).bold(),
        record.status,
        group_thousands(record.total_tokens),
        percent(record.package_compliance),
        record
            .last_update
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S"),
    )
}

pub fn render_section_header(title: &str) -> String {
    format!("\n{}\n", style(format!("--- {title} ---")).dim())
}

/// One event-log line: time of day, type, compact payload.
pub fn render_event(event: &AgentEvent) -> String {
    let mut line = format!(
        "{}  {}",
        style(event.timestamp.with_timezone(&Local).format("%H:%M:%S")).dim(),
        event.event_type
    );
    if !event.data.is_empty() {
        line.push_str("  ");
        line.push_str(&serde_json::Value::Object(event.data.clone()).to_string());
    }
    line.push('\n');
    line
}
