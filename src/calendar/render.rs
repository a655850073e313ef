//! Terminal views of the calendar rendered with Handlebars. Cell text
//! is prepared in Rust; the templates only lay it out.

use std::fmt;

use anyhow::Result;
use handlebars::{Handlebars, handlebars_helper, no_escape};
use serde::Serialize;

use super::editor::{EditMode, SlotEditor, SlotState};
use super::grid::WeekGrid;
use super::summary::SessionCount;
use super::week::{day_label, week_label};
use crate::appointments::Appointment;

// Left-align `s` in a column of `width` characters, cutting it short
// with an ellipsis when it doesn't fit.
handlebars_helper!(pad: |s: str, width: u64| fit(s, width as usize));
handlebars_helper!(plural: |n: u64, word: str| if n == 1 {
    word.to_string()
} else {
    format!("{}s", word)
});

#[derive(Debug)]
pub enum View {
    Week,
    Summary,
    Draft,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const WEEK_VIEW: &str = r#"{{label}}
{{pad "" 6}}{{#each days}}| {{pad this 22}}{{/each}}
{{#each rows}}
{{hour}} {{#each cells}}| {{pad this 22}}{{/each}}
{{/each}}"#;

const SUMMARY_VIEW: &str = r#"Present sessions
{{#each sessions}}
  {{pad display_name 32}} {{count}} {{plural count "session"}}
{{else}}
  No present sessions recorded yet.
{{/each}}"#;

const DRAFT_VIEW: &str = r"{{action}} {{key}}
  first name: {{first_name}}
  last name:  {{last_name}}
  status:     {{status}}";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(no_escape);
    registry.register_helper("pad", Box::new(pad));
    registry.register_helper("plural", Box::new(plural));
    registry
        .register_template_string(&View::Week.to_string(), WEEK_VIEW)
        .expect("Failed to register template");
    registry
        .register_template_string(&View::Summary.to_string(), SUMMARY_VIEW)
        .expect("Failed to register template");
    registry
        .register_template_string(&View::Draft.to_string(), DRAFT_VIEW)
        .expect("Failed to register template");
    registry
}

fn fit(s: &str, width: usize) -> String {
    let count = s.chars().count();
    if count <= width {
        format!("{}{}", s, " ".repeat(width - count))
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[derive(Serialize)]
struct WeekData {
    label: String,
    days: Vec<String>,
    rows: Vec<RowData>,
}

#[derive(Serialize)]
struct RowData {
    hour: String,
    cells: Vec<String>,
}

#[derive(Serialize)]
struct SummaryData<'a> {
    sessions: &'a [SessionCount],
}

#[derive(Serialize)]
struct DraftData<'a> {
    action: &'static str,
    key: String,
    first_name: &'a str,
    last_name: &'a str,
    status: &'static str,
}

fn cell_text(state: SlotState, appointment: Option<&Appointment>) -> String {
    match (state, appointment) {
        (SlotState::Editing, _) => String::from("[editing]"),
        (_, Some(appt)) => format!("{} ({})", appt.display_name(), appt.status.label()),
        _ => String::from("·"),
    }
}

pub fn render_week(registry: &Handlebars, grid: &WeekGrid) -> Result<String> {
    let days = grid
        .dates
        .iter()
        .enumerate()
        .map(|(i, date)| {
            format!(
                "{} {}",
                day_label(i).unwrap_or_default(),
                date.format("%-d %b")
            )
        })
        .collect();
    let rows = grid
        .rows
        .iter()
        .map(|row| RowData {
            hour: row.hour.format("%H:%M").to_string(),
            cells: row
                .cells
                .iter()
                .map(|cell| cell_text(cell.state, cell.appointment))
                .collect(),
        })
        .collect();
    let data = WeekData {
        label: week_label(grid.week_start),
        days,
        rows,
    };
    Ok(registry.render(&View::Week.to_string(), &data)?)
}

pub fn render_summary(registry: &Handlebars, sessions: &[SessionCount]) -> Result<String> {
    Ok(registry.render(&View::Summary.to_string(), &SummaryData { sessions })?)
}

/// The open draft, or `None` when no slot is being edited.
pub fn render_draft(registry: &Handlebars, editor: &SlotEditor) -> Result<Option<String>> {
    let (Some(key), Some(mode), Some(draft)) = (editor.editing(), editor.mode(), editor.draft())
    else {
        return Ok(None);
    };
    let data = DraftData {
        action: match mode {
            EditMode::Add => "Adding",
            EditMode::Edit => "Editing",
        },
        key: key.to_string(),
        first_name: &draft.first_name,
        last_name: &draft.last_name,
        status: draft.status.label(),
    };
    Ok(Some(registry.render(&View::Draft.to_string(), &data)?))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::appointments::{AppointmentMap, SlotKey, Status};

    #[test]
    fn it_pads_and_truncates_cells() {
        assert_eq!(fit("Jean", 6), "Jean  ");
        assert_eq!(fit("Jean-Baptiste", 6), "Jean-…");
        assert_eq!(fit("Zoé", 3), "Zoé");
    }

    #[test]
    fn it_renders_a_week() {
        let mut appointments = AppointmentMap::new();
        appointments.insert(
            SlotKey::from("2025-01-07_10:00"),
            Appointment::new("Ana", "Lee", Status::Absent),
        );
        let week = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let grid = WeekGrid::build(&appointments, week, None);

        let out = render_week(&templates(), &grid).unwrap();
        assert!(out.starts_with("6 January - 10 January 2025"));
        assert!(out.contains("Monday 6 Jan"));
        assert!(out.contains("Friday 10 Jan"));
        assert!(out.contains("08:30"));
        assert!(out.contains("18:30"));
        assert!(out.contains("Ana Lee (Absent)"));
    }

    #[test]
    fn it_renders_the_summary() {
        let registry = templates();
        let sessions = vec![
            SessionCount {
                display_name: String::from("Ana Lee"),
                count: 1,
            },
            SessionCount {
                display_name: String::from("Jean Dupont"),
                count: 3,
            },
        ];
        let out = render_summary(&registry, &sessions).unwrap();
        assert!(out.contains("1 session\n"));
        assert!(out.contains("3 sessions"));

        let empty = render_summary(&registry, &[]).unwrap();
        assert!(empty.contains("No present sessions recorded yet."));
    }

    #[test]
    fn it_renders_the_open_draft() {
        let mut appointments = AppointmentMap::new();
        let key = SlotKey::from("2025-01-07_10:00");
        appointments.insert(key.clone(), Appointment::new("Ana", "Lee", Status::Absent));

        let registry = templates();
        let mut editor = SlotEditor::default();
        assert_eq!(render_draft(&registry, &editor).unwrap(), None);

        editor.begin_edit(&appointments, key).unwrap();
        let out = render_draft(&registry, &editor).unwrap().unwrap();
        assert!(out.starts_with("Editing 2025-01-07_10:00"));
        assert!(out.contains("Ana"));
        assert!(out.contains("Absent"));
    }
}
