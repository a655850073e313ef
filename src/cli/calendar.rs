//! Interactive weekly calendar in the terminal.
//!
//! Every command that commits a change (`submit`, `delete`) is followed
//! by a save of the whole document. Saves are awaited before the next
//! prompt, so two saves are never in flight at once.

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveTime};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::appointments::Status;
use crate::calendar::render::{render_draft, render_summary, render_week, templates};
use crate::calendar::week::parse_hour;
use crate::calendar::{CalendarSession, EditorError};
use crate::client::AppointmentsClient;

const HELP: &str = r"Commands:
  show                    redraw the current week
  next | prev | today     move between weeks
  week <YYYY-MM-DD>       jump to the week containing a date
  add <day> <HH:MM>       open an empty slot (day: 1-5 or mon..fri)
  edit <day> <HH:MM>      open a booked slot
  first <name>            set the first name of the open slot
  last <name>             set the last name of the open slot
  status <status>         present, absent, pending or cancelled
  submit | cancel         close the open slot
  delete <day> <HH:MM>    remove a booked slot
  summary                 present sessions per person
  help | quit";

#[derive(Debug, PartialEq)]
enum Input {
    Show,
    Next,
    Prev,
    Today,
    Week(NaiveDate),
    Add(usize, NaiveTime),
    Edit(usize, NaiveTime),
    Delete(usize, NaiveTime),
    First(String),
    Last(String),
    Status(Status),
    Submit,
    Cancel,
    Summary,
    Help,
    Quit,
}

impl Input {
    /// Commands that change the document and are followed by a save.
    fn commits(&self) -> bool {
        matches!(self, Input::Submit | Input::Delete(..))
    }
}

/// What to print after a command ran.
#[derive(Debug, PartialEq)]
enum Screen {
    Week,
    Draft,
    Summary,
    Help,
    Message(String),
}

fn parse_day(value: &str) -> Result<usize, String> {
    let day = match value.trim().to_lowercase().as_str() {
        "1" | "mon" | "monday" => 0,
        "2" | "tue" | "tuesday" => 1,
        "3" | "wed" | "wednesday" => 2,
        "4" | "thu" | "thursday" => 3,
        "5" | "fri" | "friday" => 4,
        other => return Err(format!("'{}' is not a weekday, use 1-5 or mon..fri", other)),
    };
    Ok(day)
}

fn parse_slot(args: &str) -> Result<(usize, NaiveTime), String> {
    let mut parts = args.split_whitespace();
    let (Some(day), Some(hour), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(String::from("expected <day> <HH:MM>"));
    };
    let day = parse_day(day)?;
    let hour = parse_hour(hour)
        .ok_or_else(|| format!("'{}' is not a slot, slots run every 30 minutes from 08:30 to 18:30", hour))?;
    Ok((day, hour))
}

fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (command, args) = line.split_once(' ').unwrap_or((line, ""));
    let args = args.trim();

    let input = match command.to_lowercase().as_str() {
        "show" | "s" => Input::Show,
        "next" | "n" => Input::Next,
        "prev" | "p" => Input::Prev,
        "today" => Input::Today,
        "week" => Input::Week(
            args.parse()
                .map_err(|_| format!("'{}' is not a date, use YYYY-MM-DD", args))?,
        ),
        "add" | "a" => {
            let (day, hour) = parse_slot(args)?;
            Input::Add(day, hour)
        }
        "edit" | "e" => {
            let (day, hour) = parse_slot(args)?;
            Input::Edit(day, hour)
        }
        "delete" | "d" => {
            let (day, hour) = parse_slot(args)?;
            Input::Delete(day, hour)
        }
        "first" => Input::First(args.to_string()),
        "last" => Input::Last(args.to_string()),
        "status" => Input::Status(args.parse().map_err(|e| format!("{}", e))?),
        "submit" | "ok" => Input::Submit,
        "cancel" => Input::Cancel,
        "summary" => Input::Summary,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(format!("unknown command '{}', type help", other)),
    };
    Ok(input)
}

fn apply(session: &mut CalendarSession, input: Input, today: NaiveDate) -> Result<Screen, EditorError> {
    let screen = match input {
        Input::Show => Screen::Week,
        Input::Next => {
            session.next_week();
            Screen::Week
        }
        Input::Prev => {
            session.previous_week();
            Screen::Week
        }
        Input::Today => {
            session.show_week_of(today);
            Screen::Week
        }
        Input::Week(date) => {
            session.show_week_of(date);
            Screen::Week
        }
        Input::Add(day, hour) => {
            let Some(key) = session.slot(day, hour) else {
                return Ok(Screen::Message(String::from("No such day")));
            };
            session.begin_add(key)?;
            Screen::Draft
        }
        Input::Edit(day, hour) => {
            let Some(key) = session.slot(day, hour) else {
                return Ok(Screen::Message(String::from("No such day")));
            };
            session.begin_edit(key)?;
            Screen::Draft
        }
        Input::Delete(day, hour) => {
            let Some(key) = session.slot(day, hour) else {
                return Ok(Screen::Message(String::from("No such day")));
            };
            let removed = session.delete(&key)?;
            Screen::Message(format!("Deleted {} from {}", removed.display_name(), key))
        }
        Input::First(name) => {
            let draft = session
                .editor_mut()
                .draft_mut()
                .ok_or(EditorError::NotEditing)?;
            draft.first_name = name;
            Screen::Draft
        }
        Input::Last(name) => {
            let draft = session
                .editor_mut()
                .draft_mut()
                .ok_or(EditorError::NotEditing)?;
            draft.last_name = name;
            Screen::Draft
        }
        Input::Status(status) => {
            let draft = session
                .editor_mut()
                .draft_mut()
                .ok_or(EditorError::NotEditing)?;
            draft.status = status;
            Screen::Draft
        }
        Input::Submit => {
            session.submit()?;
            Screen::Week
        }
        Input::Cancel => {
            session.cancel();
            Screen::Week
        }
        Input::Summary => Screen::Summary,
        Input::Help => Screen::Help,
        Input::Quit => Screen::Message(String::new()),
    };
    Ok(screen)
}

fn print_screen(session: &CalendarSession, screen: Screen) -> Result<()> {
    let registry = templates();
    match screen {
        Screen::Week => println!("{}", render_week(&registry, &session.grid())?),
        Screen::Draft => {
            if let Some(draft) = render_draft(&registry, session.editor())? {
                println!("{}", draft);
            }
        }
        Screen::Summary => println!("{}", render_summary(&registry, &session.summary())?),
        Screen::Help => println!("{}", HELP),
        Screen::Message(msg) => println!("{}", msg),
    }
    Ok(())
}

pub async fn run(week: Option<NaiveDate>, api_url: &str) -> Result<()> {
    let client = AppointmentsClient::new(api_url)?;
    let today = Local::now().date_naive();

    let mut session = CalendarSession::open(today, &client).await;
    if let Some(date) = week {
        session.show_week_of(date);
    }
    print_screen(&session, Screen::Week)?;

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("calendar> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                let input = match parse_line(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => input,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };

                let commits = input.commits();
                match apply(&mut session, input, today) {
                    Ok(screen) => print_screen(&session, screen)?,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                }

                if !commits {
                    continue;
                }
                if let Err(e) = session.flush(&client).await {
                    // Local changes are kept and go out with the next change
                    tracing::error!("Failed to save appointments: {:#}", e);
                    println!("Could not save, changes are kept locally: {}", e);
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    if session.is_dirty() {
        tracing::warn!("Leaving with changes that were not saved");
        println!("Some changes could not be saved.");
    }

    Ok(())
}
