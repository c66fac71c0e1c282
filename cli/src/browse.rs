//! Line-driven driver for one `ResourcePage`.
//!
//! Reads one command per line, applies it to the page and re-renders. Rows
//! are addressed by the number shown in the first column, which counts from
//! the start of the list rather than the current page.

use std::io::{BufRead, Write};
use std::str::FromStr;
use std::time::Instant;

use crm_core::{CrmApi, PageSize, ResourcePage, Transport, ViewMode};
use tracing::debug;

use crate::error::CliError;
use crate::render;

const HELP: &str = "\
commands:
  next | prev | page N | size 5|10|20|all | refresh
  add | edit N | set FIELD VALUE | save | cancel
  delete N | yes | no
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    Page(usize),
    Size(PageSize),
    Refresh,
    Add,
    Edit(usize),
    Set { field: String, value: String },
    Save,
    Cancel,
    Delete(usize),
    Yes,
    No,
    Help,
    Quit,
}

fn row_number(arg: Option<&str>, usage: &str) -> Result<usize, String> {
    arg.and_then(|n| n.parse().ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| format!("usage: {usage}"))
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let arg = (!rest.is_empty()).then_some(rest);
        match word.to_ascii_lowercase().as_str() {
            "next" | "n" => Ok(Command::Next),
            "prev" | "p" => Ok(Command::Prev),
            "page" => row_number(arg, "page N").map(Command::Page),
            "size" => rest.parse::<PageSize>().map(Command::Size).map_err(|e| e.to_string()),
            "refresh" | "r" => Ok(Command::Refresh),
            "add" => Ok(Command::Add),
            "edit" => row_number(arg, "edit N").map(Command::Edit),
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if field.is_empty() {
                    return Err("usage: set FIELD VALUE".to_string());
                }
                Ok(Command::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                })
            }
            "save" => Ok(Command::Save),
            "cancel" => Ok(Command::Cancel),
            "delete" | "del" => row_number(arg, "delete N").map(Command::Delete),
            "yes" | "y" => Ok(Command::Yes),
            "no" => Ok(Command::No),
            "help" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

/// Apply one command. Returns a note to print above the page, if any.
pub fn apply<T: Transport>(api: &CrmApi<T>, page: &mut ResourcePage, command: Command) -> Option<String> {
    debug!(resource = %page.resource(), ?command, "browse command");
    let in_list = page.view_mode() == ViewMode::List;
    let in_form = !in_list;
    match command {
        Command::Next if in_list => page.next_page(),
        Command::Prev if in_list => page.previous_page(),
        Command::Page(n) if in_list => page.go_to_page(n),
        Command::Size(size) if in_list => page.set_page_size(size),
        Command::Refresh if in_list => page.refresh(api),
        Command::Add if in_list => page.open_add(api),
        Command::Edit(n) if in_list => {
            let record = page.items().get(n - 1).cloned();
            if !record.is_some_and(|r| page.open_edit(api, r)) {
                return Some(format!("no editable row {n}"));
            }
        }
        Command::Delete(n) => match page.items().get(n - 1).cloned() {
            Some(record) => page.request_delete(record),
            None => return Some(format!("no row {n}")),
        },
        Command::Set { field, value } if in_form => {
            let result = match page.form_mut() {
                Some(form) => form.set(&field, &value),
                None => return Some("no form is open".to_string()),
            };
            if let Err(e) = result {
                return Some(e.to_string());
            }
        }
        Command::Save if in_form => {
            page.submit_form(api);
        }
        Command::Cancel if in_form => page.cancel_form(api),
        Command::Yes if page.is_delete_confirm_open() => {
            page.confirm_delete(api);
        }
        Command::No if page.is_delete_confirm_open() => page.cancel_delete(),
        Command::Yes | Command::No => return Some("nothing to confirm".to_string()),
        Command::Help => return Some(HELP.to_string()),
        Command::Quit => {}
        _ if in_list => return Some("that command needs an open form".to_string()),
        _ => return Some("finish or cancel the form first".to_string()),
    }
    None
}

/// Run the browser until `quit` or end of input.
pub fn run<T: Transport>(
    api: &CrmApi<T>,
    page: &mut ResourcePage,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<(), CliError> {
    render::page(&mut out, page, Instant::now())?;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let note = match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => apply(api, page, command),
            Err(message) => Some(message),
        };
        if let Some(note) = note {
            writeln!(out, "{note}")?;
        }
        render::page(&mut out, page, Instant::now())?;
        out.flush()?;
    }
    Ok(())
}
