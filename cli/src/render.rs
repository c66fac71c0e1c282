//! Plain-text rendering of records and of a `ResourcePage`.

use std::io::{self, Write};
use std::time::Instant;

use crm_core::{FieldKind, FormMode, FormState, ListDisplay, PageSize, Record, Resource, ResourcePage, ViewMode};

/// Cell text is cut to this many characters.
const MAX_CELL: usize = 24;

/// Column headings: `id` then every editable field.
pub fn columns(resource: Resource) -> Vec<&'static str> {
    std::iter::once("id")
        .chain(resource.fields().iter().map(|f| f.name))
        .collect()
}

fn cell(record: &Record, column: &str) -> String {
    let text = record.display_value(column);
    if text.chars().count() > MAX_CELL {
        let cut: String = text.chars().take(MAX_CELL - 1).collect();
        format!("{cut}…")
    } else {
        text
    }
}

/// Fixed-width table, one row per record. `first_row` numbers the rows so
/// `edit N` / `delete N` can refer to them.
pub fn table(out: &mut impl Write, resource: Resource, records: &[Record], first_row: usize) -> io::Result<()> {
    let columns = columns(resource);
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| columns.iter().map(|c| cell(r, c)).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    write!(out, "{:>4}", "#")?;
    for (c, w) in columns.iter().zip(&widths) {
        write!(out, "  {c:<w$}")?;
    }
    writeln!(out)?;
    for (n, row) in rows.iter().enumerate() {
        write!(out, "{:>4}", first_row + n)?;
        for (value, w) in row.iter().zip(&widths) {
            write!(out, "  {value:<w$}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// One record as `field: value` lines, `id` first.
pub fn record(out: &mut impl Write, resource: Resource, record: &Record) -> io::Result<()> {
    for column in columns(resource) {
        writeln!(out, "{column}: {}", record.display_value(column))?;
    }
    let known = columns(resource);
    for (key, _) in record.iter().filter(|(k, _)| !known.contains(&k.as_str())) {
        writeln!(out, "{key}: {}", record.display_value(key))?;
    }
    Ok(())
}

fn pager(out: &mut impl Write, page: &ResourcePage) -> io::Result<()> {
    let sizes: Vec<String> = PageSize::OPTIONS
        .iter()
        .map(|s| {
            if *s == page.page_size() {
                format!("[{s}]")
            } else {
                s.to_string()
            }
        })
        .collect();
    writeln!(
        out,
        "Page {} of {} · {} total · rows per page: {}",
        page.page(),
        page.total_pages().max(1),
        page.items().len(),
        sizes.join(" ")
    )
}

/// The whole page as the browser shows it after each command.
pub fn page(out: &mut impl Write, page: &ResourcePage, now: Instant) -> io::Result<()> {
    let resource = page.resource();
    if let Some(banner) = page.success_banner(now) {
        writeln!(out, "✔ {banner}")?;
    }

    match page.view_mode() {
        ViewMode::List => {
            writeln!(out, "== {} ==", title_plural(resource))?;
            if let Some(message) = page.error().filter(|_| !page.items().is_empty()) {
                writeln!(out, "! {message}")?;
            }
            match page.list_display() {
                ListDisplay::LoginRequired(message) => writeln!(out, "{message}")?,
                ListDisplay::Loading => writeln!(out, "Loading {}...", resource.plural())?,
                ListDisplay::Failed(message) => writeln!(out, "! {message}")?,
                ListDisplay::Empty => writeln!(out, "No {} found.", resource.plural())?,
                ListDisplay::Items(items) => {
                    let first = (page.page() - 1) * page.rows_per_page() + 1;
                    table(out, resource, items, first)?;
                    pager(out, page)?;
                }
            }
        }
        ViewMode::Add | ViewMode::Edit => {
            if let Some(form) = page.form() {
                let heading = match form.mode() {
                    FormMode::Add => format!("Add {}", resource.title()),
                    FormMode::Edit { id } => format!("Edit {} #{id}", resource.title()),
                };
                writeln!(out, "== {heading} ==")?;
                if let Some(message) = &form.error {
                    writeln!(out, "! {message}")?;
                }
                form_fields(out, form)?;
            }
        }
    }

    if let Some(target) = page.delete_target() {
        let label = target
            .id()
            .map(|id| format!(" #{id}"))
            .unwrap_or_default();
        writeln!(
            out,
            "Delete {}{label}? This action cannot be undone. (yes/no)",
            resource.singular()
        )?;
    }
    Ok(())
}

/// Field values, each relation followed by the records it can point at.
fn form_fields(out: &mut impl Write, form: &FormState) -> io::Result<()> {
    for field in form.resource().fields() {
        writeln!(out, "  {}: {}", field.name, form.values().display_value(field.name))?;
        if let FieldKind::Relation { .. } = field.kind {
            let choices: Vec<String> = form
                .relation_options(field.name)
                .iter()
                .map(|o| format!("{} {}", o.id, o.label))
                .collect();
            if choices.is_empty() {
                writeln!(out, "    choices: none")?;
            } else {
                writeln!(out, "    choices: {}", choices.join(", "))?;
            }
        }
    }
    Ok(())
}

fn title_plural(resource: Resource) -> String {
    let plural = resource.plural();
    let mut chars = plural.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
