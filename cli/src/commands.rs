//! One function per `crm` subcommand.
//!
//! Each command runs against a `CrmApi`, writes its human-readable result to
//! `out` and turns a failed envelope into `CliError::Api`.

use std::io::Write;

use crm_core::{coerce_field, ApiError, ApiResult, CrmApi, FormState, PageSize, Record, Resource, ResourcePage, Transport};
use tracing::{info, warn};

use crate::error::CliError;
use crate::render;
use crate::token_store::TokenStore;

/// Options for `crm list`.
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub page: usize,
    pub page_size: PageSize,
    pub json: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
            json: false,
        }
    }
}

fn check<T>(result: ApiResult<T>) -> Result<(Option<String>, Option<T>), CliError> {
    if result.success {
        Ok((result.message, result.data))
    } else {
        Err(CliError::Api(result.message().to_string()))
    }
}

/// Split `FIELD=VALUE` arguments.
pub fn parse_assignments(args: &[String]) -> Result<Vec<(&str, &str)>, CliError> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value)),
            _ => Err(CliError::Assignment(arg.clone())),
        })
        .collect()
}

/// A full add-form payload: every field at its default, then the
/// assignments on top.
pub fn create_payload(resource: Resource, args: &[String]) -> Result<Record, CliError> {
    let mut form = FormState::new_add(resource);
    for (field, value) in parse_assignments(args)? {
        form.set(field, value)?;
    }
    Ok(form.payload())
}

/// Only the assigned fields, coerced; the update merges them over the
/// stored record.
pub fn update_payload(resource: Resource, args: &[String]) -> Result<Record, CliError> {
    let mut partial = Record::new();
    for (field, value) in parse_assignments(args)? {
        partial.insert(field, coerce_field(resource, field, value)?);
    }
    Ok(partial)
}

pub fn login<T: Transport>(
    api: &CrmApi<T>,
    store: &TokenStore,
    email: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let (message, token) = check(api.login(email, password))?;
    let token = token.ok_or_else(|| CliError::Api("Login failed: no token returned.".to_string()))?;
    store.save(&token)?;
    info!(email, "logged in");
    writeln!(out, "{}", message.as_deref().unwrap_or("Login successful!"))?;
    Ok(())
}

pub fn register<T: Transport>(
    api: &CrmApi<T>,
    email: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let (message, _) = check(api.register(email, password))?;
    writeln!(out, "{}", message.as_deref().unwrap_or("Registration successful!"))?;
    Ok(())
}

pub fn logout(store: &TokenStore, out: &mut impl Write) -> Result<(), CliError> {
    if store.clear()? {
        writeln!(out, "Logged out.")?;
    } else {
        writeln!(out, "Not logged in.")?;
    }
    Ok(())
}

/// Validate the stored token. A token the server rejects is removed; one
/// that could not be checked is kept.
pub fn validate<T: Transport>(api: &CrmApi<T>, store: &TokenStore, out: &mut impl Write) -> Result<(), CliError> {
    let token = store.require()?;
    let outcome = match api.check_token(Some(&token)) {
        Ok(outcome) => outcome,
        Err(err @ ApiError::Server { .. }) => {
            store.clear()?;
            info!(status = ?err.status(), "stored token rejected and removed");
            return Err(CliError::Api(err.to_string()));
        }
        Err(err) => {
            warn!(error = %err, "token could not be checked; keeping it");
            return Err(CliError::Api(err.to_string()));
        }
    };
    match (&outcome.message, &outcome.data) {
        (_, Some(data)) => writeln!(out, "Token is valid: {data}")?,
        (Some(message), None) => writeln!(out, "{message}")?,
        (None, None) => writeln!(out, "Token is valid.")?,
    }
    Ok(())
}

pub fn resources(out: &mut impl Write) -> Result<(), CliError> {
    for resource in Resource::ALL {
        let fields: Vec<String> = resource
            .fields()
            .iter()
            .map(|f| format!("{}:{}", f.name, f.kind.name()))
            .collect();
        writeln!(out, "{:<16} {}", resource.segment(), fields.join(" "))?;
    }
    Ok(())
}

pub fn list<T: Transport>(
    api: &CrmApi<T>,
    token: &str,
    resource: Resource,
    options: ListOptions,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut page = ResourcePage::open(api, resource, Some(token.to_string()));
    if let Some(error) = page.error() {
        return Err(CliError::Api(error.to_string()));
    }
    page.set_page_size(options.page_size);
    page.go_to_page(options.page);

    if options.json {
        serde_json::to_writer_pretty(&mut *out, page.visible_items())?;
        writeln!(out)?;
    } else if page.items().is_empty() {
        writeln!(out, "No {} found.", resource.plural())?;
    } else {
        let first = (page.page() - 1) * page.rows_per_page() + 1;
        render::table(out, resource, page.visible_items(), first)?;
        writeln!(
            out,
            "Page {} of {} · {} total",
            page.page(),
            page.total_pages(),
            page.items().len()
        )?;
    }
    Ok(())
}

pub fn get<T: Transport>(
    api: &CrmApi<T>,
    token: &str,
    resource: Resource,
    id: i64,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let (_, record) = check(api.get_by_id(Some(token), resource, id))?;
    let record = record.unwrap_or_default();
    if json {
        serde_json::to_writer_pretty(&mut *out, &record)?;
        writeln!(out)?;
    } else {
        render::record(out, resource, &record)?;
    }
    Ok(())
}

fn report_write(out: &mut impl Write, resource: Resource, message: Option<String>, record: Option<Record>) -> Result<(), CliError> {
    if let Some(message) = message {
        writeln!(out, "{message}")?;
    }
    if let Some(record) = record {
        render::record(out, resource, &record)?;
    }
    Ok(())
}

pub fn create<T: Transport>(
    api: &CrmApi<T>,
    token: &str,
    resource: Resource,
    args: &[String],
    out: &mut impl Write,
) -> Result<(), CliError> {
    let payload = create_payload(resource, args)?;
    let (message, record) = check(api.create(Some(token), resource, &payload))?;
    report_write(out, resource, message, record)
}

pub fn update<T: Transport>(
    api: &CrmApi<T>,
    token: &str,
    resource: Resource,
    id: i64,
    args: &[String],
    out: &mut impl Write,
) -> Result<(), CliError> {
    let partial = update_payload(resource, args)?;
    let (message, record) = check(api.update(Some(token), resource, id, &partial))?;
    report_write(out, resource, message, record)
}

pub fn delete<T: Transport>(
    api: &CrmApi<T>,
    token: &str,
    resource: Resource,
    id: i64,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let (message, _) = check(api.delete(Some(token), resource, id))?;
    if let Some(message) = message {
        writeln!(out, "{message}")?;
    }
    Ok(())
}
