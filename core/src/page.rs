//! List/add/edit state machine for one resource, plus the delete overlay.
//!
//! # Design
//! `ResourcePage` owns its own copy of the resource's records. Every
//! successful write is followed by a full refetch; nothing is patched in
//! place. Operations that talk to the server take the `CrmApi` as an
//! argument so the page itself stays plain data.
//!
//! Fetches are split into `begin_fetch` and `finish_fetch`. Each ticket
//! carries a generation number and a result for any generation but the
//! newest is dropped, so overlapping refreshes cannot let an older response
//! overwrite a newer one.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::api::CrmApi;
use crate::envelope::ApiResult;
use crate::form::FormState;
use crate::pagination::{clamp_page, page_count, page_slice, PageSize};
use crate::resource::{FieldKind, Resource};
use crate::transport::Transport;
use crate::types::Record;

/// How long the "saved" banner stays up after a successful submit.
pub const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Add,
    Edit,
}

/// Handle for one in-flight list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
    generation: u64,
}

/// What the list view should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ListDisplay<'a> {
    /// No token: prompt to log in instead of an error banner.
    LoginRequired(String),
    Loading,
    Failed(&'a str),
    Empty,
    Items(&'a [Record]),
}

#[derive(Debug, Clone)]
pub struct ResourcePage {
    resource: Resource,
    token: Option<String>,
    items: Vec<Record>,
    view_mode: ViewMode,
    selected: Option<Record>,
    form: Option<FormState>,
    page: usize,
    page_size: PageSize,
    delete_target: Option<Record>,
    loading: bool,
    error: Option<String>,
    saved_at: Option<Instant>,
    generation: u64,
}

impl ResourcePage {
    /// A page in list mode with no token and no items.
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            token: None,
            items: Vec::new(),
            view_mode: ViewMode::List,
            selected: None,
            form: None,
            page: 1,
            page_size: PageSize::default(),
            delete_target: None,
            loading: false,
            error: None,
            saved_at: None,
            generation: 0,
        }
    }

    /// A page that has already run its entry fetch.
    pub fn open<T: Transport>(api: &CrmApi<T>, resource: Resource, token: Option<String>) -> Self {
        let mut page = Self::new(resource);
        page.set_token(api, token);
        page
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    pub fn selected(&self) -> Option<&Record> {
        self.selected.as_ref()
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        self.form.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn delete_target(&self) -> Option<&Record> {
        self.delete_target.as_ref()
    }

    pub fn is_delete_confirm_open(&self) -> bool {
        self.delete_target.is_some()
    }

    /// Install or clear the token. Gaining a token while listing fetches.
    pub fn set_token<T: Transport>(&mut self, api: &CrmApi<T>, token: Option<String>) {
        self.token = token.filter(|t| !t.trim().is_empty());
        if self.token.is_none() {
            debug!(resource = %self.resource, "token cleared");
            self.items.clear();
            self.error = None;
            self.page = 1;
            return;
        }
        if self.view_mode == ViewMode::List {
            self.refresh(api);
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Apply a list result. Returns `false` when the ticket is stale and the
    /// result was discarded.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: ApiResult<Vec<Record>>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                resource = %self.resource,
                stale = ticket.generation,
                current = self.generation,
                "dropping stale list response"
            );
            return false;
        }
        self.loading = false;
        self.page = 1;
        if result.success {
            self.items = result.data.unwrap_or_default();
            debug!(resource = %self.resource, count = self.items.len(), "list loaded");
        } else {
            self.items.clear();
            self.error = Some(result.message().to_string());
        }
        true
    }

    /// Refetch the whole list. Without a token this does nothing; the view
    /// shows the login prompt instead.
    pub fn refresh<T: Transport>(&mut self, api: &CrmApi<T>) {
        if self.token.is_none() {
            return;
        }
        let ticket = self.begin_fetch();
        let result = api.list(self.token.as_deref(), self.resource);
        self.finish_fetch(ticket, result);
    }

    /// Switch to add mode with an empty form and load relation choices.
    pub fn open_add<T: Transport>(&mut self, api: &CrmApi<T>) {
        self.view_mode = ViewMode::Add;
        self.selected = None;
        self.form = Some(FormState::new_add(self.resource));
        self.load_relation_options(api);
    }

    /// Switch to edit mode for `record`. Records without an id cannot be
    /// edited and leave the page unchanged.
    pub fn open_edit<T: Transport>(&mut self, api: &CrmApi<T>, record: Record) -> bool {
        let Some(id) = record.id() else {
            return false;
        };
        self.form = Some(FormState::new_edit(self.resource, &record, id));
        self.selected = Some(record);
        self.view_mode = ViewMode::Edit;
        self.load_relation_options(api);
        true
    }

    /// `open_edit` for the `index`-th row of the current page.
    pub fn open_edit_at<T: Transport>(&mut self, api: &CrmApi<T>, index: usize) -> bool {
        match self.visible_items().get(index).cloned() {
            Some(record) => self.open_edit(api, record),
            None => false,
        }
    }

    /// List each relation's target so the form can offer its records. A
    /// failed list leaves that field without choices.
    fn load_relation_options<T: Transport>(&mut self, api: &CrmApi<T>) {
        let Some(token) = self.token.as_deref() else {
            return;
        };
        let Some(form) = self.form.as_mut() else {
            return;
        };
        for field in self.resource.relation_fields() {
            let FieldKind::Relation { target, .. } = field.kind else {
                continue;
            };
            let result = api.list(Some(token), target);
            if result.success {
                form.set_relation_options(field.name, result.data.as_deref().unwrap_or_default());
            } else {
                debug!(
                    resource = %self.resource,
                    field = field.name,
                    error = result.message(),
                    "relation choices unavailable"
                );
            }
        }
    }

    /// Leave the form and return to the list, which refetches on entry.
    pub fn cancel_form<T: Transport>(&mut self, api: &CrmApi<T>) {
        self.form = None;
        self.selected = None;
        self.enter_list(api);
    }

    fn enter_list<T: Transport>(&mut self, api: &CrmApi<T>) {
        self.view_mode = ViewMode::List;
        self.refresh(api);
    }

    /// Submit the open form. On success the page returns to the list,
    /// refetches and raises the saved banner; on failure the message stays
    /// on the form and the mode is unchanged.
    pub fn submit_form<T: Transport>(&mut self, api: &CrmApi<T>) -> bool {
        let Some(form) = self.form.as_ref() else {
            return false;
        };
        let payload = form.payload();
        let result = match (self.view_mode, self.selected.as_ref().and_then(Record::id)) {
            (ViewMode::Add, _) => api.create(self.token.as_deref(), self.resource, &payload),
            (ViewMode::Edit, Some(id)) => api.update(self.token.as_deref(), self.resource, id, &payload),
            _ => return false,
        };
        if !result.success {
            if let Some(form) = self.form.as_mut() {
                form.error = Some(result.message().to_string());
            }
            return false;
        }
        info!(resource = %self.resource, mode = ?self.view_mode, "record saved");
        self.form = None;
        self.selected = None;
        self.enter_list(api);
        self.saved_at = Some(Instant::now());
        true
    }

    /// The transient success banner, if it is still up at `now`.
    pub fn success_banner(&self, now: Instant) -> Option<String> {
        let saved_at = self.saved_at?;
        (now.saturating_duration_since(saved_at) < SUCCESS_BANNER_TTL)
            .then(|| format!("{} saved successfully!", self.resource.title()))
    }

    pub fn request_delete(&mut self, record: Record) {
        self.delete_target = Some(record);
    }

    pub fn request_delete_at(&mut self, index: usize) -> bool {
        match self.visible_items().get(index).cloned() {
            Some(record) => {
                self.request_delete(record);
                true
            }
            None => false,
        }
    }

    pub fn cancel_delete(&mut self) {
        self.delete_target = None;
    }

    /// Delete the pending target. The overlay closes whatever the outcome;
    /// success refetches, failure raises the error banner.
    pub fn confirm_delete<T: Transport>(&mut self, api: &CrmApi<T>) -> bool {
        let Some(target) = self.delete_target.take() else {
            return false;
        };
        let result = match target.id() {
            Some(id) => api.delete(self.token.as_deref(), self.resource, id),
            None => ApiResult::fail(format!("Failed to delete {}.", self.resource.singular())),
        };
        if result.success {
            info!(resource = %self.resource, id = ?target.id(), "record deleted");
            self.refresh(api);
            true
        } else {
            self.error = Some(result.message().to_string());
            false
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn rows_per_page(&self) -> usize {
        self.page_size.rows(self.items.len())
    }

    pub fn total_pages(&self) -> usize {
        page_count(self.items.len(), self.rows_per_page())
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.page = 1;
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = clamp_page(page, self.total_pages());
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages() {
            self.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn visible_items(&self) -> &[Record] {
        page_slice(&self.items, self.page, self.rows_per_page())
    }

    pub fn list_display(&self) -> ListDisplay<'_> {
        if self.token.is_none() {
            return ListDisplay::LoginRequired(format!("Please log in to view {}.", self.resource.plural()));
        }
        if !self.items.is_empty() {
            return ListDisplay::Items(self.visible_items());
        }
        if self.loading {
            return ListDisplay::Loading;
        }
        match self.error.as_deref() {
            Some(message) => ListDisplay::Failed(message),
            None => ListDisplay::Empty,
        }
    }
}
