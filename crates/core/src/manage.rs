//! Row state for a manage page.
//!
//! A manage page shows one page of records and lets the operator edit a row
//! inline, flip its status flag, or delete it. [`ManageState`] holds that
//! state: the committed rows, the page position, and at most one row in edit
//! mode with its draft.
//!
//! Mutations are applied locally after the backend accepts them; the page is
//! only refetched when the caller asks for it.

use std::fmt;

use crate::fence::{Fence, FenceTicket};
use crate::list::Page;
use crate::pagination::PageWindow;

/// A backend record with a stable identifier.
pub trait Record {
    type Id: Copy + Eq + fmt::Debug + fmt::Display;

    fn id(&self) -> Self::Id;
}

/// A record with a single boolean flag toggled by `PATCH /status/{id}`.
///
/// The flag is `is_active` for accounts and stores and `is_sales` for
/// categories and products.
pub trait StatusFlag: Record {
    fn flag(&self) -> bool;
    fn set_flag(&mut self, value: bool);
}

/// A record that supports inline editing of a subset of its fields.
pub trait Editable: Record {
    type Draft: Clone;

    /// A draft initialised from the record's current values.
    fn draft(&self) -> Self::Draft;

    /// Merge a saved draft into the record.
    fn apply(&mut self, draft: &Self::Draft);
}

/// Whether a row renders read-only or as an edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode<'a, D> {
    Viewing,
    Editing(&'a D),
}

impl<D> RowMode<'_, D> {
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }
}

#[derive(Debug, Clone)]
struct EditSlot<I, D> {
    id: I,
    draft: D,
}

/// Rows, paging and edit state of one manage table.
///
/// `D` is the inline-edit draft type; tables without inline edit use `()`.
#[derive(Debug, Clone)]
pub struct ManageState<R: Record, D = ()> {
    rows: Vec<R>,
    page: u32,
    total_pages: u32,
    editing: Option<EditSlot<R::Id, D>>,
}

impl<R: Record, D> Default for ManageState<R, D> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            page: 1,
            total_pages: 1,
            editing: None,
        }
    }
}

impl<R: Record, D> ManageState<R, D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single page holding `rows`, for acting on records fetched one by one.
    #[must_use]
    pub fn from_rows(rows: Vec<R>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Commit a fetched page if `ticket` is still the newest one issued.
    ///
    /// Returns `false`, leaving the state untouched, for a superseded
    /// response. If the row being edited is no longer on the page, edit mode
    /// ends.
    pub fn commit(&mut self, fence: &Fence, ticket: FenceTicket, page: u32, fetched: Page<R>) -> bool {
        if !fence.is_current(ticket) {
            return false;
        }
        self.replace(page, fetched);
        true
    }

    /// Take `fetched` as the current page unconditionally.
    ///
    /// If the row being edited is no longer on the page, edit mode ends.
    pub fn replace(&mut self, page: u32, fetched: Page<R>) {
        self.total_pages = fetched.page_count();
        self.page = page.clamp(1, self.total_pages);
        self.rows = fetched.data;
        if let Some(slot) = &self.editing
            && !self.rows.iter().any(|r| r.id() == slot.id)
        {
            self.editing = None;
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.total_pages)
    }

    #[must_use]
    pub fn find(&self, id: R::Id) -> Option<&R> {
        self.rows.iter().find(|r| r.id() == id)
    }

    #[must_use]
    pub fn row_mode(&self, id: R::Id) -> RowMode<'_, D> {
        match &self.editing {
            Some(slot) if slot.id == id => RowMode::Editing(&slot.draft),
            _ => RowMode::Viewing,
        }
    }

    /// Each row paired with its display mode.
    pub fn rows_with_mode(&self) -> impl Iterator<Item = (&R, RowMode<'_, D>)> {
        self.rows.iter().map(|r| (r, self.row_mode(r.id())))
    }

    #[must_use]
    pub fn editing_id(&self) -> Option<R::Id> {
        self.editing.as_ref().map(|slot| slot.id)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Drop the row with `id`. Returns whether a row was removed.
    pub fn remove(&mut self, id: R::Id) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.id() != id);
        if self.editing_id() == Some(id) {
            self.editing = None;
        }
        self.rows.len() != before
    }
}

impl<R: StatusFlag, D> ManageState<R, D> {
    /// Flip the row's flag after the backend accepted the toggle.
    ///
    /// Returns the new value, or `None` if the row is not on this page.
    pub fn toggle_status(&mut self, id: R::Id) -> Option<bool> {
        let row = self.rows.iter_mut().find(|r| r.id() == id)?;
        let flipped = !row.flag();
        row.set_flag(flipped);
        Some(flipped)
    }
}

impl<R: Editable<Draft = D>, D: Clone> ManageState<R, D> {
    /// Put `id` into edit mode with a draft of its current values.
    ///
    /// Any other row leaves edit mode. Returns `false` if `id` is not on the
    /// page.
    pub fn begin_edit(&mut self, id: R::Id) -> bool {
        let Some(row) = self.find(id) else {
            return false;
        };
        self.editing = Some(EditSlot { id, draft: row.draft() });
        true
    }

    /// Replace the draft of the row in edit mode.
    pub fn update_draft(&mut self, draft: D) -> bool {
        match &mut self.editing {
            Some(slot) => {
                slot.draft = draft;
                true
            }
            None => false,
        }
    }

    /// Merge the current draft into its row and leave edit mode.
    pub fn commit_save(&mut self) -> Option<&R> {
        let slot = self.editing.take()?;
        let row = self.rows.iter_mut().find(|r| r.id() == slot.id)?;
        row.apply(&slot.draft);
        Some(row)
    }
}
