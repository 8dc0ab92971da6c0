use marquee_core::models::{FilterField, ListQuery};

/// Filter edits the user is making vs the filters the list was loaded with.
#[derive(Debug, Clone)]
pub struct FilterStaging {
    pending: ListQuery,
    committed: ListQuery,
}

impl FilterStaging {
    pub fn new(query: ListQuery) -> Self {
        Self {
            pending: query.clone(),
            committed: query,
        }
    }

    pub fn pending(&self) -> &ListQuery {
        &self.pending
    }

    pub fn committed(&self) -> &ListQuery {
        &self.committed
    }

    /// Edit the pending side only.
    pub fn set_pending(&mut self, field: FilterField) {
        self.pending.set(field);
    }

    /// Pending and committed differ in sort, genre or language.
    pub fn dirty(&self) -> bool {
        !self.pending.same_filters(&self.committed)
    }

    /// Promote pending to committed at page 1, returning the new committed query.
    pub fn apply(&mut self) -> ListQuery {
        self.committed = self.pending.with_page(1);
        self.pending = self.committed.clone();
        self.committed.clone()
    }

    pub fn discard_pending(&mut self) {
        self.pending = self.committed.clone();
    }
}
