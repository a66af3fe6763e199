//! Store state and its transition rules.
//!
//! Every operation invocation goes `idle -> pending -> fulfilled | rejected`.
//! The transitions below are the only way the state changes besides
//! [`StoreState::reset`].

use motorpool_domain::Entity;

/// Operation categories a store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `list()`
    FetchList,
    /// `get(id)`
    FetchOne,
    /// `create(entity)`
    Create,
    /// `update(entity)`
    Update,
    /// `partial_update(entity)`
    PartialUpdate,
    /// `delete(id)`
    Delete,
}

impl Operation {
    /// Create, update, partial update and delete.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Operation::FetchList | Operation::FetchOne)
    }

    /// Stable name used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FetchList => "fetch_entity_list",
            Operation::FetchOne => "fetch_entity",
            Operation::Create => "create_entity",
            Operation::Update => "update_entity",
            Operation::PartialUpdate => "partial_update_entity",
            Operation::Delete => "delete_entity",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached data and flags for one resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState<E> {
    /// Last fetched collection, in display order
    pub entities: Vec<E>,
    /// Current entity for detail/edit flows
    pub entity: E,
    /// A list or single fetch is in flight
    pub loading: bool,
    /// A mutation is in flight
    pub updating: bool,
    /// The last mutation succeeded and nothing has started since
    pub update_success: bool,
    /// Description of the last failure
    pub error_message: Option<String>,
}

impl<E: Entity> Default for StoreState<E> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            entity: E::default(),
            loading: false,
            updating: false,
            update_success: false,
            error_message: None,
        }
    }
}

impl<E: Entity> StoreState<E> {
    /// Back to the empty defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// An operation has been issued.
    pub fn pending(&mut self, op: Operation) {
        self.error_message = None;
        self.update_success = false;
        if op.is_mutation() {
            self.updating = true;
        } else {
            self.loading = true;
        }
    }

    /// An operation failed. Cached data stays as it was.
    pub fn rejected(&mut self, op: Operation, message: String) {
        if op.is_mutation() {
            self.updating = false;
        } else {
            self.loading = false;
        }
        self.error_message = Some(message);
    }

    /// A list fetch succeeded; `entities` is already in display order.
    pub fn list_fulfilled(&mut self, entities: Vec<E>) {
        self.loading = false;
        self.error_message = None;
        self.entities = entities;
    }

    /// A single fetch succeeded.
    pub fn fetch_fulfilled(&mut self, entity: E) {
        self.loading = false;
        self.entity = entity;
    }

    /// Create, update or partial update succeeded.
    pub fn save_fulfilled(&mut self, entity: E) {
        self.updating = false;
        self.loading = false;
        self.update_success = true;
        self.entity = entity;
    }

    /// Delete succeeded.
    pub fn delete_fulfilled(&mut self) {
        self.updating = false;
        self.update_success = true;
        self.entity = E::default();
    }

    /// Neither a fetch nor a mutation is in flight.
    pub fn is_idle(&self) -> bool {
        !self.loading && !self.updating
    }
}
