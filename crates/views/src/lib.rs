//! Headless view bindings for Motorpool
//!
//! Each screen is a function of store state plus route parameters: it
//! dispatches store operations on mount and on user interaction, and reads
//! back whatever the store holds. Nothing here renders.
//!
//! - [`ListView`] - sortable collection
//! - [`DetailView`] - one entity as label/value rows
//! - [`EditView`] - create/edit form with validation and relation selects
//! - [`DeleteDialog`] - confirmation before delete

pub mod delete;
pub mod detail;
pub mod edit;
pub mod error;
pub mod list;
pub mod navigation;
pub mod routes;

pub use delete::DeleteDialog;
pub use detail::{DetailRow, DetailView};
pub use edit::{EditView, RelationSource};
pub use error::{ViewError, ViewResult};
pub use list::ListView;
pub use navigation::NavigationGuard;
pub use routes::Route;
