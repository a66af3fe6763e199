//! Leave-the-screen-after-success guard shared by the edit form and the
//! delete dialog.

use motorpool_domain::Entity;
use motorpool_store::StoreState;
use tokio::sync::watch;

use crate::routes::Route;

/// Yields the list route once per `false -> true` edge of `update_success`.
pub struct NavigationGuard<E: Entity> {
    state: watch::Receiver<StoreState<E>>,
    last_success: bool,
}

impl<E: Entity> NavigationGuard<E> {
    /// Start watching; success already present at this point is not an edge.
    pub fn new(state: watch::Receiver<StoreState<E>>) -> Self {
        let last_success = state.borrow().update_success;
        Self {
            state,
            last_success,
        }
    }

    /// Forget the last observation. Called on mount and before each save or
    /// delete: the channel only keeps the latest state, so the pending
    /// `false` between two saves may never be observed.
    pub fn rearm(&mut self) {
        self.last_success = false;
    }

    /// Route to leave for, if the store has just reported success.
    pub fn poll(&mut self) -> Option<Route> {
        let success = self.state.borrow_and_update().update_success;
        let edge = success && !self.last_success;
        self.last_success = success;
        edge.then(Route::list::<E>)
    }

    /// Wait for the next store transition, then [`poll`](Self::poll).
    ///
    /// Returns `None` when the store has been dropped.
    pub async fn next(&mut self) -> Option<Route> {
        loop {
            if let Some(route) = self.poll() {
                return Some(route);
            }
            self.state.changed().await.ok()?;
        }
    }
}
