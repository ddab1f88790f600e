use parking_lot::RwLock;

use crate::protocol::types::User;

/// Application-scoped authentication state.
///
/// Holds the signed-in user so independent consumers (CLI commands, UI
/// layers) can read it without threading it through every call. Mutation
/// goes through [`SessionStore::set_user`] and [`SessionStore::clear`];
/// inject a fresh instance per test to substitute state.
#[derive(Debug, Default)]
pub struct SessionStore {
    user: RwLock<Option<User>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user(&self, user: Option<User>) {
        *self.user.write() = user;
    }

    pub fn clear(&self) {
        *self.user.write() = None;
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.user.read().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.read().is_some()
    }
}
