//! Mock session: a canned user that can log in and out.
//!
//! There is no credential check and nothing is persisted; a fresh
//! [`SessionMock`] always starts as a guest.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub avatar: Option<String>,
}

impl User {
    /// The identity [`SessionMock::login_as_test_user`] signs in as.
    pub fn test_user() -> Self {
        Self {
            id: 1,
            name: "Test User".to_string(),
            avatar: None,
        }
    }
}

pub struct SessionMock {
    current: watch::Sender<Option<User>>,
}

impl SessionMock {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    pub fn login_as_test_user(&self) -> User {
        let user = User::test_user();
        self.current.send_replace(Some(user.clone()));
        info!(user_id = user.id, "logged in");
        user
    }

    pub fn logout(&self) {
        if self.current.send_replace(None).is_some() {
            info!("logged out");
        }
    }

    pub fn is_guest(&self) -> bool {
        self.current.borrow().is_none()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }
}

impl Default for SessionMock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionMock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMock")
            .field("current", &*self.current.borrow())
            .finish()
    }
}
