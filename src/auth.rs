//! Authentication collaborator.
//!
//! The store only needs an opaque, id-bearing session token; everything else
//! about authentication lives behind [`AuthProvider`]. `LocalAuth` is the
//! in-process implementation used by the CLI and by tests.

use std::sync::Mutex;

use log::info;

use crate::{NoteError, Result};

/// An authenticated identity. The store treats this as opaque apart from
/// the owner id used to scope persistence calls.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Opaque owner identifier
    pub id: String,
    /// Address the user signed in with
    pub email: String,
}

/// Callback invoked whenever the session changes (sign-in or sign-out).
pub type AuthCallback = Box<dyn Fn(Option<&User>) + Send + Sync>;

/// Session operations exposed by the authentication service.
pub trait AuthProvider: Send + Sync {
    /// Currently signed-in user, if any.
    fn current_user(&self) -> Option<User>;

    /// Requests a magic-link sign-in for `email`.
    fn sign_in_with_email(&self, email: &str) -> Result<()>;

    /// Signs in with email and password.
    fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()>;

    /// Creates an account with email and password and signs it in.
    fn sign_up_with_password(&self, email: &str, password: &str) -> Result<()>;

    /// Ends the current session. Idempotent.
    fn sign_out(&self);

    /// Registers a callback fired on every session change.
    fn on_auth_change(&self, callback: AuthCallback);
}

struct LocalAuthState {
    user: Option<User>,
    callbacks: Vec<AuthCallback>,
}

/// Single-process session holder.
///
/// There is no real credential verification here: the local backend is
/// single-user, so sign-in only validates input shape and establishes the
/// session token the store scopes its calls by.
pub struct LocalAuth {
    state: Mutex<LocalAuthState>,
}

impl LocalAuth {
    /// Starts with no active session.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LocalAuthState {
                user: None,
                callbacks: Vec::new(),
            }),
        }
    }

    /// Starts already signed in; the CLI uses this for the local backend.
    pub fn signed_in(id: &str, email: &str) -> Self {
        let auth = Self::new();
        auth.set_user(Some(User {
            id: id.to_string(),
            email: email.to_string(),
        }));
        auth
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, LocalAuthState> {
        // A poisoned lock only means a panic elsewhere; the session state
        // itself is still usable.
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn set_user(&self, user: Option<User>) {
        let mut state = self.lock_state();
        state.user = user;
        let user = state.user.clone();
        for callback in &state.callbacks {
            callback(user.as_ref());
        }
    }

    fn validate_email(email: &str) -> Result<&str> {
        let email = email.trim();
        if email.is_empty() {
            return Err(NoteError::Validation {
                message: "email must not be empty".to_string(),
            });
        }
        Ok(email)
    }
}

impl Default for LocalAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for LocalAuth {
    fn current_user(&self) -> Option<User> {
        self.lock_state().user.clone()
    }

    fn sign_in_with_email(&self, email: &str) -> Result<()> {
        let email = Self::validate_email(email)?;
        info!("Signing in {}", email);
        self.set_user(Some(User {
            id: email.to_string(),
            email: email.to_string(),
        }));
        Ok(())
    }

    fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(NoteError::Validation {
                message: "password must not be empty".to_string(),
            });
        }
        self.sign_in_with_email(email)
    }

    fn sign_up_with_password(&self, email: &str, password: &str) -> Result<()> {
        self.sign_in_with_password(email, password)
    }

    fn sign_out(&self) {
        info!("Signing out");
        self.set_user(None);
    }

    fn on_auth_change(&self, callback: AuthCallback) {
        self.lock_state().callbacks.push(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn sign_in_requires_non_empty_email() {
        let auth = LocalAuth::new();
        assert!(matches!(
            auth.sign_in_with_email("   "),
            Err(NoteError::Validation { .. })
        ));
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn sign_in_then_out_updates_session() {
        let auth = LocalAuth::new();
        auth.sign_in_with_email("a@example.com").unwrap();
        assert_eq!(auth.current_user().unwrap().email, "a@example.com");
        auth.sign_out();
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn password_sign_in_rejects_empty_password() {
        let auth = LocalAuth::new();
        assert!(matches!(
            auth.sign_in_with_password("a@example.com", ""),
            Err(NoteError::Validation { .. })
        ));
    }

    #[test]
    fn callbacks_fire_on_every_change() {
        let auth = LocalAuth::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        auth.on_auth_change(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        auth.sign_in_with_email("a@example.com").unwrap();
        auth.sign_out();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
