//! Login/session collaborator
//!
//! The game never checks credentials. It asks one question (is somebody
//! logged in?) and listens for two signals (login, logout). The login page
//! stores the logged-in user as JSON under the `session` LocalStorage key and
//! announces changes with `auth:login` / `auth:logout` window events.

use serde::{Deserialize, Serialize};

/// LocalStorage key holding the logged-in user
pub const SESSION_STORAGE_KEY: &str = "session";
/// Window event fired after a login
pub const LOGIN_EVENT: &str = "auth:login";
/// Window event fired after a logout
pub const LOGOUT_EVENT: &str = "auth:logout";

/// Stored session record. Only `user` is required; extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user: String,
    #[serde(default, rename = "nombre")]
    pub display_name: Option<String>,
    #[serde(default, rename = "rol")]
    pub role: Option<String>,
}

impl SessionUser {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user)
    }
}

/// Parse the stored record. Missing, malformed or empty data means nobody
/// is logged in.
pub fn parse_session(raw: Option<&str>) -> Option<SessionUser> {
    let raw = raw?;
    match serde_json::from_str::<SessionUser>(raw) {
        Ok(user) if !user.user.trim().is_empty() => Some(user),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Ignoring malformed session record: {}", e);
            None
        }
    }
}

/// Login state change delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum AuthChange {
    LoggedIn(SessionUser),
    LoggedOut,
}

type Handler = Box<dyn FnMut(&AuthChange)>;

/// Observer hub between the session collaborator and its consumers
#[derive(Default)]
pub struct AuthHub {
    user: Option<SessionUser>,
    login_handlers: Vec<Handler>,
    logout_handlers: Vec<Handler>,
}

impl std::fmt::Debug for AuthHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHub")
            .field("user", &self.user)
            .field("login_handlers", &self.login_handlers.len())
            .field("logout_handlers", &self.logout_handlers.len())
            .finish()
    }
}

impl AuthHub {
    pub fn new(user: Option<SessionUser>) -> Self {
        Self {
            user,
            ..Default::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn on_login(&mut self, handler: impl FnMut(&AuthChange) + 'static) {
        self.login_handlers.push(Box::new(handler));
    }

    pub fn on_logout(&mut self, handler: impl FnMut(&AuthChange) + 'static) {
        self.logout_handlers.push(Box::new(handler));
    }

    /// Record a login and notify login subscribers
    pub fn login(&mut self, user: SessionUser) {
        log::info!("Logged in as {}", user.label());
        self.user = Some(user.clone());
        let change = AuthChange::LoggedIn(user);
        for handler in &mut self.login_handlers {
            handler(&change);
        }
    }

    /// Record a logout and notify logout subscribers. Fires even when nobody
    /// was logged in so consumers can force their reset.
    pub fn logout(&mut self) {
        log::info!("Logged out");
        self.user = None;
        for handler in &mut self.logout_handlers {
            handler(&AuthChange::LoggedOut);
        }
    }

    /// Apply a freshly read storage record (cross-tab sync)
    pub fn sync(&mut self, raw: Option<&str>) {
        match parse_session(raw) {
            Some(user) => {
                if self.user.as_ref() != Some(&user) {
                    self.login(user);
                }
            }
            None => {
                if self.user.is_some() {
                    self.logout();
                }
            }
        }
    }
}

/// Browser side of the collaborator (WASM only)
#[cfg(target_arch = "wasm32")]
pub mod browser {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use super::*;

    /// Read `localStorage["session"]`
    pub fn read_stored_session() -> Option<String> {
        let storage = web_sys::window()?.local_storage().ok()??;
        storage.get_item(SESSION_STORAGE_KEY).ok()?
    }

    /// Build a hub from storage and forward `auth:*` and `storage` events into it
    pub fn install_bridge() -> Rc<RefCell<AuthHub>> {
        let stored = read_stored_session();
        let hub = Rc::new(RefCell::new(AuthHub::new(parse_session(stored.as_deref()))));
        let Some(window) = web_sys::window() else {
            return hub;
        };

        // Same-tab login: re-read storage so the hub carries the user record
        {
            let hub = hub.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let stored = read_stored_session();
                let user = parse_session(stored.as_deref()).unwrap_or(SessionUser {
                    user: "anonymous".to_string(),
                    display_name: None,
                    role: None,
                });
                hub.borrow_mut().login(user);
            });
            let _ = window
                .add_event_listener_with_callback(LOGIN_EVENT, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let hub = hub.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                hub.borrow_mut().logout();
            });
            let _ = window
                .add_event_listener_with_callback(LOGOUT_EVENT, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Other tabs
        {
            let hub = hub.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::StorageEvent| {
                if event.key().as_deref() == Some(SESSION_STORAGE_KEY) {
                    hub.borrow_mut().sync(event.new_value().as_deref());
                }
            });
            let _ = window
                .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        hub
    }
}
