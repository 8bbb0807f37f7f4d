//! Access guard: render protected content or send the user to sign in.
//!
//! The guard doesn't navigate. It returns a [`GuardDecision`] and the
//! caller (a router, a shell, a test) performs whatever side effect the
//! decision calls for.

use intervest_session::{Authenticator, Clock, SessionStore};

/// Where unauthenticated users are sent by default.
pub const DEFAULT_REDIRECT: &str = "/login";

/// What to do with a request for protected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision<T> {
    /// Authenticated: show the content as-is.
    Render(T),

    /// Not authenticated: go to `to`.
    ///
    /// `from` is the location originally asked for, so a login screen
    /// can send the user back afterwards. It's advisory; nothing here
    /// acts on it.
    Redirect { to: String, from: String },
}

impl<T> GuardDecision<T> {
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }

    /// The redirect target, if this is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirect { to, .. } => Some(to),
            Self::Render(_) => None,
        }
    }

    /// The originally requested location, if this is a redirect.
    pub fn return_to(&self) -> Option<&str> {
        match self {
            Self::Redirect { from, .. } => Some(from),
            Self::Render(_) => None,
        }
    }

    pub fn into_content(self) -> Option<T> {
        match self {
            Self::Render(content) => Some(content),
            Self::Redirect { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GuardDecision<U> {
        match self {
            Self::Render(content) => GuardDecision::Render(f(content)),
            Self::Redirect { to, from } => GuardDecision::Redirect { to, from },
        }
    }
}

/// Gates content on `is_authenticated`.
///
/// # Example
///
/// ```rust
/// use intervest::{AccessGuard, GuardDecision};
///
/// let guard = AccessGuard::default();
///
/// let denied = guard.check(false, "settings page", "/settings");
/// assert_eq!(
///     denied,
///     GuardDecision::Redirect { to: "/login".into(), from: "/settings".into() }
/// );
///
/// let allowed = guard.check(true, "settings page", "/settings");
/// assert_eq!(allowed, GuardDecision::Render("settings page"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGuard {
    redirect_to: String,
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::redirecting_to(DEFAULT_REDIRECT)
    }
}

impl AccessGuard {
    /// A guard that sends unauthenticated users to `target`.
    pub fn redirecting_to(target: impl Into<String>) -> Self {
        Self {
            redirect_to: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.redirect_to
    }

    /// Decides for already-built content.
    pub fn check<T>(&self, is_authenticated: bool, content: T, requested: &str) -> GuardDecision<T> {
        self.check_with(is_authenticated, requested, || content)
    }

    /// Decides, building the content only when it will be rendered.
    pub fn check_with<T>(
        &self,
        is_authenticated: bool,
        requested: &str,
        render: impl FnOnce() -> T,
    ) -> GuardDecision<T> {
        if is_authenticated {
            return GuardDecision::Render(render());
        }
        tracing::debug!(
            from = requested,
            to = %self.redirect_to,
            "unauthenticated request, redirecting"
        );
        GuardDecision::Redirect {
            to: self.redirect_to.clone(),
            from: requested.to_owned(),
        }
    }

    /// Decides using the store's current `is_authenticated()`.
    pub fn check_session<T, A, K>(
        &self,
        store: &SessionStore<A, K>,
        content: T,
        requested: &str,
    ) -> GuardDecision<T>
    where
        A: Authenticator,
        K: Clock,
    {
        self.check(store.is_authenticated(), content, requested)
    }
}
