//! Login credentials and the hook that turns them into an identity.
//!
//! The store doesn't decide who a user is. It hands the [`LoginRequest`]
//! to an [`Authenticator`] and issues a token for whatever identity comes
//! back. [`LocalAuthenticator`] is the built-in one: it checks that an
//! email was given and synthesizes the rest locally, with no network.
//!
//! A networked authenticator (an identity provider, a login API) plugs in
//! through the same trait without any change to the store.

use std::fmt;

use rand::Rng;
use serde::Deserialize;

use crate::session::DEFAULT_DISPLAY_NAME;
use crate::{SessionError, SessionUser};

/// Length of generated user ids.
const GENERATED_ID_LEN: usize = 8;

/// Alphabet for generated user ids.
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ---------------------------------------------------------------------------
// LoginRequest
// ---------------------------------------------------------------------------

/// What a login form submits.
///
/// Only `email` is required. `id`, `name`, and `roles` let a caller pin the
/// identity (useful in demos and tests); when absent the authenticator
/// fills them in.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: Option<String>,
    pub name: Option<String>,
    pub id: Option<String>,
    pub roles: Option<Vec<String>>,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("id", &self.id)
            .field("roles", &self.roles)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Authenticator
// ---------------------------------------------------------------------------

/// Validates a login request and returns the identity to sign in as.
///
/// # Trait bounds
///
/// - `Send + Sync` → the store is shared across tasks, and so is its
///   authenticator.
/// - `'static` → it lives as long as the store.
///
/// # Example
///
/// ```rust
/// use intervest_session::{Authenticator, LoginRequest, SessionError, SessionUser};
///
/// /// Only lets in addresses from one domain.
/// struct DomainAuthenticator;
///
/// impl Authenticator for DomainAuthenticator {
///     async fn authenticate(
///         &self,
///         request: &LoginRequest,
///     ) -> Result<SessionUser, SessionError> {
///         if !request.email.ends_with("@intervest.example") {
///             return Err(SessionError::AuthFailed("unknown domain".into()));
///         }
///         Ok(SessionUser {
///             id: request.email.clone(),
///             name: request.email.clone(),
///             email: Some(request.email.clone()),
///             roles: None,
///         })
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Checks the request and returns who is signing in.
    ///
    /// # Errors
    /// - [`SessionError::EmptyEmail`]: no email given
    /// - [`SessionError::AuthFailed`]: credentials rejected
    fn authenticate(
        &self,
        request: &LoginRequest,
    ) -> impl std::future::Future<Output = Result<SessionUser, SessionError>> + Send;
}

/// Accepts any non-empty email and synthesizes the identity locally.
///
/// - `id`: the request's, or 8 random `[0-9a-z]` characters
/// - `name`: the request's, or derived from the email's local part
/// - `password`: ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAuthenticator;

impl Authenticator for LocalAuthenticator {
    async fn authenticate(&self, request: &LoginRequest) -> Result<SessionUser, SessionError> {
        if request.email.trim().is_empty() {
            return Err(SessionError::EmptyEmail);
        }

        Ok(SessionUser {
            id: request.id.clone().unwrap_or_else(generate_id),
            name: request
                .name
                .clone()
                .unwrap_or_else(|| display_name_from_email(&request.email)),
            email: Some(request.email.clone()),
            roles: request.roles.clone(),
        })
    }
}

/// Turns an email's local part into a display name.
///
/// Dots become spaces: `"ada.lovelace@example.com"` → `"ada lovelace"`.
/// Falls back to `"User"` when nothing is left.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let name = local.replace('.', " ");
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_DISPLAY_NAME.to_owned()
    } else {
        name.to_owned()
    }
}

/// Generates a short random id from [`ID_ALPHABET`].
///
/// Not a secret, only an identity key for users who didn't bring one.
fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect()
}
