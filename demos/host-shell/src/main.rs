use std::sync::Arc;

use intervest::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Route table
// ---------------------------------------------------------------------------

/// A feature module the shell can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureModule {
    pub path: &'static str,
    pub title: &'static str,
    pub protected: bool,
}

const LOGIN_PATH: &str = DEFAULT_REDIRECT;

const MODULES: &[FeatureModule] = &[
    FeatureModule { path: "/", title: "Home", protected: false },
    FeatureModule { path: "/workflows", title: "Workflows", protected: true },
    FeatureModule { path: "/analytics", title: "Analytics", protected: true },
    FeatureModule { path: "/settings", title: "Settings", protected: true },
    FeatureModule { path: "/reports", title: "Reports", protected: true },
];

fn find_module(path: &str) -> Option<&'static FeatureModule> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    MODULES.iter().find(|m| m.path == path)
}

/// What the shell ends up showing for a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Module(&'static FeatureModule),
    Login { return_to: Option<String> },
    NotFound(String),
}

// ---------------------------------------------------------------------------
// Shell
// ---------------------------------------------------------------------------

type Store = SessionStore<LocalAuthenticator, ManualClock>;

struct Shell {
    store: Arc<Store>,
    guard: AccessGuard,
}

impl Shell {
    fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            guard: AccessGuard::redirecting_to(LOGIN_PATH),
        }
    }

    fn navigate(&self, path: &str) -> Screen {
        if path == LOGIN_PATH {
            return Screen::Login { return_to: None };
        }
        let Some(module) = find_module(path) else {
            return Screen::NotFound(path.to_owned());
        };
        if !module.protected {
            return Screen::Module(module);
        }
        match self.guard.check_session(&*self.store, module, path) {
            GuardDecision::Render(module) => Screen::Module(module),
            GuardDecision::Redirect { from, .. } => Screen::Login {
                return_to: Some(from),
            },
        }
    }

    /// Submits the login form and lands on the page the user first asked
    /// for, or home.
    async fn submit_login(
        &self,
        request: LoginRequest,
        return_to: Option<&str>,
    ) -> Result<Screen, IntervestError> {
        self.store.login(request).await?;
        Ok(self.navigate(return_to.unwrap_or("/")))
    }
}

fn describe(screen: &Screen) -> String {
    match screen {
        Screen::Module(m) => format!("{} ({})", m.title, m.path),
        Screen::Login { return_to: Some(from) } => format!("Login, then back to {from}"),
        Screen::Login { return_to: None } => "Login".to_owned(),
        Screen::NotFound(path) => format!("Not found: {path}"),
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// Reads a `SessionConfig` from the JSON file named by the first argument,
/// or falls back to the defaults.
fn load_config() -> Result<SessionConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            let config: SessionConfig = serde_json::from_str(&text)?;
            tracing::info!(%path, ?config, "loaded session config");
            Ok(config)
        }
        None => Ok(SessionConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    let ttl = i64::try_from(config.token_ttl_secs)?;
    let clock = ManualClock::new(SystemClock.now_secs());
    let store = Arc::new(
        SessionStore::builder(config)
            .clock(clock.clone())
            .build(),
    );
    let shell = Shell::new(Arc::clone(&store));

    // Stand-in for the UI re-rendering on session changes.
    let mut changes = store.subscribe();
    let watcher_clock = clock.clone();
    let watcher = tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let state = changes.borrow_and_update().clone();
            tracing::info!(
                phase = %state.phase_at(watcher_clock.now_secs()),
                user = state.user().map(|u| u.name.as_str()).unwrap_or("-"),
                "session changed"
            );
        }
    });

    let screen = shell.navigate("/settings");
    tracing::info!(screen = %describe(&screen), "navigate /settings");

    let return_to = match &screen {
        Screen::Login { return_to } => return_to.clone(),
        _ => None,
    };
    if let Err(e) = shell.submit_login(LoginRequest::new(""), return_to.as_deref()).await {
        tracing::warn!(error = %e, validation = e.is_validation(), "login form rejected");
    }
    let screen = shell
        .submit_login(
            LoginRequest::new("ada.lovelace@example.com").with_roles(["analyst"]),
            return_to.as_deref(),
        )
        .await?;
    tracing::info!(screen = %describe(&screen), "after login");

    // Idle until just inside the refresh window, then refresh.
    clock.advance(ttl - 50);
    store.refresh_token().await?;
    tracing::info!(phase = %store.phase(), "after refresh");

    // Let the refreshed token lapse.
    clock.advance(ttl);
    let screen = shell.navigate("/reports");
    tracing::info!(phase = %store.phase(), screen = %describe(&screen), "navigate /reports");

    store.refresh_token().await?;
    let screen = shell.navigate("/reports");
    tracing::info!(screen = %describe(&screen), "navigate /reports after refresh");

    // The Settings module's logout button.
    store.logout().await;
    let screen = shell.navigate("/settings");
    tracing::info!(screen = %describe(&screen), "navigate /settings after logout");

    drop(shell);
    drop(store);
    watcher.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_at(now: i64) -> (Shell, ManualClock) {
        let clock = ManualClock::new(now);
        let store = SessionStore::builder(SessionConfig::default())
            .clock(clock.clone())
            .build();
        (Shell::new(Arc::new(store)), clock)
    }

    #[test]
    fn test_find_module_ignores_query_and_fragment() {
        assert_eq!(find_module("/reports?year=2024").unwrap().title, "Reports");
        assert_eq!(find_module("/settings#profile").unwrap().title, "Settings");
        assert!(find_module("/nope").is_none());
    }

    #[test]
    fn test_navigate_public_home_renders_when_anonymous() {
        let (shell, _) = shell_at(1000);
        assert_eq!(shell.navigate("/"), Screen::Module(&MODULES[0]));
    }

    #[test]
    fn test_navigate_protected_when_anonymous_shows_login_with_return() {
        let (shell, _) = shell_at(1000);
        assert_eq!(
            shell.navigate("/analytics"),
            Screen::Login {
                return_to: Some("/analytics".into())
            }
        );
    }

    #[test]
    fn test_navigate_unknown_path_is_not_found() {
        let (shell, _) = shell_at(1000);
        assert_eq!(shell.navigate("/missing"), Screen::NotFound("/missing".into()));
    }

    #[tokio::test]
    async fn test_submit_login_returns_to_requested_module() {
        let (shell, _) = shell_at(1000);

        let screen = shell
            .submit_login(LoginRequest::new("ada@example.com"), Some("/workflows"))
            .await
            .unwrap();

        assert_eq!(screen, Screen::Module(find_module("/workflows").unwrap()));
    }

    #[tokio::test]
    async fn test_submit_login_empty_email_is_validation_error() {
        let (shell, _) = shell_at(1000);

        let err = shell
            .submit_login(LoginRequest::new(""), None)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(matches!(shell.navigate("/settings"), Screen::Login { .. }));
    }

    #[tokio::test]
    async fn test_navigate_after_expiry_shows_login() {
        let (shell, clock) = shell_at(1000);
        shell
            .submit_login(LoginRequest::new("ada@example.com"), None)
            .await
            .unwrap();

        clock.set(1900);

        assert!(matches!(shell.navigate("/reports"), Screen::Login { .. }));
    }
}
