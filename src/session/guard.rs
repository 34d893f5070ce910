//! Access decisions for protected views. The decision is a pure function of
//! controller state and route flags; the caller performs the actual effects
//! (persisting the redirect target, navigating). Admin-gate refusals are
//! silent by design: the viewer is redirected, never told why.

use super::controller::{SessionController, SessionState};

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteFlags {
    pub require_admin: bool,
}

impl RouteFlags {
    pub fn admin() -> Self { Self { require_admin: true } }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving; render a neutral placeholder, never redirect yet.
    Wait,
    Allow,
    /// Persist `remember` as the pending redirect target, then go to login.
    RedirectToLogin { remember: String },
    /// Admin gate failed; redirect to the non-privileged default view.
    RedirectHome,
}

/// Pure decision: may this viewer see the route at `requested_path`?
pub fn evaluate(controller: &SessionController, flags: RouteFlags, requested_path: &str) -> GuardDecision {
    match controller.state() {
        SessionState::Initializing => GuardDecision::Wait,
        SessionState::Authenticated(_) => {
            if flags.require_admin && !controller.is_admin() {
                GuardDecision::RedirectHome
            } else {
                GuardDecision::Allow
            }
        }
        // A broken store must not strand the viewer on a protected view.
        SessionState::Unauthenticated | SessionState::Error(_) => {
            GuardDecision::RedirectToLogin { remember: requested_path.to_string() }
        }
    }
}

/// Convenience for app shells: evaluate and, when the viewer is being sent to
/// log in, persist the attempted path so the next successful login returns
/// there. The decision itself is unchanged.
pub fn evaluate_and_remember(
    controller: &SessionController,
    flags: RouteFlags,
    requested_path: &str,
) -> GuardDecision {
    let decision = evaluate(controller, flags, requested_path);
    if let GuardDecision::RedirectToLogin { remember } = &decision {
        if let Err(e) = controller.store().remember_redirect(remember) {
            tracing::warn!(target: "session", "failed to persist redirect target: {e}");
        }
    }
    decision
}
