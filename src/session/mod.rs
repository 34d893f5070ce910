//! Client-side session and authorization core: identity model, durable
//! credential storage, the session state machine, and route access decisions.
//! Keep the public surface thin and split implementation across sub-modules.

mod controller;
mod credentials;
mod guard;
mod identity;

pub use controller::{SessionController, SessionState};
pub use credentials::{CredentialRecord, CredentialStore};
pub use guard::{evaluate, evaluate_and_remember, GuardDecision, RouteFlags, HOME_ROUTE, LOGIN_ROUTE};
pub use identity::{Identity, Role};
