//! Application services for request authorization.

mod gate;
mod guard;

pub use gate::{AccessError, AccessResult, AuthorizationRequest, RequestAuthorizationGate};
pub use guard::{Guard, GuardChain, TaskRoute};
