// Authentication module
// Password hashing, signed session tokens carried in a cookie, and the
// sign-up / login / logout flows built on them

pub mod cookie;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::{AuthError, TokenError, Unauthenticated};
pub use handlers::{login_handler, logout_handler, me_handler, sign_up_handler};
pub use middleware::{AuthenticatedUser, SessionGate};
pub use models::{CredentialRecord, Identity, LoginOutcome, Role};
pub use repository::{PgUserRepository, UserStore};
#[cfg(test)]
pub use repository::InMemoryUserStore;
pub use service::AuthService;
pub use token::{SessionToken, TokenService};
