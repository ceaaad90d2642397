//! Client side of the tracker: the signed-in session, view navigation and
//! the HTTP client for the transaction API.

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod hosted_auth;
pub mod router;
pub mod session;

pub use api::{ClientError, TransactionDraft, TransactionsClient};
pub use auth::{AuthError, AuthProvider, OAuthProvider, OAuthResponse, Session};
pub use dashboard::{Summary, SummaryOverflow};
pub use hosted_auth::{HostedAuth, SessionFile};
pub use router::{guard, Navigation, Route};
pub use session::{SessionStore, User};
