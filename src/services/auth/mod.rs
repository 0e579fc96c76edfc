pub mod authenticator;
pub mod credentials;
pub mod provider;
pub mod token;

pub use authenticator::ApiKeyAuthenticator;
pub use provider::{InMemoryUserProvider, PgUserProvider, User, UserProvider};
pub use token::{AuthenticatedPrincipal, PreAuthenticatedToken, SecurityToken};
