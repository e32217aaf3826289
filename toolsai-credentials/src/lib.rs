//! API credential resolution for Tools-AI.
//!
//! Every tool needs a bearer credential for the generation service. The
//! [`CredentialResolver`] produces one by walking an ordered chain of
//! [`CredentialSource`]s and caching the first non-empty answer:
//!
//! 1. A value the user entered this session
//! 2. The value persisted in local storage
//! 3. A remote bootstrap endpoint (`GET` → `{ "apiKey": "..." }`)
//! 4. A fixed fallback configured at build time
//!
//! A failing source never surfaces to the caller; resolution simply moves on.
//! Only exhaustion of the whole chain is an error
//! ([`CredentialError::Unavailable`]).
//!
//! When the generation service rejects a credential, [`dispatch`] drops the
//! cache so the next call re-walks the chain.

mod bootstrap;
mod error;
mod generation;
mod resolver;
mod source;

pub use bootstrap::{BootstrapResponse, BootstrapSource};
pub use error::{CredentialError, CredentialResult, SourceUnavailable};
pub use generation::{dispatch, GenerationError, GenerationService};
pub use resolver::{Credential, CredentialResolver, CredentialResolverConfig};
pub use source::{
    CredentialSource, CredentialSourceKind, FallbackSource, PersistedSource, UserProvidedSource,
};
