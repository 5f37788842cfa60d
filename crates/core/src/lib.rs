//! Business logic layer for netabase.
//!
//! Services own the application semantics over the repository layer:
//!
//! - [`PartyService`]: party listings and cached party detail
//! - [`PoliticianService`]: politician listings, the read-through detail
//!   cache and the view counter
//! - [`RatingService`]: the one-rating-per-user-per-politician upsert and
//!   ownership-checked mutation, with cache invalidation
//! - [`AuthService`]: registration, login, Google sign-in, JWT issuance and
//!   refresh rotation
//! - [`NewsService`]: politics news aggregation from RSS feeds

pub mod services;

pub use services::auth::{
    AuthService, Claims, GoogleVerifier, LoginInput, RegisterInput, TokenPair, TokenType,
};
pub use services::news::{NewsArticle, NewsDigest, NewsService, SourceFailure};
pub use services::party::{CreatePartyInput, PartyService};
pub use services::politician::{
    CreatePoliticianInput, InitiativeView, PoliticianDetail, PoliticianListItem,
    PoliticianService, PromiseView,
};
pub use services::rating::{RatingInput, RatingService, RatingWithContext};
