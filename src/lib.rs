//! Rust client for the monobank open API.
//! Provides an async interface over a lazily opened HTTP session and
//! typed domain models for rates, client info and statements.

pub mod client;
pub mod error;
pub mod models;
pub mod session;

pub use client::{
    Authenticated, Corporate, CorporateMonoClient, Credentials, MonoClient, Personal,
    PersonalMonoClient, Public, PublicMonoClient, ScopedClient,
};
pub use error::{MonoError, TOO_MANY_REQUESTS};
pub use models::{
    Account, ClientInfo, CurrencyRate, Jar, StatementEvent, StatementItem, Webhook, WebhookEvent,
    WebhookEventKind,
};
pub use session::{RequestOptions, Session};
