//! Discovery: matches a "seeker" note's properties against "provider"
//! notes published on a decentralized network.
//!
//! A seeker's properties become a [`DiscoveryQuery`] (keys mapped through a
//! [`SynonymTable`]), the [`Dispatcher`] collects asynchronous responses
//! over a bounded window with publisher deduplication, and [`rank`] orders
//! whatever the window caught.

pub mod dispatch;
pub mod error;
pub mod query;
pub mod rank;

pub use dispatch::{
    CloseReason, Dispatcher, DiscoverySession, NetworkClient, NetworkError, SessionState,
};
pub use error::DiscoveryError;
pub use query::{Criterion, DiscoveryQuery, SynonymTable};
pub use rank::{MatchResult, rank};
