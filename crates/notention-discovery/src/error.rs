use thiserror::Error;

use crate::dispatch::NetworkError;

/// Discovery failures surfaced to the user.
///
/// A window that closes with zero matches is *not* an error; it is the
/// normal `Closed(Timeout)` terminal state with an empty result list.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The seeker note has no properties. Discovery refuses to run an
    /// unconstrained broadcast query; the user is asked to add a property
    /// first.
    #[error("note has no properties to search with")]
    EmptyQuery,

    /// The network layer could not be reached. Non-fatal: nothing the user
    /// typed is lost, the search can be retried.
    #[error("could not reach the network layer")]
    NetworkUnavailable(#[from] NetworkError),
}
