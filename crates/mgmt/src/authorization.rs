// Path: crates/mgmt/src/authorization.rs
//! Authorization of incoming management requests.

use crate::control_parameters::ControlParametersBase;
use futures::future::BoxFuture;
use futures::FutureExt;
use ndn_types::{Interest, Name};

/// How to reply when authorization rejects a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReply {
    /// Do not reply.
    Silent,
    /// Reply with a ControlResponse whose StatusCode is 403.
    Status403,
}

/// The outcome of an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    /// The request proceeds; `requester` is recorded for logging only.
    Accept {
        /// Who the requester is, per the authorization function.
        requester: String,
    },
    /// The request is rejected.
    Reject(RejectReply),
}

/// An asynchronous authorization function.
///
/// Receives the top-level prefix (so a single function can scope its
/// decision per namespace), the incoming Interest, and the parsed
/// parameters for ControlCommands (`None` otherwise).
pub type Authorization = Box<
    dyn for<'a> Fn(
            &'a Name,
            &'a Interest,
            Option<&'a dyn ControlParametersBase>,
        ) -> BoxFuture<'a, AuthorizationResult>
        + Send
        + Sync,
>;

/// An authorization accepting every request, with an empty requester.
pub fn make_accept_all_authorization() -> Authorization {
    Box::new(|_prefix, _interest, _params| {
        async {
            AuthorizationResult::Accept {
                requester: String::new(),
            }
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accept_all_accepts() {
        let authorize = make_accept_all_authorization();
        let interest = Interest::new(Name::from_uri("/x").unwrap());
        let result = authorize(&Name::from_uri("/top").unwrap(), &interest, None).await;
        assert_eq!(
            result,
            AuthorizationResult::Accept {
                requester: String::new()
            }
        );
    }
}
