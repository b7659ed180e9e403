//! Callback resolver
//!
//! Runs in whatever browsing context receives the authorization-server
//! redirect. The decision rule: a context holding a live opener handle is
//! a spawned secondary surface, so it relays the result to its opener and
//! closes itself; a context with no opener is the primary context (the
//! handshake completed in the same tab), so the result is applied locally
//! and the result markers are scrubbed from the address so a reload cannot
//! replay it.

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use tallysync_core::{
    CallbackErrorCode, Envelope, Origin, Provider, RelayMessage, RelayedResult,
};

use crate::broker::ConnectionBroker;
use crate::surface::{InteractionSurface, RelayTarget};

/// Result indicator parsed from the callback query string
///
/// The redirect carries either `success=<provider>` or `error=<code>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackSignal(pub RelayedResult);

impl CallbackSignal {
    /// Parse the result markers out of a callback URL
    ///
    /// Returns `None` when no marker is present, or when a success marker
    /// names an unknown provider (a garbled marker must not produce a
    /// success result).
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut success: Option<String> = None;
        let mut error: Option<String> = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "success" => success = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(marker) = success {
            let provider = Provider::parse(&marker)?;
            return Some(Self(RelayedResult::Success { provider }));
        }
        if let Some(code) = error {
            return Some(Self(RelayedResult::Error {
                provider: None,
                code: CallbackErrorCode::parse(&code),
            }));
        }
        None
    }

    pub fn into_message(self) -> RelayMessage {
        match self.0 {
            RelayedResult::Success { provider } => RelayMessage::success(provider),
            RelayedResult::Error { provider, code } => RelayMessage::error(provider, &code),
        }
    }
}

/// Remove the result markers from a callback URL
///
/// All other query parameters are preserved.
pub fn scrub_markers(url: &Url) -> Url {
    let mut scrubbed = url.clone();
    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "success" && k != "error")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    scrubbed.set_query(None);
    if !remaining.is_empty() {
        scrubbed
            .query_pairs_mut()
            .extend_pairs(remaining.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    scrubbed
}

/// The execution context the redirect landed in
pub struct CallbackContext {
    /// This context's own origin, stamped onto relayed messages
    pub own_origin: Origin,
    /// Handle to the context that spawned this one, when it exists
    pub opener: Option<Arc<dyn RelayTarget>>,
    /// Handle used to close this context after relaying
    pub self_handle: Option<Arc<dyn InteractionSurface>>,
}

/// What the resolver did with the callback
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackDisposition {
    /// Secondary context: message posted to the opener, surface closed
    Relayed,
    /// Primary context: result applied locally; the caller should replace
    /// its address with the scrubbed URL
    Applied { scrubbed: Url },
    /// No result marker present; nothing to do
    NoSignal,
}

/// Resolve an authorization redirect
pub async fn resolve(
    broker: &ConnectionBroker,
    ctx: &CallbackContext,
    url: &Url,
) -> CallbackDisposition {
    let Some(signal) = CallbackSignal::from_url(url) else {
        debug!("[Callback] No result marker in callback URL");
        return CallbackDisposition::NoSignal;
    };

    match &ctx.opener {
        Some(opener) => {
            // Secondary context: relay to the opener, targeted at our own
            // origin, then terminate this surface.
            info!("[Callback] Relaying result to opener context");
            opener.post(Envelope {
                origin: ctx.own_origin.clone(),
                message: signal.into_message(),
            });
            if let Some(handle) = &ctx.self_handle {
                handle.close();
            }
            CallbackDisposition::Relayed
        }
        None => {
            // Same-tab completion: apply through the reconciler's single
            // canonical path, then hand back a replay-proof address.
            info!("[Callback] No opener; applying result locally");
            broker.apply_result(signal.0).await;
            CallbackDisposition::Applied {
                scrubbed: scrub_markers(url),
            }
        }
    }
}
