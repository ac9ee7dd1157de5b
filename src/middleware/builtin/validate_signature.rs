use crate::error::Result;
use crate::http::{Request, Response};
use crate::middleware::{Middleware, NextMiddleware};
use crate::url::{UrlGenerationContext, UrlSigner};
use chrono::Utc;
use std::sync::Arc;

/// Rejects requests whose URL does not carry a valid, unexpired signature
/// produced by the matching [`UrlSigner`].
///
/// With `absolute = true` (blueprint argument `"absolute"`) the signature is
/// verified over the absolute URL including scheme and host; otherwise over
/// path and query only. Invalid or expired signatures short-circuit with
/// `403` — bad request data is normal control flow, not a fault.
pub struct ValidateSignature {
    signer: Arc<dyn UrlSigner>,
    context: UrlGenerationContext,
    absolute: bool,
}

impl ValidateSignature {
    pub fn new(signer: Arc<dyn UrlSigner>, context: UrlGenerationContext, absolute: bool) -> Self {
        Self {
            signer,
            context,
            absolute,
        }
    }

    fn has_valid_signature(&self, request: &Request) -> bool {
        let target = if self.absolute {
            format!(
                "{}{}",
                self.context.base_url(self.context.https_by_default()),
                request.path_with_query()
            )
        } else {
            request.path_with_query()
        };

        // The signature is always the last query parameter we append
        let Some((payload, signature)) = target.rsplit_once("&signature=") else {
            return false;
        };

        let expires = request
            .query("expires")
            .and_then(|raw| raw.parse::<i64>().ok());
        match expires {
            Some(expires) if expires >= Utc::now().timestamp() => {}
            _ => return false,
        }

        self.signer.verify(payload, signature)
    }
}

impl Middleware for ValidateSignature {
    fn handle(&self, request: Request, next: NextMiddleware<'_>) -> Result<Response> {
        if self.has_valid_signature(&request) {
            return Ok(next.handle(request));
        }

        log::warn!(
            "rejected unsigned or expired request to {}",
            request.path()
        );
        Ok(Response::forbidden(Some("Invalid or expired signature")))
    }

    fn name(&self) -> &'static str {
        "validate_signature"
    }
}
