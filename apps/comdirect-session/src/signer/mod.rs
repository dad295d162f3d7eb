//! Request signing and response classification.
//!
//! Builds the per-request headers (bearer token, correlation ids, TAN
//! challenge references) and maps every HTTP response onto an
//! [`Outcome`](crate::error::Outcome). No I/O happens here.

mod classify;
mod context;
mod headers;

pub use classify::{classify, error_message};
pub use context::{
    Challenge, CorrelationContext, REQUEST_ID_WIDTH, TokenPair, request_id_from_millis,
};
pub use headers::{
    ACCEPT, AUTHENTICATION, AUTHENTICATION_INFO, AUTHORIZATION, CONTENT_TYPE, HeaderFlavor,
    HeaderSet, REQUEST_INFO, SignerError, TAN_FREE_MARKER, build_headers, form_headers,
};
