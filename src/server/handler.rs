//! The request handler contract and registry types.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::server::error::Error;
use crate::server::response::HttpResponse;

/// What a handler did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler populated the response.
    Served,
    /// The handler could not serve the target; the dispatcher answers 404.
    Declined,
}

/// Type alias for the boxed future returned by [`RequestHandler::handle`].
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<Outcome, Error>> + Send + 'a>>;

/// A unit of logic bound to exactly one path.
///
/// Handlers populate the response in place and report an [`Outcome`].
/// Returning an error surfaces as a 500 with the error's diagnostic text in
/// the body; this server is a debugging aid and deliberately exposes that
/// detail to the client.
pub trait RequestHandler: Send + Sync {
    fn handle<'a>(
        &'a self,
        request: &'a HttpRequest,
        response: &'a mut HttpResponse,
    ) -> HandlerFuture<'a>;
}

/// Path-keyed handler registry, shared between registration and dispatch.
pub type HandlerMap = HashMap<String, Arc<dyn RequestHandler>>;
