use std::fmt;
use std::mem;

use bytes::Bytes;
use http::{HeaderMap, Response, response::Parts};

/// Produces the body of a deferred response.
pub type Renderer = Box<dyn FnOnce() -> Bytes + Send>;

/// Runs once the body of a response is known.
pub type PostRenderCallback = Box<dyn FnOnce(&mut Parts, &Bytes) + Send>;

enum ResponseBody {
    Rendered(Bytes),
    Unrendered(Renderer),
}

/// Response whose body may not be produced yet.
///
/// Template-style responses render lazily: headers are patched first and the
/// body exists only after [`render`](Self::render). Work that needs the body
/// (an `ETag`) registers a [`PostRenderCallback`]. Callbacks run exactly once,
/// in registration order, right after rendering; a callback added to an
/// already rendered response runs immediately.
pub struct CacheableHttpResponse {
    parts: Parts,
    body: ResponseBody,
    callbacks: Vec<PostRenderCallback>,
}

impl CacheableHttpResponse {
    /// Wraps a response whose body is already known.
    pub fn from_response(response: Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            parts,
            body: ResponseBody::Rendered(body),
            callbacks: Vec::new(),
        }
    }

    /// Creates a response whose body is produced by `renderer` on first render.
    pub fn deferred<F>(parts: Parts, renderer: F) -> Self
    where
        F: FnOnce() -> Bytes + Send + 'static,
    {
        Self {
            parts,
            body: ResponseBody::Unrendered(Box::new(renderer)),
            callbacks: Vec::new(),
        }
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Mutable response headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.parts.headers
    }

    /// Response head.
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// Returns `true` once the body exists.
    pub fn is_rendered(&self) -> bool {
        matches!(self.body, ResponseBody::Rendered(_))
    }

    /// The body, if rendered.
    pub fn body(&self) -> Option<&Bytes> {
        match &self.body {
            ResponseBody::Rendered(body) => Some(body),
            ResponseBody::Unrendered(_) => None,
        }
    }

    /// Registers work to run once the body is known.
    pub fn add_post_render_callback<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut Parts, &Bytes) + Send + 'static,
    {
        match &self.body {
            ResponseBody::Rendered(body) => callback(&mut self.parts, body),
            ResponseBody::Unrendered(_) => self.callbacks.push(Box::new(callback)),
        }
    }

    /// Renders the body if needed and returns it. Rendering happens once.
    pub fn render(&mut self) -> Bytes {
        let body = match mem::replace(&mut self.body, ResponseBody::Rendered(Bytes::new())) {
            ResponseBody::Rendered(body) => body,
            ResponseBody::Unrendered(renderer) => {
                let body = renderer();
                for callback in self.callbacks.drain(..) {
                    callback(&mut self.parts, &body);
                }
                body
            }
        };
        self.body = ResponseBody::Rendered(body.clone());
        body
    }

    /// Renders if needed and returns the finished response.
    pub fn into_response(mut self) -> Response<Bytes> {
        let body = self.render();
        Response::from_parts(self.parts, body)
    }
}

impl From<Response<Bytes>> for CacheableHttpResponse {
    fn from(response: Response<Bytes>) -> Self {
        Self::from_response(response)
    }
}

impl fmt::Debug for CacheableHttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheableHttpResponse")
            .field("parts", &self.parts)
            .field("body", &self.body())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
