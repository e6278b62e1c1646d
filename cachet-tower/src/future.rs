use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Future;
use futures::ready;
use http::{HeaderMap, Response};
use pin_project::pin_project;

/// A header transformation applied to every response.
pub trait HeaderPatch {
    /// Applies the transformation.
    fn apply(&self, headers: &mut HeaderMap);
}

/// Wraps the inner service future and patches the response headers once it
/// resolves. Errors pass through untouched.
#[pin_project]
pub struct PatchHeadersFuture<F, P> {
    #[pin]
    inner: F,
    patch: Arc<P>,
}

impl<F, P> PatchHeadersFuture<F, P> {
    pub(crate) fn new(inner: F, patch: Arc<P>) -> Self {
        Self { inner, patch }
    }
}

impl<F, P, B, E> Future for PatchHeadersFuture<F, P>
where
    F: Future<Output = Result<Response<B>, E>>,
    P: HeaderPatch,
{
    type Output = Result<Response<B>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let mut response = ready!(this.inner.poll(cx))?;
        this.patch.apply(response.headers_mut());
        Poll::Ready(Ok(response))
    }
}
