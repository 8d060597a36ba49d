use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, Waker};

/// Poll a future once, expecting it to be immediately ready.
///
/// A convenience for synchronous contexts (boot code, diagnostics, tests)
/// driving filesystems whose operations complete on the first poll, such
/// as [`MemoryFs`](crate::MemoryFs).
///
/// # Panics
///
/// Panics if the future returns `Poll::Pending`. Futures backed by real
/// device I/O must be driven by an executor instead.
pub fn poll_now<F: Future>(fut: F) -> F::Output {
    let mut fut = pin!(fut);
    let mut cx = Context::from_waker(Waker::noop());
    match fut.as_mut().poll(&mut cx) {
        Poll::Ready(val) => val,
        Poll::Pending => panic!("VFS future returned Pending, drive it with an executor"),
    }
}
