// Simple in-memory byte stream, with half-close.

use std::pin::Pin;
use std::sync::{Arc, Mutex};

use futures::{AsyncRead, AsyncWrite};
use std::task::{Poll, Waker};

#[derive(Debug)]
struct Inner {
    buffer: Vec<u8>,
    write_cursor: usize,
    read_cursor: usize,
    write_end_closed: bool,
    read_end_closed: bool,
    read_waker: Option<Waker>,
    write_waker: Option<Waker>,
}

impl Inner {
    fn new() -> Self {
        Self {
            buffer: vec![0; 8096],
            write_cursor: 0,
            read_cursor: 0,
            write_end_closed: false,
            read_end_closed: false,
            read_waker: None,
            write_waker: None,
        }
    }

    fn close_write_end(&mut self) {
        self.write_end_closed = true;
        if let Some(read_waker) = self.read_waker.take() {
            read_waker.wake();
        }
    }

    fn close_read_end(&mut self) {
        self.read_end_closed = true;
        if let Some(read_waker) = self.read_waker.take() {
            read_waker.wake();
        }
        if let Some(write_waker) = self.write_waker.take() {
            write_waker.wake();
        }
    }
}

pub struct Sender {
    inner: Arc<Mutex<Inner>>,
}

impl Sender {
    pub fn handle(&self) -> Handle {
        Handle {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        self.inner.lock().unwrap().close_write_end();
    }
}

pub struct Receiver {
    inner: Arc<Mutex<Inner>>,
}

impl Receiver {
    pub fn handle(&self) -> Handle {
        Handle {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        self.inner.lock().unwrap().close_read_end();
    }
}

/// Shuts down either end of a channel without owning it.
#[derive(Clone)]
pub struct Handle {
    inner: Arc<Mutex<Inner>>,
}

impl Handle {
    /// The reader sees end of stream immediately, even if it is blocked or
    /// bytes are still buffered. Writes fail from now on.
    pub fn shutdown_read(&self) {
        self.inner.lock().unwrap().close_read_end();
    }

    /// The reader sees end of stream once the buffered bytes are drained.
    /// Writes fail from now on.
    pub fn shutdown_write(&self) {
        self.inner.lock().unwrap().close_write_end();
    }

    pub fn is_read_shut_down(&self) -> bool {
        self.inner.lock().unwrap().read_end_closed
    }

    pub fn is_write_shut_down(&self) -> bool {
        self.inner.lock().unwrap().write_end_closed
    }
}

pub fn channel() -> (Sender, Receiver) {
    let inner = Arc::new(Mutex::new(Inner::new()));
    let sender = Sender {
        inner: inner.clone(),
    };
    let receiver = Receiver { inner };
    (sender, receiver)
}

/// Two connected endpoints. Each is a `(reader, writer)` pair; bytes written on
/// one side are read on the other.
pub fn duplex() -> ((Receiver, Sender), (Receiver, Sender)) {
    let (a_to_b, b_from_a) = channel();
    let (b_to_a, a_from_b) = channel();
    ((a_from_b, a_to_b), (b_from_a, b_to_a))
}

impl AsyncRead for Receiver {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut futures::task::Context,
        buf: &mut [u8],
    ) -> futures::task::Poll<Result<usize, futures::io::Error>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.read_end_closed {
            Poll::Ready(Ok(0))
        } else if inner.read_cursor == inner.write_cursor {
            if inner.write_end_closed {
                Poll::Ready(Ok(0))
            } else {
                inner.read_waker = Some(cx.waker().clone());
                Poll::Pending
            }
        } else {
            assert!(inner.read_cursor < inner.write_cursor);
            let copy_len = std::cmp::min(buf.len(), inner.write_cursor - inner.read_cursor);
            buf[0..copy_len]
                .copy_from_slice(&inner.buffer[inner.read_cursor..inner.read_cursor + copy_len]);
            inner.read_cursor += copy_len;
            if let Some(write_waker) = inner.write_waker.take() {
                write_waker.wake();
            }
            Poll::Ready(Ok(copy_len))
        }
    }
}

impl AsyncWrite for Sender {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut futures::task::Context,
        buf: &[u8],
    ) -> futures::task::Poll<Result<usize, futures::io::Error>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.read_end_closed {
            return Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "read end closed",
            )));
        }
        if inner.write_end_closed {
            return Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "write end closed",
            )));
        }
        if inner.write_cursor == inner.buffer.len() {
            if inner.read_cursor == inner.buffer.len() {
                inner.write_cursor = 0;
                inner.read_cursor = 0;
            } else {
                inner.write_waker = Some(cx.waker().clone());
                return Poll::Pending;
            }
        }

        assert!(inner.write_cursor < inner.buffer.len());

        let copy_len = std::cmp::min(buf.len(), inner.buffer.len() - inner.write_cursor);
        let dest_range = inner.write_cursor..inner.write_cursor + copy_len;
        inner.buffer[dest_range].copy_from_slice(&buf[0..copy_len]);
        inner.write_cursor += copy_len;
        if let Some(read_waker) = inner.read_waker.take() {
            read_waker.wake();
        }
        Poll::Ready(Ok(copy_len))
    }

    fn poll_flush(
        self: Pin<&mut Self>,
        _cx: &mut futures::task::Context,
    ) -> Poll<Result<(), futures::io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(
        self: Pin<&mut Self>,
        _cx: &mut futures::task::Context,
    ) -> Poll<Result<(), futures::io::Error>> {
        self.inner.lock().unwrap().close_write_end();
        Poll::Ready(Ok(()))
    }
}
