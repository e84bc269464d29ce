// Copyright (c) 2013-2017 Sandstorm Development Group, Inc. and contributors
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.


//! Optional capabilities of the byte stream underneath a transport.
//!
//! A stream may or may not be able to enforce write deadlines or shut down one
//! direction at a time. The transport asks once, at construction, and falls
//! back to weaker behavior for whatever is missing.

use std::io;
use std::sync::Arc;
use std::time::Instant;

/// What a [`StreamControl`] actually supports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Features {
    pub write_deadline: bool,
    pub close_read: bool,
    pub close_write: bool,
}

impl Features {
    pub const NONE: Features = Features {
        write_deadline: false,
        close_read: false,
        close_write: false,
    };

    pub const ALL: Features = Features {
        write_deadline: true,
        close_read: true,
        close_write: true,
    };
}

/// Out-of-band control over a duplex byte stream.
///
/// Only `close` is mandatory. The other operations are consulted only when
/// `features()` advertises them.
pub trait StreamControl {
    fn features(&self) -> Features {
        Features::NONE
    }

    /// Sets, or with `None` clears, the deadline for subsequent writes.
    fn set_write_deadline(&self, _deadline: Option<Instant>) -> io::Result<()> {
        Err(unsupported("write deadlines"))
    }

    /// Shuts down the read half. A read blocked on the stream must fail or see
    /// end of stream promptly.
    fn close_read(&self) -> io::Result<()> {
        Err(unsupported("closing the read half"))
    }

    /// Shuts down the write half. The peer sees end of stream.
    fn close_write(&self) -> io::Result<()> {
        Err(unsupported("closing the write half"))
    }

    /// Releases the whole stream.
    fn close(&self) -> io::Result<()>;
}

fn unsupported(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("stream does not support {what}"),
    )
}

impl<T: StreamControl + ?Sized> StreamControl for &T {
    fn features(&self) -> Features {
        (**self).features()
    }
    fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        (**self).set_write_deadline(deadline)
    }
    fn close_read(&self) -> io::Result<()> {
        (**self).close_read()
    }
    fn close_write(&self) -> io::Result<()> {
        (**self).close_write()
    }
    fn close(&self) -> io::Result<()> {
        (**self).close()
    }
}

impl<T: StreamControl + ?Sized> StreamControl for Box<T> {
    fn features(&self) -> Features {
        (**self).features()
    }
    fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        (**self).set_write_deadline(deadline)
    }
    fn close_read(&self) -> io::Result<()> {
        (**self).close_read()
    }
    fn close_write(&self) -> io::Result<()> {
        (**self).close_write()
    }
    fn close(&self) -> io::Result<()> {
        (**self).close()
    }
}

impl<T: StreamControl + ?Sized> StreamControl for Arc<T> {
    fn features(&self) -> Features {
        (**self).features()
    }
    fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        (**self).set_write_deadline(deadline)
    }
    fn close_read(&self) -> io::Result<()> {
        (**self).close_read()
    }
    fn close_write(&self) -> io::Result<()> {
        (**self).close_write()
    }
    fn close(&self) -> io::Result<()> {
        (**self).close()
    }
}

/// A stream with no out-of-band control at all. Closing it does nothing; the
/// stream is released when its halves are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoControl;

impl StreamControl for NoControl {
    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Controls a blocking socket, typically wrapped in
/// `futures::io::AllowStdIo<TcpStream>` for the transport's halves.
///
/// The write deadline becomes the socket's `SO_SNDTIMEO`, which only bounds
/// blocking writes. A non-blocking socket driven by an async runtime ignores
/// it, so sends on such a socket are not bounded by the context's deadline.
impl StreamControl for std::net::TcpStream {
    fn features(&self) -> Features {
        Features::ALL
    }

    fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        // A zero timeout is rejected by the socket API, so an expired deadline
        // becomes the smallest representable one.
        let timeout = deadline.map(|deadline| {
            deadline
                .saturating_duration_since(Instant::now())
                .max(std::time::Duration::from_nanos(1))
        });
        self.set_write_timeout(timeout)
    }

    fn close_read(&self) -> io::Result<()> {
        self.shutdown(std::net::Shutdown::Read)
    }

    fn close_write(&self) -> io::Result<()> {
        self.shutdown(std::net::Shutdown::Write)
    }

    fn close(&self) -> io::Result<()> {
        match self.shutdown(std::net::Shutdown::Both) {
            // The peer may already have torn the connection down.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            r => r,
        }
    }
}
