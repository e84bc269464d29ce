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


//! [`Sender`] and [`Receiver`] over a duplex byte stream.

use std::pin::pin;
use std::sync::{Mutex, PoisonError};

use futures::channel::oneshot;
use futures::future::{self, Either, FutureExt, Shared};
use futures::lock::Mutex as AsyncMutex;
use futures::{AsyncRead, AsyncWrite, AsyncWriteExt};

use capnp::message::{self, HeapAllocator, ReaderOptions};
use capnp::serialize::{self, OwnedSegments};
use capnp_futures::serialize::{try_read_message, write_message};

use crate::stream::{Features, StreamControl};
use crate::{rpc_capnp, Context, Error, IncomingMessage, OutgoingMessage, Receiver, Result, Sender};

const SEND_CLOSED: u8 = 1;
const RECV_CLOSED: u8 = 2;
const FULLY_CLOSED: u8 = SEND_CLOSED | RECV_CLOSED;

fn send_closed_error() -> Error {
    Error::failed("rpc stream transport: send on closed sender".to_string())
}

fn recv_closed_error() -> Error {
    Error::failed("rpc stream transport: receive on closed receiver".to_string())
}

/// How a blocked receive is interrupted by `close_recv()`.
enum ReceiveStrategy {
    /// The stream can shut down its read half, which fails the blocked read.
    CloseRead,

    /// The decode is raced against a one-shot close signal.
    Signal {
        trigger: Mutex<Option<oneshot::Sender<()>>>,
        closed: Shared<oneshot::Receiver<()>>,
    },
}

/// A transport that frames envelopes onto a byte stream.
///
/// `input` and `output` are the two directions of the stream and `control`
/// gives access to whatever out-of-band operations the stream supports (see
/// [`StreamControl`]). The supported features are queried once, here.
///
/// When the stream cannot shut down its read half, `close_recv()` makes a
/// blocked `recv_message()` return immediately, but the partially read frame
/// is abandoned and the underlying stream is only released when the connection
/// itself is closed (by `close_send()` after `close_recv()`, or by dropping the
/// transport). No stronger guarantee is possible without a read shutdown
/// primitive.
pub struct StreamTransport<R, W, C> {
    // Each half has its own lock: a pending receive must never hold up a send.
    input: AsyncMutex<R>,
    output: AsyncMutex<W>,
    control: C,
    features: Features,
    options: ReaderOptions,
    receive: ReceiveStrategy,

    // Bit 0 is set once the sending half is closed, bit 1 once the receiving half is.
    closes: Mutex<u8>,
}

impl<R, W, C> StreamTransport<R, W, C>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    C: StreamControl,
{
    pub fn new(input: R, output: W, control: C) -> Self {
        Self::with_options(input, output, control, ReaderOptions::new())
    }

    /// Like `new()`, with explicit limits for decoding incoming messages.
    pub fn with_options(input: R, output: W, control: C, options: ReaderOptions) -> Self {
        let features = control.features();
        let receive = if features.close_read {
            ReceiveStrategy::CloseRead
        } else {
            let (trigger, closed) = oneshot::channel();
            ReceiveStrategy::Signal {
                trigger: Mutex::new(Some(trigger)),
                closed: closed.shared(),
            }
        };
        tracing::debug!(?features, "rpc stream transport created");
        Self {
            input: AsyncMutex::new(input),
            output: AsyncMutex::new(output),
            control,
            features,
            options,
            receive,
            closes: Mutex::new(0),
        }
    }

    pub fn features(&self) -> Features {
        self.features
    }

    fn is_closed(&self, bit: u8) -> bool {
        *self.closes.lock().unwrap_or_else(PoisonError::into_inner) & bit != 0
    }

    /// Sets `bit` in the close mask. Returns whether both halves are now closed,
    /// or `None` if `bit` was already set.
    fn mark_closed(&self, bit: u8) -> Option<bool> {
        let mut closes = self.closes.lock().unwrap_or_else(PoisonError::into_inner);
        if *closes & bit != 0 {
            return None;
        }
        *closes |= bit;
        Some(*closes == FULLY_CLOSED)
    }

    /// Runs the final close if this call closed the last half, and picks the
    /// error to report.
    fn finish_close(
        &self,
        half: &str,
        half_result: std::io::Result<()>,
        fully_closed: bool,
    ) -> Result<()> {
        if !fully_closed {
            return half_result.map_err(Error::from);
        }
        tracing::debug!("rpc stream transport fully closed");
        let close_result = self.control.close();
        match (half_result, close_result) {
            (Err(e), Err(suppressed)) => {
                tracing::warn!(
                    error = %suppressed,
                    "ignoring stream close error after failed {half} close"
                );
                Err(e.into())
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e.into()),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    async fn decode(&self) -> Result<Option<message::Reader<OwnedSegments>>> {
        let mut input = self.input.lock().await;
        try_read_message(&mut *input, self.options).await
    }
}

/// An envelope being built on a [`StreamTransport`].
pub struct Outgoing<'a, R, W, C> {
    transport: &'a StreamTransport<R, W, C>,
    context: Context,
    message: message::Builder<HeapAllocator>,
}

impl<R, W, C> OutgoingMessage for Outgoing<'_, R, W, C>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    C: StreamControl,
{
    fn get_body(&mut self) -> Result<rpc_capnp::message::Builder<'_>> {
        self.message.get_root()
    }

    async fn send(self) -> Result<()> {
        let transport = self.transport;
        if transport.is_closed(SEND_CLOSED) {
            return Err(send_closed_error());
        }
        let mut output = transport.output.lock().await;
        if transport.features.write_deadline {
            // A stream that refuses the deadline still gets the message.
            if let Err(e) = transport.control.set_write_deadline(self.context.deadline()) {
                tracing::warn!(error = %e, "failed to set write deadline");
            }
        }
        write_message(&mut *output, &self.message).await?;
        output.flush().await?;
        tracing::debug!(
            words = serialize::compute_serialized_size_in_words(&self.message),
            "sent rpc message"
        );
        Ok(())
    }

    fn abandon(self) {
        tracing::trace!(
            words = serialize::compute_serialized_size_in_words(&self.message),
            "abandoned rpc message"
        );
    }

    fn size_in_words(&self) -> usize {
        serialize::compute_serialized_size_in_words(&self.message)
    }
}

impl<R, W, C> Sender for StreamTransport<R, W, C>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    C: StreamControl,
{
    type Outgoing<'a> = Outgoing<'a, R, W, C> where Self: 'a;

    fn new_message(&self, ctx: &Context) -> Result<Self::Outgoing<'_>> {
        if self.is_closed(SEND_CLOSED) {
            return Err(send_closed_error());
        }
        let mut message = message::Builder::new_default();
        message.init_root::<rpc_capnp::message::Builder<'_>>();
        Ok(Outgoing {
            transport: self,
            context: ctx.clone(),
            message,
        })
    }

    fn close_send(&self) -> Result<()> {
        let Some(fully_closed) = self.mark_closed(SEND_CLOSED) else {
            return Err(Error::failed(
                "rpc stream transport: sender already closed".to_string(),
            ));
        };
        tracing::debug!("rpc stream transport: closing send");
        let half_result = if self.features.close_write {
            self.control.close_write()
        } else {
            Ok(())
        };
        self.finish_close("write", half_result, fully_closed)
    }
}

/// An envelope read from a [`StreamTransport`]. It owns its segments, so it
/// stays valid after later receives.
pub struct Incoming {
    message: message::Reader<OwnedSegments>,
}

impl Incoming {
    pub fn into_inner(self) -> message::Reader<OwnedSegments> {
        self.message
    }
}

impl IncomingMessage for Incoming {
    fn get_body(&self) -> Result<rpc_capnp::message::Reader<'_>> {
        self.message.get_root()
    }
}

impl<R, W, C> Receiver for StreamTransport<R, W, C>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    C: StreamControl,
{
    type Incoming = Incoming;

    async fn recv_message(&self, _ctx: &Context) -> Result<Incoming> {
        if self.is_closed(RECV_CLOSED) {
            return Err(recv_closed_error());
        }
        let decoded = match &self.receive {
            ReceiveStrategy::CloseRead => self.decode().await,
            ReceiveStrategy::Signal { closed, .. } => {
                match future::select(pin!(self.decode()), closed.clone()).await {
                    Either::Left((decoded, _)) => decoded,
                    Either::Right(_) => {
                        tracing::debug!("receive interrupted by close");
                        return Err(recv_closed_error());
                    }
                }
            }
        };
        match decoded? {
            Some(message) => {
                let incoming = Incoming { message };
                if tracing::enabled!(tracing::Level::DEBUG) {
                    if let Ok(body) = incoming.get_body() {
                        tracing::debug!(
                            words = incoming.message.size_in_words(),
                            message = ?body,
                            "received rpc message"
                        );
                    }
                }
                Ok(incoming)
            }
            None if self.is_closed(RECV_CLOSED) => Err(recv_closed_error()),
            None => Err(Error::disconnected("Peer disconnected.".to_string())),
        }
    }

    fn close_recv(&self) -> Result<()> {
        let Some(fully_closed) = self.mark_closed(RECV_CLOSED) else {
            return Err(Error::failed(
                "rpc stream transport: receiver already closed".to_string(),
            ));
        };
        tracing::debug!("rpc stream transport: closing receive");
        let half_result = match &self.receive {
            ReceiveStrategy::CloseRead => self.control.close_read(),
            ReceiveStrategy::Signal { trigger, .. } => {
                let trigger = trigger.lock().unwrap_or_else(PoisonError::into_inner).take();
                if let Some(trigger) = trigger {
                    // The receiving end lives in `self`, so this cannot fail.
                    let _ = trigger.send(());
                }
                Ok(())
            }
        };
        self.finish_close("read", half_result, fully_closed)
    }
}
