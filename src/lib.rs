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


//! # Cap'n Proto RPC stream transport
//!
//! The layer of [Cap'n Proto RPC](https://capnproto.org/rpc.html) that sits
//! between a duplex byte stream and a connection's state machine. It provides:
//!
//! * [`rpc_capnp`], typed views over every envelope of the RPC protocol
//!   (calls, returns, capability descriptors, pipelined targets, and the
//!   three-party handoff messages), laid out exactly as on the wire;
//! * [`transport::StreamTransport`], which implements the [`Sender`] and
//!   [`Receiver`] contracts on top of any `AsyncRead`/`AsyncWrite` pair,
//!   framing each envelope with `capnp_futures::serialize`.
//!
//! Messages themselves are ordinary `capnp::message` values, so the encoding
//! is exactly that of the `capnp` crate.
//!
//! Assigning question, answer, export and import IDs is the job of the
//! connection layer that consumes these contracts, not of this crate.
//!
//! ```
//! use capnp_rpc_transport::{rpc_capnp, Context, IncomingMessage, OutgoingMessage, Receiver, Sender};
//! use capnp_rpc_transport::{stream::NoControl, transport::StreamTransport};
//! use futures::io::Cursor;
//!
//! # futures::executor::block_on(async {
//! let out = StreamTransport::new(Cursor::new(Vec::new()), Cursor::new(Vec::new()), NoControl);
//! let mut message = out.new_message(&Context::background())?;
//! message.get_body()?.init_bootstrap().set_question_id(0);
//! message.send().await?;
//! # Ok::<(), capnp::Error>(())
//! # }).unwrap();
//! ```

use std::future::Future;

pub mod context;
pub mod rpc_capnp;
pub mod stream;
pub mod transport;

pub use crate::context::Context;
pub use capnp::{Error, ErrorKind, NotInSchema, Result};

/// An envelope being built for sending.
///
/// Exactly one of `send()` or `abandon()` ends its life; both consume it.
pub trait OutgoingMessage {
    /// Gets the envelope, which the caller fills in through its accessors.
    fn get_body(&mut self) -> Result<rpc_capnp::message::Builder<'_>>;

    /// Frames the envelope and writes it to the stream. The deadline of the
    /// context the message was created with is applied to the write, if the
    /// stream supports deadlines.
    fn send(self) -> impl Future<Output = Result<()>>;

    /// Discards the envelope without writing anything.
    fn abandon(self);

    /// Gets the total size of the message, for flow control purposes.
    fn size_in_words(&self) -> usize;
}

/// The sending half of a transport.
///
/// Sends must not overlap: the caller commits or abandons one message before
/// asking for the next.
pub trait Sender {
    type Outgoing<'a>: OutgoingMessage
    where
        Self: 'a;

    /// Allocates a fresh envelope bound to `ctx`.
    fn new_message(&self, ctx: &Context) -> Result<Self::Outgoing<'_>>;

    /// Shuts down the sending half. Fails if it was already shut down.
    fn close_send(&self) -> Result<()>;
}

/// An envelope received from the stream.
pub trait IncomingMessage {
    fn get_body(&self) -> Result<rpc_capnp::message::Reader<'_>>;
}

/// The receiving half of a transport.
///
/// Receives must not overlap. A receive may run concurrently with any
/// operation of the sending half.
pub trait Receiver {
    type Incoming: IncomingMessage;

    /// Waits for the next complete envelope.
    fn recv_message(&self, ctx: &Context) -> impl Future<Output = Result<Self::Incoming>>;

    /// Shuts down the receiving half. Fails if it was already shut down.
    fn close_recv(&self) -> Result<()>;
}
