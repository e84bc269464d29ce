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


//! A `StreamControl` over `async_byte_channel` that records what the transport
//! asks of it and can be told to fail.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use async_byte_channel::Handle;
use capnp_rpc_transport::stream::{Features, StreamControl};
use capnp_rpc_transport::transport::StreamTransport;

pub type Transport =
    StreamTransport<async_byte_channel::Receiver, async_byte_channel::Sender, Arc<PipeControl>>;

#[derive(Debug, Default)]
pub struct ControlLog {
    pub deadlines: Vec<Option<Instant>>,
    pub close_reads: u32,
    pub close_writes: u32,
    pub closes: u32,
    pub fail_deadline: bool,
    pub fail_close_read: bool,
    pub fail_close_write: bool,
    pub fail_close: bool,
}

pub struct PipeControl {
    features: Features,
    reader: Handle,
    writer: Handle,
    log: Mutex<ControlLog>,
}

impl PipeControl {
    pub fn log(&self) -> MutexGuard<'_, ControlLog> {
        self.log.lock().unwrap()
    }
}

impl StreamControl for PipeControl {
    fn features(&self) -> Features {
        self.features
    }

    fn set_write_deadline(&self, deadline: Option<Instant>) -> io::Result<()> {
        let mut log = self.log();
        log.deadlines.push(deadline);
        if log.fail_deadline {
            return Err(io::Error::other("set_write_deadline failed"));
        }
        Ok(())
    }

    fn close_read(&self) -> io::Result<()> {
        let mut log = self.log();
        log.close_reads += 1;
        if log.fail_close_read {
            return Err(io::Error::other("close_read failed"));
        }
        self.reader.shutdown_read();
        Ok(())
    }

    fn close_write(&self) -> io::Result<()> {
        let mut log = self.log();
        log.close_writes += 1;
        if log.fail_close_write {
            return Err(io::Error::other("close_write failed"));
        }
        self.writer.shutdown_write();
        Ok(())
    }

    fn close(&self) -> io::Result<()> {
        let mut log = self.log();
        log.closes += 1;
        if log.fail_close {
            return Err(io::Error::other("close failed"));
        }
        self.reader.shutdown_read();
        self.writer.shutdown_write();
        Ok(())
    }
}

fn endpoint(
    (reader, writer): (async_byte_channel::Receiver, async_byte_channel::Sender),
    features: Features,
) -> (Transport, Arc<PipeControl>) {
    let control = Arc::new(PipeControl {
        features,
        reader: reader.handle(),
        writer: writer.handle(),
        log: Mutex::new(ControlLog::default()),
    });
    (
        StreamTransport::new(reader, writer, control.clone()),
        control,
    )
}

/// Two transports connected to each other.
pub fn pair(
    a_features: Features,
    b_features: Features,
) -> (Transport, Arc<PipeControl>, Transport, Arc<PipeControl>) {
    let (a, b) = async_byte_channel::duplex();
    let (a, a_control) = endpoint(a, a_features);
    let (b, b_control) = endpoint(b, b_features);
    (a, a_control, b, b_control)
}
