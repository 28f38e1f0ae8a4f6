//! Shared test utilities and stub suppliers.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use intentflow::error::FetchError;
use intentflow::source::RemoteResponse;
use parking_lot::Mutex;
use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Find a port nothing listens on.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

/// Records which suppliers ran, in order.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl CallLog {
    pub fn record(&self, name: &'static str) {
        self.calls.lock().push(name);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }
}

/// Counts invocations of a stub.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicU32>);

impl Counter {
    pub fn bump(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn connection_refused() -> FetchError {
    FetchError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ))
}

pub fn remote_ok<T>(value: T) -> Result<RemoteResponse<T>, FetchError> {
    Ok(RemoteResponse::ok(value))
}
