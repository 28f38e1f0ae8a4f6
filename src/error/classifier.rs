//! Maps arbitrary failures onto the closed code taxonomy.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::io::ErrorKind as IoKind;

use super::codes;
use super::{FetchError, NetErrorData};

type Matcher = Box<dyn Fn(&(dyn StdError + 'static)) -> bool + Send + Sync>;

struct TypeOverride {
    type_name: &'static str,
    matches: Matcher,
    data: NetErrorData,
}

/// Classifies failures into [`NetErrorData`].
///
/// Classification order, first match wins:
/// 1. caller override registered for the exact error type
/// 2. transport status (and response-envelope business codes)
/// 3. connectivity failures
/// 4. timeouts
/// 5. socket failures
/// 6. payload decoding failures
/// 7. common runtime faults
/// 8. unknown
///
/// Each step inspects the whole source chain before the next step runs.
/// A message override keyed by the resulting code is applied last, except
/// over type overrides.
///
/// Classification is pure: the same input always yields the same output.
#[derive(Default)]
pub struct ErrorClassifier {
    type_overrides: Vec<TypeOverride>,
    message_overrides: HashMap<i32, String>,
}

impl ErrorClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a code and message for every failure of type `E`.
    pub fn register_type<E>(&mut self, code: i32, message: impl Into<String>) -> &mut Self
    where
        E: StdError + 'static,
    {
        self.type_overrides.push(TypeOverride {
            type_name: std::any::type_name::<E>(),
            matches: Box::new(|err: &(dyn StdError + 'static)| err.is::<E>()),
            data: NetErrorData::new(code, message),
        });
        self
    }

    /// Replace the message of any classification that ends up with `code`.
    pub fn register_message(&mut self, code: i32, message: impl Into<String>) -> &mut Self {
        self.message_overrides.insert(code, message.into());
        self
    }

    pub fn classify(&self, error: &(dyn StdError + 'static)) -> NetErrorData {
        if let Some(data) = self.type_override(error) {
            return data;
        }

        let steps: [fn(&(dyn StdError + 'static)) -> Option<NetErrorData>; 6] = [
            classify_status,
            classify_connectivity,
            classify_timeout,
            classify_socket,
            classify_decode,
            classify_runtime,
        ];

        let mut data = steps
            .iter()
            .find_map(|step| chain(error).find_map(step))
            .unwrap_or_else(|| {
                NetErrorData::new(codes::UNKNOWN_ERROR, "An unexpected error occurred")
            });

        if let Some(message) = self.message_overrides.get(&data.code) {
            data.message = message.clone();
        }
        data
    }

    /// Whether a failure is worth retrying.
    pub fn is_retryable(&self, error: &(dyn StdError + 'static)) -> bool {
        self.classify(error).is_network_error()
    }

    fn type_override(&self, error: &(dyn StdError + 'static)) -> Option<NetErrorData> {
        chain(error).find_map(|link| {
            self.type_overrides
                .iter()
                .find(|o| (o.matches)(link))
                .map(|o| {
                    tracing::trace!(error_type = o.type_name, "Type override matched");
                    o.data.clone()
                })
        })
    }
}

impl std::fmt::Debug for ErrorClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorClassifier")
            .field(
                "type_overrides",
                &self.type_overrides.iter().map(|o| o.type_name).collect::<Vec<_>>(),
            )
            .field("message_overrides", &self.message_overrides)
            .finish()
    }
}

fn chain<'a>(
    error: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(error), |e: &&'a (dyn StdError + 'static)| (*e).source())
}

fn status_data(status: u16) -> NetErrorData {
    let code = i32::from(status);
    match code {
        codes::UNAUTHORIZED => NetErrorData::new(code, "Session expired, please sign in again"),
        codes::FORBIDDEN => NetErrorData::new(code, "Access denied"),
        codes::NOT_FOUND => NetErrorData::new(code, "Requested resource was not found"),
        codes::REQUEST_TIMEOUT => NetErrorData::new(code, "Server timed out waiting for the request"),
        codes::INTERNAL_SERVER_ERROR => NetErrorData::new(code, "Internal server error"),
        codes::BAD_GATEWAY => NetErrorData::new(code, "Bad gateway"),
        codes::SERVICE_UNAVAILABLE => NetErrorData::new(code, "Service temporarily unavailable"),
        codes::GATEWAY_TIMEOUT => NetErrorData::new(code, "Gateway timed out"),
        _ => NetErrorData::new(code, format!("Server responded with HTTP {}", status)),
    }
}

fn classify_status(link: &(dyn StdError + 'static)) -> Option<NetErrorData> {
    if let Some(err) = link.downcast_ref::<FetchError>() {
        return match err {
            FetchError::Http { status, .. } => Some(status_data(*status)),
            FetchError::Business { code, message } => {
                Some(NetErrorData::business(*code, message.clone()))
            }
            _ => None,
        };
    }
    link.downcast_ref::<reqwest::Error>()
        .and_then(reqwest::Error::status)
        .map(|status| status_data(status.as_u16()))
}

fn classify_connectivity(link: &(dyn StdError + 'static)) -> Option<NetErrorData> {
    let connect_failed = if let Some(err) = link.downcast_ref::<reqwest::Error>() {
        err.is_connect()
    } else if let Some(err) = link.downcast_ref::<std::io::Error>() {
        matches!(
            err.kind(),
            IoKind::ConnectionRefused
                | IoKind::NotConnected
                | IoKind::AddrNotAvailable
                | IoKind::HostUnreachable
                | IoKind::NetworkUnreachable
        )
    } else {
        false
    };
    connect_failed.then(|| {
        NetErrorData::new(
            codes::NETWORK_ERROR,
            "Network unavailable, please check your connection",
        )
    })
}

fn classify_timeout(link: &(dyn StdError + 'static)) -> Option<NetErrorData> {
    let timed_out = if let Some(err) = link.downcast_ref::<reqwest::Error>() {
        err.is_timeout()
    } else if let Some(err) = link.downcast_ref::<std::io::Error>() {
        err.kind() == IoKind::TimedOut
    } else {
        link.is::<tokio::time::error::Elapsed>()
    };
    timed_out.then(|| NetErrorData::new(codes::NETWORK_TIMEOUT, "Network request timed out"))
}

fn classify_socket(link: &(dyn StdError + 'static)) -> Option<NetErrorData> {
    let socket_failed = if let Some(err) = link.downcast_ref::<reqwest::Error>() {
        err.is_request() || err.is_body()
    } else if let Some(err) = link.downcast_ref::<std::io::Error>() {
        matches!(
            err.kind(),
            IoKind::ConnectionReset
                | IoKind::ConnectionAborted
                | IoKind::BrokenPipe
                | IoKind::UnexpectedEof
        )
    } else {
        false
    };
    socket_failed.then(|| NetErrorData::new(codes::SOCKET_EXCEPTION, "Connection was interrupted"))
}

fn classify_decode(link: &(dyn StdError + 'static)) -> Option<NetErrorData> {
    let decode_failed = link.is::<serde_json::Error>()
        || link
            .downcast_ref::<reqwest::Error>()
            .is_some_and(reqwest::Error::is_decode)
        || matches!(
            link.downcast_ref::<FetchError>(),
            Some(FetchError::MissingPayload)
        );
    decode_failed.then(|| NetErrorData::new(codes::JSON_ERROR, "Failed to read server response"))
}

fn classify_runtime(link: &(dyn StdError + 'static)) -> Option<NetErrorData> {
    match link.downcast_ref::<FetchError>()? {
        FetchError::NullValue(_) => Some(NetErrorData::new(
            codes::NULL_POINTER,
            "A required value was missing",
        )),
        FetchError::OutOfBounds { .. } => Some(NetErrorData::new(
            codes::INDEX_OUT_OF_BOUNDS,
            "Data index out of range",
        )),
        FetchError::TypeMismatch { .. } => Some(NetErrorData::new(
            codes::CLASS_CAST,
            "Data had an unexpected format",
        )),
        FetchError::NotFound => Some(NetErrorData::new(
            codes::NO_CACHED_DATA,
            "No cached data available",
        )),
        _ => None,
    }
}
