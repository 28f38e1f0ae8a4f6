//! Stable numeric codes produced by the classifier.
//!
//! Transport statuses keep their HTTP value; everything else lives in the
//! 1000 range.

pub const UNAUTHORIZED: i32 = 401;
pub const FORBIDDEN: i32 = 403;
pub const NOT_FOUND: i32 = 404;
pub const REQUEST_TIMEOUT: i32 = 408;
pub const INTERNAL_SERVER_ERROR: i32 = 500;
pub const BAD_GATEWAY: i32 = 502;
pub const SERVICE_UNAVAILABLE: i32 = 503;
pub const GATEWAY_TIMEOUT: i32 = 504;

pub const NETWORK_ERROR: i32 = 1000;
pub const NETWORK_TIMEOUT: i32 = 1001;
pub const SOCKET_EXCEPTION: i32 = 1002;
pub const JSON_ERROR: i32 = 1003;
pub const NULL_POINTER: i32 = 1004;
pub const INDEX_OUT_OF_BOUNDS: i32 = 1005;
pub const CLASS_CAST: i32 = 1006;
pub const NO_CACHED_DATA: i32 = 1007;

pub const UNKNOWN_ERROR: i32 = -1;
