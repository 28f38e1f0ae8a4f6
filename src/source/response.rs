//! Response envelope returned by remote suppliers.

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Code reported for envelope failures that carry no code of their own.
pub const DEFAULT_BUSINESS_CODE: i32 = -2;

/// A remote answer: success flag, optional payload, and a message.
///
/// A response with `success == false` is a failure even though no error
/// was raised while obtaining it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<i32>,
}

impl<T> RemoteResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: String::new(),
            code: None,
        }
    }

    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            code: Some(code),
        }
    }

    /// Payload of a successful response.
    ///
    /// # Errors
    /// [`FetchError::Business`] when the response reports failure,
    /// [`FetchError::MissingPayload`] when it reports success without data.
    pub fn into_result(self) -> Result<T, FetchError> {
        if !self.success {
            return Err(FetchError::Business {
                code: self.code.unwrap_or(DEFAULT_BUSINESS_CODE),
                message: self.message,
            });
        }
        self.data.ok_or(FetchError::MissingPayload)
    }
}
