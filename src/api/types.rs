use serde::Serialize;

/// Envelope shared by every JSON response.
///
/// Failures carry only `success: false` and a `message`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            count: None,
            data: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// List response with `count` set to the number of rows.
    pub fn list(data: Vec<T>) -> Self {
        Self {
            success: true,
            message: None,
            count: Some(data.len()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            data: None,
        }
    }
}

/// Envelope for endpoints whose payload fields sit next to `success`
/// (`{"success": true, "token": .., "user": ..}`, `{"success": true, "items": [..]}`).
#[derive(Debug, Serialize)]
pub struct FlatResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> FlatResponse<T> {
    pub const fn new(body: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            body,
        }
    }

    pub fn with_message(message: impl Into<String>, body: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            body,
        }
    }

    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}
