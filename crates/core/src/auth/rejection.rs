//! Wire shape of access-control failures.
//!
//! ```json
//! { "code": 401, "title": "Unauthorized", "message": "The request you have made requires authentication." }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys of [`ErrorBody`] that extra context can never overwrite.
pub const RESERVED_KEYS: [&str; 3] = ["code", "title", "message"];

/// Three-field error body returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub title: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: u16, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Merge `context` into the body. Reserved keys in `context` are dropped.
    pub fn with_context(self, mut context: Map<String, Value>) -> Value {
        context.insert("code".to_string(), Value::from(self.code));
        context.insert("title".to_string(), Value::from(self.title));
        context.insert("message".to_string(), Value::from(self.message));
        Value::Object(context)
    }
}

/// Access-control rejection kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Unauthenticated,
    Forbidden,
}

impl Rejection {
    pub fn status_code(self) -> u16 {
        match self {
            Rejection::Unauthenticated => 401,
            Rejection::Forbidden => 403,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Rejection::Unauthenticated => "Unauthorized",
            Rejection::Forbidden => "Forbidden",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Rejection::Unauthenticated => "The request you have made requires authentication.",
            Rejection::Forbidden => {
                "The provided credentials were accepted, but were not sufficient to access this resource."
            }
        }
    }

    pub fn body(self) -> ErrorBody {
        ErrorBody::new(self.status_code(), self.title(), self.message())
    }

    pub fn body_with(self, context: Map<String, Value>) -> Value {
        self.body().with_context(context)
    }
}
