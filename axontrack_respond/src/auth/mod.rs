mod service;
mod types;

pub use service::{AuthService, Clock, SystemClock};
pub use types::{ACCESS_TOKEN_EXPIRES_KEY, ACCESS_TOKEN_KEY, CachedToken, REFRESH_SKEW, is_valid};
