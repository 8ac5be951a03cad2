pub mod auth;
pub mod rate_limit;
pub mod recover;
pub mod response;

pub use auth::require_token;
pub use rate_limit::{rate_limit, RateLimiter, SweeperHandle};
pub use recover::{handle_panic, json_method_not_allowed};
pub use response::{ApiResponse, ApiResult};
