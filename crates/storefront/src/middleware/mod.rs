//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors, binary only)
//! 2. `TraceLayer` (request spans with a `request_id` field)
//! 3. Request ID (add unique ID to each request)
//! 4. Session lock (one request per session at a time)
//! 5. Session layer (tower-sessions with in-memory store)
//! 6. Security headers (CSP, framing, referrer)

pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_lock;

pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use session_lock::{SessionLocks, session_lock_middleware};
