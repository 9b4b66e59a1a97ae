//! Tower middleware.

pub mod request_id;
