//! Retry module
//! - policy.rs: status classification and exponential delays
//! - fetcher.rs: the retrying HTTP sender built on the policy

pub mod fetcher;
pub mod policy;

pub use fetcher::BackoffFetcher;
pub use policy::RetryPolicy;
