//! Upstream calendar clients for the two activity sources.
//!
//! Both clients expose the same contract: fetch a mapping from calendar date
//! to activity count for an inclusive date window. Responses with missing or
//! unexpected fields decode to an empty mapping rather than an error; only
//! transport failures and bodies that are not JSON at all surface as
//! [`SourceError`].

mod error;
pub mod github;
pub mod leetcode;

pub use error::SourceError;
pub use github::GithubClient;
pub use leetcode::LeetCodeClient;
