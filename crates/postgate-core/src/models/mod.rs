//! Records returned by the Resource API.

pub mod post;

pub use post::Post;
