pub mod candidate;
pub mod user;
