mod client;
mod types;

pub use client::GitLabClient;
pub use types::{branch_names, merge_request_iids, Author, Branch, BranchCommit, MergeRequest};
