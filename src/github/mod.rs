//! GitHub API operations using octocrab.

pub mod auth;
pub mod client;
pub mod commits;
pub mod pagination;
pub mod repos;

pub use auth::{Account, AuthSession, Credential, Profile, discover_token};
pub use client::{ApiResponse, GitHubClient};
pub use commits::{CommitHistoryFetcher, CommitRecord};
pub use pagination::{Listing, ListingStatus, MAX_PER_PAGE, PageRequest, TruncationReason};
pub use repos::{RepositoryCatalog, RepositoryRef};
