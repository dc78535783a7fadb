use serde::{Deserialize, Serialize};

/// Response from the list-repositories and list-indexable-repositories
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoListResponse {
    /// Repository identifiers, in service order.
    pub repos: Vec<String>,
}
