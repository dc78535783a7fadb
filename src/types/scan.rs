use serde::{Deserialize, Serialize};

/// Request body for the scan endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Absolute or relative path of the repository to index.
    pub repo_path: String,
}

impl ScanRequest {
    /// Create a new `ScanRequest`.
    pub fn new(repo_path: impl Into<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }
}

/// Response from the scan endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    /// The identifier under which the repository was indexed; use it as
    /// the `repo_identifier` of subsequent ask requests.
    pub repo_identifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn request_serialization() {
        let request = ScanRequest::new("/home/user/project");
        assert_eq!(
            to_value(&request).unwrap(),
            json!({"repo_path": "/home/user/project"})
        );
    }

    #[test]
    fn response_deserialization() {
        let json = json!({"repo_identifier": "project"});
        let response: ScanResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.repo_identifier, "project");
    }
}
