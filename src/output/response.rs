// response.rs - Response body for a tree request

use serde::{Deserialize, Serialize};

use crate::core::pipeline::{PipelineOutput, StageFailure};

/// Message returned for a health check
pub const HEALTH_MESSAGE: &str = "Welcome to the Bioinformatics Phylogenetic Tree API";

/// `{message, newick_tree?, error?}` as returned to service clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub newick_tree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl TreeResponse {
    pub fn health() -> Self {
        Self {
            message: HEALTH_MESSAGE.to_string(),
            newick_tree: None,
            error: None,
        }
    }

    /// Build from a pipeline result; `source` names the input (e.g. a file)
    pub fn from_result(result: &Result<PipelineOutput, StageFailure>, source: Option<&str>) -> Self {
        match result {
            Ok(output) => Self {
                message: match source {
                    Some(name) => format!("Phylogenetic tree constructed successfully from {}", name),
                    None => "Phylogenetic tree constructed successfully".to_string(),
                },
                newick_tree: Some(output.newick.clone()),
                error: None,
            },
            Err(failure) => Self {
                message: failure.stage.failure_message().to_string(),
                newick_tree: None,
                error: Some(format!("{}: {}", failure.kind, failure.message)),
            },
        }
    }

    /// HTTP status a service would answer with for this result
    pub fn status_for(result: &Result<PipelineOutput, StageFailure>) -> u16 {
        match result {
            Ok(_) => 200,
            Err(failure) => failure.http_status(),
        }
    }

    pub fn to_json(&self) -> String {
        // Serialising plain strings cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::Pipeline;

    #[test]
    fn test_success_response() {
        let result = Pipeline::default().run_fasta(">a\nACGT\n>b\nACGA\n>c\nTCGA\n");
        let response = TreeResponse::from_result(&result, Some("seqs.fasta"));
        assert!(response.message.ends_with("from seqs.fasta"));
        assert!(response.newick_tree.as_deref().unwrap().ends_with(';'));
        assert!(response.error.is_none());
        assert_eq!(TreeResponse::status_for(&result), 200);

        let json = response.to_json();
        assert!(json.contains("\"newick_tree\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_failure_response() {
        let result = Pipeline::default().run_fasta(">a\nACGT\n>b\nACG\n");
        let response = TreeResponse::from_result(&result, None);
        assert_eq!(response.message, "MSA failed");
        assert!(response.error.as_deref().unwrap().starts_with("InputError"));
        assert_eq!(TreeResponse::status_for(&result), 400);

        let parsed: TreeResponse = serde_json::from_str(&response.to_json()).unwrap();
        assert_eq!(parsed, response);
        assert!(parsed.newick_tree.is_none());
    }

    #[test]
    fn test_health() {
        assert_eq!(TreeResponse::health().message, HEALTH_MESSAGE);
    }
}
