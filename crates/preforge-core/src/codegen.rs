//! GraphQL codegen configuration for the frontend.
//!
//! This is data only: the external `graphql-codegen` engine reads it (as
//! `codegen.json`) and does all of the work.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SCHEMA_URL: &str =
    "http://localhost:8000/subgraphs/name/dittoeth/ditto-eth-subgraph";
pub const DEFAULT_OUTPUT_DIR: &str = "./frontend/lib/gql/";
pub const CLIENT_PRESET: &str = "client";

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodegenConfig {
    pub schema: String,
    pub documents: Vec<String>,
    /// Keeps watch mode quiet while no query documents exist yet.
    pub ignore_no_documents: bool,
    pub generates: BTreeMap<String, GenerateTarget>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct GenerateTarget {
    pub preset: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA_URL.to_string(),
            documents: vec![
                "frontend/**/*.tsx".to_string(),
                "frontend/**/*.ts".to_string(),
            ],
            ignore_no_documents: true,
            generates: BTreeMap::from([(
                DEFAULT_OUTPUT_DIR.to_string(),
                GenerateTarget {
                    preset: CLIENT_PRESET.to_string(),
                },
            )]),
        }
    }
}

impl CodegenConfig {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
