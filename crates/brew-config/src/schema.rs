use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::EvalConfig;

/// JSON schema for the evaluator config file, for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(EvalConfig)
}
