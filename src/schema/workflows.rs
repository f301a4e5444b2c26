//! GitHub Actions workflow keywords
//!
//! Keys allowed at each level of a workflow file. Anything outside these
//! tables is reported by the schema rule.

/// Keys of the workflow root mapping
pub const WORKFLOW_KEYS: &[&str] = &[
    "name",
    "run-name",
    "on",
    "permissions",
    "env",
    "defaults",
    "concurrency",
    "jobs",
];

/// Keys required at the workflow root
pub const REQUIRED_WORKFLOW_KEYS: &[&str] = &["on", "jobs"];

/// Keys of a job that runs its own steps
pub const NORMAL_JOB_KEYS: &[&str] = &[
    "name",
    "permissions",
    "needs",
    "if",
    "runs-on",
    "environment",
    "concurrency",
    "outputs",
    "env",
    "defaults",
    "steps",
    "timeout-minutes",
    "strategy",
    "continue-on-error",
    "container",
    "services",
];

/// Keys of a job calling a reusable workflow
pub const REUSABLE_JOB_KEYS: &[&str] = &[
    "name",
    "uses",
    "with",
    "secrets",
    "needs",
    "if",
    "permissions",
    "concurrency",
    "strategy",
];

/// Keys of a workflow step
pub const STEP_KEYS: &[&str] = &[
    "id",
    "if",
    "name",
    "uses",
    "run",
    "working-directory",
    "shell",
    "with",
    "env",
    "continue-on-error",
    "timeout-minutes",
];

/// Check if a key is allowed at the workflow root
pub fn is_workflow_key(key: &str) -> bool {
    WORKFLOW_KEYS.contains(&key)
}

/// Check if a key is allowed in a job
pub fn is_job_key(key: &str, reusable: bool) -> bool {
    if reusable {
        REUSABLE_JOB_KEYS.contains(&key)
    } else {
        NORMAL_JOB_KEYS.contains(&key)
    }
}

/// Check if a key is allowed in a workflow step
pub fn is_step_key(key: &str) -> bool {
    STEP_KEYS.contains(&key)
}
