//! GitHub Actions action metadata keywords

/// Keys of the `action.yml` root mapping
pub const ACTION_KEYS: &[&str] = &[
    "name",
    "author",
    "description",
    "inputs",
    "outputs",
    "runs",
    "branding",
];

/// Keys required at the action root
pub const REQUIRED_ACTION_KEYS: &[&str] = &["name", "description", "runs"];

/// Keys of `runs` for `using: composite`
pub const COMPOSITE_RUNS_KEYS: &[&str] = &["using", "steps"];

/// Keys of `runs` for `using: node*`
pub const JAVASCRIPT_RUNS_KEYS: &[&str] = &[
    "using", "main", "pre", "pre-if", "post", "post-if",
];

/// Keys of `runs` for `using: docker`
pub const DOCKER_RUNS_KEYS: &[&str] = &[
    "using",
    "image",
    "env",
    "args",
    "entrypoint",
    "pre-entrypoint",
    "pre-if",
    "post-entrypoint",
    "post-if",
];

/// Keys of a composite action step
pub const COMPOSITE_STEP_KEYS: &[&str] = &[
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
];

pub fn is_action_key(key: &str) -> bool {
    ACTION_KEYS.contains(&key)
}

pub fn is_composite_step_key(key: &str) -> bool {
    COMPOSITE_STEP_KEYS.contains(&key)
}

/// Allowed `runs` keys for a `using` value
pub fn runs_keys(using: &str) -> &'static [&'static str] {
    match using {
        "composite" => COMPOSITE_RUNS_KEYS,
        "docker" => DOCKER_RUNS_KEYS,
        _ => JAVASCRIPT_RUNS_KEYS,
    }
}
