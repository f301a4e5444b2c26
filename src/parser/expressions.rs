//! GitHub Actions `${{ ... }}` expression handling

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EXPRESSION_RE: Regex = Regex::new(r"\$\{\{\s*(.*?)\s*\}\}").unwrap();
}

/// A single expression found in a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// The original text of the expression (e.g., "${{ github.ref }}")
    pub original: String,
    /// The trimmed expression body (e.g., "github.ref")
    pub body: String,
    /// Start byte offset in the scanned string
    pub start: usize,
    /// End byte offset in the scanned string
    pub end: usize,
}

impl Expression {
    /// Root context name of the expression (e.g., "github" for "github.event.issue.title")
    pub fn context(&self) -> &str {
        let end = self
            .body
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(self.body.len());
        &self.body[..end]
    }
}

/// Find every `${{ ... }}` expression in `text`, in order of appearance
pub fn find_expressions(text: &str) -> Vec<Expression> {
    EXPRESSION_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = caps.get(1)?;
            Some(Expression {
                original: whole.as_str().to_string(),
                body: body.as_str().to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Whether `text` contains at least one expression
pub fn has_expressions(text: &str) -> bool {
    EXPRESSION_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_single_expression() {
        let found = find_expressions("echo ${{ github.event.issue.title }}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].original, "${{ github.event.issue.title }}");
        assert_eq!(found[0].body, "github.event.issue.title");
        assert_eq!(found[0].context(), "github");
        assert_eq!(found[0].start, 5);
        assert_eq!(found[0].end, 36);
    }

    #[test]
    fn test_find_multiple_expressions() {
        let found = find_expressions("${{env.A}} and ${{ inputs.name }}");
        let bodies: Vec<_> = found.iter().map(|e| e.body.as_str()).collect();
        assert_eq!(bodies, vec!["env.A", "inputs.name"]);
        assert_eq!(found[1].context(), "inputs");
    }

    #[test]
    fn test_no_expressions() {
        assert!(find_expressions("echo $HOME ${VAR}").is_empty());
        assert!(!has_expressions("echo \"Example\""));
        assert!(has_expressions("x ${{ secrets.TOKEN }}"));
    }

    #[test]
    fn test_function_call_context() {
        let found = find_expressions("${{ toJSON(github) }}");
        assert_eq!(found[0].context(), "toJSON");
    }
}
