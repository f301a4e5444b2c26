//! Fault isolation for rules
//!
//! A panicking rule must not take the rest of the analysis down with it.
//! [`SafeRule`] runs the wrapped rule under `catch_unwind` and turns a panic
//! into a single finding carrying everything needed to debug it.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use tracing::warn;

use crate::model::File;

use super::{Finding, Issue, Rule};

/// Reported when a rule panics instead of returning its findings
pub static RULE_ERRORED: Issue = Issue {
    id: "RuleErrored",
    title: "Rule errored",
    description: "A rule failed while checking this file. Its other findings for the \
                  file are lost. The message holds the panic and, when enabled with \
                  RUST_BACKTRACE, the backtrace.",
    compliant: &[],
    non_compliant: &[],
};

thread_local! {
    /// Set while a wrapped rule runs on this thread
    static ISOLATING: Cell<bool> = const { Cell::new(false) };
    /// Detail of the last panic raised while isolating
    static LAST_PANIC: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !ISOLATING.with(Cell::get) {
                previous(info);
                return;
            }
            let backtrace = Backtrace::capture();
            let detail = match backtrace.status() {
                BacktraceStatus::Captured => format!("{info}\n\n{backtrace}"),
                _ => info.to_string(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(detail));
        }));
    });
}

/// Wraps a rule so a panic becomes a `RuleErrored` finding
pub struct SafeRule {
    inner: Box<dyn Rule>,
    name: String,
}

impl SafeRule {
    pub fn new(inner: Box<dyn Rule>) -> Self {
        let name = format!("SafeRule({})", inner.name());
        Self { inner, name }
    }

    pub fn inner(&self) -> &dyn Rule {
        self.inner.as_ref()
    }

    fn errored(&self, file: &File, payload: Box<dyn Any + Send>) -> Finding {
        let detail = LAST_PANIC.with(|slot| slot.borrow_mut().take());
        let mut message = format!(
            "Rule {} errored: {}",
            self.inner.name(),
            payload_message(payload.as_ref())
        );
        if let Some(detail) = detail {
            message.push_str("\n\n");
            message.push_str(&detail);
        }
        let message = neutralize_fences(&message);

        // Classification may be what panicked; fall back to the raw file.
        let location = panic::catch_unwind(AssertUnwindSafe(|| file.content().location()))
            .unwrap_or_else(|_| file.location());

        Finding::new(self.name.clone(), &RULE_ERRORED, location, message)
    }
}

impl Rule for SafeRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn issues(&self) -> Vec<&'static Issue> {
        let mut issues = self.inner.issues();
        issues.push(&RULE_ERRORED);
        issues
    }

    fn check(&mut self, file: &File) -> Vec<Finding> {
        install_panic_hook();
        LAST_PANIC.with(|slot| slot.borrow_mut().take());

        let was_isolating = ISOLATING.with(|flag| flag.replace(true));
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.inner.check(file)));
        ISOLATING.with(|flag| flag.set(was_isolating));

        match result {
            Ok(findings) => findings,
            Err(payload) => {
                warn!("Rule {} panicked while checking {}", self.inner.name(), file.path());
                vec![self.errored(file, payload)]
            }
        }
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Break Markdown code fences so the message renders inside reports
fn neutralize_fences(message: &str) -> String {
    message.replace("```", "'''")
}
