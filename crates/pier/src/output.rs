//! Colored terminal output on stderr.

use console::{Style, Term};

/// Writes status lines for the user; logs go through `tracing` instead.
pub(crate) struct Output {
    term: Term,
    success: Style,
    warning: Style,
    error: Style,
    detail: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            success: Style::new().green().bold(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            detail: Style::new().dim(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(None, msg);
    }

    /// Secondary information, dimmed.
    pub(crate) fn detail(&self, msg: &str) {
        self.line(Some(&self.detail), msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(Some(&self.success), msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(Some(&self.warning), &format!("warning: {msg}"));
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Some(&self.error), msg);
    }

    fn line(&self, style: Option<&Style>, msg: &str) {
        let text = match style {
            Some(style) => style.apply_to(msg).to_string(),
            None => msg.to_owned(),
        };
        // Nothing sensible to do when stderr is gone.
        let _ = self.term.write_line(&text);
    }
}
