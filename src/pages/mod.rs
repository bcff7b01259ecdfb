//! Page rendering
//!
//! Server-rendered HTML for the two screens, using Tera.
//! Features:
//! - Templates embedded in the binary from `templates/`
//! - Shared `base.html` layout with inheritance
//! - Initial state rendered server-side; the pages then poll the JSON API

use rust_embed::RustEmbed;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};

use crate::services::{CustomerView, DashboardSnapshot};

/// Ended sessions shown in the dashboard history, most recent last
pub const HISTORY_ROWS: usize = 5;

/// Embedded page templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct PageTemplates;

/// Page rendering errors
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Template could not be loaded or rendered
    #[error("Template error: {0}")]
    TemplateError(String),
}

/// Renders the login, dashboard and customer pages
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    /// Load and compile the embedded templates
    pub fn new() -> Result<Self, PageError> {
        let mut templates: Vec<(String, String)> = Vec::new();
        for name in PageTemplates::iter() {
            let Some(file) = PageTemplates::get(&name) else {
                continue;
            };
            let content = std::str::from_utf8(&file.data)
                .map_err(|e| PageError::TemplateError(format!("Template {} is not UTF-8: {}", name, e)))?;
            templates.push((name.to_string(), content.to_string()));
        }

        // Base layout first so children can extend it
        templates.sort_by_key(|(name, _)| name != "base.html");

        let mut tera = Tera::default();
        for (name, content) in templates {
            tera.add_raw_template(&name, &content)
                .map_err(|e| PageError::TemplateError(format!("Failed to add template {}: {}", name, e)))?;
        }
        tera.build_inheritance_chains()
            .map_err(|e| PageError::TemplateError(format!("Failed to build template inheritance: {}", e)))?;

        tracing::debug!("Loaded {} page templates", tera.get_template_names().count());
        Ok(Self { tera })
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, PageError> {
        self.tera.render(template, context).map_err(|e| {
            let mut error_msg = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                error_msg.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            PageError::TemplateError(error_msg)
        })
    }

    /// Staff login form
    pub fn login(&self) -> Result<String, PageError> {
        let mut context = TeraContext::new();
        context.insert("title", "Staff login");
        self.render("login.html", &context)
    }

    /// Staff dashboard with its initial snapshot
    pub fn dashboard(&self, snapshot: &DashboardSnapshot, poll_ms: u64) -> Result<String, PageError> {
        let mut context = TeraContext::new();
        context.insert("title", "Table timers");
        let historical = &snapshot.sessions.historical;
        let history = &historical[historical.len().saturating_sub(HISTORY_ROWS)..];
        context.insert("snapshot", snapshot);
        context.insert("history", history);
        context.insert("history_rows", &HISTORY_ROWS);
        context.insert("poll_ms", &poll_ms);
        self.render("dashboard.html", &context)
    }

    /// Customer countdown page
    pub fn customer(
        &self,
        session_id: &str,
        view: &CustomerView,
        refresh_seconds: u64,
    ) -> Result<String, PageError> {
        let mut context = TeraContext::new();
        context.insert("title", "Your table");
        context.insert("session_id", session_id);
        context.insert("view", view);
        context.insert("view_name", view.name());
        let clock = match view {
            CustomerView::Countdown { minutes, seconds, .. } => format!("{}:{:02}", minutes, seconds),
            _ => String::new(),
        };
        context.insert("clock", &clock);
        context.insert("refresh_seconds", &refresh_seconds);
        self.render("customer.html", &context)
    }
}
