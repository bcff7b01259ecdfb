//! Code issuer
//!
//! Creates a table session and renders the QR code customers scan to reach
//! their countdown. The issuer never persists anything: the caller appends
//! the returned session to its working set.
//!
//! Locator format: `<origin>/customer/<sessionId>`.

use chrono::{DateTime, Utc};
use data_encoding::BASE64;
use qrcode::render::svg;
use qrcode::QrCode;
use serde::Serialize;
use uuid::Uuid;

use crate::models::TableSession;

/// Path segment in front of the session id
const CUSTOMER_PATH: &str = "/customer/";

/// Minimum rendered edge length in pixels
const QR_MIN_SIZE: u32 = 300;

/// Error types for code issuing
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    /// Table label is missing
    #[error("Validation error: {0}")]
    Validation(String),

    /// QR rendering failed
    #[error("Failed to generate QR code: {0}")]
    Render(String),
}

/// Rendered QR code
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrImage {
    /// Standalone SVG document
    pub svg: String,
    /// `data:` URL usable directly as an `<img src>`
    pub data_url: String,
    /// Suggested name when staff download the code
    pub file_name: String,
}

/// A freshly issued session with its code
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCode {
    pub session: TableSession,
    pub locator: String,
    pub image: QrImage,
}

/// Issues table sessions and their QR codes
#[derive(Debug, Clone)]
pub struct CodeIssuer {
    origin: String,
}

impl CodeIssuer {
    /// Create an issuer whose locators point at `origin`
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        Self { origin }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Issue a new session for `table_label` starting at `now`
    ///
    /// # Errors
    ///
    /// - `Validation` if the label is empty or whitespace
    /// - `Render` if the QR code cannot be produced
    pub fn issue(&self, table_label: &str, now: DateTime<Utc>) -> Result<IssuedCode, IssueError> {
        let label = table_label.trim();
        if label.is_empty() {
            return Err(IssueError::Validation(
                "Table label cannot be empty".to_string(),
            ));
        }

        let session = TableSession::start(Uuid::new_v4().to_string(), label, now);
        let locator = self.locator(&session.id);
        let image = render_qr(&locator, label)?;

        Ok(IssuedCode {
            session,
            locator,
            image,
        })
    }

    /// Build the customer locator for a session id
    pub fn locator(&self, session_id: &str) -> String {
        format!("{}{}{}", self.origin, CUSTOMER_PATH, session_id)
    }

    /// Re-render the code for an existing session
    pub fn render(&self, session: &TableSession) -> Result<QrImage, IssueError> {
        render_qr(&self.locator(&session.id), &session.table_label)
    }
}

/// Extract the session id from a locator or a bare `/customer/<id>` path
///
/// Returns `None` when the path has no customer segment or the id is empty.
/// Query strings and fragments are ignored.
pub fn parse_locator(locator: &str) -> Option<&str> {
    let path = locator.split(['?', '#']).next().unwrap_or_default();
    let (_, rest) = path.rsplit_once(CUSTOMER_PATH)?;
    let id = rest.trim_end_matches('/');

    if id.is_empty() || id.contains('/') {
        None
    } else {
        Some(id)
    }
}

/// Render `data` as an SVG QR code
fn render_qr(data: &str, table_label: &str) -> Result<QrImage, IssueError> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| IssueError::Render(e.to_string()))?;

    let svg = code
        .render::<svg::Color>()
        .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
        .quiet_zone(true)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    let data_url = format!("data:image/svg+xml;base64,{}", BASE64.encode(svg.as_bytes()));

    Ok(QrImage {
        svg,
        data_url,
        file_name: download_file_name(table_label),
    })
}

/// File name for a downloaded code, keeping it filesystem-safe
fn download_file_name(table_label: &str) -> String {
    let safe: String = table_label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("qr-table-{}.svg", safe)
}
