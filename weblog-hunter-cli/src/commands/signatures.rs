//! `weblog-hunter signatures` command handler

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use weblog_hunter_core::types::UNKNOWN_TOOL;
use weblog_hunter_engine::SignatureCatalog;
use weblog_hunter_engine::signature::{BOT_TOOL, BROWSER_TOOL};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `signatures` command.
pub fn execute(writer: &OutputWriter) -> Result<(), CliError> {
    let catalog = SignatureCatalog::builtin()?;
    let report = SignatureListReport::from_catalog(&catalog);
    debug!(
        categories = report.categories.len(),
        tools = report.tools.len(),
        "signature catalog loaded"
    );
    writer.render(&report)
}

/// Catalog listing: attack categories and tool fingerprints in match order.
#[derive(Debug, Serialize)]
pub struct SignatureListReport {
    pub categories: Vec<CategoryEntry>,
    /// Tool fingerprints in priority order (first match wins).
    pub tools: Vec<String>,
    /// Classifications used when no fingerprint matches, in order.
    pub fallbacks: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryEntry {
    pub name: String,
    pub label: String,
}

impl SignatureListReport {
    pub fn from_catalog(catalog: &SignatureCatalog) -> Self {
        Self {
            categories: catalog
                .attack_signatures()
                .iter()
                .map(|sig| CategoryEntry {
                    name: sig.category.as_str().to_owned(),
                    label: sig.category.label().to_owned(),
                })
                .collect(),
            tools: catalog
                .tool_signatures()
                .iter()
                .map(|tool| tool.name.clone())
                .collect(),
            fallbacks: [BROWSER_TOOL, BOT_TOOL, UNKNOWN_TOOL]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }
}

impl Render for SignatureListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Attack Categories ({} total)",
            self.categories.len().to_string().bold()
        )?;
        writeln!(w, "{:<20} Label", "Name")?;
        writeln!(w, "{}", "-".repeat(40))?;
        for category in &self.categories {
            writeln!(w, "{:<20} {}", category.name, category.label.red())?;
        }

        writeln!(w)?;
        writeln!(
            w,
            "Tool Fingerprints ({} total, first match wins)",
            self.tools.len().to_string().bold()
        )?;
        for (i, tool) in self.tools.iter().enumerate() {
            writeln!(w, "{:>3}. {}", i + 1, tool.cyan())?;
        }
        writeln!(w, "  Fallbacks: {}", self.fallbacks.join(" -> ").dimmed())?;

        Ok(())
    }
}
