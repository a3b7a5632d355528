use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use weathercard_core::{ResourceViewer, UiResource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Json,
}

/// Prints each resource to a writer, as raw markup or as the descriptor JSON.
pub struct TerminalViewer<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> TerminalViewer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResourceViewer for TerminalViewer<W> {
    fn show(&mut self, resource: &UiResource) -> Result<()> {
        match self.format {
            OutputFormat::Html => {
                writeln!(self.out, "--- {} ---", resource.uri)?;
                writeln!(self.out, "{}", resource.html())?;
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(resource)
                    .context("Failed to serialize UI resource")?;
                writeln!(self.out, "{json}")?;
            }
        }
        self.out.flush().context("Failed to flush output")?;
        Ok(())
    }
}

/// Rewrites a standalone HTML page embedding the latest resource, so the card
/// can be inspected in a browser.
#[derive(Debug)]
pub struct HtmlFileViewer {
    path: PathBuf,
}

impl HtmlFileViewer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceViewer for HtmlFileViewer {
    fn show(&mut self, resource: &UiResource) -> Result<()> {
        let path = self.path();
        fs::write(path, preview_page(resource))
            .with_context(|| format!("Failed to write preview file: {}", path.display()))?;
        tracing::info!(path = %path.display(), "preview updated");
        println!("Preview written to {}", path.display());
        Ok(())
    }
}

fn preview_page(resource: &UiResource) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Weather card preview</title>
<script src="https://cdn.tailwindcss.com"></script>
</head>
<body style="font-family: system-ui, sans-serif; background: #f8fafc; padding: 32px;">
<p style="color: #475569; font-size: 14px;">UI resource: <code>{uri}</code></p>
<div data-resource-uri="{uri}">
{html}
</div>
</body>
</html>
"#,
        uri = resource.uri,
        html = resource.html(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use weathercard_core::WEATHER_CARD_URI;

    fn resource() -> UiResource {
        UiResource::raw_html(WEATHER_CARD_URI, "<p>Loading weather data for Denver...</p>").unwrap()
    }

    #[test]
    fn terminal_html_output_has_uri_header() {
        let mut viewer = TerminalViewer::new(Vec::new(), OutputFormat::Html);
        viewer.show(&resource()).unwrap();

        let out = String::from_utf8(viewer.into_inner()).unwrap();
        assert!(out.starts_with("--- ui://mcp-aharvard/weather-card ---\n"));
        assert!(out.contains("Loading weather data for Denver..."));
    }

    #[test]
    fn terminal_json_output_is_the_descriptor() {
        let mut viewer = TerminalViewer::new(Vec::new(), OutputFormat::Json);
        viewer.show(&resource()).unwrap();

        let out = String::from_utf8(viewer.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["uri"], WEATHER_CARD_URI);
        assert_eq!(value["content"]["type"], "rawHtml");
        assert_eq!(value["encoding"], "text");
    }

    #[test]
    fn html_file_viewer_replaces_previous_preview() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = HtmlFileViewer::new(dir.path().join("card.html"));

        viewer.show(&resource()).unwrap();
        let ready = UiResource::raw_html(WEATHER_CARD_URI, "<div>72°F</div>").unwrap();
        viewer.show(&ready).unwrap();

        let page = fs::read_to_string(viewer.path()).unwrap();
        assert!(page.contains("<div>72°F</div>"));
        assert!(!page.contains("Loading weather data"));
        assert!(page.contains(r#"data-resource-uri="ui://mcp-aharvard/weather-card""#));
    }
}
