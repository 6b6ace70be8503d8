// Output dispatch: file format by extension, or an on-screen view

use crate::error::{Result, TaxflowError};
use crate::figure::SankeyFigure;
use crate::render::{render_html, render_jpeg, render_pdf, render_png, render_svg};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Unsupported file format. Use .html, .png, .jpg, .jpeg, .pdf, or .svg.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Png,
    Jpeg,
    Pdf,
    Svg,
}

impl OutputFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "html" => Some(OutputFormat::Html),
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "pdf" => Some(OutputFormat::Pdf),
            "svg" => Some(OutputFormat::Svg),
            _ => None,
        }
    }

    /// Format named by the text after the last `.` of the file name, so a
    /// bare `.html` counts as HTML too
    pub fn from_path(path: &Path) -> Option<Self> {
        let (_, extension) = path.file_name()?.to_str()?.rsplit_once('.')?;
        Self::from_extension(extension)
    }

    /// HTML keeps hover and drag; everything else is a static image
    pub fn is_interactive(&self) -> bool {
        matches!(self, OutputFormat::Html)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Svg => "svg",
        }
    }
}

/// What `save_figure` did with the requested path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Interactive(PathBuf),
    Image(PathBuf),
    Unsupported,
}

impl SaveOutcome {
    pub fn message(&self) -> String {
        match self {
            SaveOutcome::Interactive(path) => {
                format!("Saved interactive HTML: {}", path.display())
            }
            SaveOutcome::Image(path) => format!("Saved image file: {}", path.display()),
            SaveOutcome::Unsupported => UNSUPPORTED_FORMAT_MESSAGE.to_string(),
        }
    }
}

pub fn render_figure(figure: &SankeyFigure, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Html => Ok(render_html(figure)?.into_bytes()),
        OutputFormat::Svg => Ok(render_svg(figure)?.into_bytes()),
        OutputFormat::Png => render_png(figure),
        OutputFormat::Jpeg => render_jpeg(figure),
        OutputFormat::Pdf => render_pdf(figure),
    }
}

pub fn save_report(content: &[u8], path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    Ok(())
}

/// Write `figure` to `path` in the format its extension names.
///
/// An unrecognized extension is not an error: nothing is written and
/// [`SaveOutcome::Unsupported`] is returned.
pub fn save_figure(figure: &SankeyFigure, path: &Path) -> Result<SaveOutcome> {
    let Some(format) = OutputFormat::from_path(path) else {
        warn!("No writer for output path {}", path.display());
        return Ok(SaveOutcome::Unsupported);
    };

    let content = render_figure(figure, format)?;
    save_report(&content, path)?;
    info!(
        "Wrote {} bytes of {} to {}",
        content.len(),
        format.as_str(),
        path.display()
    );

    if format.is_interactive() {
        Ok(SaveOutcome::Interactive(path.to_path_buf()))
    } else {
        Ok(SaveOutcome::Image(path.to_path_buf()))
    }
}

/// Write the interactive page to a kept temporary file and open it in the
/// default browser. Returns the page's path.
pub fn show_figure(figure: &SankeyFigure) -> Result<PathBuf> {
    show_figure_with_viewer(figure, std::env::var("BROWSER").ok())
}

/// Like [`show_figure`], with the viewer program given explicitly instead of
/// read from `$BROWSER`
pub fn show_figure_with_viewer(
    figure: &SankeyFigure,
    browser: Option<String>,
) -> Result<PathBuf> {
    let html = render_html(figure)?;

    let mut page = tempfile::Builder::new()
        .prefix("taxflow-")
        .suffix(".html")
        .tempfile()?;
    page.write_all(html.as_bytes())?;
    let (_, path) = page.keep().map_err(|err| err.error)?;

    info!("Opening {}", path.display());
    open_in_browser(viewer_command(browser), &path)?;
    Ok(path)
}

/// Command that opens a page: `browser` when set and non-blank, otherwise
/// the platform opener
pub fn viewer_command(browser: Option<String>) -> Command {
    match browser {
        Some(browser) if !browser.trim().is_empty() => Command::new(browser.trim()),
        _ if cfg!(target_os = "macos") => Command::new("open"),
        _ if cfg!(target_os = "windows") => {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", ""]);
            command
        }
        _ => Command::new("xdg-open"),
    }
}

fn open_in_browser(mut command: Command, path: &Path) -> Result<()> {
    let status = command
        .arg(path)
        .status()
        .map_err(|err| TaxflowError::ViewerError(err.to_string()))?;

    if !status.success() {
        return Err(TaxflowError::ViewerError(format!(
            "viewer exited with {} for {}",
            status,
            path.display()
        )));
    }
    Ok(())
}
