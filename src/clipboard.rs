//! Writing the final prompt to the clipboard.
//!
//! Text is normalized to LF line endings first. The rich write is tried before the plain one, and a failing rich
//! write falls back to plain text.

use anyhow::Result;
use log::warn;

use crate::utils::prompt_processing::normalize_line_endings;

/// A clipboard with a rich and a plain-text write method.
pub trait ClipboardWriter {
    /// Writes through the rich clipboard API.
    fn write_rich(&mut self, text: &str) -> Result<()>;

    /// Writes plain text.
    fn write_plain(&mut self, text: &str) -> Result<()>;
}

/// Copies `text` with LF line endings, falling back to a plain write if the rich write fails.
/// Returns the text that was written.
pub fn copy_text(writer: &mut impl ClipboardWriter, text: &str) -> Result<String> {
    let text = normalize_line_endings(text);
    if let Err(e) = writer.write_rich(&text) {
        warn!("Rich clipboard write failed, falling back to plain text: {}", e);
        writer.write_plain(&text)?;
    }
    Ok(text)
}

#[cfg(feature = "system_clipboard")]
pub use system::SystemClipboard;

#[cfg(feature = "system_clipboard")]
mod system {
    use anyhow::Result;
    use arboard::Clipboard;

    use super::ClipboardWriter;

    /// The OS clipboard. The rich write stores HTML with the text as its plain alternative.
    pub struct SystemClipboard {
        clipboard: Clipboard,
    }

    impl SystemClipboard {
        pub fn new() -> Result<Self> {
            Ok(Self { clipboard: Clipboard::new()? })
        }
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
    }

    impl ClipboardWriter for SystemClipboard {
        fn write_rich(&mut self, text: &str) -> Result<()> {
            let html = format!("<pre>{}</pre>", escape_html(text));
            self.clipboard.set_html(html, Some(text.to_string()))?;
            Ok(())
        }

        fn write_plain(&mut self, text: &str) -> Result<()> {
            self.clipboard.set_text(text.to_string())?;
            Ok(())
        }
    }
}
