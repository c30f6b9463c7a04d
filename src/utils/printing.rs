//! Terminal rendering of previews.
//!
//! Previews mark values as `**bold**`, so they read well as markdown. [PreviewPrinter] re-renders a preview in place,
//! which suits a fill loop where the preview changes after every edit.

use std::io::{stdout, Result, Write};

use termimad::crossterm::{cursor, ExecutableCommand};
use termimad::crossterm::terminal::Clear;
use termimad::crossterm::terminal::ClearType::FromCursorDown;
use termimad::{FmtText, MadSkin};

/// Renders markdown with `skin`, wrapping at `wrap_width` columns if given.
pub fn render_markdown(skin: &MadSkin, markdown: &str, wrap_width: Option<usize>) -> String {
    format!("{}", FmtText::from(skin, markdown, wrap_width))
}

/// Prints a preview and redraws it at the same place on the next call.
pub struct PreviewPrinter {
    pub skin: MadSkin,
    pub wrap_width: Option<usize>,
    anchor: Option<(u16, u16)>,
}

impl Default for PreviewPrinter {
    fn default() -> Self {
        Self {
            skin: MadSkin::default(),
            wrap_width: None,
            anchor: None,
        }
    }
}

impl PreviewPrinter {
    /// Prints `preview`, replacing whatever this printer printed before.
    pub fn print(&mut self, preview: &str) -> Result<()> {
        let mut out = stdout();
        match self.anchor {
            Some((column, row)) => {
                out.execute(cursor::MoveTo(column, row))?
                    .execute(Clear(FromCursorDown))?;
            }
            None => self.anchor = Some(cursor::position()?),
        }
        write!(out, "{}", render_markdown(&self.skin, preview, self.wrap_width))?;
        out.flush()
    }

    /// Forgets the anchor, so the next preview is printed below the current output.
    pub fn detach(&mut self) {
        self.anchor = None;
    }
}

#[cfg(test)]
mod test_printing {
    use termimad::MadSkin;

    use super::render_markdown;

    #[test]
    fn test_render_keeps_text() {
        let rendered = render_markdown(&MadSkin::no_style(), "Hello **Alice**", None);
        assert!(rendered.contains("Hello"));
        assert!(rendered.contains("Alice"));
        assert!(!rendered.contains("**"));
    }
}
