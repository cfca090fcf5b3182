// ── Presentation seams ──

use std::path::{Path, PathBuf};

use crate::capability::CapabilitySet;

/// The presentation surface driven by the dispatcher.
///
/// The message stream is ordered lines of text with append-or-replace
/// semantics; the capability push tells the surface which controls to
/// enable. The core never reads anything back from the surface.
pub trait Surface {
    /// Replace the console content with `text` (may span lines).
    fn replace(&mut self, text: &str);

    /// Append `text` below the current content.
    fn append(&mut self, text: &str);

    /// Render a freshly projected capability set.
    fn capabilities(&mut self, capabilities: &CapabilitySet);
}

/// Picks a destination for an experiment export.
///
/// `initial` is the previously chosen path, remembered for the process
/// lifetime only. `None` means the user cancelled.
pub trait ExportChooser {
    fn choose(&mut self, initial: Option<&Path>) -> Option<PathBuf>;
}
