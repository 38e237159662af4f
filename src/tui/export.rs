use super::state::UiState;
use crate::orchestrator;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Write the current table as CSV into the working directory.
/// Returns the absolute path of the exported file.
pub fn export_table_csv(state: &UiState) -> Result<PathBuf> {
    let view = state.table.as_ref().context("no table to export")?;
    let name = orchestrator::default_csv_name(state.job.as_ref().map(|j| j.short_id.as_str()));
    let current_dir = std::env::current_dir().context("get current directory")?;
    let path = current_dir.join(name);
    orchestrator::export_csv(&path, view)?;
    Ok(path)
}

/// Initialize the clipboard manager thread if not already initialized.
/// A dedicated thread processes copy requests sequentially and keeps each
/// clipboard instance alive long enough for clipboard managers to read it.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        // Linux clipboard managers read asynchronously; hold
                        // the instance for a moment before dropping it.
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Copy text to clipboard. Returns immediately after queuing the operation,
/// without blocking the UI thread.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
