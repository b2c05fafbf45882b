//! Clipboard yank with a timed clear

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static CLIPBOARD_COPY_ID: AtomicU64 = AtomicU64::new(0);

/// How long a yanked value stays on the clipboard
pub const CLEAR_AFTER: Duration = Duration::from_secs(10);

/// Copy `text` to the system clipboard, clearing it after `CLEAR_AFTER`
/// unless a newer copy replaced it in the meantime.
pub fn copy_with_clear(text: &str) {
    let copy_id = CLIPBOARD_COPY_ID.fetch_add(1, Ordering::SeqCst) + 1;
    let text = text.to_string();

    std::thread::spawn(move || copy_thread(text, copy_id));
}

fn copy_thread(text: String, copy_id: u64) {
    let Ok(mut clipboard) = arboard::Clipboard::new() else {
        return;
    };
    if clipboard.set_text(text).is_err() {
        return;
    }

    std::thread::sleep(CLEAR_AFTER);

    if CLIPBOARD_COPY_ID.load(Ordering::SeqCst) == copy_id {
        let _ = clipboard.clear();
    }
}
