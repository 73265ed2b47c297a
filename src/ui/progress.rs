use indicatif::{ProgressBar, ProgressStyle};

use crate::types::Progress;

/// Byte-based progress bar fed by the engines once per chunk.
///
/// Cheap to clone; clones share the same bar, so one can be moved into a
/// blocking task while the caller keeps a handle to finish it.
#[derive(Clone)]
pub struct Bar {
    bar: ProgressBar,
}

impl Bar {
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("●○ ");

        bar.set_style(style);
        bar.set_message(description.to_owned());

        Self { bar }
    }

    /// A bar that draws nothing, for non-interactive runs.
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Done");
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl Progress for Bar {
    fn advance(&self, bytes: u64) {
        self.bar.inc(bytes);
    }
}
