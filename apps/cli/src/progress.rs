//! Terminal progress rendering for uploads.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use cofre_transfer::TransferUpdate;

/// Consumes transfer updates and renders one bar per file.
///
/// Batch uploads reuse the same bar: when the file name changes, the bar
/// is finished and a fresh one starts.
pub async fn render(mut rx: mpsc::Receiver<TransferUpdate>) {
    let mut current: Option<(String, ProgressBar)> = None;

    while let Some(update) = rx.recv().await {
        let needs_new = match &current {
            Some((file, _)) => file != &update.file,
            None => true,
        };

        if needs_new {
            if let Some((_, bar)) = current.take() {
                bar.finish();
            }
            let bar = ProgressBar::new(update.total_bytes.max(1));
            bar.set_style(bar_style());
            bar.set_message(update.file.clone());
            current = Some((update.file.clone(), bar));
        }

        if let Some((_, bar)) = &current {
            bar.set_length(update.total_bytes.max(1));
            bar.set_position(update.transferred_bytes);
        }
    }

    if let Some((_, bar)) = current.take() {
        bar.finish();
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg}\n[{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
        .expect("static template is valid")
        .progress_chars("#>-")
}

/// Formats a byte count for plain-text listings.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{size:.2} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512.00 B");
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GiB");
    }

    #[tokio::test]
    async fn render_drains_channel() {
        use cofre_protocol::types::TransferMode;

        let (tx, rx) = mpsc::channel(8);
        for i in 1..=4u64 {
            tx.send(TransferUpdate {
                file: "a.bin".into(),
                mode: TransferMode::Chunked,
                transferred_bytes: i * 25,
                total_bytes: 100,
                percent: i as f64 * 25.0,
            })
            .await
            .unwrap();
        }
        drop(tx);

        // Must terminate once the sender is gone.
        render(rx).await;
    }
}
