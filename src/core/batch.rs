//! Offline conversion of a phone list into WhatsApp links, one per line.

use crate::core::phone::{recreate_phone_number, PhoneNormalizer};
use crate::core::whatsapp::WhatsappLinker;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

pub const DEFAULT_RESULTS_FILE: &str = "results.txt";

#[derive(Debug, Clone, Default)]
pub struct PhoneBatch {
    phones: PhoneNormalizer,
    whatsapp: WhatsappLinker,
}

/// Line counts of a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub lines: usize,
    pub links: usize,
}

impl PhoneBatch {
    pub fn new(phones: PhoneNormalizer, whatsapp: WhatsappLinker) -> Self {
        Self { phones, whatsapp }
    }

    /// Link for one input line, empty when the line holds no valid phone.
    pub fn convert_line(&self, line: &str) -> String {
        let phone = recreate_phone_number(Some(line.trim()));
        let normalized = self.phones.normalize(phone.as_deref());
        self.whatsapp
            .link(normalized.as_deref())
            .unwrap_or_default()
    }

    /// Output keeps one line per input line, each newline-terminated.
    pub fn convert(&self, input: &str) -> (String, BatchSummary) {
        let mut output = String::new();
        let mut summary = BatchSummary { lines: 0, links: 0 };

        for line in input.lines() {
            let link = self.convert_line(line);
            summary.lines += 1;
            if !link.is_empty() {
                summary.links += 1;
            }
            output.push_str(&link);
            output.push('\n');
        }

        (output, summary)
    }

    pub async fn run<S: Storage>(&self, storage: &S, input: &str, output: &str) -> Result<BatchSummary> {
        let data = storage.read_file(input).await?;
        let text = String::from_utf8_lossy(&data);

        let (results, summary) = self.convert(&text);
        storage.write_file(output, results.as_bytes()).await?;

        tracing::info!(
            "📞 Converted {} of {} lines from {} into {}",
            summary.links,
            summary.lines,
            input,
            output
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use tempfile::TempDir;

    #[test]
    fn test_convert_line() {
        let batch = PhoneBatch::default();
        assert_eq!(batch.convert_line("917 22 30 00"), "https://wa.me/34917223000");
        assert_eq!(batch.convert_line("+44 20 7946 0958\r"), "https://wa.me/442079460958");
        assert_eq!(batch.convert_line("call reception"), "");
        assert_eq!(batch.convert_line(""), "");
    }

    #[test]
    fn test_convert_keeps_line_positions() {
        let batch = PhoneBatch::new(PhoneNormalizer::new("86"), WhatsappLinker::default());

        let (output, summary) = batch.convert("1380013800\nnot a phone\n\n+86 138 0013 8000\n");

        assert_eq!(
            output,
            "https://wa.me/861380013800\n\n\nhttps://wa.me/8613800138000\n"
        );
        assert_eq!(summary, BatchSummary { lines: 4, links: 2 });
    }

    #[tokio::test]
    async fn test_run_reads_and_writes_through_storage() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("phones.txt"), "917223000\nxx\n").unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let summary = PhoneBatch::default()
            .run(&storage, "phones.txt", DEFAULT_RESULTS_FILE)
            .await
            .unwrap();

        assert_eq!(summary, BatchSummary { lines: 2, links: 1 });
        let written = std::fs::read_to_string(temp_dir.path().join("results.txt")).unwrap();
        assert_eq!(written, "https://wa.me/34917223000\n\n");
    }

    #[tokio::test]
    async fn test_run_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let result = PhoneBatch::default().run(&storage, "absent.txt", "out.txt").await;

        assert!(result.is_err());
        assert!(!temp_dir.path().join("out.txt").exists());
    }
}
