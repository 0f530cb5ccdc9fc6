use std::ops::Range;

/// Bytes per routed chunk.
pub const CHUNK_SIZE: u64 = 1_800_000;
/// Bytes of each text chunk that are decoded into its preview.
pub const PREVIEW_BYTES: usize = 500;

pub const TEXT_EXTENSIONS: [&str; 5] = ["txt", "csv", "json", "md", "log"];
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Image,
    Binary,
}

impl FileKind {
    /// Classifies by the (case-insensitive) extension after the last dot.
    pub fn from_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some(ext) if TEXT_EXTENSIONS.contains(&ext) => FileKind::Text,
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => FileKind::Image,
            _ => FileKind::Binary,
        }
    }

    /// Preview used for files whose content is not decoded.
    pub fn placeholder(&self, name: &str, size: u64) -> Option<String> {
        match self {
            FileKind::Text => None,
            FileKind::Image => Some(format!("[Image: {name}, {size} bytes]")),
            FileKind::Binary => Some(format!("[Binary file: {name}, {size} bytes]")),
        }
    }
}

/// Fixed-size slicing of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPlan {
    pub total_bytes: u64,
    pub chunk_size: u64,
    pub total_chunks: u64,
}

impl UploadPlan {
    pub fn new(total_bytes: u64, chunk_size: u64) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            total_bytes,
            chunk_size,
            total_chunks: total_bytes.div_ceil(chunk_size),
        }
    }

    pub fn chunk_range(&self, index: u64) -> Option<Range<u64>> {
        if index >= self.total_chunks {
            return None;
        }
        let start = index * self.chunk_size;
        let end = (start + self.chunk_size).min(self.total_bytes);
        Some(start..end)
    }

    pub fn ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        (0..self.total_chunks).filter_map(|index| self.chunk_range(index))
    }
}

/// Name under which chunk `index` (0-based) is routed.
pub fn chunk_name(file_name: &str, index: u64, total_chunks: u64) -> String {
    format!("{file_name}_chunk_{}_of_{total_chunks}", index + 1)
}

/// Rounded percentage of `processed` over `total`; an empty total counts as done.
pub fn progress_percent(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (processed.min(total) as f64 / total as f64 * 100.0).round();
    percent as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_covers_file_exactly() {
        let plan = UploadPlan::new(4_000_000, CHUNK_SIZE);
        assert_eq!(plan.total_chunks, 3);
        let ranges: Vec<_> = plan.ranges().collect();
        assert_eq!(
            ranges,
            vec![0..1_800_000, 1_800_000..3_600_000, 3_600_000..4_000_000]
        );
        let sum: u64 = ranges.iter().map(|r| r.end - r.start).sum();
        assert_eq!(sum, 4_000_000);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let plan = UploadPlan::new(CHUNK_SIZE * 2, CHUNK_SIZE);
        assert_eq!(plan.total_chunks, 2);
        assert_eq!(plan.chunk_range(2), None);
    }

    #[test]
    fn empty_file_has_no_chunks() {
        assert_eq!(UploadPlan::new(0, CHUNK_SIZE).total_chunks, 0);
    }

    #[test]
    fn file_kind_uses_last_extension() {
        assert_eq!(FileKind::from_name("notes.MD"), FileKind::Text);
        assert_eq!(FileKind::from_name("archive.tar.gz"), FileKind::Binary);
        assert_eq!(FileKind::from_name("photo.final.JPEG"), FileKind::Image);
        assert_eq!(FileKind::from_name("Makefile"), FileKind::Binary);
    }

    #[test]
    fn dotfiles_are_classified_by_their_extension() {
        assert_eq!(FileKind::from_name(".txt"), FileKind::Text);
        assert_eq!(FileKind::from_name(".LOG"), FileKind::Text);
        assert_eq!(FileKind::from_name(".png"), FileKind::Image);
        assert_eq!(FileKind::from_name("trailing."), FileKind::Binary);
    }

    #[test]
    fn placeholders_report_whole_file_size() {
        assert_eq!(
            FileKind::Image.placeholder("cat.png", 42),
            Some("[Image: cat.png, 42 bytes]".to_string())
        );
        assert_eq!(
            FileKind::Binary.placeholder("a.bin", 7),
            Some("[Binary file: a.bin, 7 bytes]".to_string())
        );
        assert_eq!(FileKind::Text.placeholder("a.txt", 7), None);
    }

    #[test]
    fn chunk_names_are_one_based() {
        assert_eq!(chunk_name("report.pdf", 0, 3), "report.pdf_chunk_1_of_3");
        assert_eq!(chunk_name("report.pdf", 2, 3), "report.pdf_chunk_3_of_3");
    }

    #[test]
    fn progress_rounds_and_reaches_hundred() {
        assert_eq!(progress_percent(1_800_000, 4_000_000), 45);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(1, 200), 1);
        assert_eq!(progress_percent(4_000_000, 4_000_000), 100);
        assert_eq!(progress_percent(0, 0), 100);
    }
}
