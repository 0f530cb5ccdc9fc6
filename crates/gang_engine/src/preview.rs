use encoding_rs::UTF_8;
use gang_core::FileKind;

/// Preview text sent along with one chunk.
///
/// Text files get the first `preview_bytes` of the chunk decoded as UTF-8
/// (BOM removed, invalid sequences replaced). Other files get a placeholder
/// naming the whole file.
pub fn chunk_preview(file_name: &str, file_size: u64, chunk: &[u8], preview_bytes: usize) -> String {
    let kind = FileKind::from_name(file_name);
    if let Some(placeholder) = kind.placeholder(file_name, file_size) {
        return placeholder;
    }
    let end = preview_bytes.min(chunk.len());
    let (text, _, _) = UTF_8.decode(&chunk[..end]);
    text.into_owned()
}
