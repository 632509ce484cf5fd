use chrono::Utc;
use std::path::PathBuf;
use uuid::Uuid;

use crate::certificate::Kind;

/// Output file name: millisecond timestamp, a short random component so two
/// requests in the same tick cannot collide, then the kind suffix.
pub fn certificate_file_name(kind: Kind) -> String {
    format!(
        "{}_{}_{}.pdf",
        Utc::now().timestamp_millis(),
        &Uuid::new_v4().to_string()[..8],
        kind.file_suffix()
    )
}

/// Storage name for an uploaded preview image, keeping a sanitized trace of
/// the original name.
pub fn upload_file_name(original: &str) -> String {
    let safe: String = original
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let safe = safe.trim_start_matches('.');
    let safe = if safe.is_empty() {
        "upload".to_string()
    } else {
        safe.to_string()
    };
    format!("{}-{}", Utc::now().timestamp_millis(), safe)
}

pub fn ensure_dirs(upload_folder: &PathBuf, certificates_folder: &PathBuf) -> std::io::Result<()> {
    std::fs::create_dir_all(upload_folder)?;
    std::fs::create_dir_all(certificates_folder)?;
    Ok(())
}
