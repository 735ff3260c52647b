//! Minutes documents: the generation prompt and the exported PDF.
//!
//! Export is gated on stored minutes that are still current for the
//! meeting's content; see [`require_current_minutes`].

pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod prompt;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::info;

use crate::error::{Error, Result};
use crate::meeting::{Meeting, MinutesRecord};

pub use layout::{layout_meeting, Layout, PageSize};
pub use pdf::write_pdf;
pub use prompt::build_prompt;

fn unsafe_runs() -> &'static Regex {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    UNSAFE.get_or_init(|| Regex::new(r"[\s/\\:\x00]+").expect("Invalid regex pattern"))
}

/// File name for a meeting's exported minutes.
///
/// Runs of whitespace and path separators in the title become `_`, and
/// leading dots are dropped, so the result is always a single path
/// component.
#[must_use]
pub fn pdf_file_name(title: &str) -> String {
    let replaced = unsafe_runs().replace_all(title, "_");
    let stem = replaced.trim_start_matches('.');
    if stem.is_empty() {
        "meeting_minutes.pdf".to_string()
    } else {
        format!("{stem}_minutes.pdf")
    }
}

/// The stored minutes, if they exist and match the meeting's current content.
///
/// # Errors
///
/// Returns [`Error::MinutesUnavailable`] when nothing was generated or the
/// meeting changed since generation.
pub fn require_current_minutes(meeting: &Meeting) -> Result<&MinutesRecord> {
    let record = meeting.minutes.as_ref().ok_or_else(|| {
        Error::minutes_unavailable(&meeting.id, "no minutes have been generated yet")
    })?;
    if record.source_digest != meeting.content_digest() {
        return Err(Error::minutes_unavailable(
            &meeting.id,
            "the meeting changed since the minutes were generated; review it again",
        ));
    }
    Ok(record)
}

/// Render the minutes PDF for `meeting` in memory.
#[must_use]
pub fn render_pdf(meeting: &Meeting, generated_at: NaiveDateTime, page_size: PageSize) -> Vec<u8> {
    let layout = layout_meeting(meeting, generated_at, page_size);
    write_pdf(&layout, &meeting.title)
}

/// Write the minutes PDF for `meeting` into `dir`.
///
/// Requires current stored minutes; the stored generation time is printed
/// in the document header.
///
/// # Errors
///
/// Returns an error if the minutes are unavailable or the file cannot be written.
pub fn export_pdf(meeting: &Meeting, page_size: PageSize, dir: &Path) -> Result<PathBuf> {
    let record = require_current_minutes(meeting)?;

    if !dir.as_os_str().is_empty() && !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let path = dir.join(pdf_file_name(&meeting.title));
    let bytes = render_pdf(meeting, record.generated_at, page_size);
    std::fs::write(&path, &bytes)?;

    info!(
        "Exported minutes for {} to {} ({} bytes)",
        meeting.id,
        path.display(),
        bytes.len()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::{Attendee, MeetingDraft};
    use chrono::{NaiveDate, NaiveTime};

    fn meeting() -> Meeting {
        let draft = MeetingDraft {
            title: "Staff  Sync\tWeekly".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 7, 7).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            location: "Online".to_string(),
        };
        Meeting::new(draft, vec![Attendee::new("Ann", "")], Vec::new())
    }

    fn with_minutes(mut m: Meeting) -> Meeting {
        m.minutes = Some(MinutesRecord {
            text: "# Staff Sync".to_string(),
            generated_at: NaiveDate::from_ymd_opt(2025, 7, 7)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            source_digest: m.content_digest(),
            edited: false,
        });
        m
    }

    #[test]
    fn test_pdf_file_name() {
        assert_eq!(pdf_file_name("Staff  Sync\tWeekly"), "Staff_Sync_Weekly_minutes.pdf");
        assert_eq!(pdf_file_name("Board"), "Board_minutes.pdf");
    }

    #[test]
    fn test_pdf_file_name_is_one_component() {
        assert_eq!(pdf_file_name("Q1/Q2 Board"), "Q1_Q2_Board_minutes.pdf");
        assert_eq!(pdf_file_name("C:\\temp\\x"), "C_temp_x_minutes.pdf");
        assert_eq!(pdf_file_name("a\0b"), "a_b_minutes.pdf");
        assert_eq!(pdf_file_name(".."), "meeting_minutes.pdf");

        let name = pdf_file_name("../x");
        assert!(!name.contains('/'));
        assert!(!name.starts_with('.'));
        assert_eq!(name, "_x_minutes.pdf");
    }

    #[test]
    fn test_require_current_minutes() {
        let m = meeting();
        assert!(matches!(
            require_current_minutes(&m),
            Err(Error::MinutesUnavailable { .. })
        ));

        let mut m = with_minutes(m);
        assert!(require_current_minutes(&m).is_ok());

        m.location = "Room 2".to_string();
        let err = require_current_minutes(&m).unwrap_err();
        assert!(err.to_string().contains("changed since"));
    }

    #[test]
    fn test_render_pdf_is_deterministic() {
        let m = meeting();
        let at = NaiveDate::from_ymd_opt(2025, 7, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(render_pdf(&m, at, PageSize::A4), render_pdf(&m, at, PageSize::A4));
    }

    #[test]
    fn test_export_pdf_writes_file() {
        let dir = std::env::temp_dir().join(format!("minutebook_export_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let path = export_pdf(&with_minutes(meeting()), PageSize::Letter, &dir).unwrap();
        assert_eq!(path.file_name().unwrap(), "Staff_Sync_Weekly_minutes.pdf");
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_export_pdf_stays_in_directory() {
        let dir = std::env::temp_dir().join(format!("minutebook_escape_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let mut m = meeting();
        m.title = "../../Q1/Q2 Board".to_string();
        let path = export_pdf(&with_minutes(m), PageSize::A4, &dir).unwrap();
        assert_eq!(path.parent(), Some(dir.as_path()));
        assert_eq!(path.file_name().unwrap(), "_.._Q1_Q2_Board_minutes.pdf");
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_export_pdf_refuses_without_minutes() {
        let dir = std::env::temp_dir();
        assert!(export_pdf(&meeting(), PageSize::A4, &dir).is_err());
    }
}
