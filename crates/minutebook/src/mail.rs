//! `mailto:` handoff of finished minutes to the platform mail client.

use urlencoding::encode;

use crate::document::require_current_minutes;
use crate::error::Result;
use crate::meeting::Meeting;

/// Subject line for a meeting's minutes.
#[must_use]
pub fn subject(meeting: &Meeting) -> String {
    format!("Meeting Minutes: {}", meeting.title)
}

/// Message body: a short cover note followed by the minutes text.
#[must_use]
pub fn body(meeting: &Meeting, minutes: &str) -> String {
    format!(
        "Please find the minutes for the meeting \"{}\" held on {}.\n\n---\n\n{minutes}",
        meeting.title,
        meeting.date
    )
}

/// Build a `mailto:` link carrying the meeting's stored minutes.
///
/// No recipient is filled in; the user picks one in their mail client.
///
/// # Errors
///
/// Returns [`crate::Error::MinutesUnavailable`] unless the meeting has current
/// minutes.
pub fn mailto_link(meeting: &Meeting) -> Result<String> {
    let record = require_current_minutes(meeting)?;
    Ok(format!(
        "mailto:?subject={}&body={}",
        encode(&subject(meeting)),
        encode(&body(meeting, &record.text))
    ))
}
