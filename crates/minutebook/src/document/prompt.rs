//! Prompt sent to the text-generation service to draft minutes.

use serde::Serialize;

use crate::error::Result;
use crate::meeting::Meeting;

/// The meeting as the generator sees it: names instead of identifiers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptMeeting<'a> {
    title: &'a str,
    date: String,
    start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,
    location: &'a str,
    attendees: Vec<&'a str>,
    agenda: Vec<PromptAgendaItem<'a>>,
    decisions: Vec<PromptDecision<'a>>,
    action_items: Vec<PromptActionItem<'a>>,
}

#[derive(Debug, Serialize)]
struct PromptAgendaItem<'a> {
    title: &'a str,
    presenter: &'a str,
    notes: &'a str,
}

#[derive(Debug, Serialize)]
struct PromptDecision<'a> {
    motion: &'a str,
    mover: &'a str,
    seconder: &'a str,
    outcome: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptActionItem<'a> {
    description: &'a str,
    owner: &'a str,
    due_date: String,
}

impl<'a> PromptMeeting<'a> {
    fn from_meeting(meeting: &'a Meeting) -> Self {
        Self {
            title: &meeting.title,
            date: meeting.date.format("%Y-%m-%d").to_string(),
            start_time: meeting.start_time.format("%H:%M").to_string(),
            end_time: meeting.end_time.map(|t| t.format("%H:%M").to_string()),
            location: &meeting.location,
            attendees: meeting.attendees.iter().map(|a| a.name.as_str()).collect(),
            agenda: meeting
                .agenda
                .iter()
                .map(|item| PromptAgendaItem {
                    title: &item.title,
                    presenter: &item.presenter,
                    notes: &item.notes,
                })
                .collect(),
            decisions: meeting
                .decisions
                .iter()
                .map(|d| PromptDecision {
                    motion: &d.motion,
                    mover: meeting.attendee_name(&d.mover_id),
                    seconder: meeting.attendee_name(&d.seconder_id),
                    outcome: d.outcome.to_string(),
                })
                .collect(),
            action_items: meeting
                .action_items
                .iter()
                .map(|a| PromptActionItem {
                    description: &a.description,
                    owner: meeting.attendee_name(&a.owner_id),
                    due_date: a
                        .due_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}

const INSTRUCTIONS: &str = r#"**Instructions for the Markdown output:**
1.  **Header:** Start with the meeting title as a main heading (#). Include the Date, Start Time, End Time, and Location clearly below the title.
2.  **Attendees:** Create a section (##) for attendees and list each attendee's name.
3.  **Agenda and Discussion:** Create a main section (##) for "Agenda & Discussion Summary". For each agenda item, create a sub-section (###) with its title. Under each agenda item, summarize the key points from the notes. Ensure the summary is coherent and professional. If notes are empty, state that the topic was on the agenda but no detailed notes were recorded.
4.  **Decisions:** Create a section (##) for "Decisions Made". List each decision clearly, including the motion, mover, seconder, and the final outcome.
5.  **Action Items:** Create a section (##) for "Action Items". Present the action items in a table format with columns for "Task", "Assigned To", and "Due Date".
6.  **Tone & Formatting:** Maintain a formal and objective tone throughout. Use Markdown formatting (bolding, lists, etc.) to enhance readability. Do not include the original JSON data in your output."#;

/// Build the minutes-drafting prompt for `meeting`.
///
/// # Errors
///
/// Returns an error if the meeting summary cannot be serialized.
pub fn build_prompt(meeting: &Meeting) -> Result<String> {
    let data = serde_json::to_string_pretty(&PromptMeeting::from_meeting(meeting))?;
    Ok(format!(
        "You are a professional secretary tasked with creating formal meeting minutes.\n\
         Based on the following JSON data, generate a comprehensive and well-structured \
         meeting minutes document in Markdown format.\n\n\
         **Meeting Data:**\n```json\n{data}\n```\n\n{INSTRUCTIONS}\n"
    ))
}
