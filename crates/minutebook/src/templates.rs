//! Built-in agenda templates offered when scheduling a meeting.

use crate::error::{Error, Result};
use crate::meeting::AgendaItem;

/// One agenda entry of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateItem {
    /// Item title.
    pub title: &'static str,
    /// Default presenter.
    pub presenter: &'static str,
    /// Time allocation in minutes.
    pub minutes: u32,
}

/// A named agenda blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingTemplate {
    /// Display name, also used for lookup.
    pub name: &'static str,
    /// Agenda entries in running order.
    pub agenda: &'static [TemplateItem],
}

const fn item(title: &'static str, presenter: &'static str, minutes: u32) -> TemplateItem {
    TemplateItem {
        title,
        presenter,
        minutes,
    }
}

/// Name of the template with no agenda items.
pub const BLANK_TEMPLATE: &str = "Blank Meeting";

/// All built-in templates; the first one is the default.
pub const MEETING_TEMPLATES: &[MeetingTemplate] = &[
    MeetingTemplate {
        name: "Quarterly Board Meeting",
        agenda: &[
            item("Call to Order", "Chairperson", 5),
            item("Approval of Previous Minutes", "Secretary", 10),
            item("CEO Report", "CEO", 20),
            item("Financial Review", "CFO", 30),
            item("Committee Updates", "Committee Heads", 25),
            item("New Business", "Chairperson", 20),
            item("Adjournment", "Chairperson", 5),
        ],
    },
    MeetingTemplate {
        name: "Annual General Meeting (AGM)",
        agenda: &[
            item("Welcome and Opening Remarks", "Chairperson", 10),
            item("Confirmation of Quorum", "Secretary", 5),
            item("Adoption of Agenda", "Chairperson", 5),
            item("Approval of Last AGM Minutes", "Secretary", 10),
            item("President's Report", "President", 15),
            item("Treasurer's Report & Financial Statements", "Treasurer", 20),
            item("Election of Board Members", "Nominating Chair", 30),
            item("Appointment of Auditors", "Chairperson", 10),
            item("Other Business", "Chairperson", 15),
            item("Adjournment", "Chairperson", 5),
        ],
    },
    MeetingTemplate {
        name: BLANK_TEMPLATE,
        agenda: &[],
    },
];

impl MeetingTemplate {
    /// Instantiate the template's agenda with fresh ids and empty notes.
    #[must_use]
    pub fn instantiate(&self) -> Vec<AgendaItem> {
        self.agenda
            .iter()
            .map(|entry| AgendaItem::new(entry.title, entry.presenter, entry.minutes))
            .collect()
    }

    /// Total scheduled minutes.
    #[must_use]
    pub fn total_minutes(&self) -> u32 {
        self.agenda.iter().map(|entry| entry.minutes).sum()
    }
}

/// The template preselected when none is chosen.
#[must_use]
pub fn default_template() -> &'static MeetingTemplate {
    &MEETING_TEMPLATES[0]
}

/// Find a built-in template by name (case-insensitive).
///
/// # Errors
///
/// Returns [`Error::UnknownTemplate`] if no template has that name.
pub fn find_template(name: &str) -> Result<&'static MeetingTemplate> {
    let name = name.trim();
    MEETING_TEMPLATES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::UnknownTemplate {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_is_board_meeting() {
        assert_eq!(default_template().name, "Quarterly Board Meeting");
        assert_eq!(default_template().agenda.len(), 7);
        assert_eq!(default_template().total_minutes(), 115);
    }

    #[test]
    fn test_find_template_case_insensitive() {
        let agm = find_template("annual general meeting (agm)").unwrap();
        assert_eq!(agm.agenda.len(), 10);
        assert_eq!(agm.agenda[6].title, "Election of Board Members");
    }

    #[test]
    fn test_find_unknown_template() {
        let err = find_template("Standup").unwrap_err();
        assert!(matches!(err, Error::UnknownTemplate { .. }));
    }

    #[test]
    fn test_blank_template_instantiates_empty_agenda() {
        let blank = find_template(BLANK_TEMPLATE).unwrap();
        assert!(blank.instantiate().is_empty());
    }

    #[test]
    fn test_instantiate_preserves_order_with_fresh_ids() {
        let template = default_template();
        let first = template.instantiate();
        let second = template.instantiate();

        let titles: Vec<_> = first.iter().map(|i| i.title.as_str()).collect();
        let expected: Vec<_> = template.agenda.iter().map(|i| i.title).collect();
        assert_eq!(titles, expected);
        assert!(first.iter().all(|i| i.notes.is_empty()));
        assert_ne!(first[0].id, second[0].id);
        assert_eq!(first[3].presenter, "CFO");
        assert_eq!(first[3].time_allocation, 30);
    }
}
