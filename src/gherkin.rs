//! Gherkin step synthesis: turn a click on a page element into a
//! structured step record with its locator and accessor artifacts.

use tracing::debug;

use crate::config::UiConfig;
use crate::dom::{NodeId, PageSnapshot};
use crate::locator;
use crate::types::{AccessorArtifact, InputType, LocatorArtifact, StepRecord};

/// Trailing punctuation stripped from subject labels.
const TRAILING_PUNCT: [char; 4] = [':', '.', ',', ';'];

/// Builds step records from interaction events. Configuration is passed
/// in at construction and refreshed by rebuilding the synthesizer; there
/// is no ambient state.
#[derive(Clone, Debug)]
pub struct StepSynthesizer {
    menu_name: String,
    element_class: String,
}

enum Verb {
    Click,
    Enter,
    Select,
}

impl StepSynthesizer {
    pub fn new(ui: &UiConfig) -> Self {
        StepSynthesizer {
            menu_name: ui.menu_name.trim().to_string(),
            element_class: ui.element_class.clone(),
        }
    }

    /// Synthesize a step for a click on `target`. Returns `None` when no
    /// usable subject can be derived; such interactions are discarded.
    pub fn on_click(&self, snapshot: &PageSnapshot, target: NodeId) -> Option<StepRecord> {
        let tag = snapshot.tag(target);

        let (subject_raw, control) = if tag == "label" {
            let text = strip_trailing_punct(&snapshot.direct_text(target));
            if text.is_empty() {
                return None;
            }
            (text, label_target(snapshot, target))
        } else if matches!(tag, "input" | "select" | "textarea" | "button") {
            (self.control_subject(snapshot, target), Some(target))
        } else {
            return None;
        };

        let subject_raw = strip_trailing_punct(subject_raw.trim());
        // Placeholder identifier: whitespace stripped, case preserved.
        let param_name = strip_trailing_punct(&remove_whitespace(&subject_raw));

        let verb = verb_for(snapshot, control);
        // Click subjects keep their word boundaries; Enter/Select
        // subjects are rebuilt from the collapsed identifier so the
        // sentence and its placeholder stay in lockstep.
        let subject = match verb {
            Verb::Click => humanize(&subject_raw),
            Verb::Enter | Verb::Select => humanize(&param_name),
        };

        let ident: String = subject.chars().filter(|c| c.is_alphanumeric()).collect();
        if ident.is_empty() {
            debug!("Discarding step with empty subject");
            return None;
        }

        let gherkin_text = match verb {
            Verb::Click => self.sentence("Click On", &subject),
            Verb::Enter => format!("{} \"<{}>\"", self.sentence("Enter", &subject), param_name),
            Verb::Select => format!("{} \"<{}>\"", self.sentence("Select", &subject), param_name),
        };

        // Locator anchors on the resolved control; a label with no
        // control falls back to the label element itself.
        let anchor = control.unwrap_or(target);
        let selector = locator::synthesize(snapshot, anchor);

        let mut input_type = InputType::infer(&gherkin_text, selector.is_composite());
        if let Some(ctrl) = control
            && snapshot.tag(ctrl) == "select"
            && snapshot.is_multiple(ctrl)
        {
            input_type = InputType::MultiSelect;
        }

        Some(StepRecord {
            gherkin_text,
            locator: LocatorArtifact {
                ident: ident.clone(),
                selector,
            },
            method: AccessorArtifact {
                ident,
                element_class: self.element_class.clone(),
            },
            input_type,
            param: match verb {
                Verb::Click => None,
                Verb::Enter | Verb::Select => Some(param_name),
            },
        })
    }

    /// Subject for a directly clicked control: associated label text,
    /// then name, id, placeholder, inner text or value, then "Button".
    fn control_subject(&self, snapshot: &PageSnapshot, control: NodeId) -> String {
        if let Some(label) = label_for_control(snapshot, control) {
            let text = snapshot.direct_text(label);
            if !text.is_empty() {
                return text;
            }
        }
        for attr in ["name", "id", "placeholder"] {
            if let Some(value) = snapshot.attr_nonempty(control, attr) {
                return value.to_string();
            }
        }
        let inner = snapshot.inner_text(control);
        if !inner.is_empty() {
            return inner;
        }
        if let Some(value) = snapshot.attr_nonempty(control, "value") {
            return value.to_string();
        }
        "Button".to_string()
    }

    /// Insert the configured menu name between verb and subject when set.
    fn sentence(&self, verb: &str, subject: &str) -> String {
        if self.menu_name.is_empty() {
            format!("{} {}", verb, subject)
        } else {
            format!("{} {} {}", verb, self.menu_name, subject)
        }
    }
}

/// Verb by control kind; anything clickable that takes no value is a
/// plain click.
fn verb_for(snapshot: &PageSnapshot, control: Option<NodeId>) -> Verb {
    let Some(control) = control else {
        return Verb::Click;
    };
    match snapshot.tag(control) {
        "select" => Verb::Select,
        "textarea" => Verb::Enter,
        "input" => {
            let input_type = snapshot.attr(control, "type").unwrap_or("").to_lowercase();
            if matches!(
                input_type.as_str(),
                "button" | "submit" | "reset" | "checkbox" | "radio"
            ) {
                Verb::Click
            } else {
                Verb::Enter
            }
        }
        _ => Verb::Click,
    }
}

/// Control a clicked label refers to: its `for` target, else the first
/// form control nested inside it.
fn label_target(snapshot: &PageSnapshot, label: NodeId) -> Option<NodeId> {
    if let Some(for_id) = snapshot.attr_nonempty(label, "for")
        && let Some(target) = snapshot.by_id(for_id)
    {
        return Some(target);
    }
    ["input", "select", "textarea"]
        .iter()
        .find_map(|tag| snapshot.descendant_with_tag(label, tag))
}

/// Label associated with a control: an explicit `label[for]` first, then
/// the nearest preceding-sibling label walking up the ancestor chain,
/// then a wrapping parent label.
pub fn label_for_control(snapshot: &PageSnapshot, control: NodeId) -> Option<NodeId> {
    if let Some(id) = snapshot.attr_nonempty(control, "id")
        && let Some(label) = snapshot
            .labels()
            .into_iter()
            .find(|&l| snapshot.attr(l, "for") == Some(id))
    {
        return Some(label);
    }

    let mut current = control;
    loop {
        if let Some(label) = snapshot
            .preceding_siblings(current)
            .into_iter()
            .find(|&sib| snapshot.tag(sib) == "label")
        {
            return Some(label);
        }
        let parent = snapshot.parent(current)?;
        if snapshot.tag(parent) == "label" {
            return Some(parent);
        }
        if snapshot.tag(parent) == "body" {
            return None;
        }
        current = parent;
    }
}

/// Human-readable form of an identifier-ish subject: split camelCase,
/// turn underscores into spaces, and title-case every word.
pub fn humanize(text: &str) -> String {
    let mut spaced = String::with_capacity(text.len() + 4);
    let chars: Vec<char> = text.replace('_', " ").chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() && chars[i - 1].is_lowercase() {
            spaced.push(' ');
        }
        spaced.push(c);
    }

    spaced
        .split_whitespace()
        .map(|word| {
            let mut cs = word.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().collect::<String>() + cs.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_trailing_punct(text: &str) -> String {
    text.trim_end_matches(TRAILING_PUNCT).trim().to_string()
}

fn remove_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
#[path = "gherkin_test.rs"]
mod gherkin_test;
