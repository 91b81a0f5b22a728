//! Step intent classification.
//!
//! A step intent is free text such as `Enter "alice" in the username field
//! and click the login button`. The classifier pulls quoted literals out,
//! splits the rest into clauses and maps each clause onto exactly one
//! [`Capability`] by its leading verb. Verification verbs are further sorted
//! by cue words. Anything that does not map onto a single capability is
//! reported as [`Classification::Ambiguous`], [`Classification::Unresolved`]
//! or [`Classification::Compound`] and is never guessed.

use crate::result::PlanwrightResult;
use regex::Regex;
use std::fmt;

/// The fixed set of things a step can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Load a page
    Navigate,
    /// Type into a field
    Fill,
    /// Click an element
    Click,
    /// Choose an option
    Select,
    /// Check that an element is visible
    VerifyVisible,
    /// Check element text
    VerifyText,
    /// Check an input value
    VerifyValue,
    /// Hover an element
    Hover,
    /// Drag an element onto another
    Drag,
    /// Upload files
    Upload,
    /// Accept or dismiss a dialog
    Dialog,
    /// Press a key
    Key,
    /// Wait for something
    Wait,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigate => "navigate",
            Self::Fill => "fill",
            Self::Click => "click",
            Self::Select => "select",
            Self::VerifyVisible => "verify visible",
            Self::VerifyText => "verify text",
            Self::VerifyValue => "verify value",
            Self::Hover => "hover",
            Self::Drag => "drag",
            Self::Upload => "upload",
            Self::Dialog => "dialog",
            Self::Key => "key",
            Self::Wait => "wait",
        };
        f.write_str(name)
    }
}

/// Classifier verdict for one clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Exactly one capability
    Matched(Capability),
    /// Several capabilities fit equally well
    Ambiguous(Vec<Capability>),
    /// Nothing fits
    Unresolved,
    /// `and` joins words that read as neither two actions nor two elements,
    /// as in `the Terms and Conditions link`
    Compound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerbRule {
    Is(Capability),
    Dialog,
    Press,
    Check,
    Verify,
}

/// Verb phrases, each with its canonical spelling. Longer phrases are tried
/// first so `fill in` wins over `fill`.
const VERBS: &[(&str, VerbRule)] = &[
    ("navigate to", VerbRule::Is(Capability::Navigate)),
    ("navigate", VerbRule::Is(Capability::Navigate)),
    ("go to", VerbRule::Is(Capability::Navigate)),
    ("browse to", VerbRule::Is(Capability::Navigate)),
    ("open", VerbRule::Is(Capability::Navigate)),
    ("visit", VerbRule::Is(Capability::Navigate)),
    ("load", VerbRule::Is(Capability::Navigate)),
    ("fill in", VerbRule::Is(Capability::Fill)),
    ("fill out", VerbRule::Is(Capability::Fill)),
    ("fill", VerbRule::Is(Capability::Fill)),
    ("enter", VerbRule::Is(Capability::Fill)),
    ("type", VerbRule::Is(Capability::Fill)),
    ("input", VerbRule::Is(Capability::Fill)),
    ("provide", VerbRule::Is(Capability::Fill)),
    ("click on", VerbRule::Is(Capability::Click)),
    ("click", VerbRule::Is(Capability::Click)),
    ("tap", VerbRule::Is(Capability::Click)),
    ("submit", VerbRule::Is(Capability::Click)),
    ("select", VerbRule::Is(Capability::Select)),
    ("choose", VerbRule::Is(Capability::Select)),
    ("pick", VerbRule::Is(Capability::Select)),
    ("hover over", VerbRule::Is(Capability::Hover)),
    ("hover on", VerbRule::Is(Capability::Hover)),
    ("hover", VerbRule::Is(Capability::Hover)),
    ("mouse over", VerbRule::Is(Capability::Hover)),
    ("drag", VerbRule::Is(Capability::Drag)),
    ("upload", VerbRule::Is(Capability::Upload)),
    ("attach", VerbRule::Is(Capability::Upload)),
    ("wait for", VerbRule::Is(Capability::Wait)),
    ("wait until", VerbRule::Is(Capability::Wait)),
    ("wait", VerbRule::Is(Capability::Wait)),
    ("accept", VerbRule::Dialog),
    ("dismiss", VerbRule::Dialog),
    ("press", VerbRule::Press),
    ("check", VerbRule::Check),
    ("verify", VerbRule::Verify),
    ("ensure", VerbRule::Verify),
    ("confirm", VerbRule::Verify),
    ("assert", VerbRule::Verify),
    ("expect", VerbRule::Verify),
    ("validate", VerbRule::Verify),
];

const DIALOG_NOUNS: &[&str] = &[
    "dialog", "alert", "confirm", "confirmation", "prompt", "popup", "modal",
];
const NEGATIONS: &[&str] = &["not", "no", "never", "isn", "aren", "doesn", "don", "cannot"];
const VALUE_CUES: &[&str] = &["value"];
const TEXT_CUES: &[&str] = &[
    "shows", "show", "showing", "contains", "contain", "containing", "text", "reads", "says",
    "displays", "display",
];
const VISIBLE_CUES: &[&str] = &[
    "displayed", "visible", "shown", "appears", "appear", "loaded", "present",
];

const LITERAL_OPEN: char = '\u{E000}';
const LITERAL_CLOSE: char = '\u{E001}';

/// One classified clause of a step intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    text: String,
    verb: Option<&'static str>,
    object: String,
    literals: Vec<String>,
    classification: Classification,
}

impl Clause {
    /// Clause as written, literals restored
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Canonical verb phrase, matched or inherited from the previous clause
    #[must_use]
    pub const fn verb(&self) -> Option<&'static str> {
        self.verb
    }

    /// Lowercase text after the verb, literals removed
    #[must_use]
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Quoted literals in order of appearance
    #[must_use]
    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// The verdict
    #[must_use]
    pub const fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Matched capability, if any
    #[must_use]
    pub fn capability(&self) -> Option<Capability> {
        match &self.classification {
            Classification::Matched(c) => Some(*c),
            _ => None,
        }
    }

    /// Words of the object
    #[must_use]
    pub fn words(&self) -> Vec<String> {
        crate::naming::words(&self.object)
    }
}

/// Splits intents into clauses and classifies them
#[derive(Debug)]
pub struct IntentClassifier {
    separators: Regex,
    conjunction: Regex,
    filler: Regex,
    literal: Regex,
    verbs: Vec<(Regex, &'static str, VerbRule)>,
}

impl IntentClassifier {
    /// Compile the clause grammar
    pub fn new() -> PlanwrightResult<Self> {
        let separators = Regex::new(
            r"(?i)\s*,\s*(?:and\s+)?then\s+|\s*,\s*and\s+|\s*;\s*|\s+and\s+then\s+",
        )?;
        let conjunction = Regex::new(r"(?i)\s+and\s+")?;
        let filler = Regex::new(
            r"(?i)^(?:(?:then|also|now|next|finally|first|please|the\s+user|user|we|i)\s+)+",
        )?;
        let literal = Regex::new(&format!("{LITERAL_OPEN}(\\d+){LITERAL_CLOSE}"))?;

        let mut phrases: Vec<&(&str, VerbRule)> = VERBS.iter().collect();
        phrases.sort_by_key(|(p, _)| std::cmp::Reverse(p.len()));
        let verbs = phrases
            .into_iter()
            .map(|(phrase, rule)| {
                let mut parts = phrase.split(' ');
                let head = parts.next().unwrap_or_default();
                let tail: String = parts.map(|p| format!(r"\s+{p}")).collect();
                let pattern = format!(r"(?i)^{head}(?:es|s)?{tail}(?:\s+|$)");
                Regex::new(&pattern).map(|re| (re, *phrase, *rule))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            separators,
            conjunction,
            filler,
            literal,
            verbs,
        })
    }

    /// Classify every clause of an intent, in order
    #[must_use]
    pub fn classify(&self, intent: &str) -> Vec<Clause> {
        let (masked, literals) = extract_literals(intent);
        let mut clauses = Vec::new();
        let mut previous: Option<(&'static str, VerbRule)> = None;

        let pieces = self
            .separators
            .split(&masked)
            .flat_map(|segment| self.conjuncts(segment));
        for (raw, compound) in pieces {
            let raw = raw.trim().trim_end_matches(['.', '!']).trim();
            if raw.is_empty() {
                continue;
            }
            let stripped = self.filler.replace(raw, "");
            let stripped = stripped.trim();

            let found = self
                .verbs
                .iter()
                .find_map(|(re, phrase, rule)| re.find(stripped).map(|m| (m.end(), *phrase, *rule)));
            let (object, verb) = match found {
                Some((end, phrase, rule)) => {
                    previous = Some((phrase, rule));
                    (&stripped[end..], Some((phrase, rule)))
                }
                None => (stripped, previous),
            };

            let clause_literals: Vec<String> = self
                .literal
                .captures_iter(object)
                .filter_map(|c| c[1].parse::<usize>().ok())
                .filter_map(|i| literals.get(i).cloned())
                .collect();
            let object_text = self.literal.replace_all(object, " ").to_lowercase();
            let object_text = object_text.split_whitespace().collect::<Vec<_>>().join(" ");

            let classification = match verb {
                _ if compound => Classification::Compound,
                Some((_, rule)) => classify_rule(rule, &object_text, clause_literals.len()),
                None => Classification::Unresolved,
            };

            let text = self.literal.replace_all(raw, |c: &regex::Captures<'_>| {
                let lit = c[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| literals.get(i))
                    .map_or("", String::as_str);
                format!("\"{lit}\"")
            });

            clauses.push(Clause {
                text: text.into_owned(),
                verb: verb.map(|(p, _)| p),
                object: object_text,
                literals: clause_literals,
                classification,
            });
        }
        clauses
    }

    /// Split a segment on bare `and`. A split happens only when the right
    /// side opens with a verb or both sides end in an element word; other
    /// pieces are glued back and flagged compound.
    fn conjuncts(&self, segment: &str) -> Vec<(String, bool)> {
        let mut out: Vec<(String, bool)> = Vec::new();
        for piece in self.conjunction.split(segment) {
            let glue = match out.last() {
                Some((prev, _)) => {
                    !(self.starts_with_verb(piece) || (ends_in_element(prev) && ends_in_element(piece)))
                }
                None => false,
            };
            match out.last_mut() {
                Some((prev, compound)) if glue => {
                    prev.push_str(" and ");
                    prev.push_str(piece);
                    *compound = true;
                }
                _ => out.push((piece.to_string(), false)),
            }
        }
        out
    }

    fn starts_with_verb(&self, piece: &str) -> bool {
        let stripped = self.filler.replace(piece.trim(), "");
        self.verbs.iter().any(|(re, _, _)| re.is_match(stripped.trim()))
    }
}

fn ends_in_element(text: &str) -> bool {
    crate::naming::words(text)
        .last()
        .is_some_and(|w| crate::planner::is_element_word(w))
}

fn classify_rule(rule: VerbRule, object: &str, literal_count: usize) -> Classification {
    let words = crate::naming::words(object);
    let has = |set: &[&str]| words.iter().any(|w| set.contains(&w.as_str()));
    match rule {
        VerbRule::Is(c) => Classification::Matched(c),
        VerbRule::Dialog if has(DIALOG_NOUNS) => Classification::Matched(Capability::Dialog),
        VerbRule::Dialog => Classification::Unresolved,
        VerbRule::Press if has(&["button"]) => Classification::Matched(Capability::Click),
        VerbRule::Press => Classification::Matched(Capability::Key),
        VerbRule::Check if has(&["checkbox"]) => Classification::Matched(Capability::Click),
        VerbRule::Check | VerbRule::Verify => {
            if has(NEGATIONS) {
                return Classification::Unresolved;
            }
            let mut caps = Vec::new();
            if has(VALUE_CUES) {
                caps.push(Capability::VerifyValue);
            }
            if has(TEXT_CUES) && literal_count > 0 {
                caps.push(Capability::VerifyText);
            }
            if has(VISIBLE_CUES) {
                caps.push(Capability::VerifyVisible);
            }
            match caps.len() {
                0 => Classification::Unresolved,
                1 => Classification::Matched(caps[0]),
                _ => Classification::Ambiguous(caps),
            }
        }
    }
}

/// Replace quoted literals with numbered placeholders.
///
/// Double quotes and curly quotes always delimit a literal. A single quote
/// opens one only at the start or after whitespace or `(`, and closes only
/// before whitespace, punctuation or the end, so apostrophes survive.
fn extract_literals(text: &str) -> (String, Vec<String>) {
    let chars: Vec<char> = text.chars().collect();
    let mut masked = String::with_capacity(text.len());
    let mut literals = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let close = match c {
            '"' => Some('"'),
            '\u{201C}' => Some('\u{201D}'),
            '\u{2018}' => Some('\u{2019}'),
            '\'' if i == 0 || chars[i - 1].is_whitespace() || chars[i - 1] == '(' => Some('\''),
            _ => None,
        };
        if let Some(end) = close.and_then(|close| find_close(&chars, i + 1, close)) {
            masked.push(LITERAL_OPEN);
            masked.push_str(&literals.len().to_string());
            masked.push(LITERAL_CLOSE);
            literals.push(chars[i + 1..end].iter().collect());
            i = end + 1;
            continue;
        }
        masked.push(c);
        i += 1;
    }
    (masked, literals)
}

fn find_close(chars: &[char], start: usize, close: char) -> Option<usize> {
    (start..chars.len()).find(|&j| {
        chars[j] == close
            && (close != '\''
                || chars
                    .get(j + 1)
                    .map_or(true, |n| n.is_whitespace() || ".,;:!?)".contains(*n)))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn classify(intent: &str) -> Vec<Clause> {
        IntentClassifier::new().unwrap().classify(intent)
    }

    fn caps(intent: &str) -> Vec<Classification> {
        classify(intent).into_iter().map(|c| c.classification).collect()
    }

    mod literal_tests {
        use super::*;

        #[test]
        fn test_double_and_single_quotes() {
            let (masked, lits) = extract_literals(r#"Enter "alice" and 'secret pw'"#);
            assert_eq!(lits, vec!["alice", "secret pw"]);
            assert!(!masked.contains("alice"));
        }

        #[test]
        fn test_apostrophes_are_not_quotes() {
            let (_, lits) = extract_literals("Click the user's profile link");
            assert!(lits.is_empty());
            let (_, lits) = extract_literals("Verify the heading shows 'Don't panic'.");
            assert_eq!(lits, vec!["Don't panic"]);
        }

        #[test]
        fn test_curly_quotes() {
            let (_, lits) = extract_literals("Type \u{201C}hello\u{201D} in search");
            assert_eq!(lits, vec!["hello"]);
        }

        #[test]
        fn test_unterminated_quote_is_text() {
            let (masked, lits) = extract_literals("Enter \"oops");
            assert!(lits.is_empty());
            assert_eq!(masked, "Enter \"oops");
        }
    }

    mod split_tests {
        use super::*;

        #[test]
        fn test_separators() {
            let clauses = classify("Navigate to the login page, then enter valid credentials and click the login button");
            assert_eq!(clauses.len(), 3);
            assert_eq!(clauses[0].capability(), Some(Capability::Navigate));
            assert_eq!(clauses[1].capability(), Some(Capability::Fill));
            assert_eq!(clauses[2].capability(), Some(Capability::Click));
            assert_eq!(clauses[2].object(), "the login button");
        }

        #[test]
        fn test_and_inside_quotes_does_not_split() {
            let clauses = classify(r#"Enter "salt and pepper" in the search field"#);
            assert_eq!(clauses.len(), 1);
            assert_eq!(clauses[0].literals(), &["salt and pepper".to_string()]);
            assert_eq!(clauses[0].text(), r#"Enter "salt and pepper" in the search field"#);
        }

        #[test]
        fn test_verb_inheritance() {
            let clauses = classify("Enter the username field and the password field");
            assert_eq!(clauses.len(), 2);
            assert_eq!(clauses[1].verb(), Some("enter"));
            assert_eq!(clauses[1].capability(), Some(Capability::Fill));
            assert_eq!(clauses[1].object(), "the password field");
        }

        #[test]
        fn test_and_inside_a_name_stays_one_clause() {
            let clauses = classify("Click the Terms and Conditions link");
            assert_eq!(clauses.len(), 1);
            assert_eq!(clauses[0].text(), "Click the Terms and Conditions link");
            assert_eq!(clauses[0].classification(), &Classification::Compound);

            let clauses = classify("Enter the username and password");
            assert_eq!(clauses.len(), 1);
            assert_eq!(clauses[0].classification(), &Classification::Compound);
        }

        #[test]
        fn test_and_before_a_verb_splits() {
            let clauses = classify("Click the save button and wait 2 seconds");
            assert_eq!(clauses.len(), 2);
            assert_eq!(clauses[1].capability(), Some(Capability::Wait));
        }

        #[test]
        fn test_filler_and_inflection() {
            let clauses = classify("The user clicks the submit button.");
            assert_eq!(clauses[0].capability(), Some(Capability::Click));
            assert_eq!(clauses[0].object(), "the submit button");
        }
    }

    mod verb_tests {
        use super::*;

        #[test]
        fn test_fixed_verbs() {
            assert_eq!(caps("Go to the settings page"), vec![Classification::Matched(Capability::Navigate)]);
            assert_eq!(caps("Fill in the email field"), vec![Classification::Matched(Capability::Fill)]);
            assert_eq!(caps("Choose 'US' from the country dropdown"), vec![Classification::Matched(Capability::Select)]);
            assert_eq!(caps("Hover over the avatar"), vec![Classification::Matched(Capability::Hover)]);
            assert_eq!(caps("Drag the card to the done column"), vec![Classification::Matched(Capability::Drag)]);
            assert_eq!(caps("Upload 'a.png' to the avatar input"), vec![Classification::Matched(Capability::Upload)]);
            assert_eq!(caps("Wait for the spinner to disappear"), vec![Classification::Matched(Capability::Wait)]);
        }

        #[test]
        fn test_press_and_check() {
            assert_eq!(caps("Press Enter"), vec![Classification::Matched(Capability::Key)]);
            assert_eq!(caps("Press the save button"), vec![Classification::Matched(Capability::Click)]);
            assert_eq!(caps("Check the terms checkbox"), vec![Classification::Matched(Capability::Click)]);
        }

        #[test]
        fn test_dialog_needs_noun() {
            assert_eq!(caps("Accept the confirmation dialog"), vec![Classification::Matched(Capability::Dialog)]);
            assert_eq!(caps("Accept the terms"), vec![Classification::Unresolved]);
        }

        #[test]
        fn test_unknown_verb() {
            assert_eq!(caps("Wave at the logo"), vec![Classification::Unresolved]);
        }
    }

    mod verification_tests {
        use super::*;

        #[test]
        fn test_cue_categories() {
            assert_eq!(
                caps("Verify the dashboard page is displayed"),
                vec![Classification::Matched(Capability::VerifyVisible)]
            );
            assert_eq!(
                caps("Verify the error message shows 'Invalid credentials'"),
                vec![Classification::Matched(Capability::VerifyText)]
            );
            assert_eq!(
                caps("Ensure the email field has value 'a@b.c'"),
                vec![Classification::Matched(Capability::VerifyValue)]
            );
        }

        #[test]
        fn test_text_cue_needs_literal() {
            assert_eq!(caps("Verify the banner shows"), vec![Classification::Unresolved]);
        }

        #[test]
        fn test_competing_cues_are_ambiguous() {
            assert_eq!(
                caps("Verify the total value is displayed"),
                vec![Classification::Ambiguous(vec![
                    Capability::VerifyValue,
                    Capability::VerifyVisible
                ])]
            );
        }

        #[test]
        fn test_negation_is_unresolved() {
            assert_eq!(caps("Verify the error is not displayed"), vec![Classification::Unresolved]);
        }

        #[test]
        fn test_no_cue_is_unresolved() {
            assert_eq!(caps("Verify the login works"), vec![Classification::Unresolved]);
        }
    }
}
