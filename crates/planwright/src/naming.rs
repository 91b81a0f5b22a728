//! Identifier and file-name casing helpers.

/// Split free text into lowercase alphanumeric words.
#[must_use]
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// `["login", "button"]` -> `loginButton`
///
/// A leading digit gets an `n` prefix so the result stays a valid identifier.
#[must_use]
pub fn camel_case<S: AsRef<str>>(words: &[S]) -> String {
    let mut out = String::new();
    for (i, w) in words.iter().enumerate() {
        let w = w.as_ref().to_lowercase();
        if i == 0 {
            out.push_str(&w);
        } else {
            out.push_str(&capitalize(&w));
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'n');
    }
    out
}

/// `["user", "settings"]` -> `UserSettings`
#[must_use]
pub fn pascal_case<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| capitalize(&w.as_ref().to_lowercase()))
        .collect()
}

/// `loginButton` -> `LoginButton`
#[must_use]
pub fn upper_first(ident: &str) -> String {
    capitalize(ident)
}

/// `LoginPage` -> `loginPage`
#[must_use]
pub fn lower_first(ident: &str) -> String {
    let mut chars = ident.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

/// `["remember", "me"]` -> `Remember me`
#[must_use]
pub fn sentence_case<S: AsRef<str>>(words: &[S]) -> String {
    let joined = words
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    capitalize(&joined)
}

/// `UserSettings` -> `user-settings`
#[must_use]
pub fn kebab_from_pascal(ident: &str) -> String {
    let mut out = String::new();
    for (i, c) in ident.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push('-');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Lower-case, hyphenated, filesystem-safe slug.
///
/// Never empty: text with no alphanumerics becomes `scenario`.
#[must_use]
pub fn slug(text: &str) -> String {
    let joined = words(text)
        .into_iter()
        .map(|w| {
            w.chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if joined.is_empty() {
        "scenario".to_string()
    } else {
        joined
    }
}
