//! Package identifier and display title derivation

/// Turn a project name into a package identifier.
///
/// Every `-` and space becomes `_`. Case is preserved and no other
/// characters are checked.
pub fn derive_identifier(name: &str) -> String {
    name.replace(['-', ' '], "_")
}

/// Turn a package identifier into a human-facing title ("my_app" -> "My App").
pub fn derive_title(identifier: &str) -> String {
    identifier
        .replace('_', " ")
        .split(' ')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
