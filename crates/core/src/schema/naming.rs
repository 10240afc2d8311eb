//! Deterministic identifier derivation from remote names.
//!
//! Every derived form starts from the same word split — non-alphanumeric
//! runs are separators — so the camel, snake, Pascal, and shouty forms of a
//! name always agree with each other.

/// Split a remote name into lowercase words on non-alphanumeric runs.
fn words(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Lower-camel semantic name: `Book Rating` → `bookRating`.
pub fn camel_case(name: &str) -> String {
    let words = words(name);
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// Upper-camel type name: `book club` → `BookClub`.
pub fn pascal_case(name: &str) -> String {
    words(name).iter().map(|w| capitalize(w)).collect()
}

/// Snake identifier: `Book Rating` → `book_rating`.
pub fn snake_case(name: &str) -> String {
    words(name).join("_")
}

/// Shouty constant name: `Book Rating` → `BOOK_RATING`.
pub fn shouty_case(name: &str) -> String {
    words(name)
        .iter()
        .map(|w| w.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Split a camelCase name back into snake form on case boundaries:
/// `bookClub` → `book_club`. Used where only the camel form is recorded,
/// e.g. resolving module names from cached metadata.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Make a derived name a legal Rust identifier. Identifiers cannot start
/// with a digit, so `2nd Author` → `_2nd_author`.
pub fn ident_safe(name: &str) -> String {
    match name.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{name}"),
        _ => name.to_string(),
    }
}
