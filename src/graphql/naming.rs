//! Identifier casing for generated declarations

fn split_words(name: &str) -> Vec<String> {
    let chars = name.chars().collect::<Vec<char>>();
    let mut words = Vec::new();
    let mut current = String::new();
    for (index, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let previous = chars[index - 1];
            let next_is_lower = chars.get(index + 1).is_some_and(|next| next.is_lowercase());
            // `getUser`, `user2FA` and the `R` in `HTTPRequest` all start a new word
            if previous.is_lowercase()
                || previous.is_numeric()
                || (previous.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize_word(index: usize, word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) if index > 0 && first.is_ascii_digit() => {
            format!("_{}{}", first, chars.as_str().to_lowercase())
        }
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
    }
}

fn pascal_case_segment(segment: &str) -> String {
    split_words(segment)
        .iter()
        .enumerate()
        .map(|(index, word)| capitalize_word(index, word))
        .collect()
}

/// PascalCase conversion. Underscores survive as word joiners unless
/// `transform_underscore` is set, in which case they only separate words.
pub fn pascal_case(name: &str, transform_underscore: bool) -> String {
    if transform_underscore {
        return pascal_case_segment(name);
    }
    name.split('_')
        .map(pascal_case_segment)
        .collect::<Vec<String>>()
        .join("_")
}

/// Cache key used by the generated primitives: hyphen before each ASCII
/// uppercase letter, lowercased, minus the first character.
///
/// The first character is dropped unconditionally, so a name that does not
/// start with an uppercase letter loses a real letter (`ping` becomes `ing`).
/// Existing generated keys depend on this; confirm with consumers before
/// changing it.
pub fn kebab_key(name: &str) -> String {
    let mut hyphenated = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            hyphenated.push('-');
        }
        hyphenated.push(c);
    }
    let lowered = hyphenated.to_lowercase();
    let mut chars = lowered.chars();
    chars.next();
    chars.as_str().to_string()
}
