// Canonical text form used by every fuzzy comparison in the engine:
// lowercase, collapse common look-alike substitutions, keep alphanumerics,
// drop everything else. "S-p-4-m!" and "spam" come out identical.

/// Map a character to the letter it imitates, if it is a known substitution.
fn substitute(c: char) -> Option<char> {
    let mapped = match c {
        // Numbers to letters
        '0' => 'o',
        '1' => 'i',
        '3' => 'e',
        '4' => 'a',
        '5' => 's',
        '6' => 'g',
        '7' => 't',
        '8' => 'b',
        '9' => 'g',
        // Special characters
        '@' => 'a',
        '$' => 's',
        '!' => 'i',
        '+' => 't',
        '*' => 'x',
        _ => return None,
    };
    Some(mapped)
}

/// Normalize a message for comparison purposes.
///
/// Empty input gives empty output; the function is total and idempotent.
pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());

    for c in text.to_lowercase().chars() {
        if let Some(mapped) = substitute(c) {
            normalized.push(mapped);
        } else if c.is_alphanumeric() {
            normalized.push(c);
        }
        // Whitespace and remaining punctuation are dropped.
    }

    normalized
}
