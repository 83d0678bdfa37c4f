//! Text helpers.

/// Uppercase the first character and lowercase the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

/// Capitalize every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            out.push_str(&capitalize(&word));
            word.clear();
            out.push(c);
        } else {
            word.push(c);
        }
    }
    out.push_str(&capitalize(&word));
    out
}

/// Cut `text` to `length` characters, appending `suffix` when shortened.
pub fn truncate(text: &str, length: usize, suffix: &str) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }
    let mut out: String = text.chars().take(length).collect();
    out.push_str(suffix);
    out
}

/// URL-friendly slug: lowercase ASCII, accents folded, words joined by `-`.
pub fn slug(text: &str) -> String {
    let folded: String = text.to_lowercase().chars().map(fold_accent).collect();
    let cleaned: String = folded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();

    let mut out = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        if c == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(c);
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Join items as natural language: `a, b y c`.
pub fn list(items: &[&str], separator: &str, last_separator: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{}{}{}", init.join(separator), last_separator, last),
    }
}

/// Prefix `https://` when the URL has no scheme.
pub fn url(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let lower = value.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        value.to_string()
    } else {
        format!("https://{}", value)
    }
}
