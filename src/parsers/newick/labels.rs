/// Formats a label for output in a Newick/NEXUS tree description.
///
/// A label is written bare when it starts with a letter and contains only
/// letters, digits, spaces, underscores and periods; spaces then become
/// underscores. Any other label is wrapped in single quotes with embedded
/// quotes doubled.
pub fn nexus_string<'a>(label: impl Into<&'a str>) -> String {
    let label: &str = label.into();
    let mut chars = label.chars();
    let enclose = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => !chars.all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.')
        }),
        _ => true,
    };

    let mut output = String::with_capacity(label.len() + 2);
    if enclose {
        output.push('\'');
    }
    for c in label.chars() {
        match c {
            '\'' => output.push_str("''"),
            ' ' if !enclose => output.push('_'),
            _ => output.push(c),
        }
    }
    if enclose {
        output.push('\'');
    }
    output
}

/// Converts underscores of a bare Newick label to spaces for display.
pub fn nexus_to_display<'a>(label: impl Into<&'a str>) -> String {
    replace_character(label, '_', ' ')
}

pub fn replace_character<'a>(
    s: impl Into<&'a str>,
    needle: char,
    replace: char,
) -> String {
    s.into().chars().map(|c| if c == needle { replace } else { c }).collect()
}
