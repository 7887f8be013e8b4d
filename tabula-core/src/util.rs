use std::borrow::Cow;

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Shortens long SQL text for log lines.
pub fn truncate_long(value: &str) -> Cow<'_, str> {
    match value.char_indices().nth(497) {
        Some((end, _)) => Cow::Owned(format!("{}...", value[..end].trim_end())),
        None => Cow::Borrowed(value),
    }
}

#[cfg(test)]
mod tests {
    use super::{separated_by, truncate_long};

    #[test]
    fn separated() {
        let mut out = String::from("(");
        separated_by(&mut out, ["a", "", "b"], |out, v| out.push_str(v), ", ");
        assert_eq!(out, "(a, b");
    }

    #[test]
    fn truncate() {
        assert_eq!(truncate_long("short"), "short");
        let long = "è".repeat(600);
        let truncated = truncate_long(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 500);
    }
}
