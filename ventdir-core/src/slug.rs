/// Lowercase, dash-separated ASCII slug used in every public URL
/// (`/states/{state}/{city}/{slug}`) and in ETL output directory names.
pub fn slugify(input: &str) -> String {
    let mut slug = String::new();
    let mut last_was_dash = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if ch.is_ascii() && !slug.is_empty() && !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
        // Non-ASCII characters are skipped entirely.
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Turn a state slug back into the fragment used for a case-insensitive
/// state match (`new-york` -> `new york`).
pub fn unslug_state(slug: &str) -> String {
    slug.replace('-', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic_cases() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("emoji 😀 test"), "emoji-test");
        assert_eq!(slugify("foo/bar\\baz"), "foo-bar-baz");
    }

    #[test]
    fn slugify_business_names() {
        assert_eq!(slugify("Dryer Vent Wizard of N. Indy"), "dryer-vent-wizard-of-n-indy");
        assert_eq!(slugify("  A+ Vent & Duct  "), "a-vent-duct");
        assert_eq!(slugify("Indiana, United States"), "indiana-united-states");
    }

    #[test]
    fn unslug_state_restores_spaces() {
        assert_eq!(unslug_state("north-carolina"), "north carolina");
        assert_eq!(unslug_state("ohio"), "ohio");
    }
}
