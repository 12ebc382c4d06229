//! Amenities from SerpAPI `extensions` and `service_options`

use serde_json::Value;
use ventdir_core::Amenity;

/// Extension keys, the category they map to, and the word separator used
/// in their raw values. `None` keeps the value as written.
const EXTENSION_CATEGORIES: [(&str, &str, Option<char>); 7] = [
    ("service_options", "Service options", Some('_')),
    ("accessibility", "Accessibility", Some('-')),
    ("from_the_business", "Offerings", None),
    ("planning", "Planning", Some(' ')),
    ("parking", "Parking", Some(' ')),
    ("crowd", "Crowd", Some(' ')),
    ("amenities", "Amenities", Some('-')),
];

/// Capitalize each `sep`-separated word and join with spaces.
pub fn title_words(value: &str, sep: char) -> String {
    value
        .split(sep)
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn amenity(name: String, category: &str) -> Amenity {
    Amenity {
        name,
        category: category.to_string(),
    }
}

/// Collect amenities in the order SerpAPI lists them.
pub fn extract_amenities(extensions: Option<&Value>, service_options: Option<&Value>) -> Vec<Amenity> {
    let mut out = Vec::new();

    if let Some(options) = service_options {
        if options.get("online_estimates").and_then(Value::as_bool) == Some(true) {
            out.push(amenity("Online Estimates".into(), "Service options"));
        }
        if options.get("on_site_services").and_then(Value::as_bool) == Some(true) {
            out.push(amenity("On-site Services".into(), "Service options"));
        }
    }

    let Some(extensions) = extensions.and_then(Value::as_array) else {
        return out;
    };

    for ext in extensions {
        for (key, category, sep) in EXTENSION_CATEGORIES {
            let Some(values) = ext.get(key).and_then(Value::as_array) else {
                continue;
            };
            for raw in values.iter().filter_map(Value::as_str) {
                let name = match sep {
                    Some(sep) => title_words(raw, sep),
                    None => raw.to_string(),
                };
                out.push(amenity(name, category));
            }
        }
    }
    out
}
