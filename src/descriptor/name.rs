use once_cell::sync::Lazy;
use regex::Regex;

// Matches `base<args>` or `base[args]` generic instantiations.
static GENERIC_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)[<\[](.+)[>\]]$").expect("generic name regex")
});

/// Rewrite a qualified type name into its canonical, `$ref`-safe form.
///
/// Plain names pass through unchanged. Generic instantiations collapse the
/// bracketed argument into a `..`-joined suffix, keeping only the last
/// path segment of the argument:
///
/// - `pets.Page<registry.Pet>` becomes `pets.Page..registry.Pet`
/// - `pets.Page[some/module/registry.Pet]` becomes `pets.Page..registry.Pet`
///
/// Any character illegal in a component reference (`< > [ ] / :`, commas and
/// whitespace) that survives the rewrite is replaced by `.`, so the same
/// instantiation always produces the same legal name.
pub fn canonical_type_name(raw: &str) -> String {
    let joined = match GENERIC_NAME_RE.captures(raw) {
        Some(caps) => format!("{}..{}", &caps[1], last_path_segment(&caps[2])),
        None => raw.to_string(),
    };

    joined
        .chars()
        .map(|c| match c {
            '<' | '>' | '[' | ']' | '/' | ':' | ',' | ' ' => '.',
            _ => c,
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

/// Reference string for a canonical component name.
pub fn component_ref(canonical: &str) -> String {
    format!("#/components/schemas/{canonical}")
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Derive the wire-facing snake_case form of a declared name.
///
/// Handles camelCase, PascalCase and acronym runs (`HTTPServer` becomes
/// `http_server`); names that are already snake_case pass through unchanged.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && chars[i - 1].is_lowercase();
            let next_lower = i + 1 < chars.len() && chars[i + 1].is_lowercase();
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                out.push('_');
            }
            for lc in c.to_lowercase() {
                out.push(lc);
            }
        } else {
            out.push(c);
        }
    }

    out
}
