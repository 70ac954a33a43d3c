const MAX_PROJECT_NAME_LEN: usize = 40;
const SYNTHETIC_PREFIX: &str = "ai-website";

/// Project name for a deployment: the caller's name made host-safe, or a
/// unique synthetic one when none was given.
pub fn derive_project_name(custom_name: Option<&str>) -> String {
    match custom_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => sanitize_project_name(name),
        None => synthesize_project_name(),
    }
}

/// Lower-cases, replaces anything but ASCII alphanumerics and `-` with `-`,
/// makes sure the name starts with a letter and caps it at 40 characters.
pub fn sanitize_project_name(name: &str) -> String {
    let mut sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect();

    if !sanitized.starts_with(|c: char| c.is_ascii_alphabetic()) {
        sanitized = format!("web-{}", sanitized);
    }
    // Only ASCII is left, so byte truncation is safe.
    sanitized.truncate(MAX_PROJECT_NAME_LEN);
    sanitized
}

fn synthesize_project_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        SYNTHETIC_PREFIX,
        chrono::Utc::now().timestamp(),
        &id[..8]
    )
}
