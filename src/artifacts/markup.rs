//! Regex surgery on generated HTML.
//!
//! The artifact store and the validator both run generated markup through
//! these functions. Every function here is idempotent: applying it to its own
//! output changes nothing.

use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const IMAGES_DIR: &str = "images";
pub const FAVICON_FILE: &str = "favicon.ico";

/// Classes every `<img>` must carry.
pub const RESPONSIVE_CLASSES: [&str; 3] = ["max-w-full", "h-auto", "object-cover"];

static IMG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap());

static SRC_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)(\ssrc\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap());

static CLASS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)(\sclass\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap());

static LOADING_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\sloading\s*=").unwrap());

static DRIVE_LETTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]:").unwrap());

static HEAD_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</head>").unwrap());

static ICON_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<link\b[^>]*\brel\s*=\s*["'][^"']*\bicon\b[^"']*["']"#).unwrap()
});

/// Value of a quoted or unquoted attribute match, with the quote to write it back with.
/// Unquoted values are written back double-quoted.
fn attribute_value<'h>(caps: &Captures<'h>) -> Option<(char, &'h str)> {
    match (caps.get(2), caps.get(3), caps.get(4)) {
        (Some(m), _, _) => Some(('"', m.as_str())),
        (_, Some(m), _) => Some(('\'', m.as_str())),
        (_, _, Some(m)) => Some(('"', m.as_str())),
        _ => None,
    }
}

/// Last path component, splitting on both `/` and `\`.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Site-relative location of an image: `images/<basename>`.
pub fn images_path(path: &str) -> String {
    format!("{}/{}", IMAGES_DIR, basename(path))
}

/// Sources that point at the generator's machine rather than the site:
/// drive letters, rooted paths and the upload folder's `static/` prefix.
/// Protocol-relative URLs (`//cdn...`) are left alone.
fn is_local_source(src: &str) -> bool {
    if src.starts_with("//") {
        return false;
    }
    src.starts_with('/')
        || src.starts_with('\\')
        || DRIVE_LETTER_RE.is_match(src)
        || src.starts_with("static/")
        || src.starts_with("static\\")
}

fn is_known_source(src: &str, known_paths: &[&str]) -> bool {
    known_paths
        .iter()
        .filter(|path| !path.is_empty())
        .any(|path| src == *path || src == path.replace(' ', "%20"))
}

/// All `src` values of `<img>` tags, in document order.
pub fn img_sources(html: &str) -> Vec<String> {
    IMG_TAG_RE
        .find_iter(html)
        .filter_map(|tag| {
            SRC_ATTR_RE.captures(tag.as_str()).map(|caps| {
                attribute_value(&caps)
                    .map(|(_, src)| src.to_string())
                    .unwrap_or_default()
            })
        })
        .collect()
}

fn map_img_tags(html: &str, rewrite: impl Fn(&str) -> String) -> String {
    IMG_TAG_RE
        .replace_all(html, |caps: &Captures| rewrite(&caps[0]))
        .into_owned()
}

fn rewrite_tag_source(tag: &str, known_paths: &[&str]) -> String {
    SRC_ATTR_RE
        .replace(tag, |caps: &Captures| {
            let Some((quote, src)) = attribute_value(caps) else {
                return caps[0].to_string();
            };
            let trimmed = src.trim();
            let name = basename(trimmed).replace("%20", " ");
            if name.is_empty() || !(is_known_source(trimmed, known_paths) || is_local_source(trimmed)) {
                return caps[0].to_string();
            }
            format!("{}{q}{}/{}{q}", &caps[1], IMAGES_DIR, name, q = quote)
        })
        .into_owned()
}

/// Points every `<img>` that references a local or uploaded file at `images/<basename>`.
///
/// `known_paths` are the caller's image paths; an `<img>` using one
/// of them verbatim (or with spaces encoded as `%20`) is rewritten even when
/// the path is relative.
pub fn rewrite_image_sources(html: &str, known_paths: &[&str]) -> String {
    map_img_tags(html, |tag| rewrite_tag_source(tag, known_paths))
}

fn insert_after_tag_name(tag: &str, attribute: &str) -> String {
    // IMG_TAG_RE guarantees the tag starts with "<img".
    let (name, rest) = tag.split_at(4);
    format!("{} {}{}", name, attribute, rest)
}

fn ensure_tag_class(tag: &str) -> String {
    let Some(caps) = CLASS_ATTR_RE.captures(tag) else {
        return insert_after_tag_name(tag, &format!("class=\"{}\"", RESPONSIVE_CLASSES.join(" ")));
    };

    let Some((quote, existing)) = attribute_value(&caps) else {
        return tag.to_string();
    };
    let present: Vec<&str> = existing.split_whitespace().collect();
    let missing: Vec<&str> = RESPONSIVE_CLASSES
        .iter()
        .copied()
        .filter(|class| !present.contains(class))
        .collect();
    if missing.is_empty() {
        return tag.to_string();
    }

    let merged = present
        .iter()
        .chain(missing.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let Some(whole) = caps.get(0) else {
        return tag.to_string();
    };
    format!(
        "{}{}{q}{}{q}{}",
        &tag[..whole.start()],
        &caps[1],
        merged,
        &tag[whole.end()..],
        q = quote
    )
}

fn ensure_tag_lazy(tag: &str) -> String {
    if LOADING_ATTR_RE.is_match(tag) {
        tag.to_string()
    } else {
        insert_after_tag_name(tag, "loading=\"lazy\"")
    }
}

/// Adds the baseline responsive classes to every `<img>`, merging into an
/// existing `class` attribute.
pub fn ensure_responsive_class(html: &str) -> String {
    map_img_tags(html, ensure_tag_class)
}

/// Adds `loading="lazy"` to every `<img>` that sets no loading behaviour.
pub fn ensure_lazy_loading(html: &str) -> String {
    map_img_tags(html, ensure_tag_lazy)
}

/// Local clean-up applied to every HTML page before and after validation.
pub fn normalize_html(html: &str) -> String {
    let html = rewrite_image_sources(html, &[]);
    let html = ensure_responsive_class(&html);
    ensure_lazy_loading(&html)
}

/// Links `images/favicon.ico` from the head unless the page already has an icon.
pub fn inject_favicon_link(html: &str) -> String {
    if ICON_LINK_RE.is_match(html) || !HEAD_CLOSE_RE.is_match(html) {
        return html.to_string();
    }
    let link = format!(
        "<link rel=\"icon\" href=\"{}/{}\">\n</head>",
        IMAGES_DIR, FAVICON_FILE
    );
    HEAD_CLOSE_RE.replacen(html, 1, link.as_str()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>t</title></head><body>
<img src="/home/me/uploads/hero.png" alt="hero">
<img alt="logo" src='static/logo.svg'>
<img src="static\team photo.jpg">
<img src="static/team%20photo.jpg">
<img src="C:\Users\me\pic.jpeg" class="rounded">
<img src="https://cdn.example.com/a.png">
<img src="//cdn.example.com/b.png">
<img data-src="/lazy/c.png" src="images/c.png">
<IMG SRC="/upper/D.PNG">
</body></html>"#;

    #[test]
    fn basename_handles_both_separators() {
        assert_eq!(basename("a/b/c.png"), "c.png");
        assert_eq!(basename("C:\\x\\y.jpg"), "y.jpg");
        assert_eq!(basename("plain.gif"), "plain.gif");
        assert_eq!(images_path("/tmp/z.webp"), "images/z.webp");
    }

    #[test]
    fn local_sources_end_up_under_images() {
        let html = rewrite_image_sources(PAGE, &[]);
        let sources = img_sources(&html);
        assert_eq!(
            sources,
            vec![
                "images/hero.png",
                "images/logo.svg",
                "images/team photo.jpg",
                "images/team photo.jpg",
                "images/pic.jpeg",
                "https://cdn.example.com/a.png",
                "//cdn.example.com/b.png",
                "images/c.png",
                "images/D.PNG",
            ]
        );
        assert!(html.contains("data-src=\"/lazy/c.png\""));
        assert!(html.contains("src='images/logo.svg'"));
    }

    #[test]
    fn no_local_or_static_source_survives() {
        let html = rewrite_image_sources(PAGE, &[]);
        for src in img_sources(&html) {
            assert!(
                src.starts_with("images/") || src.starts_with("https://") || src.starts_with("//"),
                "unexpected source {src}"
            );
        }
    }

    #[test]
    fn known_relative_paths_are_rewritten() {
        let html = r#"<img src="uploads/me 1.jpg"><img src="uploads/me%201.jpg"><img src="other/me.jpg">"#;
        let rewritten = rewrite_image_sources(html, &["uploads/me 1.jpg"]);
        assert_eq!(
            img_sources(&rewritten),
            vec!["images/me 1.jpg", "images/me 1.jpg", "other/me.jpg"]
        );
    }

    #[test]
    fn class_is_added_or_merged_without_duplicates() {
        let html = r#"<img src="a.png"><img class="rounded max-w-full" src="b.png"><img class='h-auto max-w-full object-cover'>"#;
        let out = ensure_responsive_class(html);
        assert_eq!(
            out,
            r#"<img class="max-w-full h-auto object-cover" src="a.png"><img class="rounded max-w-full h-auto object-cover" src="b.png"><img class='h-auto max-w-full object-cover'>"#
        );
    }

    #[test]
    fn lazy_loading_respects_existing_attribute() {
        let html = r#"<img src="a.png"><img loading="eager" src="b.png"><img/>"#;
        let out = ensure_lazy_loading(html);
        assert_eq!(
            out,
            r#"<img loading="lazy" src="a.png"><img loading="eager" src="b.png"><img loading="lazy"/>"#
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_html(PAGE);
        let twice = normalize_html(&once);
        assert_eq!(once, twice);
        assert_eq!(once.matches("loading=\"lazy\"").count(), 9);
        assert_eq!(once.matches("max-w-full h-auto object-cover").count(), 9);
        assert!(once.contains("class=\"rounded max-w-full h-auto object-cover\""));
    }

    #[test]
    fn unquoted_attributes_are_rewritten_in_place() {
        let html = "<img src=/home/me/hero.png class=hero>";
        let out = normalize_html(html);
        assert_eq!(
            out,
            r#"<img loading="lazy" src="images/hero.png" class="hero max-w-full h-auto object-cover">"#
        );
        assert_eq!(img_sources(&out), vec!["images/hero.png"]);
        assert_eq!(out.matches("class=").count(), 1);
        assert_eq!(normalize_html(&out), out);

        let relative = "<img src=photos/a.png class=max-w-full>";
        assert_eq!(img_sources(relative), vec!["photos/a.png"]);
        assert_eq!(
            ensure_responsive_class(relative),
            r#"<img src=photos/a.png class="max-w-full h-auto object-cover">"#
        );
    }

    #[test]
    fn markup_without_images_is_untouched() {
        let html = "<html><body><p>src=\"/x.png\"</p></body></html>";
        assert_eq!(normalize_html(html), html);
    }

    #[test]
    fn favicon_link_is_injected_once() {
        let html = "<html><head><title>x</title></HEAD><body></body></html>";
        let once = inject_favicon_link(html);
        assert!(once.contains("<link rel=\"icon\" href=\"images/favicon.ico\">\n</head>"));
        assert_eq!(inject_favicon_link(&once), once);

        let no_head = "<body></body>";
        assert_eq!(inject_favicon_link(no_head), no_head);

        let has_icon = "<head><link rel=\"shortcut icon\" href=\"x.ico\"></head>";
        assert_eq!(inject_favicon_link(has_icon), has_icon);
    }
}
