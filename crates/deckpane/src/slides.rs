//! Slide counting and active-slide marking over rendered deck HTML.
//!
//! Both functions scan tags with regular expressions instead of building a
//! tree, so partial or malformed markup degrades gracefully.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Class that makes one slide graphic visible on the stage.
pub const ACTIVE_CLASS: &str = "is-active";

static SLIDE_GRAPHIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<svg\b[^>]*?\bdata-marpit-svg\b[^>]*>").expect("slide graphic pattern")
});

static SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<section\b").expect("section pattern"));

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\sclass\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("class attribute pattern")
});

/// Count the slides in rendered deck HTML.
///
/// Per-slide graphics are authoritative; plain `<section>` elements are the
/// fallback; any other non-blank content is a single slide.
pub fn count_slides(html: &str) -> usize {
    if html.is_empty() {
        return 0;
    }
    let graphics = SLIDE_GRAPHIC.find_iter(html).count();
    if graphics > 0 {
        return graphics;
    }
    let sections = SECTION.find_iter(html).count();
    if sections > 0 {
        return sections;
    }
    usize::from(!html.trim().is_empty())
}

pub fn has_slide_graphics(html: &str) -> bool {
    SLIDE_GRAPHIC.is_match(html)
}

/// Return `html` with only the slide graphic at `index` marked active.
pub fn mark_active(html: &str, index: usize) -> String {
    let mut position = 0;
    SLIDE_GRAPHIC
        .replace_all(html, |caps: &Captures| {
            let active = position == index;
            position += 1;
            toggle_class(&caps[0], ACTIVE_CLASS, active)
        })
        .into_owned()
}

fn toggle_class(tag: &str, class: &str, on: bool) -> String {
    if let Some(caps) = CLASS_ATTR.captures(tag) {
        let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3));
        let (Some(whole), Some(value)) = (caps.get(0), value) else {
            return tag.to_string();
        };
        let mut classes: Vec<&str> = value
            .as_str()
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        if on {
            classes.push(class);
        }
        format!(
            "{} class=\"{}\"{}",
            &tag[..whole.start()],
            classes.join(" "),
            &tag[whole.end()..]
        )
    } else if on {
        // The pattern guarantees the tag opens with the four bytes `<svg`.
        format!("{} class=\"{class}\"{}", &tag[..4], &tag[4..])
    } else {
        tag.to_string()
    }
}
