/// Split a deck body (after front-matter extraction) into raw slide strings.
///
/// Two mechanisms create slide breaks:
/// 1. A line of three or more dashes preceded by a blank line (or at the start)
/// 2. With a heading divider of `n`, an ATX heading of level `n` or lower
///    when the current slide already has content
///
/// Lines inside fenced code blocks never break a slide. Slides that end up
/// blank are dropped.
pub fn split(body: &str, heading_divider: Option<u8>) -> Vec<String> {
    let body = body.replace("\r\n", "\n");

    let mut slides: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut has_content = false;
    let mut prev_blank = true;
    let mut fence: Option<(char, usize)> = None;

    for line in body.lines() {
        let trimmed = line.trim();

        if let Some((fence_char, fence_len)) = fence {
            if closes_fence(trimmed, fence_char, fence_len) {
                fence = None;
            }
            current.push(line);
            prev_blank = false;
            continue;
        }

        if let Some(open) = opens_fence(trimmed) {
            fence = Some(open);
        } else if prev_blank && is_dash_separator(trimmed) {
            push_slide(&mut slides, &current);
            current.clear();
            has_content = false;
            prev_blank = true;
            continue;
        } else if has_content && breaks_on_heading(line, heading_divider) {
            push_slide(&mut slides, &current);
            current.clear();
            has_content = false;
        }

        current.push(line);

        // Directive comments don't count as content for heading division
        if !trimmed.is_empty() && !is_directive_comment(trimmed) {
            has_content = true;
        }
        prev_blank = trimmed.is_empty();
    }

    push_slide(&mut slides, &current);
    slides
}

fn push_slide(slides: &mut Vec<String>, lines: &[&str]) {
    let text = lines.join("\n");
    let text = text.trim();
    if !text.is_empty() {
        slides.push(text.to_string());
    }
}

fn opens_fence(trimmed: &str) -> Option<(char, usize)> {
    let fence_char = trimmed.chars().next()?;
    if fence_char != '`' && fence_char != '~' {
        return None;
    }
    let len = trimmed.chars().take_while(|&c| c == fence_char).count();
    (len >= 3).then_some((fence_char, len))
}

fn closes_fence(trimmed: &str, fence_char: char, fence_len: usize) -> bool {
    let count = trimmed.chars().take_while(|&c| c == fence_char).count();
    count >= fence_len && trimmed.chars().skip(count).all(char::is_whitespace)
}

fn breaks_on_heading(line: &str, heading_divider: Option<u8>) -> bool {
    match (heading_divider, heading_level(line)) {
        (Some(max), Some(level)) => level <= max,
        _ => false,
    }
}

/// Level of an ATX heading (`# ` to `###### `), if the line is one.
pub fn heading_level(line: &str) -> Option<u8> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    (rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t')).then_some(hashes as u8)
}

fn is_dash_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

fn is_directive_comment(line: &str) -> bool {
    line.starts_with("<!--") && line.ends_with("-->") && line.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_separator() {
        let body = "Slide one\n\n---\n\nSlide two";
        let slides = split(body, None);
        assert_eq!(slides, vec!["Slide one", "Slide two"]);
    }

    #[test]
    fn test_dash_separator_without_trailing_blank() {
        let body = "Slide one\n\n---\nSlide two";
        assert_eq!(split(body, None).len(), 2);
    }

    #[test]
    fn test_setext_underline_is_not_a_separator() {
        let body = "Heading\n---\n\nBody";
        assert_eq!(split(body, None).len(), 1);
    }

    #[test]
    fn test_blank_lines_do_not_split() {
        let body = "Slide one\n\n\n\n\nStill one";
        assert_eq!(split(body, None).len(), 1);
    }

    #[test]
    fn test_empty_slides_are_dropped() {
        let body = "---\n\nOne\n\n---\n\n---\n\nTwo\n\n---\n";
        assert_eq!(split(body, None), vec!["One", "Two"]);
    }

    #[test]
    fn test_heading_divider_splits() {
        let body = "# First\n\nContent\n\n## Sub\n\nMore\n\n# Second";
        assert_eq!(split(body, Some(1)).len(), 2);
        assert_eq!(split(body, Some(2)).len(), 3);
        assert_eq!(split(body, None).len(), 1);
    }

    #[test]
    fn test_heading_divider_first_heading() {
        // First heading shouldn't split (no prior content)
        let body = "# Only Heading\n\nContent here";
        assert_eq!(split(body, Some(1)).len(), 1);
    }

    #[test]
    fn test_directive_comment_is_not_content() {
        let body = "<!-- class: lead -->\n# Title\n\nText";
        let slides = split(body, Some(1));
        assert_eq!(slides.len(), 1);
        assert!(slides[0].starts_with("<!-- class: lead -->"));
    }

    #[test]
    fn test_code_fence_protects_separators_and_headings() {
        let body = "# Code\n\n```bash\n\n---\n\n# not a heading\n```\n\nAfter";
        let slides = split(body, Some(1));
        assert_eq!(slides.len(), 1);
        assert!(slides[0].contains("# not a heading"));
    }

    #[test]
    fn test_tilde_fence_requires_matching_close() {
        let body = "~~~~\n```\n\n---\n~~~~\n\n---\n\nNext";
        assert_eq!(split(body, None).len(), 2);
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("# A"), Some(1));
        assert_eq!(heading_level("### A"), Some(3));
        assert_eq!(heading_level("#"), Some(1));
        assert_eq!(heading_level("#hashtag"), None);
        assert_eq!(heading_level("####### seven"), None);
        assert_eq!(heading_level("text"), None);
    }

    #[test]
    fn test_crlf_line_endings() {
        let body = "One\r\n\r\n---\r\n\r\nTwo";
        assert_eq!(split(body, None), vec!["One", "Two"]);
    }
}
