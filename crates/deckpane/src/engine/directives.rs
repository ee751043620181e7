//! Deck directives: YAML front-matter for the whole deck, and HTML comments
//! (`<!-- class: lead -->`) for individual slides.
//!
//! Local directives carry over to every following slide. Spot directives
//! (prefixed with `_`) apply to the slide they appear on only.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::error::RenderError;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("comment pattern"));

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalDirectives {
    pub marp: Option<bool>,
    pub title: Option<String>,
    pub theme: Option<String>,
    pub size: Option<String>,
    pub heading_divider: Option<u8>,
    pub paginate: Option<bool>,
    pub class: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub background_color: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDirectives {
    pub paginate: Option<bool>,
    pub class: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub background_color: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "_paginate")]
    pub spot_paginate: Option<bool>,
    #[serde(rename = "_class")]
    pub spot_class: Option<String>,
    #[serde(rename = "_header")]
    pub spot_header: Option<String>,
    #[serde(rename = "_footer")]
    pub spot_footer: Option<String>,
    #[serde(rename = "_backgroundColor")]
    pub spot_background_color: Option<String>,
    #[serde(rename = "_color")]
    pub spot_color: Option<String>,
}

impl LocalDirectives {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Later directives on the same slide win.
    fn merge(&mut self, other: LocalDirectives) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            paginate,
            class,
            header,
            footer,
            background_color,
            color,
            spot_paginate,
            spot_class,
            spot_header,
            spot_footer,
            spot_background_color,
            spot_color
        );
    }
}

/// Resolved settings for one slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideDirectives {
    pub paginate: bool,
    pub class: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub background_color: Option<String>,
    pub color: Option<String>,
}

impl SlideDirectives {
    pub fn from_globals(globals: &GlobalDirectives) -> Self {
        Self {
            paginate: globals.paginate.unwrap_or(false),
            class: globals.class.clone(),
            header: globals.header.clone(),
            footer: globals.footer.clone(),
            background_color: globals.background_color.clone(),
            color: globals.color.clone(),
        }
    }

    /// Fold one slide's local directives into the inherited set and return
    /// the effective settings for that slide.
    pub fn advance(&mut self, locals: &LocalDirectives) -> SlideDirectives {
        if let Some(paginate) = locals.paginate {
            self.paginate = paginate;
        }
        overwrite(&mut self.class, &locals.class);
        overwrite(&mut self.header, &locals.header);
        overwrite(&mut self.footer, &locals.footer);
        overwrite(&mut self.background_color, &locals.background_color);
        overwrite(&mut self.color, &locals.color);

        let mut effective = self.clone();
        if let Some(paginate) = locals.spot_paginate {
            effective.paginate = paginate;
        }
        overwrite(&mut effective.class, &locals.spot_class);
        overwrite(&mut effective.header, &locals.spot_header);
        overwrite(&mut effective.footer, &locals.spot_footer);
        overwrite(&mut effective.background_color, &locals.spot_background_color);
        overwrite(&mut effective.color, &locals.spot_color);
        effective
    }
}

fn overwrite(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}

/// Split leading YAML front-matter from the deck body.
///
/// A document that opens with `---` but never closes it has no front-matter;
/// the line is left for the splitter. Malformed YAML is a render failure.
pub fn extract(content: &str) -> Result<(GlobalDirectives, &str), RenderError> {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return Ok((GlobalDirectives::default(), content));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let globals = if yaml.trim().is_empty() {
                GlobalDirectives::default()
            } else {
                serde_yaml::from_str(yaml)?
            };
            return Ok((globals, body));
        }
        offset += line.len();
    }

    Ok((GlobalDirectives::default(), content))
}

/// Collect directive comments from one slide and strip them from its source.
/// Comments that are not directive mappings are left in place.
pub fn extract_local(raw: &str) -> (LocalDirectives, String) {
    let mut locals = LocalDirectives::default();
    let stripped = COMMENT.replace_all(raw, |caps: &regex::Captures| {
        match serde_yaml::from_str::<LocalDirectives>(caps[1].trim()) {
            Ok(parsed) if !parsed.is_empty() => {
                locals.merge(parsed);
                String::new()
            }
            _ => caps[0].to_string(),
        }
    });
    (locals, stripped.into_owned())
}
