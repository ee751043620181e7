use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgb,
    pub foreground: Rgb,
    pub heading_color: Rgb,
    pub accent: Rgb,
    pub code_background: Rgb,
    pub code_foreground: Rgb,
    pub h1_size: f32,
    pub h2_size: f32,
    pub h3_size: f32,
    pub body_size: f32,
    pub code_size: f32,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            name: "default",
            background: Rgb(0xFF, 0xFF, 0xFF),
            foreground: Rgb(0x1A, 0x1A, 0x2E),
            heading_color: Rgb(0x16, 0x21, 0x3E),
            accent: Rgb(0x0F, 0x34, 0x60),
            code_background: Rgb(0xF5, 0xF5, 0xF5),
            code_foreground: Rgb(0x33, 0x33, 0x33),
            h1_size: 64.0,
            h2_size: 48.0,
            h3_size: 35.0,
            body_size: 29.0,
            code_size: 20.0,
        }
    }

    pub fn gaia() -> Self {
        Self {
            name: "gaia",
            background: Rgb(0xFF, 0xF8, 0xE1),
            foreground: Rgb(0x45, 0x5A, 0x64),
            heading_color: Rgb(0x0A, 0x29, 0x3B),
            accent: Rgb(0x0F, 0x7D, 0x9A),
            code_background: Rgb(0xF0, 0xE8, 0xD0),
            code_foreground: Rgb(0x45, 0x5A, 0x64),
            h1_size: 60.0,
            h2_size: 45.0,
            h3_size: 34.0,
            body_size: 30.0,
            code_size: 20.0,
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Rgb(0x1E, 0x1E, 0x1E),
            foreground: Rgb(0xC8, 0xC8, 0xC8),
            heading_color: Rgb(0xFF, 0xFF, 0xFF),
            accent: Rgb(0x52, 0x94, 0xE2),
            code_background: Rgb(0x2D, 0x2D, 0x2D),
            code_foreground: Rgb(0xD4, 0xD4, 0xD4),
            ..Self::light()
        }
    }

    /// Unknown names fall back to the default theme.
    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            "gaia" => Self::gaia(),
            _ => Self::light(),
        }
    }

    pub fn is_known(name: &str) -> bool {
        matches!(name, "default" | "gaia" | "dark")
    }

    pub fn heading_size(&self, level: u8) -> f32 {
        match level {
            1 => self.h1_size,
            2 => self.h2_size,
            3 => self.h3_size,
            _ => self.body_size,
        }
    }

    /// Return the syntect theme name that matches this presentation theme.
    pub fn syntect_theme_name(&self) -> &'static str {
        if self.name == "dark" {
            "base16-ocean.dark"
        } else {
            "InspiredGitHub"
        }
    }

    /// Stylesheet for a deck rendered at `width` x `height` pixels.
    pub fn css(&self, width: u32, height: u32) -> String {
        let bg = self.background.hex();
        let fg = self.foreground.hex();
        let heading = self.heading_color.hex();
        let accent = self.accent.hex();
        let code_bg = self.code_background.hex();
        let code_fg = self.code_foreground.hex();

        let mut css = String::new();
        let _ = writeln!(
            css,
            "div.marpit > svg[data-marpit-svg] {{ display: block; width: 100%; height: auto; }}"
        );
        let _ = writeln!(
            css,
            "div.marpit > svg > foreignObject > section {{ width: {width}px; height: {height}px; \
             box-sizing: border-box; position: relative; overflow: hidden; padding: 70px; \
             display: flex; flex-direction: column; justify-content: center; \
             background: {bg}; color: {fg}; font-size: {}px; \
             font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; }}",
            self.body_size
        );
        for level in 1..=6u8 {
            let _ = writeln!(
                css,
                "section h{level} {{ color: {heading}; font-size: {}px; margin: 0 0 0.5em; }}",
                self.heading_size(level)
            );
        }
        let _ = writeln!(css, "section a {{ color: {accent}; }}");
        let _ = writeln!(
            css,
            "section code {{ background: {code_bg}; color: {code_fg}; padding: 0 0.2em; border-radius: 4px; }}"
        );
        let _ = writeln!(
            css,
            "section pre {{ background: {code_bg}; font-size: {}px; padding: 1em; border-radius: 6px; overflow: auto; }}",
            self.code_size
        );
        let _ = writeln!(css, "section pre code {{ background: transparent; padding: 0; }}");
        let _ = writeln!(
            css,
            "section blockquote {{ border-left: 6px solid {accent}; margin: 0; padding-left: 1em; }}"
        );
        let _ = writeln!(
            css,
            "section table {{ border-collapse: collapse; }} section th, section td {{ border: 1px solid {fg}; padding: 0.2em 0.6em; }}"
        );
        let _ = writeln!(
            css,
            "section.lead {{ text-align: center; align-items: center; }}"
        );
        let _ = writeln!(css, "section.invert {{ background: {fg}; color: {bg}; }}");
        let _ = writeln!(
            css,
            "section > header, section > footer {{ position: absolute; left: 30px; right: 30px; font-size: 18px; opacity: 0.7; }}"
        );
        let _ = writeln!(css, "section > header {{ top: 21px; }} section > footer {{ bottom: 21px; }}");
        let _ = writeln!(
            css,
            "section[data-marpit-pagination]::after {{ content: attr(data-marpit-pagination); \
             position: absolute; right: 30px; bottom: 21px; font-size: 24px; color: {fg}; }}"
        );
        css
    }
}
