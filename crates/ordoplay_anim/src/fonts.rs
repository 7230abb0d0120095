// SPDX-License-Identifier: MIT OR Apache-2.0
//! Web font declarations.
//!
//! Fonts hosted by Google are requested by name through one combined
//! stylesheet link. Self-hosted fonts become `@font-face` rules and are polled
//! until a [`FontDetector`] sees them or the timeout passes, after which they
//! count as loaded anyway.

use crate::host::HostId;
use crate::resources::{LoadState, ResourceLoader, ResourceManager};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, warn};

/// Stylesheet endpoint for Google-hosted fonts
pub const GOOGLE_FONTS_URL: &str = "http://fonts.googleapis.com/css?family=";

/// Poll interval of self-hosted fonts, in milliseconds
pub const FONT_POLL_INTERVAL: f64 = 100.0;

/// Wait after which a self-hosted font is assumed loaded, in milliseconds
pub const FONT_LOAD_TIMEOUT: f64 = 10_000.0;

/// A font the animation uses
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    /// Family name
    pub face: Option<String>,
    /// TrueType url
    pub url: Option<String>,
    /// Optional WOFF url
    pub woff: Option<String>,
    /// CSS font-style
    pub style: Option<String>,
    /// CSS font-weight
    pub weight: Option<String>,
    /// Google Fonts family name; set for fonts hosted there
    pub google_name: Option<String>,
}

impl Font {
    /// `@font-face` rule for a self-hosted font
    pub fn face_rule(&self, face: &str, url: &str) -> String {
        let mut css = format!("@font-face {{\nfont-family: \"{face}\";\nsrc:");
        if let Some(woff) = &self.woff {
            css.push_str(&format!(" url(\"{woff}\") format(\"woff\"),\n"));
        }
        css.push_str(&format!(" url(\"{url}\") format(\"truetype\");\n"));
        if let Some(style) = &self.style {
            css.push_str(&format!("font-style: {style};\n"));
        }
        if let Some(weight) = &self.weight {
            css.push_str(&format!("font-weight: {weight};\n"));
        }
        css.push_str("}\n");
        css
    }
}

/// Tells whether a font is usable yet
pub trait FontDetector {
    /// Is the font available
    fn detect(&self, font: &Font) -> bool;
}

/// What a host has to install for the fonts of an animation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontSheet {
    /// `@font-face` rules of self-hosted fonts
    pub css: String,
    /// Combined Google Fonts stylesheet link
    pub link: Option<String>,
    /// Urls of self-hosted fonts being watched
    pub pending: Vec<String>,
}

/// Polls a self-hosted font until detected or timed out
pub struct FontWatch {
    font: Font,
    detector: Rc<dyn FontDetector>,
    /// Time not yet spent on a poll
    carry: f64,
    waited: f64,
}

impl FontWatch {
    /// Watch a font
    pub fn new(font: Font, detector: Rc<dyn FontDetector>) -> Self {
        Self {
            font,
            detector,
            carry: 0.0,
            waited: 0.0,
        }
    }
}

impl ResourceLoader for FontWatch {
    fn poll(&mut self, elapsed_ms: f64) -> LoadState {
        self.carry += elapsed_ms;
        while self.carry >= FONT_POLL_INTERVAL {
            self.carry -= FONT_POLL_INTERVAL;
            self.waited += FONT_POLL_INTERVAL;
            if self.detector.detect(&self.font) {
                return LoadState::Ready;
            }
            if self.waited > FONT_LOAD_TIMEOUT {
                warn!(
                    "Font '{}' not detected after {} ms, assuming it is loaded",
                    self.font.face.as_deref().unwrap_or_default(),
                    self.waited
                );
                return LoadState::Ready;
            }
        }
        LoadState::Pending
    }
}

/// Split fonts into a combined Google link and watched `@font-face` rules.
///
/// Fonts without both a face and a url are skipped.
pub fn load_fonts(
    fonts: &[Font],
    owner: HostId,
    detector: Rc<dyn FontDetector>,
    manager: &mut dyn ResourceManager,
) -> FontSheet {
    let mut sheet = FontSheet::default();
    let mut google = Vec::new();

    for font in fonts {
        let (Some(face), Some(url)) = (&font.face, &font.url) else {
            continue;
        };
        match &font.google_name {
            Some(name) => google.push(name.as_str()),
            None => {
                sheet.css.push_str(&font.face_rule(face, url));
                sheet.pending.push(url.clone());
                manager.load_or_get(owner, url, &|| {
                    Box::new(FontWatch::new(font.clone(), detector.clone())) as Box<dyn ResourceLoader>
                });
            }
        }
    }

    if !google.is_empty() {
        sheet.link = Some(format!("{GOOGLE_FONTS_URL}{}", google.join("|")));
    }
    debug!(
        "Fonts: {} self-hosted, {} from Google",
        sheet.pending.len(),
        google.len()
    );
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Never;

    impl FontDetector for Never {
        fn detect(&self, _font: &Font) -> bool {
            false
        }
    }

    struct AfterPolls(Cell<u32>);

    impl FontDetector for AfterPolls {
        fn detect(&self, _font: &Font) -> bool {
            let left = self.0.get();
            self.0.set(left.saturating_sub(1));
            left == 0
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<(HostId, String, LoadState)>);

    impl ResourceManager for Recorder {
        fn load_or_get(&mut self, owner: HostId, url: &str, factory: &dyn Fn() -> Box<dyn ResourceLoader>) {
            let state = factory().poll(0.0);
            self.0.push((owner, url.to_string(), state));
        }
    }

    fn font(face: &str, url: &str) -> Font {
        Font {
            face: Some(face.to_string()),
            url: Some(url.to_string()),
            ..Font::default()
        }
    }

    #[test]
    fn test_fonts_are_split_by_host() {
        let fonts = vec![
            Font {
                google_name: Some("Lobster".to_string()),
                ..font("Lobster", "http://fonts/lobster")
            },
            Font {
                google_name: Some("Roboto:400".to_string()),
                ..font("Roboto", "http://fonts/roboto")
            },
            Font {
                weight: Some("bold".to_string()),
                ..font("Local", "fonts/local.ttf")
            },
            Font {
                face: None,
                ..font("", "fonts/faceless.ttf")
            },
        ];
        let mut manager = Recorder::default();
        let owner = HostId::new();
        let sheet = load_fonts(&fonts, owner, Rc::new(Never), &mut manager);

        assert_eq!(
            sheet.link.as_deref(),
            Some("http://fonts.googleapis.com/css?family=Lobster|Roboto:400")
        );
        assert_eq!(sheet.pending, ["fonts/local.ttf"]);
        assert_eq!(
            sheet.css,
            "@font-face {\nfont-family: \"Local\";\nsrc: url(\"fonts/local.ttf\") format(\"truetype\");\nfont-weight: bold;\n}\n"
        );
        assert_eq!(manager.0.len(), 1);
        assert_eq!(manager.0[0].0, owner);
        assert_eq!(manager.0[0].2, LoadState::Pending);
    }

    #[test]
    fn test_watch_times_out_as_success() {
        let mut watch = FontWatch::new(font("Slow", "slow.ttf"), Rc::new(Never));
        assert_eq!(watch.poll(10_000.0), LoadState::Pending);
        assert_eq!(watch.poll(99.0), LoadState::Pending);
        assert_eq!(watch.poll(1.0), LoadState::Ready);
    }

    #[test]
    fn test_watch_polls_on_interval() {
        let mut watch = FontWatch::new(font("Soon", "soon.ttf"), Rc::new(AfterPolls(Cell::new(2))));
        assert_eq!(watch.poll(50.0), LoadState::Pending);
        assert_eq!(watch.poll(150.0), LoadState::Pending);
        assert_eq!(watch.poll(100.0), LoadState::Ready);
    }

    #[test]
    fn test_woff_and_style_rule() {
        let font = Font {
            woff: Some("a.woff".to_string()),
            style: Some("italic".to_string()),
            ..font("A", "a.ttf")
        };
        let rule = font.face_rule("A", "a.ttf");
        assert!(rule.contains(" url(\"a.woff\") format(\"woff\"),\n url(\"a.ttf\") format(\"truetype\");"));
        assert!(rule.contains("font-style: italic;"));
    }
}
