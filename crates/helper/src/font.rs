use gloo::utils::format::JsValueSerdeExt;
use serde::Serialize;
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};
use web_sys::HtmlElement;

/// CSS font properties derived from a host font description string.
/// Empty fields mean "leave the element alone".
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FontStyle {
    #[serde(rename = "fontStyle")]
    pub font_style: String,
    #[serde(rename = "fontWeight")]
    pub font_weight: String,
}

impl FontStyle {
    /// Applies the non-empty parts to an element's inline style.
    pub fn apply_to(&self, node: &HtmlElement) {
        let css = node.style();
        if !self.font_style.is_empty() {
            let _ = css.set_property("font-style", &self.font_style);
        }
        if !self.font_weight.is_empty() {
            let _ = css.set_property("font-weight", &self.font_weight);
        }
    }
}

/// Maps a host font style description to CSS. `regular` wins outright,
/// `black` outranks `bold`, and `oblique` renders as italic.
pub fn parse_font_style(fs: &str) -> FontStyle {
    let mut style = FontStyle::default();
    if fs.is_empty() {
        return style;
    }

    let fs = fs.to_lowercase();
    if fs.contains("regular") {
        return style;
    }

    if fs.contains("italic") {
        style.font_style = "italic".to_string();
    }
    if fs.contains("bold") {
        style.font_weight = "bold".to_string();
    }
    if fs.contains("black") {
        style.font_weight = "bolder".to_string();
    }
    if fs.contains("oblique") {
        style.font_style = "italic".to_string();
    }

    style
}

/// Parses a font style description and, when a node is given, applies it to
/// that node. Returns the `{ fontStyle, fontWeight }` object widget code
/// expects.
#[wasm_bindgen(js_name = parseFontStyle)]
pub fn parse_font_style_js(fs: &str, node: Option<HtmlElement>) -> JsValue {
    let style = parse_font_style(fs);
    if let Some(node) = node {
        style.apply_to(&node);
    }
    <JsValue as JsValueSerdeExt>::from_serde(&style).unwrap_or(JsValue::NULL)
}

#[cfg(test)]
mod test {
    use super::*;

    fn style(font_style: &str, font_weight: &str) -> FontStyle {
        FontStyle {
            font_style: font_style.to_string(),
            font_weight: font_weight.to_string(),
        }
    }

    #[test]
    fn test_regular_wins_outright() {
        assert_eq!(parse_font_style("Regular"), style("", ""));
        assert_eq!(parse_font_style("Bold Regular"), style("", ""));
    }

    #[test]
    fn test_style_and_weight_combine() {
        assert_eq!(parse_font_style("Italic"), style("italic", ""));
        assert_eq!(parse_font_style("Bold"), style("", "bold"));
        assert_eq!(parse_font_style("Bold Italic"), style("italic", "bold"));
        assert_eq!(parse_font_style("Oblique"), style("italic", ""));
    }

    #[test]
    fn test_black_outranks_bold() {
        assert_eq!(parse_font_style("Black"), style("", "bolder"));
        assert_eq!(parse_font_style("Bold Black"), style("", "bolder"));
    }

    #[test]
    fn test_unknown_descriptions_change_nothing() {
        assert_eq!(parse_font_style(""), style("", ""));
        assert_eq!(parse_font_style("Condensed"), style("", ""));
    }
}
