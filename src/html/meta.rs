//! Static per-element data for DOM correctness verification.

// https://developer.mozilla.org/en-US/docs/Web/HTML/Global_attributes
// Global attributes may be specified on all HTML elements, even those
// not specified in the standard.
const GLOBAL_ATTRIBUTE_NAMES: &[&str] = &[
    "accesskey",
    "autocapitalize",
    "autofocus",
    "class",
    "contenteditable",
    "dir",
    "draggable",
    "hidden",
    "id",
    "inputmode",
    "lang",
    "role",
    "spellcheck",
    "style",
    "tabindex",
    "title",
    "translate",
];

// Prefixes of attribute families that are valid on every element:
// custom data, accessibility and the htmx attributes.
const GLOBAL_ATTRIBUTE_PREFIXES: &[&str] = &[
    "data-",
    "aria-",
    "hx-",
];

#[derive(Debug)]
pub struct ElementMeta {
    pub tag_name: &'static str,
    pub has_closing_tag: bool,
    pub allows_child_text: bool,
    pub attributes: &'static [&'static str],
}

impl ElementMeta {
    pub fn allows_attribute(&self, name: &str) -> bool {
        self.attributes.contains(&name)
            || GLOBAL_ATTRIBUTE_NAMES.contains(&name)
            || GLOBAL_ATTRIBUTE_PREFIXES.iter().any(|p| name.starts_with(p))
    }
}

impl PartialEq for ElementMeta {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.tag_name == other.tag_name
    }
}

impl Eq for ElementMeta {}

macro_rules! def_metas {
    { $( $metaname:ident: $tag:expr, closing: $closing:expr, text: $text:expr,
         [ $($att:expr),* ]; )* } => {
        $(
            pub static $metaname: ElementMeta = ElementMeta {
                tag_name: $tag,
                has_closing_tag: $closing,
                allows_child_text: $text,
                attributes: &[ $($att),* ],
            };
        )*
    }
}

def_metas! {
    HTML_META: "html", closing: true, text: false, ["xmlns"];
    HEAD_META: "head", closing: true, text: false, [];
    META_META: "meta", closing: false, text: false, ["charset", "name", "content"];
    TITLE_META: "title", closing: true, text: true, [];
    SCRIPT_META: "script", closing: true, text: true,
        ["src", "type", "async", "defer", "crossorigin", "integrity"];
    BODY_META: "body", closing: true, text: true, [];
    H1_META: "h1", closing: true, text: true, [];
    DIV_META: "div", closing: true, text: true, [];
    P_META: "p", closing: true, text: true, [];
    A_META: "a", closing: true, text: true, ["href", "target", "rel"];
    FORM_META: "form", closing: true, text: true,
        ["action", "method", "enctype", "name", "novalidate"];
    LABEL_META: "label", closing: true, text: true, ["for"];
    INPUT_META: "input", closing: false, text: false,
        ["name", "type", "value", "placeholder", "required", "autocomplete"];
    BUTTON_META: "button", closing: true, text: true, ["type", "name", "value", "disabled"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_allows_attribute() {
        assert!(INPUT_META.allows_attribute("value"));
        assert!(INPUT_META.allows_attribute("class"));
        assert!(FORM_META.allows_attribute("hx-post"));
        assert!(! DIV_META.allows_attribute("href"));
        assert!(! INPUT_META.has_closing_tag);
        assert!(DIV_META.has_closing_tag);
    }
}
