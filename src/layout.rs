use anyhow::Result;

use crate::ahtml::{HtmlAllocator, AId, Node, att};

pub const HTMX_SCRIPT_URL: &str = "https://unpkg.com/htmx.org@1.9.11";
pub const TAILWIND_SCRIPT_URL: &str = "https://cdn.tailwindcss.com";

pub trait LayoutInterface: Send + Sync {
    /// Build a whole HTML page around `main`.
    fn page(
        &self,
        html: &HtmlAllocator,
        main: AId<Node>,
    ) -> Result<AId<Node>>;
}

pub struct DemoLayout {
    pub site_title: String,
    /// Loaded in the head, in this order.
    pub script_urls: Vec<String>,
}

impl DemoLayout {
    pub fn new(site_title: impl Into<String>) -> Self {
        DemoLayout {
            site_title: site_title.into(),
            script_urls: vec![HTMX_SCRIPT_URL.into(), TAILWIND_SCRIPT_URL.into()],
        }
    }
}

impl LayoutInterface for DemoLayout {
    fn page(
        &self,
        html: &HtmlAllocator,
        main: AId<Node>,
    ) -> Result<AId<Node>>
    {
        let mut head = vec![
            html.meta([att("charset", "utf-8")], [])?,
            html.title([], [html.str(&self.site_title)?])?,
        ];
        for url in &self.script_urls {
            head.push(html.script([att("src", url)], [])?);
        }
        html.html(
            [],
            [
                html.head([], head)?,
                html.body(
                    [],
                    [
                        html.h1([att("class", "bg-gray-300 py-2 text-center mb-3")],
                                [html.str(&self.site_title)?])?,
                        main,
                    ])?
            ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_page() -> Result<()> {
        let html = HtmlAllocator::new(100);
        let layout = DemoLayout::new("Forms & more");
        let main = html.p([], [html.staticstr("content")?])?;
        let s = html.to_html_string(layout.page(&html, main)?, true)?;
        assert!(s.starts_with("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
                               <title>Forms &amp; more</title>"));
        assert!(s.contains(r#"<script src="https://unpkg.com/htmx.org@1.9.11"></script>"#));
        assert!(s.contains(r#"<script src="https://cdn.tailwindcss.com"></script></head>"#));
        assert!(s.contains(r#"<h1 class="bg-gray-300 py-2 text-center mb-3">Forms &amp; more</h1><p>content</p></body>"#));
        Ok(())
    }
}
