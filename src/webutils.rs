use std::borrow::Cow;

use anyhow::Result;
use rouille::{Response, ResponseBody};

use crate::ahtml::{Node, AId, HtmlAllocator};
use crate::http_response_status_codes::HttpResponseStatusCode;

pub fn errorpage_from_status(status: HttpResponseStatusCode) -> Response {
    let title = status.title();
    let explanation = status.desc();
    // (title and explanation are static, without markup characters.)
    let resp = format!("<html><head><title>{title}</title></head><body><h1>{title}</h1>\
                        <p>{explanation}</p></body></html>\n");
    Response {
        status_code: status.code(),
        headers: vec![(Cow::from("Content-type"), Cow::from("text/html; charset=utf-8"))],
        data: ResponseBody::from_string(resp),
        upgrade: None,
    }
}

fn htmlresponse_(
    html: &HtmlAllocator,
    status: HttpResponseStatusCode,
    want_doctype: bool,
    produce: impl FnOnce(&HtmlAllocator) -> Result<AId<Node>>
) -> Result<Response>
{
    let id = produce(html)?;
    Ok(Response {
        status_code: status.code(),
        headers: vec![(Cow::from("Content-type"),
                       Cow::from("text/html; charset=utf-8"))],
        data: ResponseBody::from_string(html.to_html_string(id, want_doctype)?),
        upgrade: None,
    })
}

/// A whole HTML document.
pub fn htmlresponse(
    html: &HtmlAllocator,
    status: HttpResponseStatusCode,
    produce: impl FnOnce(&HtmlAllocator) -> Result<AId<Node>>
) -> Result<Response>
{
    htmlresponse_(html, status, true, produce)
}

/// A fragment, to be swapped into an existing page.
pub fn htmlfragmentresponse(
    html: &HtmlAllocator,
    status: HttpResponseStatusCode,
    produce: impl FnOnce(&HtmlAllocator) -> Result<AId<Node>>
) -> Result<Response>
{
    htmlresponse_(html, status, false, produce)
}

/// Read the whole body of a response, leaving an equivalent body in
/// its place.
pub fn response_body_string(response: &mut Response) -> Result<String> {
    let mut body = ResponseBody::empty();
    std::mem::swap(&mut body, &mut response.data);
    let (mut data, _) = body.into_reader_and_size();
    let mut s = String::new();
    std::io::Read::read_to_string(&mut data, &mut s)?;
    response.data = ResponseBody::from_string(s.clone());
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ahtml::att;

    #[test]
    fn t_errorpage() -> Result<()> {
        let mut r = errorpage_from_status(HttpResponseStatusCode::NotFound404);
        assert_eq!(r.status_code, 404);
        assert!(response_body_string(&mut r)?.contains("<h1>Not Found</h1>"));
        Ok(())
    }

    #[test]
    fn t_htmlresponse() -> Result<()> {
        let html = HtmlAllocator::new(10);
        let mut r = htmlresponse(&html, HttpResponseStatusCode::OK200,
                                 |html| html.p([att("class", "a")], []))?;
        assert_eq!(r.status_code, 200);
        assert_eq!(response_body_string(&mut r)?, "<!DOCTYPE html>\n<p class=\"a\"></p>");
        // can be read again
        assert_eq!(response_body_string(&mut r)?, "<!DOCTYPE html>\n<p class=\"a\"></p>");

        let html = HtmlAllocator::new(10);
        let mut r = htmlfragmentresponse(&html, HttpResponseStatusCode::OK200,
                                         |html| html.p([], []))?;
        assert_eq!(response_body_string(&mut r)?, "<p></p>");
        Ok(())
    }
}
