//! The pages of the site and the dispatch to them.

use std::io::Read;
use std::sync::Arc;

use anyhow::Result;
use rouille::{Request, Response, router};
use rouille::input::multipart::get_multipart_input;
use rouille::input::post::raw_urlencoded_post_input;

use crate::ahtml::{HtmlAllocator, att};
use crate::config::Config;
use crate::form::FORM_PATH;
use crate::form::fields::{FieldSpec, FORM_FIELDS};
use crate::form::render::{form_fragment, result_fragment};
use crate::form::submission::SubmissionRecord;
use crate::form::validation::validate;
use crate::http_request_method::HttpRequestMethod;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::layout::{DemoLayout, LayoutInterface};
use crate::webutils::{htmlresponse, htmlfragmentresponse, errorpage_from_status};
use crate::warn;

/// Paths that exist, with the methods they accept.
const ROUTES: &[(&str, &str)] = &[
    ("/", "GET, HEAD"),
    (FORM_PATH, "GET, HEAD, POST"),
];

pub struct Site {
    pub layout: Arc<dyn LayoutInterface>,
    pub fields: &'static [FieldSpec],
    /// Per request limit, see `HtmlAllocator`.
    pub max_allocations: u32,
}

impl Site {
    pub fn new(config: &Config) -> Self {
        Site {
            layout: Arc::new(DemoLayout::new(config.site_title.clone())),
            fields: FORM_FIELDS,
            max_allocations: config.max_allocations,
        }
    }

    /// Err means the request was accepted but producing the page
    /// failed; the caller turns that into a 500 page.
    pub fn handle(&self, request: &Request) -> Result<Response> {
        let html = HtmlAllocator::new(self.max_allocations);
        router!(
            request,
            // HEAD gets the same response; the server drops the body.
            (GET) (/) => {
                self.index(&html)
            },
            (HEAD) (/) => {
                self.index(&html)
            },
            (GET) (/form) => {
                self.show_form(&html)
            },
            (HEAD) (/form) => {
                self.show_form(&html)
            },
            (POST) (/form) => {
                self.submit_form(request, &html)
            },
            _ => {
                Ok(not_routed(request))
            }
        )
    }

    fn index(&self, html: &HtmlAllocator) -> Result<Response> {
        htmlresponse(html, HttpResponseStatusCode::OK200, |html| {
            self.layout.page(
                html,
                html.div(
                    [att("class", "max-w-xl mx-auto flex flex-col items-center")],
                    [
                        html.a([att("href", FORM_PATH), att("class", "text-blue-400")],
                               [html.staticstr("Create Item")?])?
                    ])?)
        })
    }

    fn show_form(&self, html: &HtmlAllocator) -> Result<Response> {
        htmlresponse(html, HttpResponseStatusCode::OK200, |html| {
            self.layout.page(
                html,
                form_fragment(html, self.fields, None, &[])?)
        })
    }

    /// Invalid submissions are answered with 200, too: the response
    /// replaces the form in the page.
    fn submit_form(&self, request: &Request, html: &HtmlAllocator) -> Result<Response> {
        let submission = parse_submission(request);
        let result = validate(&submission, self.fields);
        htmlfragmentresponse(html, HttpResponseStatusCode::OK200, |html| {
            result_fragment(html, self.fields, &result)
        })
    }
}

fn is_multipart(request: &Request) -> bool {
    request.header("Content-Type")
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// The text fields of a `multipart/form-data` body; file uploads are
/// skipped.
fn multipart_submission(request: &Request) -> Result<SubmissionRecord> {
    let mut multipart = get_multipart_input(request)?;
    let mut record = SubmissionRecord::new();
    while let Some(mut field) = multipart.next() {
        if field.headers.filename.is_some() {
            continue;
        }
        let mut value = String::new();
        field.data.read_to_string(&mut value)?;
        record.insert(field.headers.name.to_string(), value);
    }
    Ok(record)
}

fn urlencoded_submission(request: &Request) -> Result<SubmissionRecord> {
    Ok(SubmissionRecord::from_pairs(raw_urlencoded_post_input(request)?))
}

/// The fields of a POST body, url-encoded or multipart. A body that
/// can't be parsed (wrong content type, bad encoding) gives an empty
/// record, which then fails validation like a form sent with empty
/// fields.
pub fn parse_submission(request: &Request) -> SubmissionRecord {
    let parsed =
        if is_multipart(request) {
            multipart_submission(request)
        } else {
            urlencoded_submission(request)
        };
    match parsed {
        Ok(record) => record,
        Err(e) => {
            warn!("could not parse form submission to {:?}, treating as empty: {e}",
                  request.url());
            SubmissionRecord::new()
        }
    }
}

/// 501 for methods we don't know, 405 for a known path with the
/// wrong method, 404 otherwise.
fn not_routed(request: &Request) -> Response {
    if HttpRequestMethod::from_str(request.method()).is_err() {
        return errorpage_from_status(HttpResponseStatusCode::NotImplemented501)
    }
    let url = request.url();
    match ROUTES.iter().find(|(path, _)| *path == url) {
        Some((_, allow)) =>
            errorpage_from_status(HttpResponseStatusCode::MethodNotAllowed405)
            .with_additional_header("Allow", *allow),
        None =>
            errorpage_from_status(HttpResponseStatusCode::NotFound404),
    }
}
