use std::sync::Arc;

use anyhow::Result;
use formsite::apachelog::Logs;
use formsite::config::Config;
use formsite::handlers::Site;
use formsite::server::server_handler;
use formsite::webutils::response_body_string;
use rouille::{Request, Response};

fn get(path: &str) -> Request {
    Request::fake_http("GET", path, vec![], vec![])
}

fn post(body: &str) -> Request {
    Request::fake_http(
        "POST", "/form",
        vec![("Content-Type".into(), "application/x-www-form-urlencoded".into())],
        body.as_bytes().to_vec())
}

fn respond(request: &Request) -> Result<(Response, String)> {
    let site = Site::new(&Config::default());
    let mut response = site.handle(request)?;
    let body = response_body_string(&mut response)?;
    Ok((response, body))
}

#[test]
fn t_index() -> Result<()> {
    let (r, body) = respond(&get("/"))?;
    assert_eq!(r.status_code, 200);
    assert!(body.starts_with("<!DOCTYPE html>\n<html>"));
    assert!(body.contains(r#"<a href="/form" class="text-blue-400">Create Item</a>"#));
    assert!(body.contains("<title>Rust Rouille HTMX Form</title>"));
    assert!(body.contains("htmx.org"));
    Ok(())
}

#[test]
fn t_show_form() -> Result<()> {
    let (r, body) = respond(&get("/form"))?;
    assert_eq!(r.status_code, 200);
    assert!(body.contains(r#"<input id="name" name="name" class="border">"#));
    assert!(body.contains(r#"<input id="email" name="email" class="border">"#));
    assert!(! body.contains("required!"));
    Ok(())
}

#[test]
fn t_submit_invalid_email() -> Result<()> {
    let (r, body) = respond(&post("name=John&email=notanemail"))?;
    assert_eq!(r.status_code, 200);
    assert!(! body.starts_with("<!DOCTYPE"));
    assert!(body.contains("Email required!"));
    assert!(! body.contains("Name required!"));
    assert!(body.contains(r#"value="John""#));
    assert!(body.contains(r#"value="notanemail""#));
    Ok(())
}

#[test]
fn t_submit_empty() -> Result<()> {
    let (_, body) = respond(&post("name=++&email="))?;
    let name_at = body.find("Name required!").expect("name issue");
    let email_at = body.find("Email required!").expect("email issue");
    assert!(name_at < email_at);
    // whitespace-only values are shown as submitted
    assert!(body.contains(r#"name="name" class="border" value="  ""#));
    Ok(())
}

#[test]
fn t_submit_valid() -> Result<()> {
    let (r, body) = respond(&post("name=John&email=john%40example.com&extra=1"))?;
    assert_eq!(r.status_code, 200);
    assert_eq!(body, r#"<div>{&quot;name&quot;:&quot;John&quot;,&quot;email&quot;:&quot;john@example.com&quot;}</div>"#);
    assert!(! body.contains("required!"));
    assert!(! body.contains("extra"));
    Ok(())
}

#[test]
fn t_submit_escapes_values() -> Result<()> {
    let (_, body) = respond(&post("name=%3Cb%3E&email=x"))?;
    assert!(body.contains(r#"value="&lt;b&gt;""#));
    assert!(! body.contains("<b>"));
    Ok(())
}

#[test]
fn t_submit_unparseable() -> Result<()> {
    let request = Request::fake_http("POST", "/form", vec![], b"name=John".to_vec());
    let (r, body) = respond(&request)?;
    assert_eq!(r.status_code, 200);
    assert!(body.contains("Name required!"));
    assert!(body.contains("Email required!"));
    Ok(())
}

fn multipart_post(fields: &[(&str, &str)]) -> Request {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!("--b0undary\r\n\
                                Content-Disposition: form-data; name=\"{name}\"\r\n\
                                \r\n\
                                {value}\r\n"));
    }
    body.push_str("--b0undary--\r\n");
    Request::fake_http(
        "POST", "/form",
        vec![("Content-Type".into(), "multipart/form-data; boundary=b0undary".into())],
        body.into_bytes())
}

#[test]
fn t_submit_multipart_invalid_email() -> Result<()> {
    let (r, body) = respond(&multipart_post(&[("name", "Jo")]))?;
    assert_eq!(r.status_code, 200);
    assert!(! body.contains("Name required!"));
    assert!(body.contains("Email required!"));
    assert!(body.contains(r#"value="Jo""#));
    Ok(())
}

#[test]
fn t_submit_multipart_valid() -> Result<()> {
    let (_, body) = respond(&multipart_post(&[("name", "Jo"),
                                               ("email", "jo@example.com")]))?;
    assert_eq!(body, r#"<div>{&quot;name&quot;:&quot;Jo&quot;,&quot;email&quot;:&quot;jo@example.com&quot;}</div>"#);
    Ok(())
}

#[test]
fn t_head() -> Result<()> {
    let head = |path: &str| Request::fake_http("HEAD", path, vec![], vec![]);
    let (r, _) = respond(&head("/"))?;
    assert_eq!(r.status_code, 200);
    let (r, body) = respond(&head("/form"))?;
    assert_eq!(r.status_code, 200);
    assert!(body.contains(r#"name="email""#));
    Ok(())
}

#[test]
fn t_not_routed() -> Result<()> {
    let (r, _) = respond(&Request::fake_http("PUT", "/form", vec![], vec![]))?;
    assert_eq!(r.status_code, 405);
    let (r, _) = respond(&Request::fake_http("POST", "/", vec![], vec![]))?;
    assert_eq!(r.status_code, 405);
    assert!(r.headers.iter().any(|(k, v)| k == "Allow" && v == "GET, HEAD"));
    let (r, body) = respond(&get("/nowhere"))?;
    assert_eq!(r.status_code, 404);
    assert!(body.contains("Not Found"));
    Ok(())
}

#[test]
fn t_allocation_limit() {
    let site = Site::new(&Config { max_allocations: 5, ..Config::default() });
    let handler = server_handler(Arc::new(site), Logs::stderr());
    assert_eq!(handler(&get("/form")).status_code, 500);
    assert_eq!(handler(&get("/")).status_code, 500);
}
