//! Building the form and echo fragments.

use anyhow::Result;

use crate::ahtml::{HtmlAllocator, AId, Node, att, opt_att};
use crate::form::FORM_PATH;
use crate::form::fields::FieldSpec;
use crate::form::submission::SubmissionRecord;
use crate::form::validation::{ValidationIssue, ValidationResult, ValidRecord, issue_for};

/// The form with one input per declared field. `record` is `None`
/// on a fresh page load (inputs without a value); otherwise each
/// input shows what was submitted. Each input is preceded by an
/// error element holding the message from `issues` for that field,
/// empty if there is none.
pub fn form_fragment(
    html: &HtmlAllocator,
    fields: &[FieldSpec],
    record: Option<&SubmissionRecord>,
    issues: &[ValidationIssue],
) -> Result<AId<Node>>
{
    let mut body = Vec::with_capacity(fields.len() + 1);
    for field in fields {
        let error = match issue_for(issues, field.name) {
            Some(issue) => html.staticstr(issue.message)?,
            None => html.empty_node()?,
        };
        body.push(html.div(
            [],
            [
                html.div([att("class", "text-red-500")],
                         [error])?,
                html.label([att("for", field.name)],
                           [html.staticstr(field.label)?])?,
                html.input([att("id", field.name),
                            att("name", field.name),
                            att("class", "border"),
                            opt_att("value", record.map(
                                |r| r.value_or_empty(field.name)))],
                           [])?,
            ])?);
    }
    body.push(html.button(
        [att("type", "submit"),
         att("class", "border w-full rounded bg-gray-100")],
        [html.staticstr("Save")?])?);

    html.div(
        [att("class", "max-w-xl mx-auto flex flex-col items-center")],
        [
            html.form(
                [att("class", "flex flex-col gap-1"),
                 att("hx-post", FORM_PATH),
                 att("action", FORM_PATH),
                 att("method", "POST")],
                body)?
        ])
}

/// Shows the accepted values, as a JSON object.
pub fn echo_fragment(
    html: &HtmlAllocator,
    record: &ValidRecord,
) -> Result<AId<Node>>
{
    html.div([],
             [html.string(serde_json::to_string(record)?)?])
}

/// The response to a form post: the echo if valid, otherwise the
/// form again with the submitted values and the issues.
pub fn result_fragment(
    html: &HtmlAllocator,
    fields: &[FieldSpec],
    result: &ValidationResult,
) -> Result<AId<Node>>
{
    match result {
        ValidationResult::Valid(record) =>
            echo_fragment(html, record),
        ValidationResult::Invalid { issues, submitted } =>
            form_fragment(html, fields, Some(submitted), issues),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::fields::FORM_FIELDS;
    use crate::form::validation::validate;

    fn render(record: Option<&SubmissionRecord>, issues: &[ValidationIssue]) -> Result<String> {
        let html = HtmlAllocator::new(1000);
        let id = form_fragment(&html, FORM_FIELDS, record, issues)?;
        html.to_html_string(id, false)
    }

    #[test]
    fn t_fresh() -> Result<()> {
        let s = render(None, &[])?;
        assert!(s.contains(r#"<input id="name" name="name" class="border">"#));
        assert!(s.contains(r#"<input id="email" name="email" class="border">"#));
        assert!(s.contains(r#"<div class="text-red-500"></div><label for="name">Name:</label>"#));
        assert!(! s.contains("required!"));
        assert!(s.contains(r#"hx-post="/form""#));
        assert!(s.contains(r#"<button type="submit" class="border w-full rounded bg-gray-100">Save</button>"#));
        Ok(())
    }

    #[test]
    fn t_filled_without_issues() -> Result<()> {
        let record = SubmissionRecord::from_pairs([("name", "Alice"), ("email", "a@b.com")]);
        let s = render(Some(&record), &[])?;
        assert!(s.contains(r#"name="name" class="border" value="Alice""#));
        assert!(s.contains(r#"name="email" class="border" value="a@b.com""#));
        assert!(! s.contains("required!"));
        Ok(())
    }

    #[test]
    fn t_invalid() -> Result<()> {
        let record = SubmissionRecord::from_pairs([("name", ""), ("email", "bad")]);
        let html = HtmlAllocator::new(1000);
        let id = result_fragment(&html, FORM_FIELDS, &validate(&record, FORM_FIELDS))?;
        let s = html.to_html_string(id, false)?;
        assert!(s.contains(r#"<div class="text-red-500">Name required!</div><label for="name">"#));
        assert!(s.contains(r#"<div class="text-red-500">Email required!</div><label for="email">"#));
        assert!(s.contains(r#"name="email" class="border" value="bad""#));
        assert!(s.contains(r#"name="name" class="border" value="""#));
        Ok(())
    }

    #[test]
    fn t_values_escaped() -> Result<()> {
        let record = SubmissionRecord::from_pairs([("name", "\"><script>x</script>"),
                                                   ("email", "a&b")]);
        let s = render(Some(&record), &[])?;
        assert!(! s.contains("<script>"));
        assert!(s.contains(r#"value="&quot;&gt;&lt;script&gt;x&lt;/script&gt;""#));
        assert!(s.contains(r#"value="a&amp;b""#));
        Ok(())
    }

    #[test]
    fn t_echo() -> Result<()> {
        let record = SubmissionRecord::from_pairs([("name", "John"),
                                                   ("email", "john@example.com")]);
        let html = HtmlAllocator::new(1000);
        let id = result_fragment(&html, FORM_FIELDS, &validate(&record, FORM_FIELDS))?;
        assert_eq!(html.to_html_string(id, false)?,
                   "<div>{&quot;name&quot;:&quot;John&quot;,\
                    &quot;email&quot;:&quot;john@example.com&quot;}</div>");
        assert_eq!(html.to_plain_string(id)?,
                   r#"{"name":"John","email":"john@example.com"}"#);
        Ok(())
    }
}
