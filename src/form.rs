//! Submit form scraping.
//!
//! The submit page carries hidden fields (tokens, contest ids) that must be
//! posted back. Every successful control of the form is collected the way a
//! browser would, then the submission's own fields are written over them.

use crate::dom::{self, Document, Selection};
use crate::error::{Error, Result};
use crate::reconcile::Submission;

/// Form fields in document order.
pub type FormFields = Vec<(String, String)>;

const FORM_SELECTORS: &[&str] = &["form#submit_code", r#"form[action="submit.php"]"#];

fn find_form<'a>(doc: &'a Document) -> Option<Selection<'a>> {
    FORM_SELECTORS
        .iter()
        .map(|selector| doc.select(selector).first())
        .find(Selection::exists)
}

/// Set `name`, replacing an earlier value in place.
fn upsert(fields: &mut FormFields, name: &str, value: String) {
    match fields.iter_mut().find(|(key, _)| key == name) {
        Some((_, existing)) => *existing = value,
        None => fields.push((name.to_string(), value)),
    }
}

/// Successful controls of a form: named inputs (unchecked checkboxes and
/// radios excluded), textareas and selects.
#[must_use]
pub fn collect_fields(form: &Selection) -> FormFields {
    let mut fields = FormFields::new();

    let inputs = form.select("input");
    for input in dom::each(&inputs) {
        let Some(name) = dom::non_empty_attribute(&input, "name") else {
            continue;
        };
        let kind = dom::get_attribute(&input, "type")
            .unwrap_or_default()
            .to_ascii_lowercase();
        if matches!(kind.as_str(), "checkbox" | "radio") && !dom::has_attribute(&input, "checked")
        {
            continue;
        }
        upsert(&mut fields, &name, dom::get_attribute(&input, "value").unwrap_or_default());
    }

    let textareas = form.select("textarea");
    for textarea in dom::each(&textareas) {
        if let Some(name) = dom::non_empty_attribute(&textarea, "name") {
            upsert(&mut fields, &name, dom::text_content(&textarea).to_string());
        }
    }

    let selects = form.select("select");
    for select in dom::each(&selects) {
        let Some(name) = dom::non_empty_attribute(&select, "name") else {
            continue;
        };
        let selected = select.select("option[selected]").first();
        let option = if selected.exists() {
            selected
        } else {
            select.select("option").first()
        };
        upsert(&mut fields, &name, dom::get_attribute(&option, "value").unwrap_or_default());
    }

    fields
}

/// Build the POST payload for a submission from the submit page.
///
/// `id`, `language` and `source` always come from the submission; a
/// contest-scoped submission also sets `problem_id`.
pub fn prepare_submit_payload(html: &str, submission: &Submission) -> Result<FormFields> {
    let doc = dom::parse(html);
    let form = find_form(&doc)
        .ok_or_else(|| Error::MalformedUpstream("submit form not found".to_string()))?;

    let mut fields = collect_fields(&form);
    upsert(&mut fields, "id", submission.problem_id.clone());
    upsert(&mut fields, "language", submission.language.clone());
    upsert(&mut fields, "source", submission.source.clone());
    if let Some(contest_problem_id) = &submission.contest_problem_id {
        upsert(&mut fields, "problem_id", contest_problem_id.clone());
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(contest: Option<&str>) -> Submission {
        Submission {
            problem_id: "1000".into(),
            language: "6".into(),
            source: "print(1)".into(),
            contest_problem_id: contest.map(str::to_string),
        }
    }

    const PAGE: &str = r#"<form id="submit_code" action="submit.php" method="post">
        <input type="hidden" name="csrf" value="tok123">
        <input type="hidden" name="id" value="999">
        <input type="checkbox" name="share">
        <input type="checkbox" name="notify" value="yes" checked>
        <input type="radio" name="mode" value="a">
        <input type="submit" value="Submit">
        <select name="language"><option value="0">C</option><option value="6" selected>Python</option></select>
        <select name="theme"><option value="light">Light</option></select>
        <textarea name="source">old</textarea>
        <input name="" value="ignored">
    </form>"#;

    #[test]
    fn test_payload_overrides_submission_fields() {
        let fields = prepare_submit_payload(PAGE, &submission(None)).unwrap();
        assert_eq!(
            fields,
            vec![
                ("csrf".to_string(), "tok123".to_string()),
                ("id".to_string(), "1000".to_string()),
                ("notify".to_string(), "yes".to_string()),
                ("source".to_string(), "print(1)".to_string()),
                ("language".to_string(), "6".to_string()),
                ("theme".to_string(), "light".to_string()),
            ]
        );
    }

    #[test]
    fn test_contest_problem_id() {
        let fields = prepare_submit_payload(PAGE, &submission(Some("2"))).unwrap();
        assert_eq!(fields.last(), Some(&("problem_id".to_string(), "2".to_string())));
    }

    #[test]
    fn test_form_by_action() {
        let html = r#"<form action="submit.php"><input name="cid" value="3"></form>"#;
        let fields = prepare_submit_payload(html, &submission(None)).unwrap();
        assert_eq!(fields[0], ("cid".to_string(), "3".to_string()));
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn test_missing_form() {
        let result = prepare_submit_payload("<form action=\"login.php\"></form>", &submission(None));
        assert!(matches!(result, Err(Error::MalformedUpstream(_))));
    }
}
