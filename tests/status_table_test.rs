use oj_scrape::dom;
use oj_scrape::status::{parse_status_table, sort_newest_first, StatusEntry};
use oj_scrape::{Error, JudgeResult};

const HEADER: &str = "<thead><tr><th>提交编号</th><th>用户</th><th>昵称</th><th>题目编号</th><th>结果</th><th>内存</th><th>耗时</th><th>语言</th><th>代码长度</th><th>提交时间</th></tr></thead>";

fn page(rows: &str) -> String {
    format!(r#"<html><body><table class="ui table">{HEADER}<tbody>{rows}</tbody></table></body></html>"#)
}

fn parse(html: &str, limit: Option<usize>) -> Vec<StatusEntry> {
    parse_status_table(&dom::parse(html), limit).expect("status table should parse")
}

/// Ten-cell rows carry the solution id in the first column.
#[test]
fn full_layout_row() {
    let html = page(
        r#"<tr>
            <td>2048</td><td>alice</td><td>Alice A</td><td><a href="problem.php?id=1000">1000</a></td>
            <td><span class="label" result="6">答案错误</span></td>
            <td>1024 <span>KB</span></td><td>12 ms</td>
            <td><a href="showsource.php?id=2048">C++</a> / <span>Edit</span></td>
            <td>312 B</td><td>2024-05-01 10:00:00</td>
        </tr>"#,
    );
    let rows = parse(&html, None);
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.solution_id, Some(2048));
    assert_eq!(row.solution_id_text.as_deref(), Some("2048"));
    assert_eq!(row.user.as_deref(), Some("alice"));
    assert_eq!(row.nickname.as_deref(), Some("Alice A"));
    assert_eq!(row.problem_id.as_deref(), Some("1000"));
    assert_eq!(row.result_code, Some(6));
    assert_eq!(row.result_text.as_deref(), Some("答案错误"));
    assert_eq!(row.memory.as_deref(), Some("1024KB"));
    assert_eq!(row.time.as_deref(), Some("12 ms"));
    assert_eq!(row.language.as_deref(), Some("C++ / Edit"));
    assert_eq!(row.code_length.as_deref(), Some("312 B"));
    assert_eq!(row.submitted_at.as_deref(), Some("2024-05-01 10:00:00"));
    assert!(row.is_terminal());
    assert_eq!(
        row.result_code.and_then(JudgeResult::from_code),
        Some(JudgeResult::WrongAnswer)
    );
}

/// Rows without the id column read it from a `sid=` result link.
#[test]
fn short_layout_uses_result_link() {
    let html = page(
        r#"<tr>
            <td>bob</td><td>Bob</td><td>1001</td>
            <td><a href="reinfo.php?sid=77"><span result="0">等待</span></a></td>
            <td>---</td><td>---</td><td>Python</td><td>88 B</td>
            <td>2024-05-01 11:00:00</td>
        </tr>"#,
    );
    let rows = parse(&html, None);
    let row = &rows[0];
    assert_eq!(row.solution_id, Some(77));
    assert_eq!(row.solution_id_text.as_deref(), Some("77"));
    assert_eq!(row.user.as_deref(), Some("bob"));
    assert_eq!(row.problem_id.as_deref(), Some("1001"));
    assert_eq!(row.result_code, Some(0));
    assert_eq!(row.memory, None);
    assert_eq!(row.time, None);
    assert_eq!(row.submitted_at.as_deref(), Some("2024-05-01 11:00:00"));
    assert!(!row.is_terminal());
}

#[test]
fn eight_cell_rows_have_no_timestamp() {
    let html = page(
        "<tr><td>carol</td><td>C</td><td>1002</td><td>编译错误</td><td>0</td><td>0</td><td>Java</td><td>1 KB</td></tr>",
    );
    let rows = parse(&html, None);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].solution_id, None);
    assert_eq!(rows[0].result_code, None);
    assert_eq!(rows[0].result_text.as_deref(), Some("编译错误"));
    assert_eq!(rows[0].submitted_at, None);
}

#[test]
fn short_rows_are_skipped_and_limit_applies() {
    let mut rows = String::from(r#"<tr><td colspan="10">no more records</td></tr>"#);
    for id in [30, 29, 28] {
        rows.push_str(&format!(
            "<tr><td>{id}</td><td>u</td><td>n</td><td>1000</td><td>正确</td><td>1</td><td>1</td><td>C</td><td>1 B</td><td>2024-05-01 10:00:{id}</td></tr>"
        ));
    }
    let html = page(&rows);

    let all = parse(&html, None);
    assert_eq!(all.len(), 3);
    let ids: Vec<_> = parse(&html, Some(2)).iter().map(|row| row.solution_id).collect();
    assert_eq!(ids, vec![Some(30), Some(29)]);
    assert!(parse(&html, Some(0)).is_empty());
}

#[test]
fn table_found_by_id_without_headers() {
    let html = r#"<table id="result-tab"><tr><td>5</td><td>u</td><td>n</td><td>1</td><td>x</td><td>1</td><td>1</td><td>C</td><td>1</td><td>t</td></tr></table>"#;
    let rows = parse(html, None);
    assert_eq!(rows[0].solution_id, Some(5));
}

#[test]
fn missing_table_is_an_error() {
    let doc = dom::parse("<p>nothing here</p>");
    let result = parse_status_table(&doc, None);
    assert!(matches!(result, Err(Error::MalformedUpstream(_))));
}

#[test]
fn parsed_rows_sort_newest_first() {
    let html = page(
        "<tr><td>10</td><td>u</td><td>n</td><td>1</td><td>x</td><td>1</td><td>1</td><td>C</td><td>1</td><td>2024-05-01 10:00:00</td></tr>\
         <tr><td>12</td><td>u</td><td>n</td><td>1</td><td>x</td><td>1</td><td>1</td><td>C</td><td>1</td><td>2024-05-01 09:00:00</td></tr>",
    );
    let mut rows = parse(&html, None);
    sort_newest_first(&mut rows);
    assert_eq!(rows[0].solution_id, Some(12));
}
