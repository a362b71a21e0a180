//! Submission status records.
//!
//! Two sources describe a submission: rows of the status table
//! ([`StatusEntry`], parsed by [`parse_status_table`]) and the single-solution
//! endpoint ([`SolutionStatus`]). Judge result codes are interpreted through
//! [`JudgeResult`].

use std::cmp::Reverse;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dom::{self, Document, NodeRef, Selection};
use crate::error::{Error, Result};
use crate::patterns::SOLUTION_ID_LINK;
use crate::tree;

/// Header texts that identify a status table without a known id.
const STATUS_HEADERS: &[&str] = &["提交编号", "用户", "题目编号", "结果"];

/// Rows shorter than this are layout, not submissions.
const MIN_ROW_CELLS: usize = 8;

/// Rows at least this long start with a solution id column.
const ROW_CELLS_WITH_ID: usize = 10;

/// Timestamp layout of the "submitted at" column.
const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Label for codes outside the known table.
pub const UNKNOWN_RESULT_LABEL: &str = "未知";

/// Judge verdicts and intermediate states, by numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeResult {
    Waiting,
    Rejudging,
    Compiling,
    Judging,
    Accepted,
    PresentationError,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    OutputLimitExceeded,
    RuntimeError,
    CompileError,
    Compiled,
    Running,
    PendingManualReview,
    Submitting,
    RemoteWaiting,
    RemoteJudging,
}

impl JudgeResult {
    const BY_CODE: [JudgeResult; 18] = [
        Self::Waiting,
        Self::Rejudging,
        Self::Compiling,
        Self::Judging,
        Self::Accepted,
        Self::PresentationError,
        Self::WrongAnswer,
        Self::TimeLimitExceeded,
        Self::MemoryLimitExceeded,
        Self::OutputLimitExceeded,
        Self::RuntimeError,
        Self::CompileError,
        Self::Compiled,
        Self::Running,
        Self::PendingManualReview,
        Self::Submitting,
        Self::RemoteWaiting,
        Self::RemoteJudging,
    ];

    /// Look up a judge code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::BY_CODE.get(index).copied())
    }

    /// Numeric code used by the judge.
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// English label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Rejudging => "Rejudging",
            Self::Compiling => "Compiling",
            Self::Judging => "Running & Judging",
            Self::Accepted => "Accepted",
            Self::PresentationError => "Presentation Error",
            Self::WrongAnswer => "Wrong Answer",
            Self::TimeLimitExceeded => "Time Limit Exceeded",
            Self::MemoryLimitExceeded => "Memory Limit Exceeded",
            Self::OutputLimitExceeded => "Output Limit Exceeded",
            Self::RuntimeError => "Runtime Error",
            Self::CompileError => "Compile Error",
            Self::Compiled => "Compile OK",
            Self::Running => "Test Running Done",
            Self::PendingManualReview => "Pending Manual Review",
            Self::Submitting => "Submitting",
            Self::RemoteWaiting => "Remote Waiting",
            Self::RemoteJudging => "Remote Judging",
        }
    }

    /// Label as the judge site shows it.
    #[must_use]
    pub fn local_label(self) -> &'static str {
        match self {
            Self::Waiting => "等待",
            Self::Rejudging => "等待重判",
            Self::Compiling => "编译中",
            Self::Judging => "运行并评判",
            Self::Accepted => "正确",
            Self::PresentationError => "格式错误",
            Self::WrongAnswer => "答案错误",
            Self::TimeLimitExceeded => "时间超限",
            Self::MemoryLimitExceeded => "内存超限",
            Self::OutputLimitExceeded => "输出超限",
            Self::RuntimeError => "运行错误",
            Self::CompileError => "编译错误",
            Self::Compiled => "编译成功",
            Self::Running => "运行完成",
            Self::PendingManualReview => "自动评测通过，等待人工确认",
            Self::Submitting => "提交中",
            Self::RemoteWaiting => "远程等待",
            Self::RemoteJudging => "远程判题",
        }
    }

    /// Whether judging has concluded.
    ///
    /// Waiting, rejudging, compiling, judging, submitting and both remote
    /// states are still in progress; everything else is final.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            Self::Waiting
                | Self::Rejudging
                | Self::Compiling
                | Self::Judging
                | Self::Submitting
                | Self::RemoteWaiting
                | Self::RemoteJudging
        )
    }
}

/// Whether a raw code is terminal. Unknown codes from `Accepted` upward count as terminal.
#[must_use]
pub fn is_terminal_code(code: i32) -> bool {
    JudgeResult::from_code(code).map_or(code >= JudgeResult::Accepted.code(), JudgeResult::is_terminal)
}

/// Site label for a raw code.
#[must_use]
pub fn local_label(code: i32) -> &'static str {
    JudgeResult::from_code(code).map_or(UNKNOWN_RESULT_LABEL, JudgeResult::local_label)
}

/// One row of the status table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub solution_id: Option<u64>,
    pub solution_id_text: Option<String>,
    pub user: Option<String>,
    pub nickname: Option<String>,
    pub problem_id: Option<String>,
    pub result_code: Option<i32>,
    pub result_text: Option<String>,
    /// `None` when the table shows `---`.
    pub memory: Option<String>,
    /// `None` when the table shows `---`.
    pub time: Option<String>,
    pub language: Option<String>,
    pub code_length: Option<String>,
    pub submitted_at: Option<String>,
}

/// Structural identity of a status row.
///
/// The table has no key that is stable across layouts, so rows are compared
/// on every displayed column except the user names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    solution_id: Option<u64>,
    submitted_at: Option<String>,
    result_text: Option<String>,
    memory: Option<String>,
    time: Option<String>,
    problem_id: Option<String>,
    language: Option<String>,
    code_length: Option<String>,
}

/// Recency ordering key; larger is newer.
pub type RecencyKey = (i64, Option<NaiveDateTime>, String);

impl StatusEntry {
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            solution_id: self.solution_id,
            submitted_at: self.submitted_at.clone(),
            result_text: self.result_text.clone(),
            memory: self.memory.clone(),
            time: self.time.clone(),
            problem_id: self.problem_id.clone(),
            language: self.language.clone(),
            code_length: self.code_length.clone(),
        }
    }

    /// `(solution id or -1, submission time)`.
    ///
    /// Rows with a numeric id always outrank rows without one. Unparseable
    /// timestamps order below parseable ones and then by their text.
    #[must_use]
    pub fn recency_key(&self) -> RecencyKey {
        let order = self
            .solution_id
            .and_then(|id| i64::try_from(id).ok())
            .unwrap_or(-1);
        let text = self.submitted_at.clone().unwrap_or_default();
        let parsed = NaiveDateTime::parse_from_str(text.trim(), SUBMITTED_AT_FORMAT).ok();
        (order, parsed, text)
    }

    /// Whether the row's result code is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.result_code.is_some_and(is_terminal_code)
    }
}

/// Sort rows newest first.
pub fn sort_newest_first(entries: &mut [StatusEntry]) {
    entries.sort_by_cached_key(|entry| Reverse(entry.recency_key()));
}

/// Locate the status table on a page.
fn find_status_table<'a>(doc: &'a Document) -> Option<Selection<'a>> {
    for selector in ["table#result-tab", "table#table"] {
        let table = doc.select(selector).first();
        if table.exists() {
            return Some(table);
        }
    }
    let tables = doc.select("table");
    let found = tables.nodes().iter().copied().find(|table| {
        Selection::from(*table)
            .select("th")
            .nodes()
            .iter()
            .any(|th| STATUS_HEADERS.contains(&tree::stripped_text(th, "").as_str()))
    });
    found.map(Selection::from)
}

fn cell_text(cell: &NodeRef, separator: &str) -> Option<String> {
    let text = tree::stripped_text(cell, separator);
    (!text.is_empty()).then_some(text)
}

fn measurement(cell: &NodeRef) -> Option<String> {
    cell_text(cell, "").filter(|value| value != "---")
}

/// Solution id carried by a result-cell link such as `reinfo.php?sid=1234`.
///
/// Only this judge is known to use the `sid` parameter; other layouts fall
/// through to `None`.
fn solution_id_from_links(cell: &NodeRef) -> Option<u64> {
    Selection::from(*cell)
        .select("a[href]")
        .nodes()
        .iter()
        .filter_map(|link| dom::get_attribute(&Selection::from(*link), "href"))
        .find_map(|href| {
            SOLUTION_ID_LINK
                .captures(&href)
                .and_then(|caps| caps[1].parse().ok())
        })
}

/// Build an entry from a row of at least [`MIN_ROW_CELLS`] cells.
fn parse_row(cells: &[NodeRef]) -> StatusEntry {
    // Short rows lack the leading solution id column.
    let shift = usize::from(cells.len() < ROW_CELLS_WITH_ID);
    let cell = |index: usize| cells.get(index - shift);
    let text = |index: usize| cell(index).and_then(|node| cell_text(node, ""));

    let mut solution_id_text = if shift == 0 { text(0) } else { None };
    let mut solution_id = solution_id_text.as_deref().and_then(|id| id.parse().ok());

    let result_cell = &cells[4 - shift];
    let result_code = Selection::from(*result_cell)
        .select("span[result]")
        .first()
        .attr("result")
        .and_then(|code| code.trim().parse().ok());

    if solution_id.is_none() {
        solution_id = solution_id_from_links(result_cell);
        if let Some(id) = solution_id {
            solution_id_text = Some(id.to_string());
        }
    }

    StatusEntry {
        solution_id,
        solution_id_text,
        user: text(1),
        nickname: text(2),
        problem_id: text(3),
        result_code,
        result_text: cell_text(result_cell, ""),
        memory: cell(5).and_then(measurement),
        time: cell(6).and_then(measurement),
        language: cell(7).and_then(|node| cell_text(node, " ")),
        code_length: text(8),
        submitted_at: text(9),
    }
}

/// Parse up to `limit` rows of the status table, in page order.
///
/// Rows with ten or more cells start with a solution id column; rows with
/// eight or nine cells do not, and their id is read from the result link.
/// Shorter rows are skipped.
pub fn parse_status_table(doc: &Document, limit: Option<usize>) -> Result<Vec<StatusEntry>> {
    let table = find_status_table(doc)
        .ok_or_else(|| Error::MalformedUpstream("status table not found".to_string()))?;
    let body = table.select("tbody").first();
    let body = if body.exists() { body } else { table };

    let mut entries = Vec::new();
    for row in body.select("tr").nodes() {
        if limit.is_some_and(|max| entries.len() >= max) {
            break;
        }
        let cells = Selection::from(*row).select("td");
        let cells = cells.nodes();
        if cells.len() < MIN_ROW_CELLS {
            continue;
        }
        entries.push(parse_row(cells));
    }
    Ok(entries)
}

/// Record returned by the single-solution status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionStatus {
    pub solution_id: u64,
    pub result_code: i32,
    /// Site label for the code, `未知` when unknown.
    pub result_text: String,
    pub memory: Option<String>,
    pub time: Option<String>,
    /// Extra detail; the endpoint's literal `none` becomes `None`.
    pub extra: Option<String>,
    pub ac_rate: Option<String>,
    /// Response body as received, trimmed.
    pub raw: String,
}

impl SolutionStatus {
    /// Parse a `code,memory,time,extra,acRate` response.
    ///
    /// ```rust
    /// use oj_scrape::status::SolutionStatus;
    ///
    /// let status = SolutionStatus::parse(77, "4,1024,15,none,50%").unwrap();
    /// assert_eq!(status.result_text, "正确");
    /// assert_eq!(status.extra, None);
    /// assert!(status.is_terminal());
    /// ```
    pub fn parse(solution_id: u64, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::MalformedUpstream(
                "empty response from status endpoint".to_string(),
            ));
        }
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        let result_code: i32 = parts[0].parse().map_err(|_| {
            Error::MalformedUpstream(format!(
                "invalid result code in status response: {}",
                parts[0]
            ))
        })?;
        let field = |index: usize| {
            parts
                .get(index)
                .filter(|value| !value.is_empty())
                .map(|value| (*value).to_string())
        };

        Ok(Self {
            solution_id,
            result_code,
            result_text: local_label(result_code).to_string(),
            memory: field(1),
            time: field(2),
            extra: field(3).filter(|extra| !extra.eq_ignore_ascii_case("none")),
            ac_rate: field(4),
            raw: raw.to_string(),
        })
    }

    /// Known verdict for the code, if any.
    #[must_use]
    pub fn judge_result(&self) -> Option<JudgeResult> {
        JudgeResult::from_code(self.result_code)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        is_terminal_code(self.result_code)
    }
}
