//! Judge facade.
//!
//! Wires an authenticated [`Session`] into the extraction, reconciliation and
//! polling components using the judge's URL layout. The session owns cookies
//! and transport; this module only decides which pages to read and how to
//! interpret them.

use std::sync::Arc;

use url::Url;

use crate::clock::{Sleeper, ThreadSleeper};
use crate::dom::{self, Document};
use crate::embed::{FetchedImage, ImageCache, ImageFetcher};
use crate::encoding::decode_body;
use crate::error::{Error, Result};
use crate::form::{prepare_submit_payload, FormFields};
use crate::options::Options;
use crate::poll;
use crate::problem::{assemble, ProblemPage};
use crate::reconcile::{Reconciler, Submission, SubmissionBackend};
use crate::result::ProblemRecord;
use crate::status::{parse_status_table, SolutionStatus, StatusEntry};

/// Marker of the login page in URLs and form actions.
const LOGIN_PAGE: &str = "login.php";

/// A response as seen by the caller's HTTP stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Final URL after redirects.
    pub url: String,
    /// `Content-Type` header.
    pub content_type: Option<String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl Response {
    /// Body decoded to UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Cookie-bearing HTTP session owned by the caller.
pub trait Session {
    fn get(&self, url: &Url) -> Result<Response>;

    /// POST url-encoded `fields` with a `Referer` header.
    fn post_form(&self, url: &Url, fields: &[(String, String)], referer: &Url) -> Result<Response>;
}

/// URL layout of the judge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    base: Url,
}

impl Site {
    pub fn new(base: &str) -> Result<Self> {
        Ok(Self {
            base: Url::parse(base)?,
        })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn page(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub fn problem(&self, id: &str) -> Result<Url> {
        self.page("problem.php", &[("id", id)])
    }

    pub fn status(&self, user_id: &str) -> Result<Url> {
        self.page("status.php", &[("user_id", user_id)])
    }

    pub fn submit_page(&self, problem_id: &str) -> Result<Url> {
        self.page("submitpage.php", &[("id", problem_id)])
    }

    pub fn submit(&self) -> Result<Url> {
        self.page("submit.php", &[])
    }

    pub fn status_ajax(&self, solution_id: u64) -> Result<Url> {
        self.page(
            "status-ajax.php",
            &[("solution_id", solution_id.to_string().as_str())],
        )
    }
}

/// Fail with [`Error::AuthRequired`] on a login redirect or an embedded login form.
pub fn ensure_authenticated(final_url: &str, doc: Option<&Document>) -> Result<()> {
    if final_url.to_ascii_lowercase().contains(LOGIN_PAGE) {
        return Err(Error::AuthRequired);
    }
    let login_form = format!(r#"form[action*="{LOGIN_PAGE}"]"#);
    if doc.is_some_and(|doc| doc.select(&login_form).exists()) {
        return Err(Error::AuthRequired);
    }
    Ok(())
}

/// Scraping and submission operations for one judge session.
pub struct Judge<S: Session> {
    session: S,
    site: Site,
    options: Options,
    images: Arc<ImageCache>,
    sleeper: Arc<dyn Sleeper + Send + Sync>,
}

impl<S: Session> Judge<S> {
    /// Build a facade from options; fails on an unparseable base URL.
    pub fn new(session: S, options: Options) -> Result<Self> {
        Ok(Self {
            session,
            site: Site::new(&options.base_url)?,
            options,
            images: Arc::new(ImageCache::new()),
            sleeper: Arc::new(ThreadSleeper),
        })
    }

    /// Share an image cache with other sessions.
    #[must_use]
    pub fn with_image_cache(mut self, images: Arc<ImageCache>) -> Self {
        self.images = images;
        self
    }

    /// Replace how retry pauses are taken.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper + Send + Sync>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub fn site(&self) -> &Site {
        &self.site
    }

    #[must_use]
    pub fn image_cache(&self) -> &Arc<ImageCache> {
        &self.images
    }

    /// GET a page, decode it and reject login pages.
    fn fetch_page(&self, url: &Url) -> Result<(Response, Document)> {
        let response = self.session.get(url)?;
        let doc = dom::parse(&response.text());
        ensure_authenticated(&response.url, Some(&doc))?;
        Ok((response, doc))
    }

    /// Fetch and extract one problem.
    pub fn fetch_problem(&self, id: &str) -> Result<ProblemRecord> {
        let url = self.site.problem(id)?;
        tracing::info!(%url, "fetching problem");
        let response = self.session.get(&url)?;
        ensure_authenticated(&response.url, None)?;

        let page = ProblemPage::new(response.text(), url, id);
        let fetcher = SessionImages(&self.session);
        Ok(assemble(&page, &fetcher, &self.images, &self.options))
    }

    /// Most recent `limit` submissions of a user.
    pub fn fetch_status(&self, user_id: &str, limit: usize) -> Result<Vec<StatusEntry>> {
        let (_, doc) = self.fetch_page(&self.site.status(user_id)?)?;
        parse_status_table(&doc, Some(limit))
    }

    /// Form fields to post for a submission.
    pub fn prepare_submission(&self, submission: &Submission) -> Result<FormFields> {
        let (response, _) = self.fetch_page(&self.site.submit_page(&submission.problem_id)?)?;
        prepare_submit_payload(&response.text(), submission)
    }

    /// Submit and return the status row the submission created.
    pub fn submit(&self, user_id: &str, submission: &Submission) -> Result<StatusEntry> {
        let backend = SessionBackend {
            judge: self,
            user_id,
        };
        let entry = Reconciler::new(&backend, self.sleeper.as_ref(), self.options.reconcile.clone())
            .reconcile(submission)?;
        tracing::info!(
            solution_id = ?entry.solution_id,
            judged = entry.is_terminal(),
            "submission reconciled"
        );
        Ok(entry)
    }

    /// Current status of one solution.
    pub fn query(&self, solution_id: u64) -> Result<SolutionStatus> {
        let response = self.session.get(&self.site.status_ajax(solution_id)?)?;
        ensure_authenticated(&response.url, None)?;
        SolutionStatus::parse(solution_id, &response.text())
    }

    /// Poll one solution with the configured backoff.
    pub fn poll(&self, solution_id: u64) -> Result<SolutionStatus> {
        let lookup = |id: u64| self.query(id);
        poll::poll(&lookup, self.sleeper.as_ref(), solution_id, &self.options.poll)
    }
}

/// Image downloads through the judge session.
struct SessionImages<'a, S: Session>(&'a S);

impl<S: Session> ImageFetcher for SessionImages<'_, S> {
    fn fetch_image(&self, url: &str) -> Result<FetchedImage> {
        let response = self.0.get(&Url::parse(url)?)?;
        Ok(FetchedImage {
            bytes: response.body,
            content_type: response.content_type,
        })
    }
}

/// Status listing and form posting for the reconciler.
struct SessionBackend<'a, S: Session> {
    judge: &'a Judge<S>,
    user_id: &'a str,
}

impl<S: Session> SubmissionBackend for SessionBackend<'_, S> {
    fn list_status(&self, limit: usize) -> Result<Vec<StatusEntry>> {
        self.judge.fetch_status(self.user_id, limit)
    }

    fn submit(&self, submission: &Submission) -> Result<Vec<StatusEntry>> {
        let fields = self.judge.prepare_submission(submission)?;
        let site = &self.judge.site;
        let referer = site.submit_page(&submission.problem_id)?;
        let response = self.judge.session.post_form(&site.submit()?, &fields, &referer)?;

        let doc = dom::parse(&response.text());
        ensure_authenticated(&response.url, Some(&doc))?;
        match parse_status_table(&doc, None) {
            Ok(rows) => Ok(rows),
            Err(Error::MalformedUpstream(_)) => {
                tracing::debug!(final_url = %response.url, "submit response has no status table");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }
}
