//! Puzzle platform client.
//!
//! Both calls report failures as [`Outcome::Err`] with readable reasons,
//! never as a panic or a transport error escaping to the caller.

use std::sync::LazyLock;

use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, COOKIE};

use crate::config::ClientConfig;
use crate::core::{Outcome, Part};
use crate::debug;

static MAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<main>(.*?)</main>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Operations the dev loop needs from the puzzle platform.
#[async_trait]
pub trait PuzzleClient: Send + Sync {
    async fn get_input(&self, year: u16, day: u8) -> Outcome<String>;

    /// `Ok(true)` when the answer was accepted, `Ok(false)` when it was wrong.
    async fn submit(&self, year: u16, day: u8, part: Part, solution: &str) -> Outcome<bool>;
}

/// HTTP client for adventofcode.com.
pub struct AocClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<String>,
}

impl AocClient {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session: config.session(),
        })
    }

    fn cookie(&self) -> Option<String> {
        self.session.as_ref().map(|s| format!("session={s}"))
    }
}

#[async_trait]
impl PuzzleClient for AocClient {
    async fn get_input(&self, year: u16, day: u8) -> Outcome<String> {
        let Some(cookie) = self.cookie() else {
            return Outcome::error("Session cookie is required");
        };
        let url = format!("{}/{year}/day/{day}/input", self.base_url);
        debug!("client"; "GET {}", url);

        let response = match self.http.get(&url).header(COOKIE, cookie).send().await {
            Ok(response) => response,
            Err(e) => return Outcome::errors(["Could not fetch input".to_string(), e.to_string()]),
        };
        let status = response.status();
        if !status.is_success() {
            return Outcome::errors(["Could not fetch input".to_string(), status.to_string()]);
        }
        match response.text().await {
            Ok(text) => Outcome::ok(text),
            Err(e) => Outcome::errors(["Could not read input".to_string(), e.to_string()]),
        }
    }

    async fn submit(&self, year: u16, day: u8, part: Part, solution: &str) -> Outcome<bool> {
        let Some(cookie) = self.cookie() else {
            return Outcome::error("Session cookie is required");
        };
        let url = format!("{}/{year}/day/{day}/answer", self.base_url);
        let body = format!(
            "level={}&answer={}",
            part.number(),
            utf8_percent_encode(solution, NON_ALPHANUMERIC)
        );
        debug!("client"; "POST {}", url);

        let response = match self
            .http
            .post(&url)
            .header(COOKIE, cookie)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Outcome::errors(["Could not submit answer".to_string(), e.to_string()]),
        };
        let status = response.status();
        if !status.is_success() {
            return Outcome::errors(["Could not submit answer".to_string(), status.to_string()]);
        }
        match response.text().await {
            Ok(html) => interpret_answer(&html),
            Err(e) => Outcome::errors(["Could not read response".to_string(), e.to_string()]),
        }
    }
}

/// Text content of the page's `<main>` element.
fn main_text(html: &str) -> Option<String> {
    let inner = MAIN.captures(html)?.get(1)?.as_str();
    let text = TAG.replace_all(inner, "");
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Map the answer page onto accepted / wrong / error.
pub fn interpret_answer(html: &str) -> Outcome<bool> {
    let Some(text) = main_text(html) else {
        return Outcome::error("Could not get main element");
    };

    if text.contains("That's the right answer") {
        Outcome::ok(true)
    } else if text.contains("That's not the right answer") {
        Outcome::ok(false)
    } else if text.contains("You don't seem to be solving the right level") {
        Outcome::error("Not solving the right level")
    } else if text.contains("please identify yourself") {
        Outcome::error("To play, please identify yourself")
    } else {
        // "You gave an answer too recently" and anything unexpected
        Outcome::error(text)
    }
}
