//! HTML view module
//!
//! Renders bridge pages through Tera templates compiled into the binary. Templates
//! end in `.html`, so everything interpolated into them is HTML-escaped.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use tera::{Context, Tera};

use crate::backend::QuizResult;
use crate::bridge::Page;

const TEMPLATES: [(&str, &str); 6] = [
    ("layout.html", include_str!("../../templates/layout.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("quiz.html", include_str!("../../templates/quiz.html")),
    ("results.html", include_str!("../../templates/results.html")),
    ("quiz_list.html", include_str!("../../templates/quiz_list.html")),
    ("review.html", include_str!("../../templates/review.html")),
];

/// One quiz result prepared for display
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    player_name: &'a str,
    score: u32,
    total_questions: u32,
    percentage: String,
    completed_at: String,
}

impl<'a> From<&'a QuizResult> for ResultRow<'a> {
    fn from(result: &'a QuizResult) -> Self {
        Self {
            player_name: &result.player_name,
            score: result.score,
            total_questions: result.total_questions,
            percentage: format!("{:.1}", result.percentage),
            completed_at: result
                .completed_at
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_default(),
        }
    }
}

/// Compiled page templates
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        tera.autoescape_on(vec![".html"]);
        Ok(Self { tera })
    }

    /// Render a page to a full HTML document
    pub fn render(&self, page: &Page) -> Result<String, tera::Error> {
        let mut context = Context::new();
        let template = match page {
            Page::Index { error } => {
                context.insert("error", error);
                "index.html"
            }
            Page::Quiz { quiz } => {
                context.insert("quiz", quiz);
                "quiz.html"
            }
            Page::Results { result } => {
                context.insert("result", &ResultRow::from(result));
                "results.html"
            }
            Page::QuizList { quizzes, error } => {
                context.insert("quizzes", quizzes);
                context.insert("error", error);
                "quiz_list.html"
            }
            Page::Review {
                quiz,
                results,
                notice,
            } => {
                let rows: Vec<ResultRow<'_>> = results.iter().map(ResultRow::from).collect();
                context.insert("quiz", quiz);
                context.insert("results", &rows);
                context.insert("notice", notice);
                "review.html"
            }
        };
        self.tera.render(template, &context)
    }
}

/// `YYYY-MM-DD HH:MM` for RFC 3339 or offset-less ISO timestamps, anything else verbatim
fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M";

    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return t.format(DISPLAY).to_string();
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_or_else(|_| raw.to_string(), |t| t.format(DISPLAY).to_string())
}
