//! Request router / session bridge
//!
//! Turns browser interactions into backend calls and session updates. Each operation
//! makes its backend call(s), branches on the outcome and returns an [`Outcome`] for the
//! handler layer to turn into a response. Quiz logic itself stays in the backend.

mod outcome;

use hyper::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use outcome::{Outcome, Page};

use crate::backend::{
    AnswerSubmission, ClientError, HttpBackend, Quiz, QuizBackend, QuizResult, QuizSubmission,
};
use crate::config::BridgeConfig;
use crate::http::FormData;
use crate::logger;
use crate::session::{Session, CURRENT_QUIZ, QUIZ_RESULT};

/// Fixed message for any failed exchange with the backend
pub const CONNECTIVITY_ERROR: &str = "Unable to connect to backend service";

pub const INDEX_PATH: &str = "/";
pub const QUIZ_PATH: &str = "/quiz";
pub const RESULTS_PATH: &str = "/results";

/// Router operations over one backend
pub struct QuizBridge<B> {
    backend: B,
}

impl QuizBridge<HttpBackend> {
    /// Router talking HTTP to the configured backend
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(HttpBackend::new(
            &config.backend_base_url,
            config.backend_timeout,
        ))
    }
}

impl<B: QuizBackend> QuizBridge<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// `GET /`
    pub const fn show_entry(&self) -> Outcome {
        Outcome::Render(Page::Index { error: None })
    }

    /// `POST /`: ask the backend for a new quiz and remember it
    pub async fn generate(&self, session: &mut dyn Session, form: &FormData) -> Outcome {
        let topic = form.get("topic").unwrap_or_default().trim();
        let Some(count) = form
            .get("num_questions")
            .and_then(|v| v.trim().parse::<u32>().ok())
        else {
            return Outcome::index_error("Number of questions must be a whole number");
        };

        match self.backend.generate(topic, count).await {
            Ok(quiz) => {
                store(session, CURRENT_QUIZ, &quiz);
                Outcome::Redirect(QUIZ_PATH)
            }
            Err(ClientError::Transport(reason)) => {
                logger::log_warning(&format!("Quiz generation failed: {reason}"));
                Outcome::index_error(format!("{CONNECTIVITY_ERROR}: {reason}"))
            }
            Err(err @ ClientError::Backend { status, .. }) => {
                logger::log_warning(&format!("Quiz generation rejected: HTTP {status}"));
                let mut message = format!("Failed to generate quiz. HTTP Status: {status}");
                if let Some(preview) = err.preview() {
                    message.push_str(" - ");
                    message.push_str(&preview);
                }
                Outcome::index_error(message)
            }
        }
    }

    /// `GET /quiz`
    pub fn view_quiz(&self, session: &dyn Session) -> Outcome {
        load::<Quiz>(session, CURRENT_QUIZ).map_or(Outcome::Redirect(INDEX_PATH), |quiz| {
            Outcome::Render(Page::Quiz { quiz })
        })
    }

    /// `POST /submit_quiz`: send the answered questions for scoring
    pub async fn submit(&self, session: &mut dyn Session, form: &FormData) -> Outcome {
        let Some(quiz) = load::<Quiz>(session, CURRENT_QUIZ) else {
            return Outcome::json_error(StatusCode::BAD_REQUEST, "No quiz found");
        };

        let answers = match collect_answers(&quiz, form) {
            Ok(answers) => answers,
            Err(question_id) => {
                return Outcome::json_error(
                    StatusCode::BAD_REQUEST,
                    &format!("Invalid answer for question {question_id}"),
                );
            }
        };

        let submission = QuizSubmission {
            quiz_id: quiz.id,
            player_name: form.get("player_name").unwrap_or_default().trim().to_string(),
            answers,
        };

        match self.backend.submit(&submission).await {
            Ok(result) => {
                store(session, QUIZ_RESULT, &result);
                Outcome::Redirect(RESULTS_PATH)
            }
            Err(ClientError::Transport(reason)) => {
                logger::log_warning(&format!("Quiz {} submit failed: {reason}", quiz.id));
                Outcome::json_error(StatusCode::INTERNAL_SERVER_ERROR, CONNECTIVITY_ERROR)
            }
            Err(ClientError::Backend { status, .. }) => {
                logger::log_warning(&format!("Quiz {} submit rejected: HTTP {status}", quiz.id));
                Outcome::json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to submit quiz")
            }
        }
    }

    /// `GET /results`
    pub fn view_results(&self, session: &dyn Session) -> Outcome {
        load::<QuizResult>(session, QUIZ_RESULT).map_or(Outcome::Redirect(INDEX_PATH), |result| {
            Outcome::Render(Page::Results { result })
        })
    }

    /// `GET /quiz_list`
    pub async fn list(&self) -> Outcome {
        let (quizzes, error) = match self.backend.list().await {
            Ok(quizzes) => (quizzes, None),
            Err(ClientError::Transport(reason)) => {
                logger::log_warning(&format!("Quiz list failed: {reason}"));
                (Vec::new(), Some(CONNECTIVITY_ERROR.to_string()))
            }
            Err(ClientError::Backend { status, .. }) => {
                logger::log_warning(&format!("Quiz list rejected: HTTP {status}"));
                (Vec::new(), Some("Failed to load quizzes".to_string()))
            }
        };
        Outcome::Render(Page::QuizList { quizzes, error })
    }

    /// `GET /quiz/{id}`: fetch a stored quiz and make it the current one
    pub async fn take_quiz(&self, session: &mut dyn Session, id: i64) -> Outcome {
        match self.backend.quiz(id).await {
            Ok(quiz) => {
                store(session, CURRENT_QUIZ, &quiz);
                Outcome::Render(Page::Quiz { quiz })
            }
            Err(err) => quiz_fetch_failed(id, &err),
        }
    }

    /// `GET /quiz/{id}/review`: quiz plus its leaderboard
    pub async fn review(&self, id: i64) -> Outcome {
        let quiz = match self.backend.quiz(id).await {
            Ok(quiz) => quiz,
            Err(err) => return quiz_fetch_failed(id, &err),
        };

        let (results, notice) = match self.backend.results(id).await {
            Ok(results) => (results, None),
            Err(ClientError::Transport(reason)) => {
                logger::log_warning(&format!("Results for quiz {id} failed: {reason}"));
                (Vec::new(), Some(CONNECTIVITY_ERROR.to_string()))
            }
            Err(ClientError::Backend { status, .. }) => {
                logger::log_warning(&format!("Results for quiz {id} rejected: HTTP {status}"));
                (Vec::new(), None)
            }
        };

        Outcome::Render(Page::Review {
            quiz,
            results,
            notice,
        })
    }

    /// `DELETE /quiz/{id}`
    pub async fn delete(&self, id: i64) -> Outcome {
        match self.backend.delete(id).await {
            Ok(()) => Outcome::json_message("Quiz deleted successfully"),
            Err(ClientError::Transport(reason)) => {
                logger::log_warning(&format!("Delete of quiz {id} failed: {reason}"));
                Outcome::json_error(StatusCode::INTERNAL_SERVER_ERROR, CONNECTIVITY_ERROR)
            }
            Err(ClientError::Backend { status, .. }) => {
                logger::log_warning(&format!("Delete of quiz {id} rejected: HTTP {status}"));
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                Outcome::json_error(status, "Failed to delete quiz")
            }
        }
    }
}

fn quiz_fetch_failed(id: i64, err: &ClientError) -> Outcome {
    logger::log_warning(&format!("Fetch of quiz {id} failed: {err}"));
    if err.is_transport() {
        Outcome::index_error(CONNECTIVITY_ERROR)
    } else {
        Outcome::index_error("Quiz not found")
    }
}

/// Pair each question with its selected answer. Unanswered questions are left out;
/// a selection that is not an id yields the question id as error.
fn collect_answers(quiz: &Quiz, form: &FormData) -> Result<Vec<AnswerSubmission>, i64> {
    let mut answers = Vec::new();
    for question in &quiz.questions {
        let Some(raw) = form.get_non_empty(&format!("question_{}", question.id)) else {
            continue;
        };
        let selected_answer_id = raw.parse::<i64>().map_err(|_| question.id)?;
        answers.push(AnswerSubmission {
            question_id: question.id,
            selected_answer_id,
        });
    }
    Ok(answers)
}

fn load<T: DeserializeOwned>(session: &dyn Session, key: &str) -> Option<T> {
    let value = session.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            logger::log_warning(&format!("Discarding unreadable session value '{key}': {e}"));
            None
        }
    }
}

fn store<T: Serialize>(session: &mut dyn Session, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(v) => session.set(key, v),
        Err(e) => logger::log_error(&format!("Failed to store session value '{key}': {e}")),
    }
}
