//! Route matching module
//!
//! Maps method and path onto the front end's fixed set of routes.

use hyper::Method;

/// Every route the front end serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Entry,
    Generate,
    ViewQuiz,
    Submit,
    Results,
    QuizList,
    TakeQuiz(i64),
    Review(i64),
    Delete(i64),
    Health,
}

/// Why no route matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    NotFound,
    /// Path exists, method does not; carries the `Allow` value
    MethodNotAllowed(&'static str),
}

impl Route {
    /// Whether the handler must read a form body first
    pub const fn reads_form(self) -> bool {
        matches!(self, Self::Generate | Self::Submit)
    }
}

/// Find the route for a request
pub fn match_route(method: &Method, path: &str) -> Result<Route, RouteError> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match segments.as_slice() {
        [""] => match *method {
            Method::GET => Ok(Route::Entry),
            Method::POST => Ok(Route::Generate),
            _ => Err(RouteError::MethodNotAllowed("GET, POST")),
        },
        ["quiz"] => only(method, &Method::GET, Route::ViewQuiz),
        ["submit_quiz"] => only(method, &Method::POST, Route::Submit),
        ["results"] => only(method, &Method::GET, Route::Results),
        ["quiz_list"] => only(method, &Method::GET, Route::QuizList),
        ["healthz" | "readyz"] => only(method, &Method::GET, Route::Health),
        ["quiz", id] => {
            let id = parse_id(id)?;
            match *method {
                Method::GET => Ok(Route::TakeQuiz(id)),
                Method::DELETE => Ok(Route::Delete(id)),
                _ => Err(RouteError::MethodNotAllowed("GET, DELETE")),
            }
        }
        ["quiz", id, "review"] => only(method, &Method::GET, Route::Review(parse_id(id)?)),
        ["delete_quiz", id] => only(method, &Method::DELETE, Route::Delete(parse_id(id)?)),
        _ => Err(RouteError::NotFound),
    }
}

fn only(method: &Method, allowed: &Method, route: Route) -> Result<Route, RouteError> {
    if method == allowed {
        return Ok(route);
    }
    let allow = match *allowed {
        Method::POST => "POST",
        Method::DELETE => "DELETE",
        _ => "GET",
    };
    Err(RouteError::MethodNotAllowed(allow))
}

/// Quiz ids are plain non-negative integers; anything else is not a route
fn parse_id(raw: &str) -> Result<i64, RouteError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RouteError::NotFound);
    }
    raw.parse().map_err(|_| RouteError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_routes() {
        assert_eq!(match_route(&Method::GET, "/"), Ok(Route::Entry));
        assert_eq!(match_route(&Method::POST, "/"), Ok(Route::Generate));
        assert_eq!(
            match_route(&Method::PUT, "/"),
            Err(RouteError::MethodNotAllowed("GET, POST"))
        );
    }

    #[test]
    fn test_session_pages() {
        assert_eq!(match_route(&Method::GET, "/quiz"), Ok(Route::ViewQuiz));
        assert_eq!(match_route(&Method::POST, "/submit_quiz"), Ok(Route::Submit));
        assert_eq!(match_route(&Method::GET, "/results"), Ok(Route::Results));
        assert_eq!(match_route(&Method::GET, "/quiz_list"), Ok(Route::QuizList));
        assert_eq!(
            match_route(&Method::GET, "/submit_quiz"),
            Err(RouteError::MethodNotAllowed("POST"))
        );
    }

    #[test]
    fn test_quiz_id_routes() {
        assert_eq!(match_route(&Method::GET, "/quiz/12"), Ok(Route::TakeQuiz(12)));
        assert_eq!(match_route(&Method::GET, "/quiz/12/review"), Ok(Route::Review(12)));
        assert_eq!(match_route(&Method::DELETE, "/quiz/3"), Ok(Route::Delete(3)));
        assert_eq!(match_route(&Method::DELETE, "/delete_quiz/3"), Ok(Route::Delete(3)));
    }

    #[test]
    fn test_non_integer_ids_not_found() {
        assert_eq!(match_route(&Method::GET, "/quiz/abc"), Err(RouteError::NotFound));
        assert_eq!(match_route(&Method::GET, "/quiz/-1"), Err(RouteError::NotFound));
        assert_eq!(
            match_route(&Method::GET, "/quiz/99999999999999999999"),
            Err(RouteError::NotFound)
        );
        assert_eq!(match_route(&Method::GET, "/nope"), Err(RouteError::NotFound));
    }

    #[test]
    fn test_health_and_form_routes() {
        assert_eq!(match_route(&Method::GET, "/healthz"), Ok(Route::Health));
        assert_eq!(match_route(&Method::GET, "/readyz"), Ok(Route::Health));
        assert!(Route::Generate.reads_form());
        assert!(!Route::Delete(1).reads_form());
    }
}
