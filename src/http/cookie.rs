//! Cookie header parsing module

use cookie::Cookie;

/// Value of cookie `name` in a `Cookie` request header, surrounding quotes removed
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value_trimmed().to_string())
}
