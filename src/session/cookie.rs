// Session cookie module
// The cookie carries the session id signed with HMAC-SHA256 under a key derived from
// the configured secret

use cookie::{Cookie, CookieJar, Key, SameSite};

/// Domain separation prefix mixed into the key material
const KEY_CONTEXT: &str = "quiz_frontend.session-cookie:";
/// `Key::derive_from` needs at least this many bytes
const MIN_KEY_MATERIAL: usize = 32;

/// Issues and checks session cookies for one secret
#[derive(Clone)]
pub struct SessionCookie {
    name: String,
    key: Key,
}

impl SessionCookie {
    pub fn new(name: &str, secret: &str) -> Self {
        Self {
            name: name.to_string(),
            key: derive_key(secret),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signed cookie value for a session id
    pub fn sign(&self, id: &str) -> String {
        let mut jar = CookieJar::new();
        jar.signed_mut(&self.key)
            .add(Cookie::new(self.name.clone(), id.to_string()));
        jar.get(&self.name)
            .map(|cookie| cookie.value().to_string())
            .unwrap_or_default()
    }

    /// Session id carried by a cookie value, if its signature checks out
    pub fn verify(&self, value: &str) -> Option<String> {
        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new(self.name.clone(), value.to_string()));
        jar.signed(&self.key)
            .get(&self.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|id| !id.is_empty())
    }

    /// `Set-Cookie` header value for a session id
    pub fn set_cookie_header(&self, id: &str) -> String {
        Cookie::build((self.name.clone(), self.sign(id)))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
            .to_string()
    }
}

/// Stretch the secret to the minimum key length and derive the signing key
fn derive_key(secret: &str) -> Key {
    let seed = format!("{KEY_CONTEXT}{secret}");
    let material: Vec<u8> = seed
        .bytes()
        .cycle()
        .take(seed.len().max(MIN_KEY_MATERIAL))
        .collect();
    Key::derive_from(&material)
}
