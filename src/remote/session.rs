// src/remote/session.rs
// =============================================================================
// Login and logout against the Sitecore login page.
//
// Sitecore has no token API for this, so we post the same form the login
// page posts. Whether it worked is decided by the cookie jar afterwards: a
// logged-in session carries an `.ASPXAUTH` cookie with a real value.
//
// A Session is a cheap clone of the client's reqwest::Client and cookie jar,
// so the interrupt path can log out without touching the crawler.
//
// Rust concepts:
// - Arrays of tuples as form bodies (RequestBuilder::form)
// - The CookieStore trait: asking the jar which cookies a URL would get
// =============================================================================

use crate::config::Endpoints;
use crate::error::AuthError;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

const AUTH_COOKIE: &str = ".ASPXAUTH";
// Shorter values are placeholders the server sets on the login page itself
const MIN_AUTH_COOKIE_LEN: usize = 8;
// The client has no global timeout; logout must not hang the exit
const LOGOUT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Session {
    http: Client,
    jar: Arc<Jar>,
    endpoints: Endpoints,
}

impl Session {
    pub(super) fn new(http: Client, jar: Arc<Jar>, endpoints: Endpoints) -> Self {
        Session {
            http,
            jar,
            endpoints,
        }
    }

    /// Posts the login form and checks the jar for a session cookie.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        tracing::debug!(url = %self.endpoints.login, "logging in");

        let form = [
            ("__EVENTTARGET", ""),
            ("__VIEWSTATEGENERATOR", "C43BEF34"),
            ("UserName", username),
            ("Password", password),
            // Encoded as ctl07=Log+in, which is what the login page itself
            // submits. The server does not check the button value.
            ("ctl07", "Log in"),
        ];

        let response = self
            .http
            .post(self.endpoints.login.clone())
            .form(&form)
            .send()
            .await
            .map_err(|source| AuthError::Transport {
                action: "login",
                source,
            })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(body = %body, "login response");
            return Err(AuthError::Rejected { action: "login" });
        }

        if !self.is_logged_in() {
            return Err(AuthError::NoSession);
        }

        tracing::debug!(status = %status, "logged in");
        Ok(())
    }

    /// Posts the (empty) logout form.
    pub async fn logout(&self) -> Result<(), AuthError> {
        tracing::debug!(url = %self.endpoints.logout, "logging out");

        let empty: [(&str, &str); 0] = [];
        let response = self
            .http
            .post(self.endpoints.logout.clone())
            .form(&empty)
            .timeout(LOGOUT_TIMEOUT)
            .send()
            .await
            .map_err(|source| AuthError::Transport {
                action: "logout",
                source,
            })?;

        if response.status() == StatusCode::FORBIDDEN {
            return Err(AuthError::Rejected { action: "logout" });
        }
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        [&self.endpoints.base, &self.endpoints.login]
            .into_iter()
            .filter_map(|url| self.jar.cookies(url))
            .any(|header| {
                header
                    .to_str()
                    .map(has_auth_cookie)
                    .unwrap_or(false)
            })
    }
}

// Checks a `Cookie:` header value ("a=1; b=2") for a usable auth cookie
fn has_auth_cookie(header: &str) -> bool {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == AUTH_COOKIE && value.len() > MIN_AUTH_COOKIE_LEN)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. How does .form() encode the body?
//    - As application/x-www-form-urlencoded
//    - Spaces become '+', and a literal '+' becomes %2B
//
// 2. Why is Session::new pub(super)?
//    - Only SitecoreClient creates sessions, so they always share its cookie jar
//
// 3. Why does into_iter() on an array yield the elements themselves?
//    - Since edition 2021 arrays implement IntoIterator by value
//    - Here the elements are `&Url`, so nothing is moved out of self
// -----------------------------------------------------------------------------
