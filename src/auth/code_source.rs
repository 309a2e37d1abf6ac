use log::warn;
use oauth2::CsrfToken;
use std::io::{BufRead, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tiny_http::{Response, Server};
use url::Url;

use crate::error::AuthError;

/// Where the user's authorization code comes from.
pub trait AuthorizationCodeSource {
    /// Redirect URI registered with the authorization request.
    fn redirect_uri(&self) -> &str;

    /// Shows `auth_url` to the user and returns the code the provider issued.
    fn obtain_code(&mut self, auth_url: &Url, csrf: &CsrfToken) -> Result<String, AuthError>;
}

/// Pulls the code out of what the user pasted: either the bare code or the
/// whole redirect URL the browser ended up on.
pub fn parse_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(input) {
        return url
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned());
    }
    Some(input.to_string())
}

/// Prints the authorization URL and reads the code from a line of input.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
    redirect_uri: String,
    open_browser: bool,
}

impl ConsolePrompt<std::io::StdinLock<'static>, std::io::Stderr> {
    pub fn stdio(redirect_uri: impl Into<String>, open_browser: bool) -> Self {
        Self::new(
            std::io::stdin().lock(),
            std::io::stderr(),
            redirect_uri,
            open_browser,
        )
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W, redirect_uri: impl Into<String>, open_browser: bool) -> Self {
        Self {
            input,
            output,
            redirect_uri: redirect_uri.into(),
            open_browser,
        }
    }
}

impl<R: BufRead, W: Write> AuthorizationCodeSource for ConsolePrompt<R, W> {
    fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    fn obtain_code(&mut self, auth_url: &Url, _csrf: &CsrfToken) -> Result<String, AuthError> {
        let io_err = |e: std::io::Error| AuthError::CodeUnavailable {
            message: e.to_string(),
        };

        writeln!(
            self.output,
            "Go to the following link in your browser then type the authorization code \
             (or paste the address you were redirected to):\n{auth_url}"
        )
        .map_err(io_err)?;
        if self.open_browser {
            open_best_effort(auth_url);
        }

        let mut line = String::new();
        self.input.read_line(&mut line).map_err(io_err)?;
        parse_code(&line).ok_or_else(|| AuthError::CodeUnavailable {
            message: "no authorization code entered".into(),
        })
    }
}

/// Listens on the loopback address of the redirect URI and takes the code
/// from the provider's redirect.
pub struct LoopbackReceiver {
    redirect_uri: String,
    open_browser: bool,
    timeout: Duration,
}

impl LoopbackReceiver {
    pub fn new(redirect_uri: impl Into<String>, open_browser: bool) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            open_browser,
            timeout: Duration::from_secs(120),
        }
    }

    fn bind_addr(&self) -> Result<SocketAddr, AuthError> {
        let unavailable = |message: String| AuthError::CodeUnavailable { message };
        let redirect = Url::parse(&self.redirect_uri)?;
        let host = redirect
            .host_str()
            .ok_or_else(|| unavailable(format!("redirect_uri missing host: {}", self.redirect_uri)))?;
        let port = redirect
            .port_or_known_default()
            .ok_or_else(|| unavailable(format!("redirect_uri missing port: {}", self.redirect_uri)))?;

        let ip: IpAddr = match host {
            "localhost" | "127.0.0.1" => IpAddr::V4(Ipv4Addr::LOCALHOST),
            other => other.parse().map_err(|_| {
                unavailable(format!(
                    "redirect_uri host must be localhost/127.0.0.1 or an IP: {other}"
                ))
            })?,
        };
        Ok(SocketAddr::new(ip, port))
    }
}

impl AuthorizationCodeSource for LoopbackReceiver {
    fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    fn obtain_code(&mut self, auth_url: &Url, csrf: &CsrfToken) -> Result<String, AuthError> {
        let bind_addr = self.bind_addr()?;
        // listen before the user can possibly be redirected
        let server = Server::http(bind_addr).map_err(|e| AuthError::CodeUnavailable {
            message: format!("failed to bind callback server on {bind_addr}: {e}"),
        })?;

        eprintln!("Open this URL in your browser:\n{auth_url}");
        if self.open_browser {
            open_best_effort(auth_url);
        }

        let wait_until = Instant::now() + self.timeout;
        while Instant::now() < wait_until {
            let request = match server.recv_timeout(Duration::from_millis(500)) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(e) => {
                    return Err(AuthError::CodeUnavailable {
                        message: format!("callback server on {bind_addr} failed: {e}"),
                    });
                }
            };

            let full = format!("http://{bind_addr}{}", request.url());
            let Ok(parsed) = Url::parse(&full) else {
                let _ = request.respond(Response::from_string("Bad redirect"));
                continue;
            };
            let param = |key: &str| {
                parsed
                    .query_pairs()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.into_owned())
            };

            if let Some(error) = param("error") {
                let _ = request.respond(Response::from_string(
                    "Authorization was not granted. You can close this tab.",
                ));
                return Err(AuthError::CodeUnavailable {
                    message: format!("authorization server returned {error}"),
                });
            }

            match param("code") {
                Some(code) if param("state").as_deref() == Some(csrf.secret().as_str()) => {
                    let _ = request.respond(Response::from_string(
                        "Authorization received. You can close this tab.",
                    ));
                    return Ok(code);
                }
                Some(_) => {
                    warn!("ignoring redirect with mismatched state");
                    let _ = request.respond(Response::from_string("State mismatch."));
                }
                None => {
                    let _ = request.respond(Response::from_string(
                        "No code found in redirect. You can close this tab.",
                    ));
                }
            }
        }

        Err(AuthError::CodeUnavailable {
            message: format!("no code received within {:?}", self.timeout),
        })
    }
}

fn open_best_effort(url: &Url) {
    if let Err(e) = open::that(url.as_str()) {
        warn!("could not open browser automatically: {e}");
    }
}
