//! OAuth client-credentials exchange against the HMRC token endpoint.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::form_urlencoded;

use crate::core::{AccessToken, TokenError};
use crate::transport::{HttpRequest, HttpTransport};

pub(crate) const SCOPE: &str = "read:vat";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

pub(crate) struct Credentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

pub(crate) fn token_request(base_url: &str, creds: &Credentials<'_>, timeout: Duration) -> HttpRequest {
    let form = form_urlencoded::Serializer::new(String::new())
        .append_pair("client_secret", creds.client_secret)
        .append_pair("client_id", creds.client_id)
        .append_pair("grant_type", "client_credentials")
        .append_pair("scope", SCOPE)
        .finish();

    HttpRequest::post(format!("{base_url}/oauth/token"), form)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .timeout(timeout)
}

pub(crate) fn exchange(
    transport: &dyn HttpTransport,
    request: HttpRequest,
    issued_for_test: bool,
    now: DateTime<Utc>,
) -> Result<AccessToken, TokenError> {
    let resp = transport.send(request)?;
    if resp.status != 200 {
        return Err(TokenError::Status {
            status: resp.status,
            body: resp.body,
        });
    }

    let parsed: TokenResponse =
        serde_json::from_str(&resp.body).map_err(|e| TokenError::Decode(e.to_string()))?;
    let token = AccessToken::from_lifetime(parsed.access_token, parsed.expires_in, issued_for_test, now);
    if token.is_expired_at(now) {
        return Err(TokenError::ExpiredOnIssue {
            expires_in: parsed.expires_in,
        });
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, TransportError};
    use chrono::TimeDelta;

    struct Reply(u16, &'static str);

    impl HttpTransport for Reply {
        fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(self.0, self.1))
        }
    }

    fn creds() -> Credentials<'static> {
        Credentials {
            client_id: "my id",
            client_secret: "s&cret",
        }
    }

    #[test]
    fn form_body_is_encoded() {
        let req = token_request("https://test-api.service.hmrc.gov.uk", &creds(), Duration::from_secs(5));
        assert_eq!(req.url, "https://test-api.service.hmrc.gov.uk/oauth/token");
        let body = req.body.unwrap_or_default();
        assert!(body.contains("client_id=my+id"));
        assert!(body.contains("client_secret=s%26cret"));
        assert!(body.contains("grant_type=client_credentials"));
        assert!(body.contains("scope=read%3Avat"));
    }

    #[test]
    fn success_applies_margin() {
        let now = Utc::now();
        let req = token_request("https://x", &creds(), Duration::from_secs(5));
        let t = exchange(
            &Reply(200, r#"{"access_token":"abc","token_type":"bearer","expires_in":14400,"scope":"read:vat"}"#),
            req,
            true,
            now,
        )
        .unwrap();
        assert_eq!(t.token, "abc");
        assert!(t.issued_for_test);
        assert_eq!(t.expires_at, now + TimeDelta::seconds(14340));
    }

    #[test]
    fn non_200_carries_body() {
        let req = token_request("https://x", &creds(), Duration::from_secs(5));
        match exchange(&Reply(401, "invalid_client"), req, false, Utc::now()) {
            Err(TokenError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_json_is_decode_error() {
        let req = token_request("https://x", &creds(), Duration::from_secs(5));
        assert!(matches!(
            exchange(&Reply(200, "{\"token\":1}"), req, false, Utc::now()),
            Err(TokenError::Decode(_))
        ));
    }

    #[test]
    fn lifetime_within_margin_is_rejected() {
        let short = [
            (0, r#"{"access_token":"short","expires_in":0}"#),
            (30, r#"{"access_token":"short","expires_in":30}"#),
            (60, r#"{"access_token":"short","expires_in":60}"#),
        ];
        for (expires_in, body) in short {
            let req = token_request("https://x", &creds(), Duration::from_secs(5));
            match exchange(&Reply(200, body), req, false, Utc::now()) {
                Err(TokenError::ExpiredOnIssue { expires_in: got }) => assert_eq!(got, expires_in),
                other => panic!("expires_in {expires_in} gave {other:?}"),
            }
        }
        let req = token_request("https://x", &creds(), Duration::from_secs(5));
        assert!(exchange(&Reply(200, r#"{"access_token":"ok","expires_in":61}"#), req, false, Utc::now()).is_ok());
    }
}
