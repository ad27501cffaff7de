// API client module: contains a small blocking HTTP client that talks to
// the Revolori SSO server. It is intentionally small and synchronous; the
// tool only ever issues one request at a time.

use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Base URL used when neither the CLI flag nor `REVOLORI_ADDRESS` is set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5429";

/// Password shared by both service credentials on a test instance.
const SERVICE_PASSWORD: &str = "password";

/// Error message Revolori returns when an account already exists.
const DUPLICATE_USER_MESSAGE: &str = "user with given ID already exists";

/// Basic-auth credential attached to service requests. Revolori accepts
/// `admin` for privileged routes and `user` for the rest; callers never
/// pick one directly, the client falls back from admin to user on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ServiceCredential {
    Admin,
    User,
}

impl ServiceCredential {
    fn username(self) -> &'static str {
        match self {
            ServiceCredential::Admin => "admin",
            ServiceCredential::User => "user",
        }
    }
}

/// Simple API client that holds a reqwest blocking client and the base URL
/// of the Revolori server.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// Data shape used to create an account. Fields mirror the backend
/// expectations (Revolori's `/user` route).
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl CreateUserRequest {
    /// Build a request from raw input. All fields are trimmed; an empty
    /// first or last name falls back to a placeholder so the backend never
    /// sees a blank name field.
    pub fn new(email: &str, password: &str, first_name: &str, last_name: &str) -> Self {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        CreateUserRequest {
            email: email.trim().to_string(),
            password: password.trim().to_string(),
            first_name: if first_name.is_empty() { "First" } else { first_name }.to_string(),
            last_name: if last_name.is_empty() { "Last" } else { last_name }.to_string(),
        }
    }
}

/// Login request payload for Revolori's `/login` route.
#[derive(Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: &str, password: &str) -> Self {
        LoginRequest {
            email: email.trim().to_string(),
            password: password.trim().to_string(),
        }
    }
}

/// Error body Revolori wraps failures in: `{"error":{"message":"..."}}`.
#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Deserialize, Debug)]
struct ErrorMessage {
    message: String,
}

/// Outcome of a service POST after the credential fallback has run. The
/// token cookie is captured before the body is consumed so both are
/// available to callers.
struct ServiceResponse {
    status: StatusCode,
    body: String,
    token_cookie: Option<String>,
    ok: bool,
}

impl ApiClient {
    /// Build a client for the given base URL. A trailing slash is stripped
    /// so path concatenation stays predictable.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create an account by POSTing to `/user`. A duplicate-user conflict
    /// counts as success so a seeding run can be repeated.
    pub fn create_user(&self, req: &CreateUserRequest) -> Result<()> {
        let response = self.post_json("/user", req)?;
        if response.ok {
            return Ok(());
        }
        if response.status == StatusCode::CONFLICT && is_duplicate_user(&response.body) {
            debug!("user {} already exists, treating as success", req.email);
            return Ok(());
        }
        anyhow::bail!("Create user failed: {} - {}", response.status, response.body);
    }

    /// Log an account in via `/login` and return the token Revolori sets
    /// in the `token` cookie.
    pub fn login(&self, req: &LoginRequest) -> Result<String> {
        let response = self.post_json("/login", req)?;
        if !response.ok {
            anyhow::bail!("Login failed: {} - {}", response.status, response.body);
        }
        let token = response
            .token_cookie
            .context("No token cookie in login response")?;
        if token.is_empty() {
            anyhow::bail!("Login response carried an empty token");
        }
        Ok(token)
    }

    /// POST a JSON body with basic auth. The first attempt uses the admin
    /// credential; if the server rejects it the request is retried exactly
    /// once as the plain service user, and that second response is final.
    fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<ServiceResponse> {
        let url = format!("{}{}", self.base_url, path);
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "POST {} body: {}",
                url,
                serde_json::to_string(body).unwrap_or_else(|_| "<unencodable>".into())
            );
        }

        let response = self.send(&url, body, ServiceCredential::Admin)?;
        if response.ok {
            return Ok(response);
        }

        debug!(
            "admin credential rejected ({}), retrying as user",
            response.status
        );
        self.send(&url, body, ServiceCredential::User)
    }

    fn send<T: Serialize>(
        &self,
        url: &str,
        body: &T,
        credential: ServiceCredential,
    ) -> Result<ServiceResponse> {
        let res = self
            .client
            .post(url)
            .basic_auth(credential.username(), Some(SERVICE_PASSWORD))
            .json(body)
            .send()
            .with_context(|| format!("Failed to POST {}", url))?;

        let status = res.status();
        // Grab the cookie before `text()` consumes the response.
        let token_cookie = res
            .cookies()
            .find(|cookie| cookie.name() == "token")
            .map(|cookie| cookie.value().to_string());
        let body = res.text().unwrap_or_else(|_| "".into());

        Ok(ServiceResponse {
            status,
            body,
            token_cookie,
            // The backend only ever answers 200 or 201 on success.
            ok: matches!(status, StatusCode::OK | StatusCode::CREATED),
        })
    }
}

fn is_duplicate_user(body: &str) -> bool {
    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error.message == DUPLICATE_USER_MESSAGE)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const ADMIN_AUTH: &str = "Basic YWRtaW46cGFzc3dvcmQ=";
    const USER_AUTH: &str = "Basic dXNlcjpwYXNzd29yZA==";

    fn client_for(server: &Server) -> ApiClient {
        ApiClient::new(&server.url()).unwrap()
    }

    #[test]
    fn create_user_posts_expected_body_with_admin_auth() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/user")
            .match_header("authorization", ADMIN_AUTH)
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "email": "user0@example.com",
                "password": "password",
                "firstName": "First 0",
                "lastName": "Last 0",
            })))
            .with_status(201)
            .create();

        let api = client_for(&server);
        let req = CreateUserRequest::new("user0@example.com", "password", "First 0", "Last 0");
        api.create_user(&req).unwrap();

        mock.assert();
    }

    #[test]
    fn rejected_admin_credential_falls_back_to_user() {
        let mut server = Server::new();
        let admin_mock = server
            .mock("POST", "/user")
            .match_header("authorization", ADMIN_AUTH)
            .with_status(401)
            .expect(1)
            .create();
        let user_mock = server
            .mock("POST", "/user")
            .match_header("authorization", USER_AUTH)
            .with_status(201)
            .expect(1)
            .create();

        let api = client_for(&server);
        let req = CreateUserRequest::new("user1@example.com", "password", "First 1", "Last 1");
        api.create_user(&req).unwrap();

        admin_mock.assert();
        user_mock.assert();
    }

    #[test]
    fn duplicate_user_conflict_counts_as_success() {
        let mut server = Server::new();
        // Both the admin attempt and the user fallback see the conflict.
        let mock = server
            .mock("POST", "/user")
            .with_status(409)
            .with_body(r#"{"error":{"message":"user with given ID already exists"}}"#)
            .expect(2)
            .create();

        let api = client_for(&server);
        let req = CreateUserRequest::new("user0@example.com", "password", "First 0", "Last 0");
        api.create_user(&req).unwrap();

        mock.assert();
    }

    #[test]
    fn other_conflict_is_reported_as_failure() {
        let mut server = Server::new();
        server
            .mock("POST", "/user")
            .with_status(409)
            .with_body(r#"{"error":{"message":"email is malformed"}}"#)
            .expect(2)
            .create();

        let api = client_for(&server);
        let req = CreateUserRequest::new("user0@example.com", "password", "First 0", "Last 0");
        let err = api.create_user(&req).unwrap_err();
        assert!(err.to_string().contains("409"));
    }

    #[test]
    fn login_returns_token_cookie() {
        let mut server = Server::new();
        server
            .mock("POST", "/login")
            .match_body(Matcher::Json(serde_json::json!({
                "email": "user0@example.com",
                "password": "password",
            })))
            .with_status(200)
            .with_header("set-cookie", "token=abc123; Path=/")
            .create();

        let api = client_for(&server);
        let token = api
            .login(&LoginRequest::new("user0@example.com", "password"))
            .unwrap();
        assert_eq!(token, "abc123");
    }

    #[test]
    fn login_without_token_cookie_fails() {
        let mut server = Server::new();
        server.mock("POST", "/login").with_status(200).create();

        let api = client_for(&server);
        let err = api
            .login(&LoginRequest::new("user0@example.com", "password"))
            .unwrap_err();
        assert!(err.to_string().contains("token cookie"));
    }

    #[test]
    fn login_with_empty_token_cookie_fails() {
        let mut server = Server::new();
        server
            .mock("POST", "/login")
            .with_status(200)
            .with_header("set-cookie", "token=; Path=/")
            .create();

        let api = client_for(&server);
        assert!(api
            .login(&LoginRequest::new("user0@example.com", "password"))
            .is_err());
    }

    #[test]
    fn create_user_request_trims_and_defaults_names() {
        let req = CreateUserRequest::new("  a@b.example  ", " password ", "   ", "");
        assert_eq!(req.email, "a@b.example");
        assert_eq!(req.password, "password");
        assert_eq!(req.first_name, "First");
        assert_eq!(req.last_name, "Last");
    }
}
