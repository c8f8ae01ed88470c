use std::fmt::Display;

use log::{debug, info};
use reqwest::{header, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::{
    config::{ClientId, Credentials},
    report::BeatmapLookup,
    schema::{Beatmap, BeatmapId, GameMode, Score, User, UserId},
};

const TOKEN_URL: &str = "https://osu.ppy.sh/oauth/token";
const API_URL: &str = "https://osu.ppy.sh/api/v2";
const BEST_SCORES_LIMIT: u32 = 100;

/// How a user is looked up: an all-digit query is an ID, anything else a username.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum UserQuery {
    Id(UserId),
    Username(String),
}

#[derive(Debug, thiserror::Error)]
#[error("\"{0}\" is not a valid user! Please provide a user ID or a username!")]
pub struct InvalidUserQuery(pub String);

impl UserQuery {
    pub fn parse(query: &str) -> Result<Self, InvalidUserQuery> {
        let query = query.trim();
        if query.is_empty() {
            return Err(InvalidUserQuery(query.to_owned()));
        }
        Ok(match query.parse::<u64>() {
            Ok(id) => Self::Id(id.into()),
            Err(_) => Self::Username(query.to_owned()),
        })
    }

    fn key(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Username(_) => "username",
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Username(name) => name.clone(),
        }
    }
}

impl Display for UserQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "ID {id}"),
            Self::Username(name) => write!(f, "username {name:?}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Please check that your authentication details are correct in the config!")]
    AuthenticationRejected,
    #[error("A valid user does not exist on osu! with the {0}")]
    UserNotFound(UserQuery),
    #[error("Nothing was found at {0}")]
    NotFound(Url),
    #[error("Unexpected error code: server returned {status} for {url}")]
    UnexpectedStatus { url: Url, status: StatusCode },
    #[error("The response from {url} could not be decoded: {source}")]
    Decode {
        url: Url,
        source: serde_json::Error,
    },
    #[error("An HTTP error occurred: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Serialize)]
struct TokenForm<'a> {
    client_id: ClientId,
    client_secret: &'a str,
    grant_type: &'static str,
    scope: &'static str,
}
impl<'a> TokenForm<'a> {
    fn new(credentials: &'a Credentials) -> Self {
        Self {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret.as_str(),
            grant_type: "client_credentials",
            scope: "public",
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A client authenticated against the osu! API with the client-credentials grant.
#[derive(Clone)]
pub struct OsuClient {
    client: reqwest::Client,
    access_token: String,
}

impl OsuClient {
    pub async fn login(credentials: &Credentials) -> Result<Self, ApiError> {
        info!("Logging into the osu! API.");
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .connection_verbose(true)
            .build()?;
        let response = client
            .post(TOKEN_URL)
            .form(&TokenForm::new(credentials))
            .send()
            .await?;
        match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                return Err(ApiError::AuthenticationRejected)
            }
            status if !status.is_success() => {
                return Err(ApiError::UnexpectedStatus {
                    url: response.url().clone(),
                    status,
                })
            }
            _ => {}
        }
        let token: TokenResponse = response.json().await?;
        info!("Successfully logged in.");
        Ok(Self {
            client,
            access_token: token.access_token,
        })
    }

    pub async fn user(&self, query: &UserQuery, mode: GameMode) -> Result<User, ApiError> {
        info!("Finding the user with the {query} on osu!.");
        let url = user_url(query, mode)?;
        match self.get(url).await {
            Err(ApiError::NotFound(_)) => Err(ApiError::UserNotFound(query.clone())),
            res => res,
        }
    }

    pub async fn best_scores(&self, user_id: UserId, mode: GameMode) -> Result<Vec<Score>, ApiError> {
        info!("Fetching the top plays of user {user_id}.");
        let url = best_scores_url(user_id, mode)?;
        self.get(url).await
    }

    pub async fn fetch_beatmap(&self, id: BeatmapId) -> Result<Beatmap, ApiError> {
        self.get(Url::parse(&format!("{API_URL}/beatmaps/{id}"))?)
            .await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        decode_response(url, status, &body)
    }
}

impl BeatmapLookup for OsuClient {
    async fn beatmap(&self, id: BeatmapId) -> anyhow::Result<Beatmap> {
        Ok(self.fetch_beatmap(id).await?)
    }
}

fn user_url(query: &UserQuery, mode: GameMode) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        &format!(
            "{API_URL}/users/{}/{mode}",
            urlencoding::encode(&query.value())
        ),
        [("key", query.key())],
    )
}

fn best_scores_url(user_id: UserId, mode: GameMode) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        &format!("{API_URL}/users/{user_id}/scores/best"),
        [
            ("mode", mode.to_string()),
            ("limit", BEST_SCORES_LIMIT.to_string()),
        ],
    )
}

/// The API answers some failures with a success status and an `error` or
/// `authentication` body, so both the status and the body are inspected.
fn decode_response<T: DeserializeOwned>(
    url: Url,
    status: StatusCode,
    body: &str,
) -> Result<T, ApiError> {
    match status {
        StatusCode::UNAUTHORIZED => return Err(ApiError::AuthenticationRejected),
        StatusCode::NOT_FOUND => return Err(ApiError::NotFound(url)),
        status if !status.is_success() => return Err(ApiError::UnexpectedStatus { url, status }),
        _ => {}
    }
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(source) => return Err(ApiError::Decode { url, source }),
    };
    if value.get("authentication").is_some() {
        return Err(ApiError::AuthenticationRejected);
    }
    if value.get("error").is_some() {
        return Err(ApiError::NotFound(url));
    }
    serde_json::from_value(value).map_err(|source| ApiError::Decode { url, source })
}
