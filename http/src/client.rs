//! `reqwest` implementation of the booking API.

use crate::token::{InMemoryTokenStore, TokenStore};
use crate::wire::{
    AirportsData, Envelope, FlightIdBody, FlightIdsBody, FlightsData, LoginBody, LoginData,
    PathsData, TicketsData, UserData, WishesData,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use voa_booking::{
    Airport, ApiError, ApiFuture, AuthToken, BookingApi, Flight, FlightId, Ticket, TicketId,
    UserProfile,
};

/// HTTP client for one marketplace tenant.
///
/// Attaches the session credential from its [`TokenStore`] to every call
/// except login, unwraps the `{Data, error, status}` response envelope, and
/// classifies failures into [`ApiError`] so the domain never sees raw
/// statuses or server strings.
#[derive(Clone)]
pub struct HttpBookingApi {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for HttpBookingApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBookingApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpBookingApi {
    /// Creates a client against `base_url` with a process-local token store.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_token_store(base_url, Arc::new(InMemoryTokenStore::new()))
    }

    /// Creates a client with an externally owned token store.
    #[must_use]
    pub fn with_token_store(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// The credential is sent back verbatim, not as a `Bearer` scheme.
    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.token() {
            Some(token) => request.header("Authorization", token.as_str()),
            None => request,
        }
    }

    async fn request_envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(ApiError::transport(format!("malformed response body: {e}")));
            }
            Err(_) => return Err(classify_status(status, body.trim())),
        };

        if let Some(message) = envelope.error.as_deref().filter(|m| !m.is_empty()) {
            tracing::debug!(%status, message, "server reported failure");
            return Err(classify_message(message, status));
        }
        if !status.is_success() {
            return Err(classify_status(status, body.trim()));
        }
        Ok(envelope)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.request_envelope::<T>(request)
            .await?
            .data
            .ok_or_else(|| ApiError::transport("response envelope carried no payload"))
    }

    /// Mutation acknowledgements carry only a human-readable message, if
    /// anything; success is the absence of a classified failure.
    async fn acknowledge(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.request_envelope::<serde_json::Value>(request)
            .await
            .map(|_| ())
    }
}

/// Known server phrasings take precedence over the HTTP status; one tenant
/// reports auth failures with the status left unset.
fn classify_message(message: &str, status: StatusCode) -> ApiError {
    match message {
        "client not found" | "invalid credentials" | "not authorized" => ApiError::auth(message),
        "more than one user logged" | "not available seats" => ApiError::conflict(message),
        "not valid city name" => ApiError::validation(message),
        m if m.starts_with("some flight doesn't exist") => ApiError::validation(message),
        m if m.ends_with("not found") => ApiError::not_found(message),
        _ => classify_status(status, message),
    }
}

fn classify_status(status: StatusCode, message: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::auth(message),
        StatusCode::NOT_FOUND => ApiError::not_found(message),
        StatusCode::NOT_ACCEPTABLE | StatusCode::CONFLICT => ApiError::conflict(message),
        status => ApiError::transport(format!("status {status}: {message}")),
    }
}

impl BookingApi for HttpBookingApi {
    fn login(&self, username: String, password: String) -> ApiFuture<'_, AuthToken> {
        Box::pin(async move {
            let data: LoginData = self
                .fetch(self.client.post(self.url("login")).json(&LoginBody {
                    username: &username,
                    password: &password,
                }))
                .await?;
            let token = AuthToken::new(data.token);
            self.tokens.store(token.clone());
            Ok(token)
        })
    }

    fn logout(&self) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let result = self
                .acknowledge(self.authed(self.client.get(self.url("logout"))))
                .await;
            // The local credential is gone either way.
            self.tokens.clear();
            result
        })
    }

    fn current_user(&self) -> ApiFuture<'_, UserProfile> {
        Box::pin(async move {
            let data: UserData = self
                .fetch(self.authed(self.client.get(self.url("user"))))
                .await?;
            Ok(UserProfile {
                name: data.user.name,
            })
        })
    }

    fn airports(&self) -> ApiFuture<'_, Vec<Airport>> {
        Box::pin(async move {
            let data: AirportsData = self
                .fetch(self.authed(self.client.get(self.url("airports"))))
                .await?;
            Ok(data
                .airports
                .into_iter()
                .map(crate::wire::AirportDto::into_airport)
                .collect())
        })
    }

    fn search_routes(&self, origin: String, destination: String) -> ApiFuture<'_, Vec<Flight>> {
        Box::pin(async move {
            let request = self
                .client
                .get(self.url("route"))
                .query(&[("src", origin.as_str()), ("dest", destination.as_str())]);
            let data: PathsData = self.fetch(self.authed(request)).await?;
            Ok(data
                .paths
                .into_iter()
                .map(crate::wire::FlightDto::into_flight)
                .collect())
        })
    }

    fn flights_by_id(&self, ids: Vec<FlightId>) -> ApiFuture<'_, Vec<Flight>> {
        Box::pin(async move {
            let body = FlightIdsBody {
                flight_ids: ids.iter().map(|id| id.value()).collect(),
            };
            let data: FlightsData = self
                .fetch(self.authed(self.client.post(self.url("flights")).json(&body)))
                .await?;
            // Rows carry no identifier; they come back in request order.
            if data.flights.len() != ids.len() {
                return Err(ApiError::transport(format!(
                    "requested {} flights, feed returned {}",
                    ids.len(),
                    data.flights.len()
                )));
            }
            Ok(ids
                .into_iter()
                .zip(data.flights)
                .map(|(id, row)| row.into_flight(id))
                .collect())
        })
    }

    fn wishlist(&self) -> ApiFuture<'_, Vec<FlightId>> {
        Box::pin(async move {
            let data: WishesData = self
                .fetch(self.authed(self.client.get(self.url("wishlist"))))
                .await?;
            Ok(data
                .wishes
                .into_iter()
                .map(|wish| FlightId::new(wish.id))
                .collect())
        })
    }

    fn add_to_wishlist(&self, flight_id: FlightId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let body = FlightIdBody {
                flight_id: flight_id.value(),
            };
            self.acknowledge(self.authed(self.client.post(self.url("wishlist")).json(&body)))
                .await
        })
    }

    fn remove_from_wishlist(&self, flight_id: FlightId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let request = self
                .client
                .delete(self.url("wishlist"))
                .query(&[("id", flight_id.value())]);
            self.acknowledge(self.authed(request)).await
        })
    }

    fn buy_ticket(&self, flight_id: FlightId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let body = FlightIdBody {
                flight_id: flight_id.value(),
            };
            self.acknowledge(self.authed(self.client.post(self.url("ticket")).json(&body)))
                .await
        })
    }

    fn tickets(&self) -> ApiFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            let data: TicketsData = self
                .fetch(self.authed(self.client.get(self.url("tickets"))))
                .await?;
            Ok(data
                .tickets
                .into_iter()
                .map(crate::wire::TicketDto::into_ticket)
                .collect())
        })
    }

    fn cancel_ticket(&self, ticket_id: TicketId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let request = self
                .client
                .delete(self.url("ticket"))
                .query(&[("id", ticket_id.value())]);
            self.acknowledge(self.authed(request)).await
        })
    }
}
