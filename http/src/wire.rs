//! Wire DTOs for the marketplace feed.
//!
//! Every response wraps its payload as `{Data, error, status}`. The tenants
//! disagree on casing and field names in a few places (`Name` vs `CityName`,
//! `Id` vs `ID`, city records vs bare city-name strings); serde aliases and
//! one untagged enum absorb the divergence here so the rest of the crate
//! only ever sees the canonical `voa-booking` shapes.

use serde::{Deserialize, Serialize};
use voa_booking::{Airport, City, Company, Flight, FlightId, RouteEndpoint, Ticket, TicketId};

/// Standard response wrapper. A populated `error` is a failure regardless
/// of the HTTP status; the embedded status duplicates the HTTP one and is
/// ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(rename = "Data")]
    pub data: Option<T>,
    #[serde(default, alias = "Error")]
    pub error: Option<String>,
}

// ── Request bodies ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
    #[serde(rename = "Username")]
    pub username: &'a str,
    #[serde(rename = "Password")]
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FlightIdBody {
    #[serde(rename = "FlightId")]
    pub flight_id: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct FlightIdsBody {
    #[serde(rename = "FlightIds")]
    pub flight_ids: Vec<u64>,
}

// ── Response payloads ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    pub user: UserDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirportsData {
    #[serde(rename = "Airports")]
    pub airports: Vec<AirportDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirportDto {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "City")]
    pub city: CityDto,
}

impl AirportDto {
    pub(crate) fn into_airport(self) -> Airport {
        Airport::canonical(self.name, self.city.into_city())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CityDto {
    #[serde(rename = "Name", alias = "CityName")]
    pub name: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Latitude", default)]
    pub latitude: f64,
    #[serde(rename = "Longitude", default)]
    pub longitude: f64,
}

impl CityDto {
    pub(crate) fn into_city(self) -> City {
        City {
            name: self.name,
            state: self.state,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A city reference as the feed sends it: some endpoints carry the stored
/// city record, others just the city name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CityRef {
    Record(CityDto),
    Name(String),
}

impl CityRef {
    pub(crate) fn into_city(self) -> City {
        match self {
            Self::Record(city) => city.into_city(),
            Self::Name(name) => City {
                name,
                state: String::new(),
                latitude: 0.0,
                longitude: 0.0,
            },
        }
    }

    pub(crate) fn into_endpoint(self) -> RouteEndpoint {
        let city = self.into_city();
        RouteEndpoint {
            city: city.name,
            state: city.state,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PathsData {
    pub paths: Vec<FlightDto>,
}

/// A stored flight record as returned by the route search.
#[derive(Debug, Deserialize)]
pub(crate) struct FlightDto {
    #[serde(rename = "ID", alias = "Id")]
    pub id: u64,
    #[serde(rename = "Company", default)]
    pub company: Option<String>,
    #[serde(rename = "Price", default)]
    pub price: u64,
    #[serde(rename = "Seats", default)]
    pub seats: i64,
    #[serde(rename = "OriginAirport")]
    pub origin: AirportDto,
    #[serde(rename = "DestinationAirport")]
    pub destination: AirportDto,
}

impl FlightDto {
    pub(crate) fn into_flight(self) -> Flight {
        Flight {
            id: FlightId::new(self.id),
            company: company_or_fallback(self.company.as_deref()),
            price: self.price,
            seats: u32::try_from(self.seats).unwrap_or(0),
            origin: self.origin.into_airport(),
            destination: self.destination.into_airport(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlightsData {
    #[serde(rename = "Flights")]
    pub flights: Vec<HydratedFlightDto>,
}

/// Row of the flights-by-id feed. The rows come back in request order and
/// carry no identifier of their own; some tenants send only the seat count
/// and the endpoint city names.
#[derive(Debug, Deserialize)]
pub(crate) struct HydratedFlightDto {
    #[serde(rename = "Company", default)]
    pub company: Option<String>,
    #[serde(rename = "Price", default)]
    pub price: u64,
    #[serde(rename = "Seats", default)]
    pub seats: i64,
    #[serde(rename = "Src")]
    pub src: CityRef,
    #[serde(rename = "Dest")]
    pub dest: CityRef,
}

impl HydratedFlightDto {
    pub(crate) fn into_flight(self, id: FlightId) -> Flight {
        let origin = self.src.into_city();
        let destination = self.dest.into_city();
        Flight {
            id,
            company: company_or_fallback(self.company.as_deref()),
            price: self.price,
            seats: u32::try_from(self.seats).unwrap_or(0),
            origin: Airport::canonical(origin.name.clone(), origin),
            destination: Airport::canonical(destination.name.clone(), destination),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WishesData {
    #[serde(rename = "Wishes")]
    pub wishes: Vec<WishDto>,
}

/// Wishlist rows are full stored flight records; only the identifier
/// matters here, the catalog hydrates the rest on demand.
#[derive(Debug, Deserialize)]
pub(crate) struct WishDto {
    #[serde(rename = "ID", alias = "Id")]
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TicketsData {
    #[serde(rename = "Tickets")]
    pub tickets: Vec<TicketDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TicketDto {
    #[serde(rename = "Id", alias = "ID")]
    pub id: u64,
    #[serde(rename = "Company", default)]
    pub company: Option<String>,
    #[serde(rename = "Src")]
    pub src: CityRef,
    #[serde(rename = "Dest")]
    pub dest: CityRef,
}

impl TicketDto {
    pub(crate) fn into_ticket(self) -> Ticket {
        Ticket {
            id: TicketId::new(self.id),
            origin: self.src.into_endpoint(),
            destination: self.dest.into_endpoint(),
            company: company_or_fallback(self.company.as_deref()),
        }
    }
}

fn company_or_fallback(name: Option<&str>) -> Company {
    name.map_or_else(Company::fallback, Company::from_name)
}
