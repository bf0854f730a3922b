//! Postcode lookup against the OS Places API.

use std::time::Duration;

use lpa_domain::actor::Address;
use lpa_domain::ports::BoxFuture;
use lpa_domain::ports::address::{AddressLookup, LookupError};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::config::AppConfig;

#[derive(Debug, Default, Deserialize)]
struct PostcodeResponse {
    #[serde(default)]
    results: Vec<PostcodeResult>,
}

#[derive(Debug, Deserialize)]
struct PostcodeResult {
    #[serde(rename = "DPA")]
    dpa: AddressDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
struct AddressDetails {
    building_name: String,
    building_number: String,
    thoroughfare_name: String,
    dependent_locality: String,
    post_town: String,
    postcode: String,
}

impl AddressDetails {
    fn into_address(self) -> Address {
        let street = join_non_empty(&[
            self.building_number.as_str(),
            self.thoroughfare_name.as_str(),
        ]);
        if self.building_name.is_empty() {
            Address {
                line1: street,
                line2: self.dependent_locality,
                line3: String::new(),
                town_or_city: self.post_town,
                postcode: self.postcode,
            }
        } else {
            Address {
                line1: self.building_name,
                line2: street,
                line3: self.dependent_locality,
                town_or_city: self.post_town,
                postcode: self.postcode,
            }
        }
    }
}

fn join_non_empty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_postcode(postcode: &str) -> String {
    postcode.chars().filter(|c| !c.is_whitespace()).collect()
}

#[derive(Debug, Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl PlacesClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&format!("{}/postcode", base_url.trim_end_matches('/')))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::new(
            &config.os_places_base_url,
            config.os_places_api_key.trim(),
            Duration::from_millis(config.address_lookup_timeout_ms.max(1)),
        )
    }

    async fn fetch(&self, postcode: &str) -> Result<Vec<Address>, LookupError> {
        let postcode = normalize_postcode(postcode);
        let response = self
            .http
            .get(self.endpoint.clone())
            .header("accept", "application/json")
            .query(&[("postcode", postcode.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|err| LookupError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<PostcodeResponse>()
                .await
                .map_err(|err| LookupError::InvalidResponse(err.to_string()))?;
            return Ok(body
                .results
                .into_iter()
                .map(|result| result.dpa.into_address())
                .collect());
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::BAD_REQUEST => Err(LookupError::BadRequest(message)),
            _ => Err(LookupError::Unavailable(format!(
                "status {}: {}",
                status.as_u16(),
                message
            ))),
        }
    }
}

impl AddressLookup for PlacesClient {
    fn lookup_postcode(&self, postcode: &str) -> BoxFuture<'_, Result<Vec<Address>, LookupError>> {
        let postcode = postcode.to_string();
        Box::pin(async move {
            let result = self.fetch(&postcode).await;
            match &result {
                Ok(addresses) => tracing::debug!(found = addresses.len(), "postcode looked up"),
                Err(err) => tracing::warn!(error = %err, "postcode lookup failed"),
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::Router;
    use axum::extract::Query;
    use axum::http::StatusCode as HttpStatus;
    use axum::routing::get;

    use super::*;

    const MULTIPLE_ADDRESSES: &str = r#"{
        "header": {"totalresults": 2},
        "results": [
            {"DPA": {
                "ADDRESS": "123, MELTON ROAD, BIRMINGHAM, B14 7ET",
                "BUILDING_NUMBER": "123",
                "THOROUGHFARE_NAME": "MELTON ROAD",
                "POST_TOWN": "BIRMINGHAM",
                "POSTCODE": "B14 7ET"
            }},
            {"DPA": {
                "ADDRESS": "87A, MELTON ROAD, KINGS HEATH, BIRMINGHAM, B14 7ET",
                "BUILDING_NAME": "87A",
                "THOROUGHFARE_NAME": "MELTON ROAD",
                "DEPENDENT_LOCALITY": "KINGS HEATH",
                "POST_TOWN": "BIRMINGHAM",
                "POSTCODE": "B14 7ET"
            }}
        ]
    }"#;

    async fn stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}")
    }

    fn client(base_url: &str) -> PlacesClient {
        PlacesClient::new(base_url, "fake-api-key", Duration::from_secs(5)).expect("client")
    }

    fn details(name: &str, number: &str, locality: &str) -> AddressDetails {
        AddressDetails {
            building_name: name.to_string(),
            building_number: number.to_string(),
            thoroughfare_name: "MELTON ROAD".to_string(),
            dependent_locality: locality.to_string(),
            post_town: "BIRMINGHAM".to_string(),
            postcode: "B14 7ET".to_string(),
        }
    }

    fn lines(address: &Address) -> [&str; 3] {
        [
            address.line1.as_str(),
            address.line2.as_str(),
            address.line3.as_str(),
        ]
    }

    #[test]
    fn address_lines_follow_building_name_and_locality() {
        let cases = [
            (details("", "1", ""), ["1 MELTON ROAD", "", ""]),
            (details("1A", "", ""), ["1A", "MELTON ROAD", ""]),
            (details("MELTON HOUSE", "2", ""), ["MELTON HOUSE", "2 MELTON ROAD", ""]),
            (details("", "3", "KINGS HEATH"), ["3 MELTON ROAD", "KINGS HEATH", ""]),
            (
                details("MELTON HOUSE", "5", "KINGS HEATH"),
                ["MELTON HOUSE", "5 MELTON ROAD", "KINGS HEATH"],
            ),
        ];

        for (details, expected) in cases {
            let address = details.into_address();
            assert_eq!(lines(&address), expected);
            assert_eq!(address.town_or_city, "BIRMINGHAM");
            assert_eq!(address.postcode, "B14 7ET");
        }
    }

    #[tokio::test]
    async fn lookup_sends_compact_postcode_and_key() {
        let router = Router::new().route(
            "/postcode",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                let expected = query.get("postcode").map(String::as_str) == Some("B147ET")
                    && query.get("key").map(String::as_str) == Some("fake-api-key");
                if expected {
                    (HttpStatus::OK, MULTIPLE_ADDRESSES)
                } else {
                    (HttpStatus::UNAUTHORIZED, "unexpected query")
                }
            }),
        );
        let base_url = stub(router).await;

        let addresses = client(&base_url)
            .lookup_postcode(" B14 7ET ")
            .await
            .expect("lookup");

        assert_eq!(addresses.len(), 2);
        assert_eq!(lines(&addresses[0]), ["123 MELTON ROAD", "", ""]);
        assert_eq!(lines(&addresses[1]), ["87A", "MELTON ROAD", "KINGS HEATH"]);
    }

    #[tokio::test]
    async fn no_results_is_an_empty_list() {
        let router = Router::new().route(
            "/postcode",
            get(|| async { r#"{"header": {"totalresults": 0}}"# }),
        );
        let base_url = stub(router).await;

        let addresses = client(&base_url)
            .lookup_postcode("XXXXXX")
            .await
            .expect("lookup");

        assert!(addresses.is_empty());
    }

    const REJECTED_POSTCODE: &str = "Requested postcode must contain a minimum of the sector \
        plus 1 digit of the district e.g. SO1. Requested postcode was X";

    #[tokio::test]
    async fn rejected_postcode_is_a_bad_request() {
        let router = Router::new().route(
            "/postcode",
            get(|| async { (HttpStatus::BAD_REQUEST, REJECTED_POSTCODE) }),
        );
        let base_url = stub(router).await;

        let result = client(&base_url).lookup_postcode("X").await;

        assert!(matches!(result, Err(LookupError::BadRequest(_))));
    }

    #[tokio::test]
    async fn malformed_body_is_an_invalid_response() {
        let router = Router::new().route("/postcode", get(|| async { "not JSON" }));
        let base_url = stub(router).await;

        let result = client(&base_url).lookup_postcode("B14 7ET").await;

        assert!(matches!(result, Err(LookupError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn server_errors_are_unavailable() {
        let router = Router::new().route(
            "/postcode",
            get(|| async { (HttpStatus::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base_url = stub(router).await;

        let result = client(&base_url).lookup_postcode("B14 7ET").await;

        assert!(matches!(result, Err(LookupError::Unavailable(_))));
    }
}
