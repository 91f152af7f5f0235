use super::{decode_each, id_from_value, rating_from_value, text_from_value};
use crate::adapters::http::send_json;
use crate::domain::model::{normalize_rating, CourseQuery, CourseRecord, Difficulty, Provider};
use crate::domain::ports::CourseProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_ENDPOINT: &str = "https://api.edx.org/catalog/v1/catalogs/edx/courses/";

#[derive(Debug, Deserialize)]
struct EdxPage {
    #[serde(default)]
    results: Vec<Value>,
}

/// Every field is read leniently; only a missing id or title drops the record.
#[derive(Debug, Deserialize)]
struct EdxCourse {
    key: Option<Value>,
    name: Option<Value>,
    short_description: Option<Value>,
    language: Option<Value>,
    level: Option<Value>,
    effort: Option<Value>,
    rating: Option<Value>,
    marketing_url: Option<Value>,
}

impl EdxCourse {
    fn into_record(self) -> Option<CourseRecord> {
        let id = id_from_value(self.key.as_ref())?;
        let title = text_from_value(self.name.as_ref())?;
        let effort = text_from_value(self.effort.as_ref()).unwrap_or_else(|| "Unknown".to_string());

        Some(CourseRecord {
            id,
            title,
            description: text_from_value(self.short_description.as_ref()).unwrap_or_default(),
            provider: Provider::Edx,
            language: text_from_value(self.language.as_ref()).unwrap_or_else(|| "en".to_string()),
            difficulty: text_from_value(self.level.as_ref())
                .map(|level| Difficulty::normalize(&level))
                .unwrap_or(Difficulty::Beginner),
            duration: format!("{} hours/week", effort),
            rating: normalize_rating(rating_from_value(self.rating.as_ref())),
            url: text_from_value(self.marketing_url.as_ref()),
            trending: None,
        })
    }
}

/// edX course catalog search.
pub struct EdxProvider {
    client: Client,
    endpoint: String,
    page_size: u32,
}

impl EdxProvider {
    pub fn new(client: Client, endpoint: impl Into<String>, page_size: u32) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            page_size,
        }
    }
}

#[async_trait]
impl CourseProvider for EdxProvider {
    fn provider(&self) -> Provider {
        Provider::Edx
    }

    async fn fetch(&self, query: &CourseQuery) -> Result<Vec<CourseRecord>> {
        tracing::debug!("Searching edX for '{}' ({})", query.query, query.language);

        let page_size = self.page_size.to_string();
        let request = self.client.get(&self.endpoint).query(&[
            ("search", query.query.as_str()),
            ("language", query.language.as_str()),
            ("page_size", page_size.as_str()),
        ]);
        let page: EdxPage = send_json(Provider::Edx.as_str(), request).await?;

        let total = page.results.len();
        let courses: Vec<CourseRecord> = decode_each::<EdxCourse>(Provider::Edx, page.results)
            .into_iter()
            .filter_map(EdxCourse::into_record)
            .collect();

        if courses.len() < total {
            tracing::debug!("edX: dropped {} results without id or title", total - courses.len());
        }
        Ok(courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::build_client;
    use crate::domain::model::DifficultyFilter;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn provider(server: &MockServer) -> EdxProvider {
        let client = build_client(Duration::from_secs(5)).unwrap();
        EdxProvider::new(client, server.url("/courses/"), 20)
    }

    #[tokio::test]
    async fn test_fetch_normalizes_results() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/courses/")
                .query_param("search", "python")
                .query_param("language", "en")
                .query_param("page_size", "20");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "results": [
                        {
                            "key": "HarvardX+CS50P",
                            "name": "CS50's Introduction to Programming with Python",
                            "short_description": "Learn Python",
                            "language": "en",
                            "level": "Introductory",
                            "effort": "3-9",
                            "rating": 4.9,
                            "marketing_url": "https://www.edx.org/cs50p"
                        },
                        {
                            "key": "MITx+6.86x",
                            "name": "Machine Learning with Python",
                            "level": "Advanced",
                            "effort": 12
                        },
                        {"key": null, "name": "No id"},
                        {"key": "X+1"}
                    ]
                }));
        });

        let query = CourseQuery::new("python", "en", DifficultyFilter::All);
        let courses = provider(&server).fetch(&query).await.unwrap();

        api_mock.assert();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].id, "HarvardX+CS50P");
        assert_eq!(courses[0].difficulty, Difficulty::Beginner);
        assert_eq!(courses[0].duration, "3-9 hours/week");
        assert_eq!(courses[0].url.as_deref(), Some("https://www.edx.org/cs50p"));
        assert_eq!(courses[1].difficulty, Difficulty::Advanced);
        assert_eq!(courses[1].duration, "12 hours/week");
        assert_eq!(courses[1].rating, 0.0);
        assert!(courses[1].url.is_none());
    }

    #[tokio::test]
    async fn test_missing_level_defaults_to_beginner() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/courses/");
            then.status(200)
                .json_body(serde_json::json!({"results": [{"key": "A+1", "name": "Anything"}]}));
        });

        let query = CourseQuery::new("anything", "en", DifficultyFilter::All);
        let courses = provider(&server).fetch(&query).await.unwrap();

        assert_eq!(courses[0].difficulty, Difficulty::Beginner);
        assert_eq!(courses[0].duration, "Unknown hours/week");
    }

    #[tokio::test]
    async fn test_one_odd_record_does_not_sink_the_page() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/courses/");
            then.status(200).json_body(serde_json::json!({
                "results": [
                    {"key": "A+1", "name": "Numeric rating", "rating": 4.2},
                    {"key": "A+2", "name": "String rating", "rating": "4.5"},
                    {"key": "A+3", "name": "Garbage rating", "rating": {"avg": 3}, "level": 7},
                    "not a course"
                ]
            }));
        });

        let query = CourseQuery::new("anything", "en", DifficultyFilter::All);
        let courses = provider(&server).search(&query).await;

        let ratings: Vec<(&str, f64)> = courses.iter().map(|c| (c.id.as_str(), c.rating)).collect();
        assert_eq!(ratings, vec![("A+1", 4.2), ("A+2", 4.5), ("A+3", 0.0)]);
        assert_eq!(courses[2].difficulty, Difficulty::Unknown);
    }

    #[tokio::test]
    async fn test_search_swallows_server_errors() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/courses/");
            then.status(500);
        });

        let query = CourseQuery::new("python", "en", DifficultyFilter::All);
        let courses = provider(&server).search(&query).await;

        api_mock.assert();
        assert!(courses.is_empty());
    }
}
