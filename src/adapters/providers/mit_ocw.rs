use super::{decode_each, id_from_value, text_from_value};
use crate::adapters::http::send_json;
use crate::domain::model::{CourseQuery, CourseRecord, Difficulty, Provider};
use crate::domain::ports::CourseProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_ENDPOINT: &str = "https://ocw.mit.edu/api/v1/search/";

// OCW 不提供等級與評分，統一給固定值
const OCW_RATING: f64 = 4.5;

#[derive(Debug, Deserialize)]
struct OcwPage {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct OcwCourse {
    id: Option<Value>,
    title: Option<Value>,
    description: Option<Value>,
    url: Option<Value>,
}

/// MIT OpenCourseWare search.
pub struct MitOcwProvider {
    client: Client,
    endpoint: String,
}

impl MitOcwProvider {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CourseProvider for MitOcwProvider {
    fn provider(&self) -> Provider {
        Provider::MitOcw
    }

    async fn fetch(&self, query: &CourseQuery) -> Result<Vec<CourseRecord>> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.query.as_str()), ("type", "course")]);
        let page: OcwPage = send_json(Provider::MitOcw.as_str(), request).await?;

        Ok(decode_each::<OcwCourse>(Provider::MitOcw, page.results)
            .into_iter()
            .filter_map(|course| {
                Some(CourseRecord {
                    id: id_from_value(course.id.as_ref())?,
                    title: text_from_value(course.title.as_ref())?,
                    description: text_from_value(course.description.as_ref()).unwrap_or_default(),
                    provider: Provider::MitOcw,
                    language: "en".to_string(),
                    difficulty: Difficulty::Intermediate,
                    duration: "Self-paced".to_string(),
                    rating: OCW_RATING,
                    url: text_from_value(course.url.as_ref()),
                    trending: None,
                })
            })
            .collect())
    }
}
