use super::{decode_each, id_from_value, text_from_value};
use crate::adapters::http::send_json;
use crate::domain::model::{CourseQuery, CourseRecord, Difficulty, Provider};
use crate::domain::ports::CourseProvider;
use crate::utils::error::Result;
use crate::utils::text::contains_ignore_case;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_ENDPOINT: &str = "https://openstax.org/api/books";

const OPENSTAX_RATING: f64 = 4.3;

/// The books endpoint has answered with both a bare list and a paged object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BooksBody {
    List(Vec<Value>),
    Paged { items: Vec<Value> },
}

#[derive(Debug, Deserialize)]
struct OpenStaxBook {
    id: Option<Value>,
    title: Option<Value>,
    description: Option<Value>,
    webview_url: Option<Value>,
}

/// OpenStax textbooks. The API has no search, so matching happens locally on titles.
pub struct OpenStaxProvider {
    client: Client,
    endpoint: String,
}

impl OpenStaxProvider {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CourseProvider for OpenStaxProvider {
    fn provider(&self) -> Provider {
        Provider::OpenStax
    }

    async fn fetch(&self, query: &CourseQuery) -> Result<Vec<CourseRecord>> {
        let body: BooksBody = send_json(Provider::OpenStax.as_str(), self.client.get(&self.endpoint)).await?;
        let books: Vec<OpenStaxBook> = match body {
            BooksBody::List(items) | BooksBody::Paged { items } => decode_each(Provider::OpenStax, items),
        };

        let needle = query.query.trim();
        Ok(books
            .into_iter()
            .filter_map(|book| {
                let title = text_from_value(book.title.as_ref())?;
                if !needle.is_empty() && !contains_ignore_case(&title, needle) {
                    return None;
                }
                Some(CourseRecord {
                    id: id_from_value(book.id.as_ref())?,
                    title,
                    description: text_from_value(book.description.as_ref()).unwrap_or_default(),
                    provider: Provider::OpenStax,
                    language: "en".to_string(),
                    difficulty: Difficulty::Beginner,
                    duration: "Self-paced".to_string(),
                    rating: OPENSTAX_RATING,
                    url: text_from_value(book.webview_url.as_ref()),
                    trending: None,
                })
            })
            .collect())
    }
}
