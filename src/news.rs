
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;


#[derive(Deserialize, Debug)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize, Debug)]
struct Article {
    title: Option<String>,
}

// error bodies carry a human readable message next to "status": "error"
#[derive(Deserialize, Debug)]
struct ErrorResponse {
    message: Option<String>,
}

pub struct NewsClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl NewsClient {

    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> NewsClient {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            endpoint: endpoint.to_owned(),
            api_key: api_key.to_owned()
        }
    }

    /// Fetches the titles of the articles matching `query`.
    ///
    /// Anything but a 200 answer is an error naming the status code.
    pub fn fetch_titles(&self, query: &str, page_size: usize) -> Result<Vec<String>, Box<dyn Error>> {

        let request = self.agent
        .get(&self.endpoint)
        .query("q", query)
        .query("pageSize", &page_size.to_string())
        .query("apiKey", &self.api_key);

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let message = response
                .into_string()
                .ok()
                .and_then(|body| serde_json::from_str::<ErrorResponse>(&body).ok())
                .and_then(|err| err.message);
                return Err(status_error(status, message).into());
            },
            Err(e) => return Err(format!("error fetching news: {}", e).into())
        };

        if response.status() != 200 {
            return Err(status_error(response.status(), None).into());
        }

        let body = response.into_string()?;
        let titles = parse_titles(&body)?;
        println!("fetched {} titles for query '{}'", titles.len(), query);
        Ok(titles)
    }
}

fn status_error(status: u16, message: Option<String>) -> String {
    match message {
        Some(message) => format!("error fetching news: status {} ({})", status, message),
        None => format!("error fetching news: status {}", status)
    }
}

pub fn parse_titles(body: &str) -> Result<Vec<String>, serde_json::Error> {

    let response: NewsResponse = serde_json::from_str(body)?;
    let titles = response.articles
    .into_iter()
    .filter_map(|article| article.title)
    .filter(|title| !title.is_empty())
    .collect();

    Ok(titles)
}
