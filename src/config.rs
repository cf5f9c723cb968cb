

use serde_json::Value;
use std::{env, error::Error, fmt::Display, fs, time::Duration};

pub const DEFAULT_NEWS_ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const API_KEY_ENV: &str = "NEWS_API_KEY";

#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    News,
    File(String),
    Toy,
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::News => write!(f, "news"),
            Source::File(path) => write!(f, "file ({})", path),
            Source::Toy => write!(f, "toy")
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewsParams {
    pub api_key: String,
    pub endpoint: String,
    pub query: String,
    pub page_size: usize,
    pub timeout: Duration,
}

impl Display for NewsParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // the api key is never printed
        write!(f, "news parameters:
        endpoint: {},
        query: {},
        page_size: {},
        timeout_secs: {}",
        self.endpoint, self.query, self.page_size, self.timeout.as_secs()
        )
    }
}

#[derive(Clone, Debug)]
pub struct TrainParams {
    pub window_sizes: Vec<usize>,
    pub embedding_dims: Vec<usize>,
    pub epochs: usize,
    pub learning_rate: f32,
    pub min_count: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
    pub log_every: usize,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            window_sizes: vec![2],
            embedding_dims: vec![20],
            epochs: 100,
            learning_rate: 0.01,
            min_count: 1,
            shuffle: false,
            seed: None,
            log_every: 1
        }
    }
}

impl Display for TrainParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "training hyper parameters:
        window_sizes: {:?},
        embedding_dims: {:?},
        epochs: {},
        learning_rate: {},
        min_count: {},
        shuffle: {},
        seed: {:?},
        log_every: {}",
        self.window_sizes, self.embedding_dims, self.epochs, self.learning_rate, self.min_count, self.shuffle, self.seed, self.log_every
        )
    }
}

#[derive(Clone, Debug)]
pub struct RunParams {
    pub source: Source,
    pub news: Option<NewsParams>,
    pub output_dir: Option<String>,
    pub print_embeddings: bool,
    pub query_words: Vec<String>,
    pub top_k: usize,
    pub train: TrainParams,
}

impl Display for RunParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        source: {}
        output_dir: {:?}
        print_embeddings: {}
        query_words: {:?}
        top_k: {}",
        self.source, self.output_dir, self.print_embeddings, self.query_words, self.top_k)?;
        if let Some(news) = &self.news {
            write!(f, "\nUsing {}", news)?;
        }
        write!(f, "\nUsing {}", self.train)
    }
}

pub struct Config {
    params: RunParams
}

impl Config {

    pub fn get_params(&self) -> RunParams {
        self.params.clone()
    }

    pub fn new(args: &[String]) -> Result<Config, Box<dyn Error>> {

        if args.len() != 2 {
            return Err("input should be a path to json file only".into());
        }

        // parse input json
        let f = fs::File::open(&args[1]).map_err(|e| format!("cannot open json file {}: {}", &args[1], e))?;
        let json: Value = serde_json::from_reader(f).map_err(|e| format!("cannot read json file {}: {}", &args[1], e))?;

        Config::from_json(&json, env::var(API_KEY_ENV).ok())
    }

    // `env_api_key` is used when the json has no api_key entry
    pub fn from_json(json: &Value, env_api_key: Option<String>) -> Result<Config, Box<dyn Error>> {

        if !json.is_object() {
            return Err("json config should be an object".into());
        }

        let source = match get_str(json, "source")?.as_deref() {
            None | Some("news") => Source::News,
            Some("toy") => Source::Toy,
            Some("file") => match get_str(json, "corpus_file")? {
                Some(corpus_file) => Source::File(corpus_file),
                None => return Err("corpus_file was not supplied through json, it is needed for source 'file'".into())
            },
            Some(other) => return Err(format!("unrecognized source '{}', expected news, file or toy", other).into())
        };

        let news = match source {
            Source::News => {
                let api_key = match get_str(json, "api_key")?.or(env_api_key) {
                    Some(api_key) if !api_key.is_empty() => api_key,
                    _ => return Err(format!("api_key was not supplied through json nor through {}", API_KEY_ENV).into())
                };
                let page_size = get_usize(json, "page_size", 10)?;
                if page_size == 0 || page_size > 100 {
                    return Err(format!("page_size should be between 1 and 100, got {}", page_size).into());
                }
                let timeout_secs = get_usize(json, "timeout_secs", 30)?;
                if timeout_secs == 0 {
                    return Err("timeout_secs should be at least 1".into());
                }
                Some(NewsParams {
                    api_key,
                    endpoint: get_str(json, "news_endpoint")?.unwrap_or_else(|| DEFAULT_NEWS_ENDPOINT.to_string()),
                    query: get_str(json, "query")?.unwrap_or_else(|| "technology".to_string()),
                    page_size,
                    timeout: Duration::from_secs(timeout_secs as u64),
                })
            },
            _ => None
        };

        // handle default vs input parameters
        let defaults = TrainParams::default();
        let train = TrainParams {
            window_sizes: get_usize_list(json, "window_size", "window_sizes", defaults.window_sizes)?,
            embedding_dims: get_usize_list(json, "embedding_dim", "embedding_dims", defaults.embedding_dims)?,
            epochs: get_usize(json, "epochs", defaults.epochs)?,
            learning_rate: get_f32(json, "learning_rate", defaults.learning_rate)?,
            min_count: get_usize(json, "min_count", defaults.min_count)?,
            shuffle: get_bool(json, "shuffle", defaults.shuffle)?,
            seed: match json.get("seed") {
                Some(seed) => Some(seed.as_u64().ok_or("given seed is not a non negative integer")?),
                None => None
            },
            log_every: get_usize(json, "log_every", defaults.log_every)?,
        };

        if train.epochs == 0 {
            return Err("epochs should be at least 1".into());
        }
        if !(train.learning_rate.is_finite() && train.learning_rate > 0.0) {
            return Err(format!("learning_rate should be finite and positive, got {}", train.learning_rate).into());
        }
        if train.embedding_dims.contains(&0) {
            return Err("embedding_dim should be at least 1".into());
        }
        if train.log_every == 0 {
            return Err("log_every should be at least 1".into());
        }

        let query_words = match json.get("query_words") {
            Some(Value::Array(words)) => words
                .iter()
                .map(|w| w.as_str().map(|s| s.to_lowercase()).ok_or_else(|| "query_words should hold strings only".into()))
                .collect::<Result<Vec<String>, Box<dyn Error>>>()?,
            Some(_) => return Err("query_words should be a list of strings".into()),
            None => Vec::new()
        };

        let params = RunParams {
            source,
            news,
            output_dir: get_str(json, "output_dir")?,
            print_embeddings: get_bool(json, "print_embeddings", true)?,
            query_words,
            top_k: get_usize(json, "top_k", 5)?,
            train
        };

        Ok(
            Self {
                params
            }
        )
    }

}


fn get_str(json: &Value, key: &str) -> Result<Option<String>, Box<dyn Error>> {
    match json.get(key) {
        Some(value) => match value.as_str() {
            Some(s) => Ok(Some(s.to_owned())),
            None => Err(format!("given {} is not a string", key).into())
        },
        None => Ok(None)
    }
}

fn get_usize(json: &Value, key: &str, default: usize) -> Result<usize, Box<dyn Error>> {
    match json.get(key) {
        Some(value) => match value.as_u64() {
            Some(n) => Ok(n as usize),
            None => Err(format!("given {} is not a non negative integer", key).into())
        },
        None => Ok(default)
    }
}

fn get_f32(json: &Value, key: &str, default: f32) -> Result<f32, Box<dyn Error>> {
    match json.get(key) {
        Some(value) => match value.as_f64() {
            Some(x) => Ok(x as f32),
            None => Err(format!("given {} is not numeric", key).into())
        },
        None => Ok(default)
    }
}

fn get_bool(json: &Value, key: &str, default: bool) -> Result<bool, Box<dyn Error>> {
    match json.get(key) {
        Some(value) => match value.as_bool() {
            Some(b) => Ok(b),
            None => Err(format!("given {} is not boolean", key).into())
        },
        None => Ok(default)
    }
}

// a single value under `single_key` or a sweep under `list_key`, not both
fn get_usize_list(json: &Value, single_key: &str, list_key: &str, default: Vec<usize>) -> Result<Vec<usize>, Box<dyn Error>> {
    match (json.get(single_key), json.get(list_key)) {
        (Some(_), Some(_)) => Err(format!("only one of {} and {} should be given", single_key, list_key).into()),
        (Some(_), None) => Ok(vec![get_usize(json, single_key, 0)?]),
        (None, Some(Value::Array(values))) => {
            if values.is_empty() {
                return Err(format!("{} should not be empty", list_key).into());
            }
            values
            .iter()
            .map(|v| v.as_u64().map(|n| n as usize).ok_or_else(|| format!("{} should hold non negative integers only", list_key).into()))
            .collect()
        },
        (None, Some(_)) => Err(format!("given {} is not a list", list_key).into()),
        (None, None) => Ok(default)
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use serde_json::json;

    fn parse(json: Value) -> Result<RunParams, Box<dyn Error>> {
        Config::from_json(&json, None).map(|config| config.get_params())
    }

    #[test]
    fn toy_defaults() {
        let params = parse(json!({"source": "toy"})).unwrap();
        assert_eq!(params.source, Source::Toy);
        assert!(params.news.is_none());
        assert_eq!(params.train.window_sizes, vec![2]);
        assert_eq!(params.train.embedding_dims, vec![20]);
        assert_eq!(params.train.epochs, 100);
        assert_eq!(params.train.learning_rate, 0.01);
        assert_eq!(params.train.seed, None);
        assert!(params.print_embeddings);
        assert_eq!(params.top_k, 5);
        assert!(params.output_dir.is_none());
    }

    #[test]
    fn news_source_is_the_default_and_needs_a_key() {
        assert!(parse(json!({})).is_err());

        let params = Config::from_json(&json!({}), Some("env-key".to_string())).unwrap().get_params();
        assert_eq!(params.source, Source::News);
        let news = params.news.unwrap();
        assert_eq!(news.api_key, "env-key");
        assert_eq!(news.endpoint, DEFAULT_NEWS_ENDPOINT);
        assert_eq!(news.query, "technology");
        assert_eq!(news.page_size, 10);
        assert_eq!(news.timeout, Duration::from_secs(30));
    }

    #[test]
    fn json_api_key_wins_over_env() {
        let params = Config::from_json(&json!({"api_key": "json-key", "query": "rust", "page_size": 50}), Some("env-key".to_string()))
        .unwrap()
        .get_params();
        let news = params.news.unwrap();
        assert_eq!(news.api_key, "json-key");
        assert_eq!(news.query, "rust");
        assert_eq!(news.page_size, 50);
    }

    #[test]
    fn file_source_needs_corpus_file() {
        assert!(parse(json!({"source": "file"})).is_err());
        let params = parse(json!({"source": "file", "corpus_file": "titles.txt"})).unwrap();
        assert_eq!(params.source, Source::File("titles.txt".to_string()));
    }

    #[test]
    fn sweep_lists_and_single_values() {
        let params = parse(json!({"source": "toy", "window_sizes": [1, 2, 3], "embedding_dim": 8, "seed": 42})).unwrap();
        assert_eq!(params.train.window_sizes, vec![1, 2, 3]);
        assert_eq!(params.train.embedding_dims, vec![8]);
        assert_eq!(params.train.seed, Some(42));

        assert!(parse(json!({"source": "toy", "window_size": 2, "window_sizes": [2]})).is_err());
        assert!(parse(json!({"source": "toy", "embedding_dims": []})).is_err());
        assert!(parse(json!({"source": "toy", "embedding_dims": [0]})).is_err());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(parse(json!({"source": "toy", "epochs": "many"})).is_err());
        assert!(parse(json!({"source": "toy", "learning_rate": -1.0})).is_err());
        // 1e39 does not fit an f32 and becomes infinite
        assert!(parse(json!({"source": "toy", "learning_rate": 1e39})).is_err());
        assert!(Config::from_json(&json!({"api_key": "k", "timeout_secs": 0}), None).is_err());
        assert!(parse(json!({"source": "toy", "shuffle": 1})).is_err());
        assert!(parse(json!({"source": "toy", "window_sizes": 2})).is_err());
        assert!(parse(json!({"source": "toy", "query_words": ["ok", 3]})).is_err());
        assert!(parse(json!({"source": "podcast"})).is_err());
        assert!(parse(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn query_words_are_lower_cased() {
        let params = parse(json!({"source": "toy", "query_words": ["Deep", "learning"], "top_k": 2})).unwrap();
        assert_eq!(params.query_words, vec!["deep".to_string(), "learning".to_string()]);
        assert_eq!(params.top_k, 2);
    }

    #[test]
    fn new_needs_exactly_one_argument() {
        assert!(Config::new(&["skipgram".to_string()]).is_err());
        assert!(Config::new(&["skipgram".to_string(), "/nonexistent/args.json".to_string()]).is_err());
    }

    #[test]
    fn display_hides_the_api_key() {
        let params = Config::from_json(&json!({"api_key": "secret-key"}), None).unwrap().get_params();
        let printed = format!("{}", params);
        assert!(printed.contains("technology"));
        assert!(!printed.contains("secret-key"));
    }
}
