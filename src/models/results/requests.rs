use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsQuery {
    #[serde(default = "default_term")]
    pub term: i32,
}

fn default_term() -> i32 {
    1
}
