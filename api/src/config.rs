use crate::{
    analysis::{DEFAULT_AI_BASE_URL, DEFAULT_BODY_BUDGET, DEFAULT_MODEL},
    domain::request::HttpMethod,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// SQLite file, or any `sqlite:` url.
    pub db_path: String,
    /// Method a freshly started draft is seeded with.
    pub default_method: HttpMethod,
    pub model: String,
    pub ai_base_url: String,
    /// Characters of response body included in an analysis prompt.
    pub body_budget: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: String::from("pulse.sqlite"),
            default_method: HttpMethod::GET,
            model: String::from(DEFAULT_MODEL),
            ai_base_url: String::from(DEFAULT_AI_BASE_URL),
            body_budget: DEFAULT_BODY_BUDGET,
        }
    }
}
