use super::entities::{AnnualResults, ClassResults};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ClassResultsResponse {
    pub results: ClassResults,
}

#[derive(Debug, Serialize)]
pub struct AnnualResultsResponse {
    pub results: AnnualResults,
}
