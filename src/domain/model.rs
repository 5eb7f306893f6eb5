use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_page() -> u32 {
    1
}

fn default_format() -> String {
    "xml".to_string()
}

/// 醫藥品資訊查詢參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLookupRequest {
    pub api_key: String,
    pub item_name: String,
    #[serde(default = "default_page")]
    pub page_number: u32,
    #[serde(default = "default_page")]
    pub num_of_rows: u32,
    #[serde(default = "default_format", alias = "response_type")]
    pub response_format: String,
}

impl CatalogLookupRequest {
    /// Request for the first record matching `item_name`, as XML.
    pub fn new(api_key: impl Into<String>, item_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            item_name: item_name.into(),
            page_number: default_page(),
            num_of_rows: default_page(),
            response_format: default_format(),
        }
    }

    /// Query string sent to the catalog service.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("serviceKey", self.api_key.clone()),
            ("itemName", self.item_name.clone()),
            ("pageNo", self.page_number.to_string()),
            ("numOfRows", self.num_of_rows.to_string()),
            ("type", self.response_format.clone()),
        ]
    }
}

impl Validate for CatalogLookupRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("api_key", &self.api_key)?;
        validate_non_empty_string("item_name", &self.item_name)?;
        validate_positive_number("page_number", self.page_number, 1)?;
        validate_positive_number("num_of_rows", self.num_of_rows, 1)?;
        validate_non_empty_string("response_format", &self.response_format)?;
        Ok(())
    }
}

/// First record of a catalog response.
///
/// Only produced when at least one of the two document references is
/// present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "pdf_viewer_url")]
    pub viewer_reference: Option<String>,
    #[serde(rename = "pdf_download_url")]
    pub download_reference: Option<String>,
    pub item_name: Option<String>,
    pub company_name: Option<String>,
}

/// Raw catalog reply before the status check.
#[derive(Debug, Clone)]
pub struct CatalogResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl CatalogResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// An upload written to the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub original_name: String,
    pub path: PathBuf,
}
