//! Liquidity extraction from a rendered asset table.
//!
//! Data flow:
//! PageBrowser -> PageSession (rows) -> strategies -> parser -> LiquidityReading

pub mod browser;
pub mod chromium;
pub mod errors;
pub mod extractor;
pub mod parser;
pub mod strategy;

pub use browser::{PageBrowser, PageSession, RowSnapshot};
pub use chromium::ChromiumBrowser;
pub use errors::ExtractError;
pub use extractor::{ExtractorSettings, LiquidityReading, PageExtractor};
pub use parser::parse_value;
pub use strategy::{RowMatcher, Strategy};
