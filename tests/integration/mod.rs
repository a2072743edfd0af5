//! Integration tests for the marquee catalog data layer

mod config_loading;
mod filter_views;
