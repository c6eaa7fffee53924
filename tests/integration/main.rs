//! Integration test harness
//!
//! Every file in this directory is compiled into a single test binary.

mod crawl_tests;
