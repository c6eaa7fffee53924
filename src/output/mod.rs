//! Output module for the harvested URL list and run reports
//!
//! This module handles:
//! - Writing the found URLs to the output file
//! - Summarizing run statistics

pub mod stats;

pub use stats::{print_statistics, RunStatistics};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes URLs to `path`, one per line, sorted lexicographically
///
/// The file is truncated first. Every line, including the last, ends with a
/// newline; an empty input produces an empty file.
///
/// # Returns
///
/// * `Ok(usize)` - Number of URLs written
/// * `Err(std::io::Error)` - The file could not be created or written
pub fn write_url_list<'a, I>(path: &Path, urls: I) -> std::io::Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut urls: Vec<&str> = urls.into_iter().collect();
    urls.sort_unstable();

    let mut writer = BufWriter::new(File::create(path)?);
    for url in &urls {
        writeln!(writer, "{}", url)?;
    }
    writer.flush()?;

    Ok(urls.len())
}
