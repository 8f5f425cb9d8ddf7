//! # slds
//!
//! Design token and utility class recommendations for Lightning components.
//!
//! The workspace crates are re-exported under short names:
//!
//! - [`parser`] scans stylesheets, markup and scripts into structured inputs
//! - [`analysis`] runs the matchers and produces [`Report`]s
//! - [`config`] loads layered TOML settings
//! - [`lsp`] turns reports into editor diagnostics and quick fixes

pub use slds_analysis as analysis;
pub use slds_config as config;
pub use slds_lsp as lsp;
pub use slds_parser as parser;

pub use slds_analysis::{Context, Report, Runner};
pub use slds_parser::{Bundle, Entry};

/// Validates in-memory sources as one component bundle with the bundled data.
pub fn validate_sources(
    files: &[(&str, &str)],
    context: &Context,
) -> analysis::Result<Vec<Report>> {
    let runner = Runner::bundled()?;
    let bundle = Bundle::new(
        files
            .iter()
            .map(|(path, source)| Entry::from_source(*path, source))
            .collect(),
    );
    Ok(runner.run_bundle(&bundle, context))
}
