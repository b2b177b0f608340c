//! Binary entrypoint that launches the clinical language-model server.

use std::process::ExitCode;

use clinical_llm::start_clinical_llm;

/// Load the models and serve the API until Ctrl-C.
fn main() -> ExitCode {
    start_clinical_llm::run()
}
