//! Blocking submission: validate, send, and hand the outcome to the view.

use architect_core::{Completion, PortfolioConfig, SubmitError, ViewController};

use crate::service::OptimizerService;

/// Run one submission to completion on the calling thread.
///
/// Validation failures are returned without touching the network; service and
/// transport failures are recorded on the view and also returned.
pub fn submit_blocking(
    view: &mut ViewController,
    service: &dyn OptimizerService,
    config: &PortfolioConfig,
) -> Result<Completion, SubmitError> {
    let (ticket, request) = view.submit(config)?;
    let outcome = service.optimize(&request);
    let failure = outcome.as_ref().err().cloned();
    let completion = view.complete(ticket, outcome);
    match failure {
        Some(e) if completion == Completion::Applied => Err(e),
        _ => Ok(completion),
    }
}
