//! Background worker — network calls never run on the UI thread.
//!
//! Each `Optimize` command gets its own short-lived request thread, so
//! submissions overlap the way they would in a browser; the view controller
//! discards any completion whose ticket is no longer current.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use architect_client::OptimizerService;
use architect_core::{OptimizationRequest, OptimizationResult, RequestTicket, SubmitError};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Optimize {
        ticket: RequestTicket,
        request: OptimizationRequest,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Completed {
        ticket: RequestTicket,
        outcome: Box<Result<OptimizationResult, SubmitError>>,
    },
}

pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    service: Arc<dyn OptimizerService>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("architect-worker".into())
        .spawn(move || worker_loop(rx, tx, service))
}

fn worker_loop(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    service: Arc<dyn OptimizerService>,
) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Optimize { ticket, request }) => {
                let reply = tx.clone();
                let service = Arc::clone(&service);
                let spawned = thread::Builder::new()
                    .name(format!("architect-request-{}", ticket.seq()))
                    .spawn(move || {
                        let outcome = service.optimize(&request);
                        // The UI may already be gone.
                        let _ = reply.send(WorkerResponse::Completed {
                            ticket,
                            outcome: Box::new(outcome),
                        });
                    });
                if let Err(e) = spawned {
                    report_spawn_failure(&tx, ticket, &e);
                }
            }
        }
    }
    tracing::debug!("worker stopped");
}

/// A request thread that never started still completes its ticket, so the
/// view leaves `Loading`.
fn report_spawn_failure(tx: &Sender<WorkerResponse>, ticket: RequestTicket, err: &io::Error) {
    tracing::warn!(seq = ticket.seq(), error = %err, "could not start request thread");
    let _ = tx.send(WorkerResponse::Completed {
        ticket,
        outcome: Box::new(Err(SubmitError::Transport(err.to_string()))),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_core::{LeverageMode, PortfolioConfig, ViewController};
    use std::sync::mpsc;
    use std::time::Duration;

    struct FailingService;

    impl OptimizerService for FailingService {
        fn optimize(&self, _: &OptimizationRequest) -> Result<OptimizationResult, SubmitError> {
            Err(SubmitError::service(503, Some("maintenance".into())))
        }
    }

    struct SlowFirstService;

    impl OptimizerService for SlowFirstService {
        fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResult, SubmitError> {
            if request.target_mode == LeverageMode::Volatility {
                thread::sleep(Duration::from_millis(200));
            }
            Err(SubmitError::Transport(request.target_mode.to_string()))
        }
    }

    #[test]
    fn worker_shutdown() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, _resp_rx) = mpsc::channel();

        let handle = spawn_worker(cmd_rx, resp_tx, Arc::new(FailingService)).unwrap();
        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().expect("worker should join cleanly");
    }

    #[test]
    fn completion_carries_ticket() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(cmd_rx, resp_tx, Arc::new(FailingService)).unwrap();

        let mut view = ViewController::default();
        let (ticket, request) = view.submit(&PortfolioConfig::default()).unwrap();
        cmd_tx.send(WorkerCommand::Optimize { ticket, request }).unwrap();

        let WorkerResponse::Completed { ticket: got, outcome } =
            resp_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(got, ticket);
        assert_eq!((*outcome).unwrap_err().to_string(), "maintenance");

        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn slow_older_request_arrives_stale() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(cmd_rx, resp_tx, Arc::new(SlowFirstService)).unwrap();

        let mut view = ViewController::default();
        let slow = PortfolioConfig::default();
        let fast = PortfolioConfig {
            leverage_target_mode: LeverageMode::ValueAtRisk,
            ..PortfolioConfig::default()
        };
        let (first, req) = view.submit(&slow).unwrap();
        cmd_tx.send(WorkerCommand::Optimize { ticket: first, request: req }).unwrap();
        let (second, req) = view.submit(&fast).unwrap();
        cmd_tx.send(WorkerCommand::Optimize { ticket: second, request: req }).unwrap();

        let mut completions = Vec::new();
        for _ in 0..2 {
            let WorkerResponse::Completed { ticket, outcome } =
                resp_rx.recv_timeout(Duration::from_secs(5)).unwrap();
            completions.push((ticket, view.complete(ticket, *outcome)));
        }

        assert_eq!(completions[0].0, second);
        assert_eq!(completions[1], (first, architect_core::Completion::Stale));
        assert_eq!(view.error_message(), Some("Connection failed: var"));

        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn spawn_failure_completes_ticket_with_transport_error() {
        let (resp_tx, resp_rx) = mpsc::channel();
        let mut view = ViewController::default();
        let (ticket, _) = view.submit(&PortfolioConfig::default()).unwrap();

        let err = io::Error::new(io::ErrorKind::OutOfMemory, "no threads left");
        report_spawn_failure(&resp_tx, ticket, &err);

        let WorkerResponse::Completed { ticket: got, outcome } =
            resp_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(got, ticket);
        assert_eq!(
            view.complete(got, *outcome),
            architect_core::Completion::Applied
        );
        assert!(!view.is_loading());
        assert_eq!(view.error_message(), Some("Connection failed: no threads left"));
    }
}
