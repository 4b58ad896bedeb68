//! Batch query orchestration: plans work units from a submission, dispatches
//! them one at a time, and turns the aggregate into display and export data.

pub(crate) mod dispatch;
pub mod notice;
pub mod progress;
pub mod session;

pub use dispatch::UnitFailure;
pub use notice::Notice;
pub use progress::Progress;
pub use session::{RunPhase, Session};

use std::fmt;

use tracing::{info, warn};

use crate::backend::{BackendError, LookupBackend};
use crate::pairing::{TermPair, pair_adjacent};
use crate::records::{DisplayRecord, ExportMapping, encode_export, format_records};
use crate::terms::{self, InputError, TermInput, TermSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Definition,
    Relation,
}

impl Mode {
    pub fn not_found_message(self) -> &'static str {
        match self {
            Mode::Definition => "未找到相关定义",
            Mode::Relation => "未找到相关关系",
        }
    }
}

/// How terms are turned into backend calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Strategy {
    /// One request for the whole submission.
    #[default]
    Joined,
    /// One request per term (definitions) or per adjacent pair (relations).
    Sequential,
}

/// What to do when a unit comes back 401 while more units remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    /// Keep dispatching and report each 401.
    #[default]
    Continue,
    /// Stop the run and discard anything gathered so far.
    Abort,
}

/// The payload of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnit {
    Term(String),
    Batch(String),
    Pair(TermPair),
}

impl WorkUnit {
    pub fn query(&self) -> String {
        match self {
            WorkUnit::Term(t) | WorkUnit::Batch(t) => t.clone(),
            WorkUnit::Pair(p) => p.query(),
        }
    }
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkUnit::Term(t) => write!(f, "term {t}"),
            WorkUnit::Batch(b) => write!(f, "batch [{b}]"),
            WorkUnit::Pair(p) => write!(f, "pair {p}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub mode: Mode,
    pub strategy: Strategy,
    pub input: TermInput,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("{}", notice::AUTH_MESSAGE)]
    Unauthorized,

    #[error("{}", .0.not_found_message())]
    NoResultsFound(Mode),

    #[error(transparent)]
    Transport(#[from] BackendError),

    #[error("已有查询正在进行，请稍候")]
    Busy,
}

/// Everything a successful run hands to presentation and export. The export
/// covers every aggregated record; the display set is the filtered view.
#[derive(Debug, Clone)]
pub struct QueryResults {
    pub display: Vec<DisplayRecord>,
    pub export: ExportMapping,
}

#[derive(Debug)]
pub enum RunOutcome {
    Succeeded(QueryResults),
    PartialFailure(QueryResults, Vec<UnitFailure>),
    Failed(RunError),
}

impl RunOutcome {
    pub fn results(&self) -> Option<&QueryResults> {
        match self {
            RunOutcome::Succeeded(r) | RunOutcome::PartialFailure(r, _) => Some(r),
            RunOutcome::Failed(_) => None,
        }
    }

    pub fn failures(&self) -> &[UnitFailure] {
        match self {
            RunOutcome::PartialFailure(_, failures) => failures,
            _ => &[],
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub notices: Vec<Notice>,
}

/// Receives progress, phase changes and notices while a run is in flight.
pub trait RunObserver {
    fn on_progress(&mut self, _progress: Progress) {}
    fn on_phase(&mut self, _phase: &RunPhase) {}
    fn on_notice(&mut self, _notice: &Notice) {}
}

impl RunObserver for () {}

/// Turn a validated term sequence into the backend calls to make.
///
/// Joined runs send one request: a lone definition term or a lone relation
/// pair goes to the single endpoint, anything larger to the batch endpoint.
pub fn plan_units(mode: Mode, strategy: Strategy, terms: TermSequence) -> Vec<WorkUnit> {
    match (strategy, mode) {
        (Strategy::Joined, Mode::Definition) if terms.len() == 1 => {
            terms.into_vec().into_iter().map(WorkUnit::Term).collect()
        }
        (Strategy::Joined, Mode::Relation) if terms.len() == 2 => {
            pair_adjacent(&terms).into_iter().map(WorkUnit::Pair).collect()
        }
        (Strategy::Joined, _) => vec![WorkUnit::Batch(terms.joined())],
        (Strategy::Sequential, Mode::Definition) => {
            terms.into_vec().into_iter().map(WorkUnit::Term).collect()
        }
        (Strategy::Sequential, Mode::Relation) => {
            pair_adjacent(&terms).into_iter().map(WorkUnit::Pair).collect()
        }
    }
}

pub struct Engine<B> {
    backend: B,
    auth_policy: AuthPolicy,
    session: Session,
}

impl<B: LookupBackend> Engine<B> {
    pub fn new(backend: B, auth_policy: AuthPolicy) -> Self {
        Self {
            backend,
            auth_policy,
            session: Session::default(),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one submission to completion. The session is back to `Idle` when
    /// this returns.
    pub async fn submit(
        &mut self,
        request: &QueryRequest,
        observer: &mut impl RunObserver,
    ) -> RunReport {
        let mut notices = Vec::new();
        let result = self.execute(request, observer, &mut notices).await;

        let outcome = match result {
            Err(RunError::Busy) => {
                let notice = Notice::error(RunError::Busy.to_string());
                observer.on_notice(&notice);
                notices.push(notice);
                return RunReport {
                    outcome: RunOutcome::Failed(RunError::Busy),
                    notices,
                };
            }
            Ok((results, failures)) if failures.is_empty() => {
                info!(found = results.display.len(), "run succeeded");
                RunOutcome::Succeeded(results)
            }
            Ok((results, failures)) => {
                info!(
                    found = results.display.len(),
                    failed = failures.len(),
                    "run partially succeeded"
                );
                RunOutcome::PartialFailure(results, failures)
            }
            Err(e) => {
                warn!(error = %e, "run failed");
                RunOutcome::Failed(e)
            }
        };

        let notice = match &outcome {
            RunOutcome::Succeeded(_) => Notice::success(notice::SUCCESS_MESSAGE),
            RunOutcome::PartialFailure(results, _) => {
                Notice::success(notice::partial_success_message(results.display.len()))
            }
            RunOutcome::Failed(e) => Notice::error(e.to_string()),
        };
        observer.on_notice(&notice);
        notices.push(notice);

        self.session.finish(&outcome, observer);
        self.session.reset(observer);

        RunReport { outcome, notices }
    }

    async fn execute(
        &mut self,
        request: &QueryRequest,
        observer: &mut impl RunObserver,
        notices: &mut Vec<Notice>,
    ) -> Result<(QueryResults, Vec<UnitFailure>), RunError> {
        if self.session.is_running() {
            return Err(RunError::Busy);
        }

        let terms = terms::extract(&request.input, request.mode, request.strategy)?;
        let units = plan_units(request.mode, request.strategy, terms);

        info!(
            mode = ?request.mode,
            strategy = ?request.strategy,
            units = units.len(),
            "run started"
        );
        self.session.begin(units.len(), observer)?;

        let dispatched = dispatch::dispatch_all(
            &self.backend,
            request.mode,
            &units,
            self.auth_policy,
            &mut self.session,
            observer,
            notices,
        )
        .await?;

        if dispatched.records.is_empty() {
            return Err(RunError::NoResultsFound(request.mode));
        }

        let display = format_records(&dispatched.records);
        if display.is_empty() {
            warn!(
                raw = dispatched.records.len(),
                "every record was malformed, nothing to display"
            );
            return Err(RunError::NoResultsFound(request.mode));
        }

        let export = encode_export(&dispatched.records);
        Ok((
            QueryResults {
                display,
                export,
            },
            dispatched.failures,
        ))
    }
}
