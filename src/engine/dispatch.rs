use tracing::{debug, warn};

use super::notice::{self, Notice};
use super::session::Session;
use super::{AuthPolicy, Mode, RunError, RunObserver, WorkUnit};
use crate::backend::{LookupBackend, LookupResponse};
use crate::records::RawRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unauthorized,
    NotFound,
    RequestFailed(u16),
}

impl FailureKind {
    pub fn notice(self, mode: Mode) -> Notice {
        let message = match self {
            FailureKind::Unauthorized => notice::AUTH_MESSAGE.to_string(),
            FailureKind::NotFound => mode.not_found_message().to_string(),
            FailureKind::RequestFailed(status) => notice::request_failed_message(status),
        };
        Notice::error(message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub unit: WorkUnit,
    pub kind: FailureKind,
}

/// Records and per-unit failures gathered over one run, in dispatch order.
#[derive(Debug, Default)]
pub(crate) struct Aggregator {
    pub records: Vec<RawRecord>,
    pub failures: Vec<UnitFailure>,
}

pub(crate) fn classify(response: LookupResponse) -> Result<Vec<RawRecord>, FailureKind> {
    match response.status {
        200..=299 => Ok(response.records),
        401 => Err(FailureKind::Unauthorized),
        404 => Err(FailureKind::NotFound),
        status => Err(FailureKind::RequestFailed(status)),
    }
}

/// Run every unit in order, one in flight at a time.
///
/// A transport failure ends the run immediately; anything gathered so far is
/// dropped by the caller. Status failures are reported and skipped.
pub(crate) async fn dispatch_all(
    backend: &impl LookupBackend,
    mode: Mode,
    units: &[WorkUnit],
    auth_policy: AuthPolicy,
    session: &mut Session,
    observer: &mut impl RunObserver,
    notices: &mut Vec<Notice>,
) -> Result<Aggregator, RunError> {
    let mut agg = Aggregator::default();

    for unit in units {
        let response = backend.lookup(mode, unit).await.inspect_err(|e| {
            warn!(unit = %unit, error = %e, "transport failure, aborting run");
        })?;

        match classify(response) {
            Ok(records) => {
                debug!(unit = %unit, found = records.len(), "unit completed");
                agg.records.extend(records);
            }
            Err(FailureKind::Unauthorized) if auth_policy == AuthPolicy::Abort => {
                warn!(unit = %unit, "unauthorized, aborting run");
                session.advance(observer);
                return Err(RunError::Unauthorized);
            }
            Err(kind) => {
                warn!(unit = %unit, failure = ?kind, "unit failed");
                let n = kind.notice(mode);
                observer.on_notice(&n);
                notices.push(n);
                agg.failures.push(UnitFailure {
                    unit: unit.clone(),
                    kind,
                });
            }
        }

        session.advance(observer);
    }

    Ok(agg)
}
