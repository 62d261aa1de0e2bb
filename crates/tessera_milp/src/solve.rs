//! Budgeted, cancellable solving.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::backend::{BackendOutcome, MilpBackend, Solution};
use crate::error::BackendError;
use crate::iis::{irreducible_subset, Iis};
use crate::model::Model;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Knobs passed to every solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Worker threads the backend may use.
    pub threads: u32,
    /// Wall-clock budget for the main solve.
    #[serde(with = "secs")]
    pub time_limit: Duration,
    /// Wall-clock budget for infeasibility diagnosis.
    #[serde(with = "secs")]
    pub iis_time_limit: Duration,
    /// Integer feasibility tolerance.
    pub int_feas_tol: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            threads: 8,
            time_limit: Duration::from_secs(1800),
            iis_time_limit: Duration::from_secs(120),
            int_feas_tol: 1e-9,
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("duration must be a non-negative number of seconds"));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}

/// A shared flag that aborts in-flight solves.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of a single budgeted backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    /// The backend returned within budget.
    Finished(BackendOutcome),
    /// The budget elapsed first.
    TimedOut,
    /// The token was cancelled first.
    Cancelled,
}

/// Final outcome of [`solve`].
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// Proven optimal.
    Optimal(Solution),
    /// Feasible but not proven optimal.
    Feasible(Solution),
    /// Proven infeasible, with the diagnosed conflict.
    Infeasible(Iis),
    /// Objective unbounded.
    Unbounded,
    /// Budget elapsed without a conclusion.
    TimedOut,
    /// Cancelled by the caller.
    Cancelled,
}

impl SolveOutcome {
    /// The solution, if one was found.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Optimal(s) | SolveOutcome::Feasible(s) => Some(s),
            _ => None,
        }
    }

    /// Short status word for logs.
    pub fn status(&self) -> &'static str {
        match self {
            SolveOutcome::Optimal(_) => "optimal",
            SolveOutcome::Feasible(_) => "feasible",
            SolveOutcome::Infeasible(_) => "infeasible",
            SolveOutcome::Unbounded => "unbounded",
            SolveOutcome::TimedOut => "timed out",
            SolveOutcome::Cancelled => "cancelled",
        }
    }
}

/// Runs one backend call on a worker thread under `budget`.
///
/// On timeout or cancellation the worker is detached. It keeps running until
/// the backend returns, and its result is then dropped.
pub fn solve_once(
    backend: &Arc<dyn MilpBackend>,
    model: Arc<Model>,
    settings: &SolverSettings,
    budget: Duration,
    cancel: &CancelToken,
) -> Result<Attempt, BackendError> {
    if cancel.is_cancelled() {
        return Ok(Attempt::Cancelled);
    }

    let (tx, rx) = mpsc::channel();
    let worker_backend = Arc::clone(backend);
    let worker_settings = settings.clone();
    thread::Builder::new()
        .name("tessera-solve".into())
        .spawn(move || {
            let result = worker_backend.solve(&model, &worker_settings);
            let _ = tx.send(result);
        })
        .map_err(|e| BackendError::Failed {
            backend: backend.name().to_string(),
            message: format!("cannot spawn solver thread: {e}"),
        })?;

    let deadline = Instant::now() + budget;
    loop {
        if cancel.is_cancelled() {
            tracing::debug!("solve cancelled");
            return Ok(Attempt::Cancelled);
        }
        let now = Instant::now();
        if now >= deadline {
            tracing::debug!(budget_s = budget.as_secs_f64(), "solve budget elapsed");
            return Ok(Attempt::TimedOut);
        }
        match rx.recv_timeout(POLL_INTERVAL.min(deadline - now)) {
            Ok(result) => return result.map(Attempt::Finished),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Err(BackendError::WorkerLost),
        }
    }
}

/// Solves `model` within `settings.time_limit`.
///
/// On proven infeasibility an irreducible infeasible subset of constraint
/// groups is computed within `settings.iis_time_limit`.
pub fn solve(
    backend: Arc<dyn MilpBackend>,
    model: Arc<Model>,
    settings: &SolverSettings,
    cancel: &CancelToken,
) -> Result<SolveOutcome, BackendError> {
    tracing::info!(
        backend = backend.name(),
        vars = model.variables().len(),
        integer_vars = model.num_integer_vars(),
        constraints = model.constraints().len(),
        "solving"
    );
    let started = Instant::now();
    let attempt = solve_once(&backend, Arc::clone(&model), settings, settings.time_limit, cancel)?;

    let outcome = match attempt {
        Attempt::Finished(BackendOutcome::Optimal(s)) => SolveOutcome::Optimal(s),
        Attempt::Finished(BackendOutcome::Feasible(s)) => SolveOutcome::Feasible(s),
        Attempt::Finished(BackendOutcome::Unbounded) => SolveOutcome::Unbounded,
        Attempt::Finished(BackendOutcome::Infeasible) => {
            tracing::info!("model infeasible, computing conflict");
            SolveOutcome::Infeasible(irreducible_subset(&backend, &model, settings, cancel))
        }
        Attempt::TimedOut => SolveOutcome::TimedOut,
        Attempt::Cancelled => SolveOutcome::Cancelled,
    };

    tracing::info!(
        status = outcome.status(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "solve finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::LinExpr;
    use crate::GoodLpBackend;

    struct Sleepy(Duration);

    impl MilpBackend for Sleepy {
        fn name(&self) -> &str {
            "sleepy"
        }

        fn solve(&self, _: &Model, _: &SolverSettings) -> Result<BackendOutcome, BackendError> {
            thread::sleep(self.0);
            Ok(BackendOutcome::Infeasible)
        }
    }

    struct Broken;

    impl MilpBackend for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn solve(&self, _: &Model, _: &SolverSettings) -> Result<BackendOutcome, BackendError> {
            Err(BackendError::Failed {
                backend: "broken".into(),
                message: "license expired".into(),
            })
        }
    }

    fn short(limit_ms: u64) -> SolverSettings {
        SolverSettings {
            time_limit: Duration::from_millis(limit_ms),
            iis_time_limit: Duration::from_millis(limit_ms),
            ..SolverSettings::default()
        }
    }

    struct Incumbent;

    impl MilpBackend for Incumbent {
        fn name(&self) -> &str {
            "incumbent"
        }

        fn solve(&self, model: &Model, _: &SolverSettings) -> Result<BackendOutcome, BackendError> {
            Ok(BackendOutcome::Feasible(Solution::new(model, vec![3.0])))
        }
    }

    #[test]
    fn default_settings() {
        let s = SolverSettings::default();
        assert_eq!(s.threads, 8);
        assert_eq!(s.time_limit, Duration::from_secs(1800));
        assert_eq!(s.iis_time_limit, Duration::from_secs(120));
        assert_eq!(s.int_feas_tol, 1e-9);
    }

    #[test]
    fn settings_serde_in_seconds() {
        let s: SolverSettings = serde_json::from_str(r#"{"time_limit": 2.5}"#).unwrap();
        assert_eq!(s.time_limit, Duration::from_millis(2500));
        assert_eq!(s.threads, 8);
        assert!(serde_json::from_str::<SolverSettings>(r#"{"time_limit": -1}"#).is_err());
    }

    #[test]
    fn cancel_token_is_shared() {
        let t = CancelToken::new();
        let c = t.clone();
        assert!(!c.is_cancelled());
        t.cancel();
        assert!(c.is_cancelled());
    }

    #[test]
    fn budget_elapses() {
        let backend: Arc<dyn MilpBackend> = Arc::new(Sleepy(Duration::from_secs(5)));
        let out = solve(backend, Arc::new(Model::new()), &short(50), &CancelToken::new()).unwrap();
        assert_eq!(out, SolveOutcome::TimedOut);
    }

    #[test]
    fn pre_cancelled_returns_immediately() {
        let backend: Arc<dyn MilpBackend> = Arc::new(Sleepy(Duration::from_secs(5)));
        let token = CancelToken::new();
        token.cancel();
        let out = solve(backend, Arc::new(Model::new()), &short(10_000), &token).unwrap();
        assert_eq!(out, SolveOutcome::Cancelled);
    }

    #[test]
    fn cancel_from_another_thread() {
        let backend: Arc<dyn MilpBackend> = Arc::new(Sleepy(Duration::from_secs(5)));
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.cancel();
        });
        let out = solve(backend, Arc::new(Model::new()), &short(10_000), &token).unwrap();
        handle.join().unwrap();
        assert_eq!(out, SolveOutcome::Cancelled);
    }

    #[test]
    fn incumbent_is_passed_through() {
        let mut m = Model::new();
        let x = m.integer("x", 0.0, 10.0);
        m.minimise(LinExpr::term(x, 2.0));
        let backend: Arc<dyn MilpBackend> = Arc::new(Incumbent);
        let out = solve(backend, Arc::new(m), &short(1000), &CancelToken::new()).unwrap();
        assert_eq!(out.status(), "feasible");
        let sol = out.solution().expect("incumbent");
        assert_eq!(sol.value(x), 3.0);
        assert_eq!(sol.objective(), 6.0);
    }

    #[test]
    fn backend_errors_propagate() {
        let backend: Arc<dyn MilpBackend> = Arc::new(Broken);
        let err = solve(backend, Arc::new(Model::new()), &short(1000), &CancelToken::new()).unwrap_err();
        assert!(err.to_string().contains("license expired"));
    }

    #[test]
    fn infeasible_model_yields_conflict() {
        let mut m = Model::new();
        let x = m.integer("x", 0.0, 10.0);
        m.ge("need", LinExpr::from(x), 8.0);
        m.le("cap", LinExpr::from(x), 5.0);
        m.le("loose", LinExpr::from(x), 9.0);
        let out = solve(
            Arc::new(GoodLpBackend::new()),
            Arc::new(m),
            &SolverSettings::default(),
            &CancelToken::new(),
        )
        .unwrap();
        match out {
            SolveOutcome::Infeasible(iis) => {
                assert!(iis.complete);
                assert_eq!(iis.groups, vec!["need".to_string(), "cap".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
