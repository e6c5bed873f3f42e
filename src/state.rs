use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::{info, warn};

use crate::config::DataConfig;
use crate::data::loader::load_with_fallback;
use crate::error::LoadError;
use crate::report::{build_from_outcome, ReportArtifacts};

// ---------------------------------------------------------------------------
// Report store
// ---------------------------------------------------------------------------

/// Holds the current report for a long-lived host process.
///
/// Readers take a cheap [`snapshot`](Self::snapshot) and never recompute.
/// [`reload`](Self::reload) re-runs load + build; reloads are serialized and
/// the new artifacts replace the old ones in a single swap.
pub struct ReportStore {
    config: DataConfig,
    current: RwLock<Arc<ReportArtifacts>>,
    reload_lock: Mutex<()>,
}

impl ReportStore {
    /// Load the configured source and build the first report.
    pub fn open(config: DataConfig) -> Result<Self, LoadError> {
        let artifacts = Self::build(&config)?;
        Ok(ReportStore {
            config,
            current: RwLock::new(Arc::new(artifacts)),
            reload_lock: Mutex::new(()),
        })
    }

    fn build(config: &DataConfig) -> Result<ReportArtifacts, LoadError> {
        let outcome = load_with_fallback(&config.path, config.fallback)?;
        Ok(build_from_outcome(outcome))
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// The current artifacts.
    pub fn snapshot(&self) -> Arc<ReportArtifacts> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebuild from the source. On failure (strict mode only) the previous
    /// artifacts stay in place.
    pub fn reload(&self) -> Result<Arc<ReportArtifacts>, LoadError> {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        info!("reloading report from {}", self.config.path.display());

        let fresh = match Self::build(&self.config) {
            Ok(artifacts) => Arc::new(artifacts),
            Err(err) => {
                warn!("reload failed, keeping previous report: {err}");
                return Err(err);
            }
        };
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&fresh);
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::thread;

    use super::*;
    use crate::data::model::DataOrigin;

    const CSV: &str = "Gender,Age,Sleep Duration,Quality of Sleep,Physical Activity Level,\
        Stress Level,BMI Category,Heart Rate,Daily Steps,Sleep Disorder\n\
        Male,30,7.0,7,50,5,Normal,70,7000,\n\
        Female,45,6.0,6,40,7,Obese,80,5000,Insomnia\n";

    fn config(path: PathBuf, fallback: bool) -> DataConfig {
        DataConfig { path, fallback }
    }

    #[test]
    fn snapshots_share_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sleep.csv");
        std::fs::write(&path, CSV).unwrap();

        let store = ReportStore::open(config(path, false)).unwrap();
        let a = store.snapshot();
        let b = store.snapshot();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.records, 2);
    }

    #[test]
    fn reload_picks_up_new_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sleep.csv");
        std::fs::write(&path, CSV).unwrap();
        let store = ReportStore::open(config(path.clone(), false)).unwrap();
        let before = store.snapshot();

        std::fs::write(&path, format!("{CSV}Male,50,8.0,8,70,3,Normal,65,9000,\n")).unwrap();
        let after = store.reload().unwrap();

        assert_eq!(before.records, 2);
        assert_eq!(after.records, 3);
        assert!(Arc::ptr_eq(&after, &store.snapshot()));
    }

    #[test]
    fn failed_strict_reload_keeps_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sleep.csv");
        std::fs::write(&path, CSV).unwrap();
        let store = ReportStore::open(config(path.clone(), false)).unwrap();

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(store.reload(), Err(LoadError::Io { .. })));
        assert_eq!(store.snapshot().records, 2);
        assert!(!store.snapshot().is_degraded());
    }

    #[test]
    fn fallback_store_opens_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::open(config(dir.path().join("missing.csv"), true)).unwrap();
        let report = store.snapshot();
        assert!(report.is_degraded());
        assert_eq!(report.origin, DataOrigin::Fixture);
    }

    #[test]
    fn concurrent_reloads_always_leave_a_whole_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sleep.csv");
        std::fs::write(&path, CSV).unwrap();
        let store = Arc::new(ReportStore::open(config(path, false)).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..5 {
                        store.reload().unwrap();
                        let snap = store.snapshot();
                        assert_eq!(snap.disorder_counts.total(), snap.records);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.snapshot().records, 2);
    }
}
