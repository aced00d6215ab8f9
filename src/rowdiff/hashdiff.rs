//! Cross-database recursive-checksum bisection.
//!
//! Grounded on this crate's existing recursive-descent style in
//! `analyzer`/`graph` (walk, compare, recurse) generalized to a threaded
//! producer via `scheduler::Scheduler`.

use crate::differ::DiffWarning;
use crate::error::DiffError;
use crate::key::{KeyValue, Vector};
use crate::rowdiff::{DiffRow, Sign};
use crate::scheduler::{Scheduler, SchedulerHandle};
use crate::segment::TableSegment;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy)]
pub struct HashDiffConfig {
    pub bisection_factor: usize,
    pub bisection_threshold: usize,
    pub threaded: bool,
    pub max_threadpool_size: usize,
}

impl Default for HashDiffConfig {
    fn default() -> Self {
        Self {
            bisection_factor: 32,
            bisection_threshold: 16384,
            threaded: true,
            max_threadpool_size: 16,
        }
    }
}

pub struct HashDiffer {
    config: HashDiffConfig,
    warnings: Mutex<Vec<DiffWarning>>,
}

impl HashDiffer {
    pub fn new(config: HashDiffConfig) -> Result<Self, DiffError> {
        if config.bisection_factor < 2 {
            return Err(DiffError::Configuration { message: "bisection_factor must be >= 2".to_string() });
        }
        if config.bisection_threshold <= config.bisection_factor {
            return Err(DiffError::Configuration {
                message: "bisection_threshold must exceed bisection_factor".to_string(),
            });
        }
        Ok(Self { config, warnings: Mutex::new(Vec::new()) })
    }

    pub fn warnings(&self) -> Vec<DiffWarning> {
        self.warnings.lock().expect("hashdiffer warnings mutex poisoned").clone()
    }

    fn record(&self, warns: Vec<DiffWarning>) {
        if warns.is_empty() {
            return;
        }
        self.warnings.lock().expect("hashdiffer warnings mutex poisoned").extend(warns);
    }

    pub fn diff(&self, a: TableSegment, b: TableSegment) -> Result<Vec<DiffRow>, DiffError> {
        let (a, warns_a) = a.with_schema()?;
        let (b, warns_b) = b.with_schema()?;
        self.record(warns_a);
        self.record(warns_b);

        let (a, b, reconcile_warnings) = crate::rowdiff::validate_relevant_columns(a, b)?;
        self.record(reconcile_warnings);

        let (a_min, a_max) = a.query_key_range()?;
        let (b_min, b_max) = b.query_key_range()?;
        let union_min = zip_vector(&a_min, &b_min, key_min);
        // query_key_range reports the actual max key present; range
        // predicates are half-open (`< max`), so bump by one unit to keep
        // that row inside the diffed range.
        let union_max = zip_vector(&a_max, &b_max, key_max).successor();

        let a_bounded = a.with_bounds(union_min.clone(), union_max.clone())?;
        let b_bounded = b.with_bounds(union_min, union_max)?;

        let n_workers = if self.config.threaded { self.config.max_threadpool_size.max(1) } else { 1 };
        let scheduler: Scheduler<Vec<DiffRow>> = Scheduler::new(n_workers);
        let run_warnings = Arc::new(Mutex::new(Vec::new()));

        let config = self.config;
        let w = run_warnings.clone();
        scheduler.submit(0, move |h| bisect_and_diff(h, a_bounded, b_bounded, config, w, None, 0));

        let mut out = Vec::new();
        for result in scheduler {
            out.extend(result?);
        }

        let collected = run_warnings.lock().expect("hashdiffer run-warnings mutex poisoned").clone();
        self.record(collected);
        Ok(out)
    }
}

fn key_min(a: &KeyValue, b: &KeyValue) -> KeyValue {
    match a.partial_cmp(b) {
        Some(Ordering::Greater) => b.clone(),
        _ => a.clone(),
    }
}

fn key_max(a: &KeyValue, b: &KeyValue) -> KeyValue {
    match a.partial_cmp(b) {
        Some(Ordering::Less) => b.clone(),
        _ => a.clone(),
    }
}

fn zip_vector(a: &Vector, b: &Vector, pick: fn(&KeyValue, &KeyValue) -> KeyValue) -> Vector {
    Vector(a.0.iter().zip(b.0.iter()).map(|(x, y)| pick(x, y)).collect())
}

fn bisect_and_diff(
    handle: &SchedulerHandle<Vec<DiffRow>>,
    a: TableSegment,
    b: TableSegment,
    config: HashDiffConfig,
    warnings: Arc<Mutex<Vec<DiffWarning>>>,
    max_rows: Option<u128>,
    level: i64,
) {
    match bisect_step(&a, &b, config, max_rows) {
        Err(e) => handle.push(Err(e)),
        Ok(BisectOutcome::Leaf) => match local_diff(&a, &b) {
            Ok(rows) => handle.push(Ok(rows)),
            Err(e) => handle.push(Err(e)),
        },
        Ok(BisectOutcome::Split(pairs)) => {
            for (child_a, child_b) in pairs {
                let w = warnings.clone();
                handle.submit(level, move |h2| diff_segments(h2, child_a, child_b, config, w, level + 1));
            }
        }
    }
}

enum BisectOutcome {
    Leaf,
    Split(Vec<(TableSegment, TableSegment)>),
}

fn bisect_step(a: &TableSegment, b: &TableSegment, config: HashDiffConfig, max_rows: Option<u128>) -> Result<BisectOutcome, DiffError> {
    let size = a.approximate_size()?.max(b.approximate_size()?);
    let max_rows = max_rows.unwrap_or(size);

    if max_rows < config.bisection_threshold as u128 || size < 2 * config.bisection_factor as u128 {
        return Ok(BisectOutcome::Leaf);
    }

    let checkpoints = a.choose_checkpoints(config.bisection_factor)?;
    let children_a = a.segment_by_checkpoints(&checkpoints)?;
    let children_b = b.segment_by_checkpoints(&checkpoints)?;
    Ok(BisectOutcome::Split(children_a.into_iter().zip(children_b).collect()))
}

fn diff_segments(
    handle: &SchedulerHandle<Vec<DiffRow>>,
    a: TableSegment,
    b: TableSegment,
    config: HashDiffConfig,
    warnings: Arc<Mutex<Vec<DiffWarning>>>,
    level: i64,
) {
    let outcome = (|| -> Result<(), DiffError> {
        let (count_a, checksum_a) = a.count_and_checksum()?;
        let (count_b, checksum_b) = b.count_and_checksum()?;

        if count_a == 0 && count_b == 0 {
            return Ok(());
        }

        if count_a != count_b || checksum_a != checksum_b {
            let new_max_rows = count_a.max(count_b) as u128;
            let w = warnings.clone();
            handle.submit(level, move |h2| bisect_and_diff(h2, a, b, config, w, Some(new_max_rows), level));
        }
        Ok(())
    })();

    if let Err(e) = outcome {
        handle.push(Err(e));
    }
}

/// Set-difference of two leaf segments' downloaded rows, interleaved `-`/`+`
/// in key order (ties favor the A-side row first).
fn local_diff(a: &TableSegment, b: &TableSegment) -> Result<Vec<DiffRow>, DiffError> {
    let n_key = a.key_columns().len();
    let a_rows = a.get_values()?;
    let b_rows = b.get_values()?;

    let a_set: HashSet<Vec<String>> = a_rows.iter().cloned().collect();
    let b_set: HashSet<Vec<String>> = b_rows.iter().cloned().collect();

    let mut a_only: Vec<Vec<String>> = a_rows.into_iter().filter(|r| !b_set.contains(r)).collect();
    let mut b_only: Vec<Vec<String>> = b_rows.into_iter().filter(|r| !a_set.contains(r)).collect();
    a_only.sort();
    b_only.sort();

    let mut out = Vec::with_capacity(a_only.len() + b_only.len());
    let (mut ai, mut bi) = (0usize, 0usize);
    loop {
        let take_a = match (a_only.get(ai), b_only.get(bi)) {
            (Some(ra), Some(rb)) => ra[..n_key] <= rb[..n_key],
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        if take_a {
            out.push((Sign::Minus, a_only[ai].clone()));
            ai += 1;
        } else {
            out.push((Sign::Plus, b_only[bi].clone()));
            bi += 1;
        }
    }
    Ok(out)
}
