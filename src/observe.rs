use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::io::prelude::*;
use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use anyhow::{Context, Result};

/// Rows beyond this are only counted, not kept.
const MAX_ROWS: usize = 1 << 20;

/// In-process record of what the controller did: how often curves were
/// regenerated, handles moved, inputs rejected.
pub struct Observer {
    start: Instant,
    rows: Vec<(f64, usize, &'static str, f64)>,
    counts: BTreeMap<&'static str, usize>,
}

impl Observer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            rows: Vec::new(),
            counts: BTreeMap::new(),
        }
    }

    pub fn append(&mut self, event: usize, name: &'static str, value: f64) {
        *self.counts.entry(name).or_insert(0) += 1;
        if self.rows.len() < MAX_ROWS {
            self.rows
                .push((self.start.elapsed().as_secs_f64(), event, name, value));
        }
    }

    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }

    pub fn write_csv<W: Write>(&self, mut output: W) -> std::io::Result<()> {
        writeln!(output, "elapsed_s,event,name,value")?;
        for (elapsed, event, name, value) in &self.rows {
            writeln!(output, "{},{},{},{}", elapsed, event, name, value)?;
        }
        output.flush()
    }
}

/// Index of the input event being processed, stamped on every row.
pub static EVENT: AtomicUsize = AtomicUsize::new(0);
pub static OBSERVER: Lazy<Mutex<Observer>> = Lazy::new(|| Mutex::new(Observer::new()));

pub fn observer() -> MutexGuard<'static, Observer> {
    OBSERVER.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn reset_observer() {
    *observer() = Observer::new();
}

pub fn observe_event(event: usize) {
    #[cfg(feature = "observe")]
    EVENT.store(event, std::sync::atomic::Ordering::Relaxed);
    #[cfg(not(feature = "observe"))]
    let _ = event;
}

pub fn dump_observer<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let file =
        std::fs::File::create(path).with_context(|| format!("creating {:?}", path))?;
    observer()
        .write_csv(std::io::BufWriter::new(file))
        .with_context(|| format!("writing {:?}", path))
}

#[cfg(feature = "observe")]
macro_rules! observe {
    ($name: literal, $value: expr) => {
        crate::observe::observer().append(
            crate::observe::EVENT.load(std::sync::atomic::Ordering::Relaxed),
            $name,
            $value as f64,
        );
    };
}

#[cfg(not(feature = "observe"))]
macro_rules! observe {
    ($name: literal, $value: expr) => {};
}

pub(crate) use observe;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_counts_and_csv() {
        let mut obs = Observer::new();
        obs.append(0, "curve", 61.0);
        obs.append(1, "curve", 61.0);
        obs.append(1, "handle", 0.5);
        assert_eq!(obs.count("curve"), 2);
        assert_eq!(obs.count("handle"), 1);
        assert_eq!(obs.count("missing"), 0);

        let mut out = Vec::new();
        obs.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "elapsed_s,event,name,value");
        assert!(lines[3].ends_with(",1,handle,0.5"));
    }
}
