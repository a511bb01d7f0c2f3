use std::{
    collections::HashMap,
    fmt::Write,
    time::{Duration, Instant},
};

use num_traits::Float;

use crate::floating_type_mod::FT;

/// Samples of one named quantity.
struct Counter<T> {
    values: Vec<T>,
    last_start: Instant,
}

impl<T> Counter<T> {
    fn new() -> Self {
        Counter::<T> {
            last_start: Instant::now(),
            values: Vec::new(),
        }
    }

    fn add_value(&mut self, v: T) {
        self.values.push(v);
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

impl Counter<FT> {
    fn avg(&self) -> FT {
        self.values.iter().cloned().sum::<FT>() / self.values.len() as FT
    }
    fn min(&self) -> FT {
        self.values.iter().cloned().fold(<FT as Float>::max_value(), FT::min)
    }
    fn max(&self) -> FT {
        self.values.iter().cloned().fold(<FT as Float>::min_value(), FT::max)
    }
}

impl Counter<Duration> {
    fn begin(&mut self) {
        self.last_start = Instant::now();
    }

    fn end(&mut self) {
        self.values.push(Instant::now() - self.last_start);
    }

    fn avg(&self) -> Duration {
        self.values.iter().cloned().sum::<Duration>() / self.values.len() as u32
    }

    fn sum(&self) -> Duration {
        self.values.iter().cloned().sum::<Duration>()
    }
}

/// Named sample series (e.g. phase-A mass per report).
pub struct ValueCounters {
    counters: HashMap<String, Counter<FT>>,
    enabled: bool,
}

impl ValueCounters {
    pub fn new(enabled: bool) -> ValueCounters {
        ValueCounters {
            counters: HashMap::default(),
            enabled,
        }
    }

    pub fn add_value(&mut self, id: &str, v: FT) {
        if self.enabled {
            self.counters
                .entry(id.to_string())
                .or_insert_with(Counter::<FT>::new)
                .add_value(v);
        }
    }
}

/// Wall-clock time spent in each solver phase.
pub struct PerformanceCounters {
    counters: HashMap<String, Counter<Duration>>,
    enabled: bool,
}

impl PerformanceCounters {
    pub fn new(enabled: bool) -> PerformanceCounters {
        PerformanceCounters {
            counters: HashMap::default(),
            enabled,
        }
    }

    pub fn begin(&mut self, id: &str) {
        if self.enabled {
            self.counters
                .entry(id.to_string())
                .or_insert_with(Counter::<Duration>::new)
                .begin();
        }
    }

    pub fn end(&mut self, id: &str) {
        if self.enabled {
            if let Some(counter) = self.counters.get_mut(id) {
                counter.end();
            }
        }
    }
}

/// Human readable summary of both counter sets, sorted by name.
pub fn write_statistics(pcounters: &PerformanceCounters, vcounters: &ValueCounters) -> String {
    let mut s = String::new();

    if let Some(tick) = pcounters.counters.get("tick") {
        writeln!(
            s,
            "simulation-time: {}ms ({} ticks)",
            tick.sum().as_secs_f64() * 1000.,
            tick.len()
        )
        .unwrap();
        writeln!(s).unwrap();
    }

    let mut v = pcounters.counters.iter().collect::<Vec<_>>();
    v.sort_by(|x, y| x.0.cmp(y.0));
    for (label, pcounter) in v {
        writeln!(s, "{}: avg:{}ms", label, pcounter.avg().as_secs_f64() * 1000.).unwrap();
    }
    writeln!(s).unwrap();

    let mut v = vcounters.counters.iter().collect::<Vec<_>>();
    v.sort_by(|x, y| x.0.cmp(y.0));
    for (label, vcounter) in v {
        writeln!(
            s,
            "{}: min:{} max:{} avg:{}",
            label,
            vcounter.min(),
            vcounter.max(),
            vcounter.avg()
        )
        .unwrap();
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_counters_record_nothing() {
        let mut p = PerformanceCounters::new(false);
        p.begin("tick");
        p.end("tick");
        assert!(p.counters.is_empty());

        let mut v = ValueCounters::new(false);
        v.add_value("mass-a", 1.);
        assert!(v.counters.is_empty());
    }

    #[test]
    fn report_lists_every_counter() {
        let mut p = PerformanceCounters::new(true);
        for _ in 0..3 {
            p.begin("tick");
            p.begin("collision");
            p.end("collision");
            p.end("tick");
        }
        let mut v = ValueCounters::new(true);
        v.add_value("mass-a", 1.);
        v.add_value("mass-a", 3.);

        let report = write_statistics(&p, &v);
        assert!(report.contains("(3 ticks)"));
        assert!(report.contains("collision: avg:"));
        assert!(report.contains("mass-a: min:1 max:3 avg:2"));
    }
}
