use std::time::Instant;

use crate::prettyprint_usize;

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

pub fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

const PROGRESS_FREQUENCY_SECONDS: f64 = 0.2;

struct Progress {
    label: String,
    processed_items: usize,
    total_items: usize,
    started_at: Instant,
    last_printed_at: Instant,
}

impl Progress {
    fn new(label: &str, total_items: usize) -> Progress {
        Progress {
            label: label.to_string(),
            processed_items: 0,
            total_items,
            started_at: Instant::now(),
            last_printed_at: Instant::now(),
        }
    }

    // Returns when done
    fn next(&mut self) -> Option<(f64, String)> {
        self.processed_items += 1;
        if self.processed_items > self.total_items {
            panic!(
                "{} is too few items for {} progress",
                prettyprint_usize(self.total_items),
                self.label
            );
        }

        if self.processed_items == self.total_items {
            let elapsed = elapsed_seconds(self.started_at);
            let line = format!(
                "{} ({})... {}",
                self.label,
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed)
            );
            debug!("{}", line);
            return Some((elapsed, line));
        } else if elapsed_seconds(self.last_printed_at) >= PROGRESS_FREQUENCY_SECONDS {
            self.last_printed_at = Instant::now();
            debug!(
                "{}: {}/{}... {}",
                self.label,
                prettyprint_usize(self.processed_items),
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed_seconds(self.started_at))
            );
        }
        None
    }
}

enum StackEntry {
    TimerSpan(TimerSpan),
    Progress(Progress),
}

struct TimerSpan {
    name: String,
    started_at: Instant,
    nested_results: Vec<String>,
    nested_time: f64,
}

/// Hierarchial magic. Times nested phases of work, tracks progress through loops, collects
/// warnings, and runs ordered parallel maps. Everything goes through the `log` facade; a summary
/// of all phases is logged when the outermost timer is dropped.
pub struct Timer {
    results: Vec<String>,
    stack: Vec<StackEntry>,

    outermost_name: String,

    warnings: Vec<String>,
}

impl Timer {
    pub fn new(name: &str) -> Timer {
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.to_string(),
            warnings: Vec::new(),
        };
        t.start(name);
        t
    }

    // TODO Shouldn't use this much.
    pub fn throwaway() -> Timer {
        Timer::new("throwaway")
    }

    /// Log immediately, and also repeat in the summary at the end.
    pub fn warn(&mut self, line: String) {
        warn!("{}", line);
        self.warnings.push(line);
    }

    /// Used to end the scope of a timer early.
    pub fn done(self) {}

    pub fn start(&mut self, name: &str) {
        debug!("{}...", name);
        self.stack.push(StackEntry::TimerSpan(TimerSpan {
            name: name.to_string(),
            started_at: Instant::now(),
            nested_results: Vec::new(),
            nested_time: 0.0,
        }));
    }

    pub fn stop(&mut self, name: &str) {
        let span = match self.stack.pop() {
            Some(StackEntry::TimerSpan(s)) => s,
            _ => panic!("Timer::stop({}) without a matching start", name),
        };
        assert_eq!(span.name, name);
        let elapsed = elapsed_seconds(span.started_at);
        let line = format!("{} took {}", name, prettyprint_time(elapsed));

        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(StackEntry::TimerSpan(ref mut s)) => {
                s.nested_results.push(format!("{}- {}", padding, line));
                s.nested_results.extend(span.nested_results);
                if span.nested_time != 0.0 {
                    s.nested_results.push(format!(
                        "  {}- ... plus {}",
                        padding,
                        prettyprint_time(elapsed - span.nested_time)
                    ));
                }
                s.nested_time += elapsed;
            }
            Some(StackEntry::Progress(_)) => unreachable!(),
            None => {
                self.results.push(format!("{}- {}", padding, line));
                self.results.extend(span.nested_results);
                if span.nested_time != 0.0 {
                    self.results.push(format!(
                        "  - ... plus {}",
                        prettyprint_time(elapsed - span.nested_time)
                    ));
                }
                // Don't bother tracking excess time that the Timer has existed but had no spans
            }
        }

        debug!("{}", line);
    }

    pub fn start_iter(&mut self, name: &str, total_items: usize) {
        if total_items == 0 {
            return;
        }
        if let Some(StackEntry::Progress(p)) = self.stack.last() {
            panic!(
                "Can't start_iter({}) while Progress({}) is top of the stack",
                name, p.label
            );
        }

        self.stack
            .push(StackEntry::Progress(Progress::new(name, total_items)));
    }

    pub fn next(&mut self) {
        let maybe_result = if let Some(StackEntry::Progress(ref mut progress)) = self.stack.last_mut()
        {
            progress.next()
        } else {
            panic!("Can't next() while a TimerSpan is top of the stack");
        };
        if let Some((elapsed, result)) = maybe_result {
            self.stack.pop();
            self.add_result(elapsed, result);
        }
    }

    fn add_result(&mut self, elapsed: f64, line: String) {
        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(StackEntry::TimerSpan(ref mut s)) => {
                s.nested_results.push(format!("{}- {}", padding, line));
                s.nested_time += elapsed;
            }
            Some(StackEntry::Progress(_)) => unreachable!(),
            None => {
                self.results.push(format!("{}- {}", padding, line));
            }
        }
    }

    /// Maps every request through the callback on a thread pool, returning results in the same
    /// order as the requests, no matter which thread finished first.
    pub fn parallelize<I, O, F>(&mut self, timer_name: &str, requests: Vec<I>, cb: F) -> Vec<O>
    where
        I: Send,
        O: Send,
        F: Fn(I) -> O + Sync,
    {
        let num_requests = requests.len();
        if num_requests <= 1 {
            return requests.into_iter().map(cb).collect();
        }

        let cb = &cb;
        let mut pool = scoped_threadpool::Pool::new(num_cpus::get().max(1) as u32);
        pool.scoped(|scope| {
            let (tx, rx) = std::sync::mpsc::channel();
            let mut results: Vec<Option<O>> = std::iter::repeat_with(|| None)
                .take(num_requests)
                .collect();
            for (idx, req) in requests.into_iter().enumerate() {
                let tx = tx.clone();
                scope.execute(move || {
                    // The receiver outlives every job
                    tx.send((idx, cb(req))).unwrap();
                });
            }
            drop(tx);

            self.start_iter(timer_name, num_requests);
            for (idx, result) in rx.iter() {
                self.next();
                results[idx] = Some(result);
            }
            results.into_iter().map(|x| x.unwrap()).collect()
        })
    }

    /// Like `parallelize`, but runs on the current thread. Useful for callers that pick between
    /// the two at runtime.
    pub fn sequential<I, O, F>(&mut self, timer_name: &str, requests: Vec<I>, cb: F) -> Vec<O>
    where
        F: Fn(I) -> O,
    {
        self.start_iter(timer_name, requests.len());
        let mut results = Vec::new();
        for req in requests {
            self.next();
            results.push(cb(req));
        }
        results
    }
}

impl std::ops::Drop for Timer {
    fn drop(&mut self) {
        let stop_name = self.outermost_name.clone();

        // If we're in the middle of unwinding a panic, don't further blow up.
        match self.stack.last() {
            Some(StackEntry::TimerSpan(ref s)) => {
                if s.name != stop_name {
                    error!("dropping Timer because of panic");
                    return;
                }
            }
            Some(StackEntry::Progress(ref p)) => {
                error!("dropping Timer while doing progress {}, because of panic", p.label);
                return;
            }
            None => unreachable!(),
        }

        self.stop(&stop_name);
        for line in &self.results {
            debug!("{}", line);
        }

        if !self.warnings.is_empty() {
            info!("{} warnings during {}", self.warnings.len(), stop_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallelize_keeps_order() {
        let mut timer = Timer::throwaway();
        let offset = 10;
        let input: Vec<usize> = (0..100).collect();
        let results = timer.parallelize("square", input.clone(), |x| x * x + offset);
        let expected: Vec<usize> = input.iter().map(|x| x * x + offset).collect();
        assert_eq!(results, expected);
        assert_eq!(
            timer.sequential("square again", input, |x| x * x + offset),
            expected
        );
    }

    #[test]
    fn nested_spans() {
        let mut timer = Timer::new("outer");
        timer.start("inner");
        timer.start_iter("loop", 3);
        for _ in 0..3 {
            timer.next();
        }
        timer.stop("inner");
        timer.warn("something odd".to_string());
        assert_eq!(timer.warnings, vec!["something odd".to_string()]);
        timer.done();
    }
}
