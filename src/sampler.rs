use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;

use crate::metrics::{MetricSource, Sample};

/// Fixed sampling cadence.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Control handle for the background sampling thread. Single-shot
/// lifecycle: once stopped, a sampler is never restarted.
pub struct SamplerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// Start the sampling loop on its own thread.
///
/// Once per `interval` the loop takes one `Sample` from the source and
/// sends it down the channel. A full queue blocks the sampler rather than
/// dropping samples; the send only fails once the receiving side is gone,
/// which ends the loop. All potentially blocking source queries stay on
/// this thread.
pub fn spawn<S>(mut source: S, interval: Duration, tx: Sender<Sample>) -> SamplerHandle
where
    S: MetricSource + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);

    let thread = thread::spawn(move || {
        // The flag is checked only at the top of each iteration: stopping
        // never interrupts an in-flight query, it prevents the next cycle
        // from starting. Callers tolerate up to one interval of latency.
        while !flag.load(Ordering::Relaxed) {
            let cycle_started = Instant::now();

            let sample = source.sample();
            if tx.send(sample).is_err() {
                break;
            }

            let elapsed = cycle_started.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
    });

    SamplerHandle {
        stop,
        thread: Some(thread),
    }
}

impl SamplerHandle {
    /// Request a cooperative stop. Returns immediately; the loop exits at
    /// the next iteration boundary.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Stop and wait for the current cycle to finish. Blocks for at most
    /// one interval plus the in-flight query.
    pub fn join(&mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    #[cfg(test)]
    fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    /// Emits cpu = 1.0, 2.0, 3.0, … with an optional per-cycle delay.
    /// Flips `started` at the top of each cycle so tests can synchronize
    /// with an in-flight query instead of guessing with sleeps.
    struct Scripted {
        counter: u32,
        delay: Duration,
        started: Arc<AtomicBool>,
    }

    impl Scripted {
        fn new(delay: Duration) -> (Self, Arc<AtomicBool>) {
            let started = Arc::new(AtomicBool::new(false));
            let source = Self {
                counter: 0,
                delay,
                started: Arc::clone(&started),
            };
            (source, started)
        }
    }

    impl MetricSource for Scripted {
        fn cpu_percent(&mut self) -> f32 {
            self.counter += 1;
            self.counter as f32
        }
        fn memory_percent(&mut self) -> f32 {
            thread::sleep(self.delay);
            50.0
        }
        fn gpu_stats(&mut self) -> (Option<f32>, Option<f32>, Option<f32>) {
            self.started.store(true, Ordering::SeqCst);
            (None, None, None)
        }
    }

    fn wait_for(flag: &AtomicBool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !flag.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline, "sampler cycle never started");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_samples_arrive_in_production_order() {
        let (source, _) = Scripted::new(Duration::ZERO);
        let (tx, rx) = bounded(8);
        let mut handle = spawn(source, Duration::from_millis(10), tx);

        let cpus: Vec<f32> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap().cpu_percent)
            .collect();
        drop(rx);
        handle.join();

        assert_eq!(cpus, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_stop_lets_in_flight_cycle_deliver() {
        let (source, started) = Scripted::new(Duration::from_millis(200));
        let (tx, rx) = bounded(8);
        let mut handle = spawn(source, Duration::from_millis(10), tx);

        // Request the stop while the first cycle's query is still running.
        wait_for(&started);
        handle.stop();
        handle.join();
        assert!(handle.is_finished());

        // The in-flight cycle completed and its sample was delivered;
        // no further cycle started after the flag was set.
        let delivered: Vec<Sample> = rx.try_iter().collect();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].cpu_percent, 1.0);
    }

    #[test]
    fn test_full_queue_blocks_without_dropping() {
        let (source, _) = Scripted::new(Duration::ZERO);
        let (tx, rx) = bounded(1);
        let mut handle = spawn(source, Duration::ZERO, tx);

        // Let the sampler run far ahead of the consumer, then drain:
        // every received value is consecutive — nothing was dropped.
        thread::sleep(Duration::from_millis(100));
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap().cpu_percent;
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap().cpu_percent;
        drop(rx);
        handle.join();

        assert_eq!(second, first + 1.0);
    }
}
