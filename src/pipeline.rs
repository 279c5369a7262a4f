use crate::config::TrackerConfig;
use crate::tracker::PitchTracker;
use crate::types::{DisplayState, PitchSample};
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, trace};

/// The pipeline owns the tracker and is the only place its state is
/// mutated. It receives raw samples from the backend (or simulator),
/// processes each through the tracker, and broadcasts the resulting
/// display snapshot to every consumer by value. Consumers never share
/// access to tracker state — they only see immutable `DisplayState`
/// clones.
pub struct Pipeline {
    sample_rx: Receiver<PitchSample>,
    display_txs: Vec<Sender<DisplayState>>,
    tracker: PitchTracker,
}

impl Pipeline {
    pub fn new(
        sample_rx: Receiver<PitchSample>,
        display_txs: Vec<Sender<DisplayState>>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            sample_rx,
            display_txs,
            tracker: PitchTracker::new(config),
        }
    }

    /// Run until the sample channel closes. Blocks the calling thread.
    pub fn run(&mut self) {
        info!("Pipeline running");
        let mut sample_count: u64 = 0;
        let mut active_count: u64 = 0;

        for sample in self.sample_rx.iter() {
            let display = self.tracker.process(&sample);
            if display.signal_active {
                active_count += 1;
            }

            for tx in &self.display_txs {
                let _ = tx.send(display.clone());
            }

            sample_count += 1;
            if sample_count % 1000 == 0 {
                debug!(
                    "Pipeline: {} samples processed, {} active",
                    sample_count, active_count
                );
                trace!("Latest: {}", display);
            }
        }

        // Leave no stale lock behind for a later start.
        self.tracker.reset();
        info!("Pipeline shutting down after {} samples", sample_count);
    }
}
