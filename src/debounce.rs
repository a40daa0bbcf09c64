use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

/// Default quiet period before a search term is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Emits the latest pushed value once input has been quiet for `delay`.
/// Values superseded within the window are never emitted.
pub struct Debouncer<T> {
    input: watch::Sender<T>,
    output: watch::Receiver<T>,
}

impl<T> Debouncer<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawns the timer task; must be called inside a tokio runtime.
    pub fn new(initial: T, delay: Duration) -> Self {
        let (input, input_rx) = watch::channel(initial.clone());
        let (output_tx, output) = watch::channel(initial);
        tokio::spawn(run(input_rx, output_tx, delay));
        Self { input, output }
    }

    pub fn push(&self, value: T) {
        self.input.send_replace(value);
    }

    /// Wait for the next settled value. `None` once the timer task is gone.
    pub async fn settled(&mut self) -> Option<T> {
        self.output.changed().await.ok()?;
        Some(self.output.borrow_and_update().clone())
    }

    /// Last settled value.
    pub fn latest(&self) -> T {
        self.output.borrow().clone()
    }
}

async fn run<T: Clone>(mut input: watch::Receiver<T>, output: watch::Sender<T>, delay: Duration) {
    while input.changed().await.is_ok() {
        let closed = loop {
            let event = tokio::select! {
                changed = input.changed() => Some(changed.is_err()),
                () = tokio::time::sleep(delay) => None,
            };
            match event {
                Some(true) => break true,
                Some(false) => continue,
                None => break false,
            }
        };

        let latest = input.borrow_and_update().clone();
        if output.send(latest).is_err() || closed {
            break;
        }
    }
    debug!("debouncer stopped");
}
