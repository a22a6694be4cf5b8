use crate::ui::UiEvent;
use subcellular::engine::progress::{Progress, ProgressCallback, ProgressReporter};
use tokio::sync::mpsc;
use tracing::warn;

/// Forwards library progress events to the UI task.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Failed to send progress update to UI channel: {}", e);
            }
        })
    }

    pub fn reporter(&self) -> ProgressReporter<'static> {
        ProgressReporter::with_callback(self.get_callback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[tokio::test]
    async fn callback_sends_progress_event() {
        let (sender, mut receiver) = mpsc::channel(1);
        let handler = CliProgressHandler::new(sender);
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Testing" });

        match receiver.recv().await {
            Some(UiEvent::Progress(Progress::PhaseStart { name })) => assert_eq!(name, "Testing"),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn reporter_is_usable_from_worker_threads() {
        let (sender, mut receiver) = mpsc::channel(8);
        let handler = CliProgressHandler::new(sender);
        let reporter = handler.reporter();

        thread::scope(|s| {
            s.spawn(|| {
                reporter.report(Progress::TaskStart { total: 2 });
                reporter.report(Progress::TaskIncrement { amount: 2 });
            });
        });

        let mut received = 0;
        while receiver.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 2);
    }

    #[test]
    fn full_channel_drops_events_without_blocking() {
        let (sender, _receiver) = mpsc::channel(1);
        let callback = CliProgressHandler::new(sender).get_callback();
        callback(Progress::PhaseFinish);
        callback(Progress::PhaseFinish);
    }
}
