//! Background jobs for preview decoding and prediction requests.
//!
//! Each job runs on its own short-lived thread and reports back through the
//! event channel, then wakes the UI.

use classifier_core::{
    PredictError, PredictJob, PredictTicket, Prediction, Predictor, Preview, PreviewJob,
};
use crossbeam_channel::Sender;
use eframe::egui;
use std::sync::Arc;
use std::thread;

pub enum WorkerEvent {
    PreviewReady {
        selection: u64,
        preview: Preview,
    },
    PredictFinished {
        ticket: PredictTicket,
        result: Result<Prediction, PredictError>,
    },
}

pub fn spawn_preview(
    job: PreviewJob,
    events: Sender<WorkerEvent>,
    ctx: egui::Context,
) -> std::io::Result<()> {
    thread::Builder::new()
        .name("preview".into())
        .spawn(move || {
            let preview = job.run();
            deliver(
                &events,
                &ctx,
                WorkerEvent::PreviewReady {
                    selection: job.selection,
                    preview,
                },
            );
        })
        .map(|_| ())
}

pub fn spawn_predict(
    job: PredictJob,
    predictor: Arc<dyn Predictor>,
    events: Sender<WorkerEvent>,
    ctx: egui::Context,
) -> std::io::Result<()> {
    thread::Builder::new()
        .name("predict".into())
        .spawn(move || {
            let result = job.run(predictor.as_ref());
            deliver(
                &events,
                &ctx,
                WorkerEvent::PredictFinished {
                    ticket: job.ticket,
                    result,
                },
            );
        })
        .map(|_| ())
}

fn deliver(events: &Sender<WorkerEvent>, ctx: &egui::Context, event: WorkerEvent) {
    if events.send(event).is_err() {
        tracing::debug!("UI closed before worker event was delivered");
        return;
    }
    ctx.request_repaint();
}
