use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use wearables_core::{AnalysisError, Analyzer, CapabilitySnapshot, ClassificationResult, Raster};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("analysis did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("engine thread exited")]
    ChannelClosed,
}

/// Messages sent from callers to the engine thread.
enum EngineRequest {
    Analyze {
        path: PathBuf,
        snapshot: CapabilitySnapshot,
        reply: oneshot::Sender<Result<ClassificationResult, AnalysisError>>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Decode and classify an image file on the engine thread.
    pub async fn analyze(
        &self,
        path: PathBuf,
        snapshot: CapabilitySnapshot,
    ) -> Result<ClassificationResult, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Analyze {
                path,
                snapshot,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        Ok(reply_rx.await.map_err(|_| EngineError::ChannelClosed)??)
    }

    /// [`analyze`](Self::analyze) with a deadline. A late result is dropped
    /// by the engine when it finds the reply channel closed.
    pub async fn analyze_with_timeout(
        &self,
        path: PathBuf,
        snapshot: CapabilitySnapshot,
        timeout: Duration,
    ) -> Result<ClassificationResult, EngineError> {
        tokio::time::timeout(timeout, self.analyze(path, snapshot))
            .await
            .map_err(|_| EngineError::TimedOut(timeout))?
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// Decoding and classification are CPU-bound and never yield, so they run
/// off the async runtime.
pub fn spawn_engine(analyzer: Analyzer) -> Result<EngineHandle, EngineError> {
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(4);

    std::thread::Builder::new()
        .name("wearables-engine".into())
        .spawn(move || {
            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Analyze {
                        path,
                        snapshot,
                        reply,
                    } => {
                        let result = Raster::open(&path)
                            .and_then(|raster| analyzer.analyze(&raster, &snapshot));
                        if let Err(ref err) = result {
                            tracing::debug!(path = %path.display(), error = %err, "analysis failed");
                        }
                        if reply.send(result).is_err() {
                            tracing::debug!("caller gave up before analysis finished; result discarded");
                        }
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })?;

    Ok(EngineHandle { tx })
}
