//! Sensor adapter trait and shared send path

use std::sync::Arc;

use async_channel::{Sender, TrySendError};
use contracts::{AxisSample, DropPolicy, SensorKind};
use tracing::trace;

use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};

/// Sensor adapter trait
///
/// One adapter per registered source, responsible for:
/// 1. Registering the source callback
/// 2. Forwarding readings as `AxisSample`
/// 3. Sending to the channel (handling backpressure)
pub trait SensorAdapter: Send + Sync {
    /// Which stream this adapter feeds
    fn kind(&self) -> SensorKind;

    /// Start sample delivery
    ///
    /// # Arguments
    /// * `tx` - sample send channel
    /// * `metrics` - shared ingestion metrics
    fn start(&self, tx: Sender<AxisSample>, metrics: Arc<IngestionMetrics>) -> Result<()>;

    /// Stop sample delivery and release the subscription
    fn stop(&self);

    /// Check whether the adapter is listening
    fn is_listening(&self) -> bool;
}

/// Send a sample, applying the backpressure policy
///
/// A full channel is policy, not failure; only a closed channel errors.
#[inline]
pub(crate) fn send_sample(
    tx: &Sender<AxisSample>,
    sample: AxisSample,
    metrics: &Arc<IngestionMetrics>,
    drop_policy: DropPolicy,
) -> Result<()> {
    let kind = sample.kind;
    match tx.try_send(sample) {
        Ok(_) => {
            metrics.update_queue_len(tx.len());
            trace!(kind = %kind, "sample sent");
            Ok(())
        }
        Err(TrySendError::Full(_)) => {
            metrics.record_dropped();
            metrics::counter!("ingestion_samples_dropped", "kind" => kind.as_str()).increment(1);
            match drop_policy {
                DropPolicy::DropNewest => {
                    trace!(kind = %kind, "sample dropped (newest)");
                }
                DropPolicy::DropOldest => {
                    // TODO: DropOldest needs a pop-capable channel; until then
                    // the incoming sample is dropped instead.
                    trace!(kind = %kind, "sample dropped (oldest fallback)");
                }
            }
            Ok(())
        }
        Err(TrySendError::Closed(_)) => Err(IngestionError::ChannelClosed { kind }),
    }
}
