use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use vidshelf_media::lease::LeaseRegistry;
use vidshelf_media::thumbnail::{
    extract_thumbnail, MediaProbe, ThumbnailOutcome, ThumbnailPolicy, ThumbnailSize,
    ThumbnailSource,
};
use vidshelf_state::thumbnail::{Liveness, ThumbnailTarget};

pub struct ThumbnailRequest {
    pub target: ThumbnailTarget,
    pub source: ThumbnailSource,
    pub size: ThumbnailSize,
    pub liveness: Liveness,
    /// Held back by the dispatcher for this long before any worker sees it.
    pub defer: Option<Duration>,
}

pub struct ThumbnailResult {
    pub target: ThumbnailTarget,
    pub outcome: ThumbnailOutcome,
}

pub struct ThumbnailWorkerChannels {
    pub req_tx: mpsc::Sender<ThumbnailRequest>,
    pub result_rx: mpsc::Receiver<ThumbnailResult>,
}

struct Deferred {
    ready_at: Instant,
    request: ThumbnailRequest,
}

/// Spawns the dispatcher plus `workers` extraction threads. Each
/// extraction gets a fresh probe from `make_probe`.
pub fn spawn_thumbnail_workers<F, P>(
    workers: usize,
    policy: ThumbnailPolicy,
    leases: LeaseRegistry,
    make_probe: F,
) -> ThumbnailWorkerChannels
where
    F: Fn(ThumbnailSize) -> P + Send + Sync + 'static,
    P: MediaProbe,
{
    let (req_tx, req_rx) = mpsc::channel::<ThumbnailRequest>();
    let (job_tx, job_rx) = mpsc::channel::<ThumbnailRequest>();
    let (result_tx, result_rx) = mpsc::channel();

    let job_rx = Arc::new(Mutex::new(job_rx));
    let make_probe = Arc::new(make_probe);
    let policy = Arc::new(policy);

    for index in 0..workers.max(1) {
        let job_rx = Arc::clone(&job_rx);
        let result_tx = result_tx.clone();
        let make_probe = Arc::clone(&make_probe);
        let policy = Arc::clone(&policy);
        let leases = leases.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("thumbnail-worker-{index}"))
            .spawn(move || loop {
                let next = match job_rx.lock() {
                    Ok(rx) => rx.recv(),
                    Err(_) => return,
                };
                let Ok(req) = next else {
                    return;
                };
                if !req.liveness.is_alive() {
                    tracing::trace!(name = %req.source.name, "target gone, skipping thumbnail");
                    continue;
                }

                let mut probe = make_probe(req.size);
                let outcome =
                    extract_thumbnail(&mut probe, &leases, &req.source, req.size, &policy);
                if result_tx
                    .send(ThumbnailResult {
                        target: req.target,
                        outcome,
                    })
                    .is_err()
                {
                    return;
                }
            });
        if let Err(e) = spawned {
            tracing::error!("failed to spawn thumbnail worker: {e}");
        }
    }

    let spawned = std::thread::Builder::new()
        .name("thumbnail-dispatch".into())
        .spawn(move || dispatch(req_rx, job_tx));
    if let Err(e) = spawned {
        tracing::error!("failed to spawn thumbnail dispatcher: {e}");
    }

    ThumbnailWorkerChannels { req_tx, result_rx }
}

fn dispatch(req_rx: mpsc::Receiver<ThumbnailRequest>, job_tx: mpsc::Sender<ThumbnailRequest>) {
    let mut deferred: Vec<Deferred> = Vec::new();

    loop {
        let next = match deferred.iter().map(|d| d.ready_at).min() {
            Some(ready_at) => {
                let wait = ready_at.saturating_duration_since(Instant::now());
                match req_rx.recv_timeout(wait) {
                    Ok(req) => Some(req),
                    Err(mpsc::RecvTimeoutError::Timeout) => None,
                    Err(mpsc::RecvTimeoutError::Disconnected) => return,
                }
            }
            None => match req_rx.recv() {
                Ok(req) => Some(req),
                Err(_) => return,
            },
        };

        if let Some(mut req) = next {
            match req.defer.take() {
                Some(delay) => deferred.push(Deferred {
                    ready_at: Instant::now() + delay,
                    request: req,
                }),
                None => {
                    if job_tx.send(req).is_err() {
                        return;
                    }
                }
            }
        }

        let now = Instant::now();
        let mut i = 0;
        while i < deferred.len() {
            if deferred[i].ready_at <= now {
                let due = deferred.remove(i);
                if job_tx.send(due.request).is_err() {
                    return;
                }
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::PathBuf;

    use image::{Rgba, RgbaImage};
    use vidshelf_media::error::MediaError;
    use vidshelf_media::lease::MediaLease;
    use vidshelf_media::thumbnail::ProbeEvent;
    use vidshelf_state::entry::EntryId;

    use super::*;

    /// Loads and seeks instantly and always captures a grey frame.
    struct InstantProbe {
        events: VecDeque<ProbeEvent>,
    }

    impl InstantProbe {
        fn new() -> Self {
            Self {
                events: VecDeque::new(),
            }
        }
    }

    impl MediaProbe for InstantProbe {
        fn load(&mut self, _lease: &MediaLease) -> Result<(), MediaError> {
            self.events.push_back(ProbeEvent::MetadataLoaded);
            Ok(())
        }

        fn reload(&mut self) -> Result<(), MediaError> {
            self.events.push_back(ProbeEvent::MetadataLoaded);
            Ok(())
        }

        fn seek(&mut self, _seconds: f64) -> Result<(), MediaError> {
            self.events.push_back(ProbeEvent::Seeked);
            Ok(())
        }

        fn wait_event(&mut self, _timeout: Duration) -> Option<ProbeEvent> {
            self.events.pop_front()
        }

        fn capture(&mut self, size: ThumbnailSize) -> Result<RgbaImage, MediaError> {
            Ok(RgbaImage::from_pixel(
                size.width,
                size.height,
                Rgba([90, 90, 90, 255]),
            ))
        }

        fn detach(&mut self) {
            self.events.clear();
        }
    }

    fn request(
        name: &str,
        bytes: u64,
        defer: Option<Duration>,
    ) -> (ThumbnailTarget, Liveness, ThumbnailRequest) {
        let target = ThumbnailTarget::Row(EntryId::new());
        let liveness = Liveness::new();
        let req = ThumbnailRequest {
            target,
            source: ThumbnailSource {
                name: name.into(),
                path: PathBuf::from(format!("/videos/{name}")),
                byte_size: bytes,
            },
            size: ThumbnailSize::LIST_ROW,
            liveness: liveness.clone(),
            defer,
        };
        (target, liveness, req)
    }

    fn spawn(workers: usize) -> (ThumbnailWorkerChannels, LeaseRegistry) {
        let leases = LeaseRegistry::new();
        let channels = spawn_thumbnail_workers(
            workers,
            ThumbnailPolicy::default(),
            leases.clone(),
            |_| InstantProbe::new(),
        );
        (channels, leases)
    }

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn ready_result_comes_back_for_live_target() {
        let (channels, leases) = spawn(2);
        let (target, _alive, req) = request("a.mp4", 1024, None);
        channels.req_tx.send(req).unwrap();

        let result = channels.result_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result.target, target);
        assert!(result.outcome.is_ready());
        assert_eq!(leases.live(), 0);
        assert_eq!(leases.minted(), 1);
    }

    #[test]
    fn dead_targets_are_skipped() {
        let (channels, leases) = spawn(1);
        let (_, dead, req_dead) = request("gone.mp4", 1024, None);
        dead.kill();
        let (kept, _alive, req_kept) = request("kept.mp4", 1024, None);

        channels.req_tx.send(req_dead).unwrap();
        channels.req_tx.send(req_kept).unwrap();

        let result = channels.result_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result.target, kept);
        assert!(channels
            .result_rx
            .recv_timeout(Duration::from_millis(200))
            .is_err());
        assert_eq!(leases.minted(), 1);
    }

    #[test]
    fn deferred_requests_run_after_immediate_ones() {
        let (channels, _leases) = spawn(1);
        let (large, _a, req_large) = request(
            "large.mp4",
            60 * 1024 * 1024,
            Some(Duration::from_millis(300)),
        );
        let (small, _b, req_small) = request("small.mp4", 1024, None);

        channels.req_tx.send(req_large).unwrap();
        channels.req_tx.send(req_small).unwrap();

        let first = channels.result_rx.recv_timeout(WAIT).unwrap();
        let second = channels.result_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(first.target, small);
        assert_eq!(second.target, large);
    }

    #[test]
    fn killed_while_deferred_is_never_extracted() {
        let (channels, leases) = spawn(1);
        let (_, liveness, req) = request("big.mp4", 1024, Some(Duration::from_millis(100)));
        channels.req_tx.send(req).unwrap();
        liveness.kill();

        assert!(channels
            .result_rx
            .recv_timeout(Duration::from_millis(500))
            .is_err());
        assert_eq!(leases.minted(), 0);
    }

    #[test]
    fn oversized_sources_report_skipped() {
        let (channels, leases) = spawn(1);
        let (target, _alive, req) = request("huge.mp4", 200 * 1024 * 1024, None);
        channels.req_tx.send(req).unwrap();

        let result = channels.result_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result.target, target);
        assert!(matches!(result.outcome, ThumbnailOutcome::Skipped));
        assert_eq!(leases.minted(), 0);
    }
}
