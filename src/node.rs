// ================================
// src/node.rs - async node around the wall follower
// ================================
use crate::{
    config::Config,
    follower::{DriveCommand, WallFollower},
    lidar::LaserScan,
};
use tokio::sync::{
    mpsc::{self, error::SendError},
    watch,
};
use tracing::{debug, info, warn};

/// Scans buffered between the transport and the node.
pub const SCAN_QUEUE_SIZE: usize = 10;

/// The transport side of a [`WallFollowingNode`].
pub struct NodeHandles {
    pub scan_sender: mpsc::Sender<LaserScan>,
    /// Last-write-wins emergency-stop flag, `false` until told otherwise.
    pub emergency_stop: watch::Sender<bool>,
    pub shutdown: watch::Sender<bool>,
    pub drive_receiver: mpsc::Receiver<DriveCommand>,
}

pub struct WallFollowingNode {
    follower: WallFollower,
    scan_receiver: mpsc::Receiver<LaserScan>,
    emergency_stop: watch::Receiver<bool>,
    shutdown: watch::Receiver<bool>,
    drive_publisher: mpsc::Sender<DriveCommand>,
}

impl WallFollowingNode {
    pub fn new(config: Config) -> (Self, NodeHandles) {
        let (scan_sender, scan_receiver) = mpsc::channel(SCAN_QUEUE_SIZE);
        let (drive_publisher, drive_receiver) = mpsc::channel(SCAN_QUEUE_SIZE);
        let (emergency_stop_sender, emergency_stop) = watch::channel(false);
        let (shutdown_sender, shutdown) = watch::channel(false);

        let node = Self {
            follower: WallFollower::new(config),
            scan_receiver,
            emergency_stop,
            shutdown,
            drive_publisher,
        };
        let handles = NodeHandles {
            scan_sender,
            emergency_stop: emergency_stop_sender,
            shutdown: shutdown_sender,
            drive_receiver,
        };
        (node, handles)
    }

    /// Runs until the scan or drive channel closes or shutdown is signalled,
    /// then hands back the follower.
    pub async fn run(mut self) -> WallFollower {
        info!("wall following node running");
        let mut emergency_stop_open = true;
        let mut shutdown_open = true;

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown.changed(), if shutdown_open => {
                    if changed.is_err() {
                        shutdown_open = false;
                    } else if *self.shutdown.borrow_and_update() {
                        info!("shutdown requested");
                        break;
                    }
                }

                changed = self.emergency_stop.changed(), if emergency_stop_open => {
                    if changed.is_err() {
                        emergency_stop_open = false;
                        continue;
                    }
                    if self.apply_emergency_stop().await.is_err() {
                        warn!("drive channel closed");
                        break;
                    }
                }

                scan = self.scan_receiver.recv() => {
                    let Some(mut scan) = scan else {
                        info!("scan channel closed");
                        break;
                    };

                    // Skip stale scans and process only the latest
                    let mut skipped = 0usize;
                    while let Ok(newer) = self.scan_receiver.try_recv() {
                        scan = newer;
                        skipped += 1;
                    }
                    if skipped > 0 {
                        debug!(skipped, "dropped stale scans");
                    }

                    if self.process_scan(&scan).await.is_err() {
                        warn!("drive channel closed");
                        break;
                    }
                }
            }
        }

        self.follower
    }

    async fn process_scan(&mut self, scan: &LaserScan) -> Result<(), SendError<DriveCommand>> {
        self.apply_emergency_stop().await?;
        let command = self.follower.on_scan(scan);
        self.drive_publisher.send(command).await
    }

    async fn apply_emergency_stop(&mut self) -> Result<(), SendError<DriveCommand>> {
        let stopped = *self.emergency_stop.borrow_and_update();
        match self.follower.set_emergency_stop(stopped) {
            Some(command) => self.drive_publisher.send(command).await,
            None => Ok(()),
        }
    }
}
