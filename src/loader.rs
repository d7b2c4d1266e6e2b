//! Background generation of the environment map
//!
//! The map is rendered on a worker thread and handed back through a oneshot
//! channel. The main thread polls once per frame and never blocks.

use std::thread;

use futures::channel::oneshot;

use crate::error::{Error, Result};
use crate::gfx::resources::environment::{EnvironmentMap, EnvironmentPreset};

/// Progress of a pending environment load
#[derive(Debug)]
pub enum LoadState {
    Loading,
    Ready(EnvironmentMap),
    Failed(Error),
}

pub struct EnvironmentLoader {
    preset: EnvironmentPreset,
    receiver: oneshot::Receiver<Result<EnvironmentMap>>,
}

impl EnvironmentLoader {
    /// Start generating `preset` on a worker thread
    ///
    /// If no thread can be spawned the map is generated inline and the first
    /// poll returns it.
    pub fn spawn(preset: EnvironmentPreset, face_size: u32) -> Self {
        let (sender, receiver) = oneshot::channel();
        let spawned = thread::Builder::new()
            .name("environment-loader".to_string())
            .spawn(move || {
                // The receiver is gone if the app exited before loading finished
                let _ = sender.send(EnvironmentMap::generate(preset, face_size));
            });

        match spawned {
            Ok(_) => {
                log::info!("Loading '{}' environment ({}px faces)", preset, face_size);
                Self { preset, receiver }
            }
            Err(e) => {
                log::warn!("Could not spawn environment worker ({}), generating inline", e);
                let (sender, receiver) = oneshot::channel();
                let _ = sender.send(EnvironmentMap::generate(preset, face_size));
                Self { preset, receiver }
            }
        }
    }

    pub fn preset(&self) -> EnvironmentPreset {
        self.preset
    }

    /// Check for a finished map without blocking
    ///
    /// `Ready` and `Failed` are terminal; the loader should be dropped after
    /// either is returned.
    pub fn poll(&mut self) -> LoadState {
        match self.receiver.try_recv() {
            Ok(None) => LoadState::Loading,
            Ok(Some(Ok(map))) => LoadState::Ready(map),
            Ok(Some(Err(e))) => LoadState::Failed(e),
            Err(oneshot::Canceled) => LoadState::Failed(Error::EnvironmentWorker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(loader: &mut EnvironmentLoader) -> LoadState {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            match loader.poll() {
                LoadState::Loading if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(5))
                }
                state => return state,
            }
        }
    }

    #[test]
    fn test_loader_delivers_map() {
        let mut loader = EnvironmentLoader::spawn(EnvironmentPreset::City, 8);
        assert_eq!(loader.preset(), EnvironmentPreset::City);
        match wait_for(&mut loader) {
            LoadState::Ready(map) => {
                assert_eq!(map.face_size(), 8);
                assert_eq!(map.label(), "city");
            }
            other => panic!("expected a map, got {:?}", other),
        }
    }

    #[test]
    fn test_loader_reports_generation_error() {
        let mut loader = EnvironmentLoader::spawn(EnvironmentPreset::Sunset, 12);
        match wait_for(&mut loader) {
            LoadState::Failed(Error::InvalidEnvironmentSize(12)) => {}
            other => panic!("expected a size error, got {:?}", other),
        }
    }

    #[test]
    fn test_dropped_sender_is_a_worker_failure() {
        let (sender, receiver) = oneshot::channel();
        drop(sender);
        let mut loader = EnvironmentLoader {
            preset: EnvironmentPreset::Studio,
            receiver,
        };
        assert!(matches!(
            loader.poll(),
            LoadState::Failed(Error::EnvironmentWorker)
        ));
    }
}
