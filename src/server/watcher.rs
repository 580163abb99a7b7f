use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error};

use crate::error::{Error, Result};

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches the content directory and raises a (debounced) alert when
/// anything under it changes.
pub struct Watcher {
  path: PathBuf,
  // dropping it stops the watch
  #[allow(dead_code)]
  watcher: Option<notify::RecommendedWatcher>,
  rx: Option<Receiver<()>>,
  tx: Sender<()>,
}

impl Watcher {
  pub fn new(path: &Path) -> Self {
    let (tx, rx) = mpsc::channel(1);

    // editors tend to touch a file several times when saving
    let rx = debounce(DEBOUNCE, rx);

    Self {
      path: path.to_owned(),
      watcher: None,
      rx: Some(rx),
      tx,
    }
  }

  pub fn take_change_alert(&mut self) -> Option<Receiver<()>> {
    self.rx.take()
  }

  pub fn setup(&mut self) -> Result<()> {
    use notify::{Event, RecursiveMode, Watcher};

    let tx = self.tx.clone();
    let event_handler = move |event: Result<Event, notify::Error>| match event
    {
      Ok(event)
        if event.kind.is_modify()
          || event.kind.is_create()
          || event.kind.is_remove() =>
      {
        // a full channel means a reload is already pending
        let _ = tx.try_send(());
      }
      Ok(event) => {
        debug!("ignored file event: {:?}", event.kind);
      }
      Err(e) => {
        error!("file watcher error: {:?}", e);
      }
    };

    let watch_err = |source| Error::Watch {
      path: self.path.clone(),
      source,
    };

    // notify cannot watch a path that does not exist yet
    std::fs::create_dir_all(&self.path)
      .map_err(|e| watch_err(notify::Error::io(e)))?;

    let mut watcher =
      notify::recommended_watcher(event_handler).map_err(watch_err)?;
    watcher
      .watch(&self.path, RecursiveMode::Recursive)
      .map_err(watch_err)?;

    self.watcher = Some(watcher);
    Ok(())
  }
}

fn debounce<T: Send + 'static>(
  duration: Duration,
  mut rx: Receiver<T>,
) -> Receiver<T> {
  let (debounced_tx, debounced_rx) = mpsc::channel(1);
  tokio::task::spawn(async move {
    let mut last = None;
    loop {
      tokio::select! {
        val = rx.recv() => {
          match val {
            Some(val) => last = Some(val),
            None => break,
          }
        }
        _ = tokio::time::sleep(duration) => {
          if let Some(val) = last.take() {
            if debounced_tx.send(val).await.is_err() {
              break;
            }
          }
        }
      }
    }
  });
  debounced_rx
}
