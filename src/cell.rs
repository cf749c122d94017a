//! Periodically refreshed data, owned by a page and advanced by the render loop.

use std::sync::Arc;

use log::{debug, warn};
use time::{Duration, OffsetDateTime};

use crate::task::{Task, TaskError};
use crate::weather::FetchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Loading,
    Loaded,
    Error,
}

pub type Fetch<T> = Arc<dyn Fn() -> Result<T, FetchError> + Send + Sync>;

/// Holds the latest successfully fetched value and keeps at most one background fetch
/// in flight. All state changes happen inside [`RefreshCell::on_tick`].
pub struct RefreshCell<T> {
    name: &'static str,
    refresh_interval: Duration,
    fetch: Fetch<T>,
    last_refresh: OffsetDateTime,
    data: Option<T>,
    status: Status,
    active: Option<Task<T>>,
}

impl<T: Send + 'static> RefreshCell<T> {
    pub fn new<F>(name: &'static str, refresh_interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Result<T, FetchError> + Send + Sync + 'static,
    {
        Self {
            name,
            refresh_interval,
            fetch: Arc::new(fetch),
            last_refresh: OffsetDateTime::UNIX_EPOCH,
            data: None,
            status: Status::Loading,
            active: None,
        }
    }

    pub fn on_tick(&mut self, now: OffsetDateTime) {
        let Some(mut task) = self.active.take() else {
            if now - self.last_refresh > self.refresh_interval {
                self.schedule(now);
            }
            return;
        };

        if task.is_finished() {
            match task.result() {
                Ok(value) => {
                    debug!("{} refreshed", self.name);
                    self.data = Some(value);
                    self.last_refresh = now;
                    self.status = Status::Loaded;
                }
                Err(err) => unreachable!("{} task reported completion but {}", self.name, err),
            }
        } else if task.has_errored() {
            match task.result() {
                Err(TaskError::Incomplete) | Ok(_) => {
                    unreachable!("{} task reported failure without one", self.name)
                }
                Err(err) => warn!("Refreshing {} failed: {}", self.name, err),
            }
            self.last_refresh = now;
            self.status = Status::Error;
        } else {
            self.active = Some(task);
        }
    }

    fn schedule(&mut self, now: OffsetDateTime) {
        debug!("Scheduling {} refresh", self.name);
        let fetch = Arc::clone(&self.fetch);

        match Task::spawn(self.name, move || (*fetch)()) {
            Ok(task) => self.active = Some(task),
            Err(err) => {
                warn!("Unable to start {} refresh: {}", self.name, err);
                self.last_refresh = now;
                self.status = Status::Error;
            }
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn last_refresh(&self) -> OffsetDateTime {
        self.last_refresh
    }

    pub fn is_refreshing(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Mutex};
    use std::thread;

    fn at(seconds: i64) -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::seconds(seconds)
    }

    /// Tick at `now` until the in-flight fetch has been adopted.
    fn settle<T: Send + 'static>(cell: &mut RefreshCell<T>, now: OffsetDateTime) {
        for _ in 0..1000 {
            cell.on_tick(now);
            if !cell.is_refreshing() {
                return;
            }
            thread::sleep(std::time::Duration::from_millis(2));
        }
        panic!("refresh did not complete");
    }

    /// A cell whose fetches each wait for the next scripted outcome.
    fn scripted(
        interval: Duration,
    ) -> (
        RefreshCell<&'static str>,
        mpsc::Sender<Result<&'static str, FetchError>>,
        Arc<AtomicUsize>,
    ) {
        let (sender, receiver) = mpsc::channel();
        let receiver = Mutex::new(receiver);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let cell = RefreshCell::new("test", interval, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            receiver
                .lock()
                .unwrap()
                .recv()
                .unwrap_or(Err(FetchError::Validation("script exhausted")))
        });

        (cell, sender, calls)
    }

    #[test]
    fn first_tick_always_fetches() {
        let (mut cell, script, _) = scripted(Duration::days(365));

        cell.on_tick(at(1));
        assert!(cell.is_refreshing());

        script.send(Ok("first")).unwrap();
        settle(&mut cell, at(2));
        assert_eq!(cell.data(), Some(&"first"));
    }

    #[test]
    fn never_runs_two_fetches_at_once() {
        let (mut cell, script, calls) = scripted(Duration::seconds(1));

        cell.on_tick(at(10));
        for t in 11..50 {
            cell.on_tick(at(t * 100));
            assert!(cell.is_refreshing());
        }

        script.send(Ok("only")).unwrap();
        settle(&mut cell, at(5000));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.last_refresh(), at(5000));
    }

    #[test]
    fn failure_keeps_last_good_value() {
        let (mut cell, script, _) = scripted(Duration::seconds(60));

        cell.on_tick(at(0));
        script.send(Ok("good")).unwrap();
        settle(&mut cell, at(0));
        assert_eq!(cell.status(), Status::Loaded);

        cell.on_tick(at(61));
        script.send(Err(FetchError::HttpStatus(503))).unwrap();
        settle(&mut cell, at(61));

        assert_eq!(cell.status(), Status::Error);
        assert_eq!(cell.data(), Some(&"good"));
        assert_eq!(cell.last_refresh(), at(61));
    }

    #[test]
    fn failure_without_prior_data_stays_empty() {
        let (mut cell, script, _) = scripted(Duration::seconds(60));

        cell.on_tick(at(0));
        script.send(Err(FetchError::Validation("bad"))).unwrap();
        settle(&mut cell, at(0));

        assert_eq!(cell.status(), Status::Error);
        assert_eq!(cell.data(), None);
    }

    #[test]
    fn success_after_error_recovers() {
        let (mut cell, script, _) = scripted(Duration::seconds(60));

        cell.on_tick(at(0));
        script.send(Err(FetchError::HttpStatus(500))).unwrap();
        settle(&mut cell, at(0));
        assert_eq!(cell.status(), Status::Error);

        cell.on_tick(at(30));
        assert!(!cell.is_refreshing());

        cell.on_tick(at(61));
        script.send(Ok("fresh")).unwrap();
        settle(&mut cell, at(61));

        assert_eq!(cell.status(), Status::Loaded);
        assert_eq!(cell.data(), Some(&"fresh"));
    }

    #[test]
    fn panicking_fetch_is_a_failed_refresh() {
        let mut cell: RefreshCell<u32> =
            RefreshCell::new("panicky", Duration::seconds(60), || panic!("fetch blew up"));

        cell.on_tick(at(0));
        settle(&mut cell, at(0));

        assert_eq!(cell.status(), Status::Error);
        assert_eq!(cell.data(), None);
    }

    #[test]
    fn refreshes_on_interval() {
        let values = Mutex::new(vec!["V2", "V1"]);
        let mut cell = RefreshCell::new("scenario", Duration::seconds(60), move || {
            values
                .lock()
                .unwrap()
                .pop()
                .ok_or(FetchError::Validation("no more values"))
        });

        cell.on_tick(at(1000));
        assert_eq!(cell.status(), Status::Loading);
        assert_eq!(cell.data(), None);

        settle(&mut cell, at(1000));
        assert_eq!(cell.status(), Status::Loaded);
        assert_eq!(cell.data(), Some(&"V1"));

        cell.on_tick(at(1060));
        assert!(!cell.is_refreshing());

        cell.on_tick(at(1061));
        assert!(cell.is_refreshing());

        settle(&mut cell, at(1061));
        assert_eq!(cell.status(), Status::Loaded);
        assert_eq!(cell.data(), Some(&"V2"));
    }
}
