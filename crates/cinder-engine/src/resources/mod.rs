//! Scoped resource teardown.
//!
//! Anything that must be released when the application shuts down registers
//! itself with a [`ResourceManager`]. The frame driver calls
//! [`ResourceManager::dispose_all`] exactly once while terminating.

use anyhow::Result;

/// A resource with an explicit release step.
pub trait Dispose {
    fn dispose(&mut self) -> Result<()>;
}

struct FnDispose<F>(Option<F>);

impl<F> Dispose for FnDispose<F>
where
    F: FnOnce() -> Result<()>,
{
    fn dispose(&mut self) -> Result<()> {
        match self.0.take() {
            Some(f) => f(),
            None => Ok(()),
        }
    }
}

struct Entry {
    label: String,
    resource: Box<dyn Dispose>,
}

/// Outcome of [`ResourceManager::dispose_all`].
#[derive(Debug, Default)]
pub struct TeardownReport {
    /// Labels released successfully, in release order.
    pub released: Vec<String>,
    /// Labels that failed to release, with their errors.
    pub failures: Vec<(String, anyhow::Error)>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns every resource registered for automatic disposal.
#[derive(Default)]
pub struct ResourceManager {
    entries: Vec<Entry>,
    disposed: bool,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<D: Dispose + 'static>(&mut self, label: impl Into<String>, resource: D) {
        let label = label.into();
        if self.disposed {
            log::warn!("resource `{label}` registered after teardown; it will not be released");
        }
        self.entries.push(Entry {
            label,
            resource: Box::new(resource),
        });
    }

    /// Registers a release closure.
    pub fn register_fn<F>(&mut self, label: impl Into<String>, release: F)
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        self.register(label, FnDispose(Some(release)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Releases every registered resource, most recently registered first.
    ///
    /// A failing release is logged and recorded; the remaining resources are
    /// still released. Only the first call does any work.
    pub fn dispose_all(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();
        if self.disposed {
            return report;
        }
        self.disposed = true;

        while let Some(mut entry) = self.entries.pop() {
            match entry.resource.dispose() {
                Ok(()) => {
                    log::debug!("released `{}`", entry.label);
                    report.released.push(entry.label);
                }
                Err(e) => {
                    log::error!("failed to release `{}`: {e:#}", entry.label);
                    report.failures.push((entry.label, e));
                }
            }
        }

        report
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        if !self.disposed && !self.entries.is_empty() {
            log::warn!("resource manager dropped before teardown; releasing now");
            self.dispose_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::anyhow;

    use super::*;

    fn recorder(
        log: &Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
    ) -> impl FnOnce() -> Result<()> + 'static {
        let log = Rc::clone(log);
        move || {
            log.borrow_mut().push(name);
            Ok(())
        }
    }

    #[test]
    fn releases_in_reverse_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut resources = ResourceManager::new();
        resources.register_fn("a", recorder(&log, "a"));
        resources.register_fn("b", recorder(&log, "b"));

        let report = resources.dispose_all();
        assert_eq!(*log.borrow(), vec!["b", "a"]);
        assert_eq!(report.released, vec!["b".to_string(), "a".to_string()]);
        assert!(report.is_clean());
    }

    #[test]
    fn failures_do_not_stop_remaining_releases() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut resources = ResourceManager::new();
        resources.register_fn("first", recorder(&log, "first"));
        resources.register_fn("broken", || Err(anyhow!("device lost")));
        resources.register_fn("last", recorder(&log, "last"));

        let report = resources.dispose_all();
        assert_eq!(*log.borrow(), vec!["last", "first"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "broken");
    }

    #[test]
    fn second_dispose_is_a_no_op() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut resources = ResourceManager::new();
        resources.register_fn("once", recorder(&log, "once"));

        resources.dispose_all();
        let again = resources.dispose_all();
        assert!(again.released.is_empty());
        assert_eq!(log.borrow().len(), 1);
        assert!(resources.is_disposed());
    }

    struct Buffer {
        released: Rc<RefCell<bool>>,
    }

    impl Dispose for Buffer {
        fn dispose(&mut self) -> Result<()> {
            *self.released.borrow_mut() = true;
            Ok(())
        }
    }

    #[test]
    fn drop_releases_undisposed_resources() {
        let released = Rc::new(RefCell::new(false));
        {
            let mut resources = ResourceManager::new();
            resources.register("buffer", Buffer { released: Rc::clone(&released) });
        }
        assert!(*released.borrow());
    }
}
