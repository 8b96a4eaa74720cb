//! Long-lived pinned tasks.
//!
//! Each task is an OS thread with a fixed priority, pinned to one core for
//! its whole lifetime. There is no pool and no spawning after startup.

use std::{
    io,
    thread::{self, JoinHandle},
};

use core_affinity::{get_core_ids, set_for_current};
use log::{error, info, warn};
use thread_priority::{ThreadBuilderExt, ThreadPriority, ThreadPriorityValue};

/// Stack per task thread (bytes).
pub const TASK_STACK_SIZE: usize = 256 * 1024;

/// Scales the small task priorities (1, 2, ...) into the cross-platform 0..=99 range.
const PRIORITY_SCALE: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: &'static str,
    pub core: usize,
    pub priority: u8,
}

impl TaskSpec {
    pub const fn new(name: &'static str, core: usize, priority: u8) -> Self {
        Self {
            name,
            core,
            priority,
        }
    }

    fn thread_priority(&self) -> ThreadPriority {
        match ThreadPriorityValue::try_from(self.priority.saturating_mul(PRIORITY_SCALE)) {
            Ok(value) => ThreadPriority::Crossplatform(value),
            Err(_) => ThreadPriority::Max,
        }
    }
}

/// Spawns `body` on its own thread, raises its priority and pins it to
/// `spec.core`. Failing to pin or raise priority is logged, not fatal.
pub fn spawn_pinned<F>(spec: TaskSpec, body: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(spec.name.to_string())
        .stack_size(TASK_STACK_SIZE)
        .spawn_with_priority(spec.thread_priority(), move |raised| {
            if let Err(e) = raised {
                warn!("[{}] could not set priority {}: {:?}", spec.name, spec.priority, e);
            }
            pin_current(spec.name, spec.core);
            info!("[{}] started (core {}, priority {})", spec.name, spec.core, spec.priority);
            body();
            info!("[{}] exited", spec.name);
        })
}

fn pin_current(name: &str, core: usize) {
    let core_ids = get_core_ids().unwrap_or_default();
    match core_ids.get(core) {
        Some(core_id) => {
            if !set_for_current(*core_id) {
                error!("[{}] failed to pin to core {}", name, core);
            }
        }
        None => error!("[{}] core {} not among {} available cores", name, core, core_ids.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn spawned_task_runs_body_even_if_unpinnable() {
        let (tx, rx) = mpsc::channel();
        let spec = TaskSpec::new("unit_task", usize::MAX, 1);

        let handle = spawn_pinned(spec, move || {
            tx.send(thread::current().name().map(str::to_owned)).unwrap();
        })
        .unwrap();

        handle.join().unwrap();
        assert_eq!(rx.recv().unwrap().as_deref(), Some("unit_task"));
    }
}
