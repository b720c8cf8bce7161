use std::io::{self, IsTerminal, Write};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::FormatConfig;

/// Progress is drawn when explicitly requested, otherwise only on a terminal.
pub(crate) fn progress_enabled(config: &FormatConfig) -> bool {
    config
        .progress
        .unwrap_or_else(|| io::stderr().is_terminal())
}

static OUTPUT_LOCK: Mutex<()> = Mutex::new(());
static MANAGER: OnceLock<ProgressManager> = OnceLock::new();

fn manager() -> &'static ProgressManager {
    MANAGER.get_or_init(ProgressManager::new)
}

fn clear_progress_line() {
    let _guard = OUTPUT_LOCK.lock().ok();
    let _ = io::stderr().write_all(b"\r\x1b[2K");
    let _ = io::stderr().flush();
}

#[derive(Clone)]
struct ProgressTask {
    id: u64,
    label: String,
    total: Option<usize>,
    current: usize,
    started_at: Instant,
}

struct ProgressManager {
    state: Mutex<ProgressState>,
}

struct ProgressState {
    next_id: u64,
    tasks: Vec<ProgressTask>,
    renderer_started: bool,
}

impl ProgressManager {
    fn new() -> Self {
        Self {
            state: Mutex::new(ProgressState {
                next_id: 1,
                tasks: Vec::new(),
                renderer_started: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_renderer(&self) {
        let mut state = self.lock();
        if state.renderer_started {
            return;
        }
        state.renderer_started = true;
        drop(state);

        thread::spawn(|| {
            const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            const TICK: Duration = Duration::from_millis(80);
            const START_DELAY: Duration = Duration::from_millis(120);
            let mut idx = 0usize;
            let mut rendered = false;
            loop {
                let task = manager().lock().tasks.last().cloned();
                let Some(task) = task.filter(|task| task.started_at.elapsed() >= START_DELAY)
                else {
                    if rendered {
                        clear_progress_line();
                        rendered = false;
                    }
                    thread::sleep(TICK);
                    continue;
                };

                let frame = FRAMES[idx % FRAMES.len()];
                idx = idx.wrapping_add(1);
                let line = if let Some(total) = task.total {
                    let current = task.current.min(total);
                    format!(
                        "\r\x1b[2Kwsfmt ▸ {} [{current}/{total}] {frame}",
                        task.label
                    )
                } else {
                    format!("\r\x1b[2Kwsfmt ▸ {} {frame}", task.label)
                };
                {
                    let _guard = OUTPUT_LOCK.lock().ok();
                    let _ = io::stderr().write_all(line.as_bytes());
                    let _ = io::stderr().flush();
                }
                rendered = true;
                thread::sleep(TICK);
            }
        });
    }

    fn push_task(&self, label: String, total: Option<usize>) -> u64 {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id = state.next_id.saturating_add(1);
        state.tasks.push(ProgressTask {
            id,
            label,
            total,
            current: 0,
            started_at: Instant::now(),
        });
        id
    }

    fn update_current(&self, id: u64, delta: usize) {
        let mut state = self.lock();
        if let Some(task) = state.tasks.iter_mut().find(|task| task.id == id) {
            task.current = task.current.saturating_add(delta);
        }
    }

    fn remove_task(&self, id: u64) {
        let mut state = self.lock();
        if let Some(pos) = state.tasks.iter().position(|task| task.id == id) {
            state.tasks.remove(pos);
        }
    }
}

/// Spinner or counted bar on stderr. Shared by reference across pass workers.
pub struct ProgressReporter {
    id: Option<u64>,
}

impl ProgressReporter {
    #[must_use]
    pub fn disabled() -> Self {
        Self { id: None }
    }

    pub(crate) fn spinner(label: impl Into<String>, enabled: bool) -> Self {
        Self::start(label, None, enabled)
    }

    pub(crate) fn bar(label: impl Into<String>, total: usize, enabled: bool) -> Self {
        if total == 0 {
            return Self::spinner(label, enabled);
        }
        Self::start(label, Some(total), enabled)
    }

    fn start(label: impl Into<String>, total: Option<usize>, enabled: bool) -> Self {
        if !enabled {
            return Self::disabled();
        }
        manager().start_renderer();
        let id = manager().push_task(label.into(), total);
        Self { id: Some(id) }
    }

    pub fn increment(&self) {
        if let Some(id) = self.id {
            manager().update_current(id, 1);
        }
    }

    pub(crate) fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(id) = self.id.take() {
            manager().remove_task(id);
            clear_progress_line();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker count for a pass over `total` documents.
pub(crate) fn pass_concurrency(jobs: usize, total: usize) -> usize {
    jobs.clamp(1, 16).min(total.max(1))
}
