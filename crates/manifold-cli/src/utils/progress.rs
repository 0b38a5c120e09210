use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use manifoldem::engine::progress::{Progress, ProgressCallback};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new_spinner().with_style(Self::spinner_style());
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::Importing { path } => {
                    Self::start_phase(&pb_guard, "Importing clustering output", &path)
                }
                Progress::Loading { path } => {
                    Self::start_phase(&pb_guard, "Loading PD data", &path)
                }
                Progress::Saving { path } => Self::start_phase(&pb_guard, "Saving PD data", &path),
                Progress::Done => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message("✓ Done");
                }
                Progress::Message(msg) => {
                    if !pb_guard.is_finished() {
                        pb_guard.println(format!("  {}", msg));
                    } else {
                        pb_guard.set_message(msg);
                    }
                }
            }
        })
    }

    fn start_phase(pb: &ProgressBar, action: &str, path: &Path) {
        pb.reset();
        pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        pb.set_message(format!("{} ({})", action, path.display()));
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
