use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use mango_model::InstallProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Download,
    Extract,
}

/// Terminal rendering of [`InstallProgress`] events: a byte bar while
/// downloading, an entry bar while extracting.
pub struct InstallProgressBar {
    bar: ProgressBar,
    phase: Mutex<Phase>,
}

impl InstallProgressBar {
    pub fn stderr() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            bar: ProgressBar::with_draw_target(Some(0), target),
            phase: Mutex::new(Phase::Idle),
        }
    }

    pub fn handle(&self, event: InstallProgress) {
        match event {
            InstallProgress::Resolving => {}
            InstallProgress::Downloading { downloaded, total } => {
                self.enter(Phase::Download, total, "Downloading");
                self.bar.set_position(downloaded);
            }
            InstallProgress::Extracting { processed, total } => {
                self.enter(Phase::Extract, total as u64, "Extracting");
                self.bar.set_position(processed as u64);
            }
            InstallProgress::Activating { .. } => self.finish(),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn enter(&self, phase: Phase, total: u64, message: &'static str) {
        let mut current = self
            .phase
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if *current == phase {
            return;
        }
        *current = phase;

        self.bar.reset();
        self.bar.set_style(style_for(phase, total));
        self.bar.set_message(message);
        if phase == Phase::Download && total == 0 {
            self.bar.unset_length();
            self.bar.enable_steady_tick(Duration::from_millis(120));
        } else {
            self.bar.disable_steady_tick();
            self.bar.set_length(total);
        }
    }
}

fn style_for(phase: Phase, total: u64) -> ProgressStyle {
    let template = match phase {
        Phase::Download if total == 0 => "{spinner} {msg} {bytes}",
        Phase::Download => "{msg} [{bar:40.cyan/dim}] {bytes}/{total_bytes}",
        Phase::Extract | Phase::Idle => "{msg} [{bar:40.cyan/dim}] {pos}/{len}",
    };
    ProgressStyle::default_bar()
        .template(template)
        .map_or_else(|_| ProgressStyle::default_bar(), |style| style.progress_chars("━━─"))
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;
    use mango_model::InstallProgress;

    use super::InstallProgressBar;

    #[test]
    fn tracks_download_then_extraction() {
        let progress = InstallProgressBar::with_target(ProgressDrawTarget::hidden());

        progress.handle(InstallProgress::Downloading {
            downloaded: 512,
            total: 2048,
        });
        assert_eq!(progress.bar.position(), 512);
        assert_eq!(progress.bar.length(), Some(2048));

        progress.handle(InstallProgress::Extracting {
            processed: 3,
            total: 10,
        });
        assert_eq!(progress.bar.position(), 3);
        assert_eq!(progress.bar.length(), Some(10));
    }

    #[test]
    fn unknown_download_size_spins_without_a_length() {
        let progress = InstallProgressBar::with_target(ProgressDrawTarget::hidden());

        progress.handle(InstallProgress::Downloading {
            downloaded: 4096,
            total: 0,
        });
        assert_eq!(progress.bar.length(), None);
        assert_eq!(progress.bar.position(), 4096);

        progress.handle(InstallProgress::Extracting {
            processed: 1,
            total: 5,
        });
        assert_eq!(progress.bar.length(), Some(5));
        progress.finish();
        assert!(progress.bar.is_finished());
    }

    #[test]
    fn activation_finishes_the_bar() {
        let progress = InstallProgressBar::with_target(ProgressDrawTarget::hidden());
        progress.handle(InstallProgress::Extracting {
            processed: 1,
            total: 1,
        });

        progress.handle(InstallProgress::Activating {
            version: "1.22.0".parse().expect("valid version in test"),
        });

        assert!(progress.bar.is_finished());
    }
}
