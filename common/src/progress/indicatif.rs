use super::{Progress, ProgressBar};
use indicatif::{MultiProgress, ProgressStyle};

fn style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} {wide_bar} {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

impl Progress for MultiProgress {
    type Instance = IndicatifProgressBar;

    fn start(&self, work: usize) -> Self::Instance {
        let bar = indicatif::ProgressBar::new(work.try_into().unwrap_or(u64::MAX));
        bar.set_style(style());
        IndicatifProgressBar(self.add(bar))
    }

    fn println(&self, message: &str) {
        let _ = MultiProgress::println(self, message);
    }
}

pub struct IndicatifProgressBar(indicatif::ProgressBar);

impl ProgressBar for IndicatifProgressBar {
    async fn increment(&mut self, work: usize) {
        self.0.inc(work as u64);
    }

    async fn finish(self) {
        self.0.finish_and_clear();
    }

    async fn set_message(&mut self, msg: String) {
        self.0.set_message(msg);
    }
}
