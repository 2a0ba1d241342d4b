use std::time::Duration;

use crate::results::ResultRecord;

/// Running summary over recorded sessions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameMetrics {
    pub games_played: u32,
    pub high_score: u32,
    pub best_level: u32,
    pub total_time: Duration,
    total_score: u64,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[ResultRecord]) -> Self {
        let mut metrics = Self::new();
        for record in records {
            metrics.on_game_over(record);
        }
        metrics
    }

    pub fn on_game_over(&mut self, record: &ResultRecord) {
        self.games_played += 1;
        self.total_score += u64::from(record.score);
        // Records built in code skip the store's duration check
        let duration = Duration::try_from_secs_f64(record.duration_seconds).unwrap_or_default();
        self.total_time = self.total_time.saturating_add(duration);
        if record.score > self.high_score {
            self.high_score = record.score;
        }
        if record.level > self.best_level {
            self.best_level = record.level;
        }
    }

    pub fn mean_score(&self) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_score as f32 / self.games_played as f32
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Games: {} | Best: {} | Best level: {} | Avg: {:.1} | Time: {}",
            self.games_played,
            self.high_score,
            self.best_level,
            self.mean_score(),
            format_time(self.total_time),
        )
    }
}

/// `MM:SS`, minutes keep counting past the hour
pub fn format_time(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}", minutes, seconds)
}
