use chrono::NaiveDateTime;

use super::record::ResultRecord;

/// Score-over-time points for the chart
///
/// `x` is the record timestamp in seconds since the Unix epoch (taken as
/// UTC so the axis stays monotonic), `y` is the score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSeries {
    points: Vec<(f64, f64)>,
    first: Option<NaiveDateTime>,
    last: Option<NaiveDateTime>,
}

impl ScoreSeries {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let points = records
            .iter()
            .map(|r| (r.timestamp.and_utc().timestamp() as f64, r.score as f64))
            .collect();
        Self {
            points,
            first: records.iter().map(|r| r.timestamp).min(),
            last: records.iter().map(|r| r.timestamp).max(),
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.first
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.last
    }

    /// X range, widened by a minute on each side when all points share a time
    pub fn x_bounds(&self) -> [f64; 2] {
        let (min, max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| {
                (lo.min(x), hi.max(x))
            });
        if !min.is_finite() {
            return [0.0, 1.0];
        }
        if max - min < 1.0 {
            [min - 60.0, max + 60.0]
        } else {
            [min, max]
        }
    }

    /// Y range from zero to one above the best score
    pub fn y_bounds(&self) -> [f64; 2] {
        let max = self.points.iter().map(|&(_, y)| y).fold(0.0, f64::max);
        [0.0, max.max(1.0) + 1.0]
    }

    pub fn max_score(&self) -> u32 {
        self.points.iter().map(|&(_, y)| y as u32).max().unwrap_or(0)
    }
}
