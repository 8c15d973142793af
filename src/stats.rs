//! Win-rate statistics over headless rounds

use std::fmt;

use serde::{Deserialize, Serialize};

/// Confidence level of the reported margin of error
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// z-score for a 95% two-sided interval
const Z_95: f64 = 1.96;

/// Result of one played round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub won: bool,
    /// Ticks the round lasted
    pub ticks: u64,
}

/// Aggregate over many rounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRateReport {
    pub games: usize,
    pub wins: usize,
    pub win_ratio: f64,
    pub confidence_level: f64,
    /// Worst-case (p = 0.5) half-width of the confidence interval
    pub margin_of_error: f64,
    pub mean_ticks: f64,
}

impl WinRateReport {
    pub fn from_rounds(rounds: &[RoundSummary]) -> Self {
        let games = rounds.len();
        let wins = rounds.iter().filter(|r| r.won).count();

        if games == 0 {
            return Self {
                games,
                wins,
                win_ratio: 0.0,
                confidence_level: CONFIDENCE_LEVEL,
                margin_of_error: 0.0,
                mean_ticks: 0.0,
            };
        }

        let n = games as f64;
        let total_ticks: u64 = rounds.iter().map(|r| r.ticks).sum();
        Self {
            games,
            wins,
            win_ratio: wins as f64 / n,
            confidence_level: CONFIDENCE_LEVEL,
            margin_of_error: Z_95 / (2.0 * n.sqrt()),
            mean_ticks: total_ticks as f64 / n,
        }
    }
}

impl fmt::Display for WinRateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Games played:     {}", self.games)?;
        writeln!(f, "Games won:        {}", self.wins)?;
        writeln!(f, "Win ratio:        {:.1}%", self.win_ratio * 100.0)?;
        writeln!(f, "Confidence level: {:.0}%", self.confidence_level * 100.0)?;
        writeln!(f, "Margin of error:  ±{:.1}%", self.margin_of_error * 100.0)?;
        write!(f, "Mean round ticks: {:.0}", self.mean_ticks)
    }
}
