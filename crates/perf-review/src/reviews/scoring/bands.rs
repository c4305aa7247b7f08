use serde::{Deserialize, Serialize};

/// Fine-grained grading used on review detail and reporting views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeBand {
    Outstanding,
    Excellent,
    Good,
    Satisfactory,
    NeedsImprovement,
    Poor,
}

impl GradeBand {
    pub const fn label(self) -> &'static str {
        match self {
            GradeBand::Outstanding => "Outstanding",
            GradeBand::Excellent => "Excellent",
            GradeBand::Good => "Good",
            GradeBand::Satisfactory => "Satisfactory",
            GradeBand::NeedsImprovement => "Needs Improvement",
            GradeBand::Poor => "Poor",
        }
    }

    pub const fn letter(self) -> &'static str {
        match self {
            GradeBand::Outstanding => "A+",
            GradeBand::Excellent => "A",
            GradeBand::Good => "B+",
            GradeBand::Satisfactory => "B",
            GradeBand::NeedsImprovement => "C",
            GradeBand::Poor => "D",
        }
    }
}

/// Coarse banding used for status alerts. Cut points differ from [`GradeBand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl AlertBand {
    pub const fn label(self) -> &'static str {
        match self {
            AlertBand::Excellent => "excellent",
            AlertBand::Good => "good",
            AlertBand::Fair => "fair",
            AlertBand::Poor => "poor",
        }
    }
}

/// Lower edges are inclusive: 4.5 is outstanding, 4.49 is excellent.
pub fn grade_band(score: f64) -> GradeBand {
    if score >= 4.5 {
        GradeBand::Outstanding
    } else if score >= 4.0 {
        GradeBand::Excellent
    } else if score >= 3.5 {
        GradeBand::Good
    } else if score >= 3.0 {
        GradeBand::Satisfactory
    } else if score >= 2.5 {
        GradeBand::NeedsImprovement
    } else {
        GradeBand::Poor
    }
}

pub fn alert_band(score: f64) -> AlertBand {
    if score >= 4.5 {
        AlertBand::Excellent
    } else if score >= 3.5 {
        AlertBand::Good
    } else if score >= 2.5 {
        AlertBand::Fair
    } else {
        AlertBand::Poor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub label: &'static str,
    pub letter: &'static str,
    pub band: GradeBand,
}

pub fn grade_for(score: f64) -> Grade {
    let band = grade_band(score);
    Grade {
        label: band.label(),
        letter: band.letter(),
        band,
    }
}
