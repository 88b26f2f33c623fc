use tracing::debug;

use crate::core::PrimitiveValue;

/// Deployment status encoded in the rollout column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RolloutStatus {
    Rolled,
    RolledWithError,
    NotRolled,
}

impl RolloutStatus {
    pub const ALL: [Self; 3] = [Self::Rolled, Self::RolledWithError, Self::NotRolled];

    /// Status for a column cell; `None` for nulls and unknown codes.
    #[must_use]
    pub fn from_value(value: &PrimitiveValue) -> Option<Self> {
        let code = value.as_f64()?;
        match code.round() as i64 {
            0 => Some(Self::Rolled),
            1 => Some(Self::RolledWithError),
            2 => Some(Self::NotRolled),
            _ => None,
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Rolled => "#fa8e00",
            Self::RolledWithError => "#ff0000",
            Self::NotRolled => "#ffffff",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Rolled => "Rolled",
            Self::RolledWithError => "Rolled with error",
            Self::NotRolled => "Not rolled",
        }
    }
}

/// Band behind the plots; `x`/`length` in data units, `y`/`width` in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloutRectangle {
    pub x: f64,
    pub length: f64,
    pub y: f64,
    pub width: f64,
    pub status: RolloutStatus,
}

impl RolloutRectangle {
    #[must_use]
    pub fn color(&self) -> &'static str {
        self.status.color()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RolloutRectangles {
    pub name: String,
    pub rectangles: Vec<RolloutRectangle>,
    pub opacity: f64,
}

/// Turns runs of equal status into bands.
///
/// A run starts at its first x and ends where the next run starts; the last
/// run ends at its own last x. Cells without a known status end the current
/// run without producing a band. `y`/`height` place the bands vertically.
#[must_use]
pub fn build_rollout_rectangles(
    name: &str,
    x_values: &[f64],
    statuses: &[PrimitiveValue],
    y: f64,
    height: f64,
    opacity: f64,
) -> RolloutRectangles {
    let cells: Vec<(f64, Option<RolloutStatus>)> = x_values
        .iter()
        .zip(statuses)
        .map(|(&x, cell)| (x, RolloutStatus::from_value(cell)))
        .collect();

    let mut rectangles = Vec::new();
    let mut start = 0;
    while start < cells.len() {
        let (x_start, status) = cells[start];
        let mut end = start + 1;
        while end < cells.len() && cells[end].1 == status {
            end += 1;
        }
        let x_end = cells.get(end).map_or(cells[end - 1].0, |next| next.0);
        if let Some(status) = status {
            rectangles.push(RolloutRectangle {
                x: x_start,
                length: x_end - x_start,
                y,
                width: height,
                status,
            });
        }
        start = end;
    }

    debug!(bands = rectangles.len(), "built rollout rectangles");
    RolloutRectangles {
        name: name.to_owned(),
        rectangles,
        opacity,
    }
}

#[cfg(test)]
mod tests {
    use super::{RolloutStatus, build_rollout_rectangles};
    use crate::core::PrimitiveValue;

    #[test]
    fn contiguous_runs_become_bands() {
        let statuses: Vec<PrimitiveValue> = [0.0, 0.0, 1.0, 1.0, 2.0]
            .into_iter()
            .map(PrimitiveValue::from)
            .collect();
        let bands = build_rollout_rectangles(
            "rollout",
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &statuses,
            10.0,
            200.0,
            0.2,
        );
        let summary: Vec<_> = bands
            .rectangles
            .iter()
            .map(|r| (r.x, r.length, r.status))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1.0, 2.0, RolloutStatus::Rolled),
                (3.0, 2.0, RolloutStatus::RolledWithError),
                (5.0, 0.0, RolloutStatus::NotRolled),
            ]
        );
        assert!(bands.rectangles.iter().all(|r| r.y == 10.0 && r.width == 200.0));
    }

    #[test]
    fn unknown_statuses_split_runs() {
        let statuses = vec![
            PrimitiveValue::from(0.0),
            PrimitiveValue::Null,
            PrimitiveValue::from(0.0),
        ];
        let bands = build_rollout_rectangles("r", &[1.0, 2.0, 3.0], &statuses, 0.0, 1.0, 0.2);
        assert_eq!(bands.rectangles.len(), 2);
        assert_eq!(bands.rectangles[0].length, 1.0);
        assert_eq!(RolloutStatus::RolledWithError.color(), "#ff0000");
    }
}
