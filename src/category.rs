use crate::series::Series;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Drought/humidity class of an index value.
///
/// Variants are declared from driest to wettest, so the derived ordering
/// follows the index scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    ExtremeDrought,
    SevereDrought,
    ModerateDrought,
    Normal,
    ModerateHumidity,
    SevereHumidity,
    ExtremeHumidity,
}

/// Exclusive lower bound of each class, highest first. Anything not above
/// the last bound is [`Category::ExtremeDrought`].
const THRESHOLDS: [(f64, Category); 6] = [
    (2.33, Category::ExtremeHumidity),
    (1.65, Category::SevereHumidity),
    (1.28, Category::ModerateHumidity),
    (-0.84, Category::Normal),
    (-1.28, Category::ModerateDrought),
    (-1.65, Category::SevereDrought),
];

impl Category {
    /// All classes from wettest to driest, the order they are stacked in.
    pub const ALL: [Category; 7] = [
        Category::ExtremeHumidity,
        Category::SevereHumidity,
        Category::ModerateHumidity,
        Category::Normal,
        Category::ModerateDrought,
        Category::SevereDrought,
        Category::ExtremeDrought,
    ];

    /// Class of a finite index value. A value exactly on a threshold belongs
    /// to the class below it.
    pub fn of(value: f64) -> Category {
        THRESHOLDS
            .iter()
            .find(|&&(bound, _)| value > bound)
            .map_or(Category::ExtremeDrought, |&(_, category)| category)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::ExtremeDrought => "extreme drought",
            Category::SevereDrought => "severe drought",
            Category::ModerateDrought => "moderate drought",
            Category::Normal => "normal",
            Category::ModerateHumidity => "moderate humidity",
            Category::SevereHumidity => "severe humidity",
            Category::ExtremeHumidity => "extreme humidity",
        }
    }

    /// Colour used when charting the class.
    pub fn color(&self) -> &'static str {
        match self {
            Category::ExtremeDrought => "#8B1A1A",
            Category::SevereDrought => "#DE2929",
            Category::ModerateDrought => "#F3641D",
            Category::Normal => "#22c55e",
            Category::ModerateHumidity => "#FDC404",
            Category::SevereHumidity => "#03F2FD",
            Category::ExtremeHumidity => "#1771DE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Class of an index value; missing and NaN values have none.
pub fn categorize(value: Option<f64>) -> Option<Category> {
    value.filter(|val| !val.is_nan()).map(Category::of)
}

/// Class of every point of an index series, in series order.
pub fn categorize_series(index: &Series) -> Vec<Option<Category>> {
    index.iter().map(|point| categorize(point.value)).collect()
}
