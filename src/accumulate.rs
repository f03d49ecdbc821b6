use crate::error::SpeiError;
use crate::series::{Series, TimePoint};

/// Trailing sum of `window` consecutive points.
///
/// Each output point carries the date of the last point of its window, so
/// the first `window - 1` inputs produce no output. A window containing a
/// missing value sums to missing. If `window` exceeds the series length the
/// result is empty.
pub fn accumulate(series: &Series, window: usize) -> Result<Series, SpeiError> {
    if window == 0 {
        return Err(SpeiError::InvalidWindow(window));
    }

    let accumulated: Series = series
        .points
        .windows(window)
        .map(|points| {
            let date = points[window - 1].date;
            let value = points.iter().map(|point| point.value).sum::<Option<f64>>();
            TimePoint::new(date, value)
        })
        .collect();

    log::debug!(
        "accumulated {} points over {window} months into {}",
        series.len(),
        accumulated.len()
    );

    Ok(accumulated)
}
