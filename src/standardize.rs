use crate::fit::{LogLogistic, SeasonalFit};
use crate::series::{Series, TimePoint};

/// Probabilities are kept within `[EPSILON, 1 - EPSILON]` before the probit.
pub const EPSILON: f64 = 1e-6;

/// Convert accumulated balances into index values.
///
/// Every point is standardized against the fit of its calendar month. Points
/// whose month has no fit, or whose value is missing, stay missing. The
/// output has exactly one point per input point.
pub fn standardize(series: &Series, fit: &SeasonalFit) -> Series {
    series
        .iter()
        .map(|point| {
            let index = point
                .value
                .zip(fit.dist(point.month()))
                .map(|(val, dist)| standardize_value(val, dist));
            TimePoint::new(point.date, index)
        })
        .collect()
}

/// Index value of `x` under `dist`: the probit of its clamped probability.
pub fn standardize_value(x: f64, dist: &LogLogistic) -> f64 {
    let prob = dist.cdf(x).clamp(EPSILON, 1.0 - EPSILON);
    probit(prob)
}

/// Inverse of the standard normal CDF, for `p` in `(0, 1)`.
///
/// Wichura's algorithm AS241 (PPND16), accurate to about 1e-16.
pub fn probit(p: f64) -> f64 {
    let q = p - 0.5;

    if q.abs() <= 0.425 {
        let r = 0.180625 - q * q;
        let num = (((((((2.509_080_928_730_122_7e3 * r + 3.343_057_558_358_813e4) * r
            + 6.726_577_092_700_87e4)
            * r
            + 4.592_195_393_154_987e4)
            * r
            + 1.373_169_376_550_946e4)
            * r
            + 1.971_590_950_306_551_3e3)
            * r
            + 1.331_416_678_917_843_7e2)
            * r
            + 3.387_132_872_796_366_5)
            * q;
        let den = ((((((5.226_495_278_852_854_5e3 * r + 2.872_908_573_572_194_3e4) * r
            + 3.930_789_580_009_271e4)
            * r
            + 2.121_379_430_158_659_7e4)
            * r
            + 5.394_196_021_424_751e3)
            * r
            + 6.871_870_074_920_579e2)
            * r
            + 4.231_333_070_160_091e1)
            * r
            + 1.0;
        return num / den;
    }

    let r = if q < 0.0 { p } else { 1.0 - p };
    let r = (-r.ln()).sqrt();

    let x = if r <= 5.0 {
        let r = r - 1.6;
        let num = ((((((7.745_450_142_783_414e-4 * r + 2.272_384_498_926_918_4e-2) * r
            + 2.417_807_251_774_506e-1)
            * r
            + 1.270_458_252_452_368_4)
            * r
            + 3.647_848_324_763_204_5)
            * r
            + 5.769_497_221_460_691)
            * r
            + 4.630_337_846_156_545)
            * r
            + 1.423_437_110_749_683_5;
        let den = ((((((1.050_750_071_644_416_8e-9 * r + 5.475_938_084_995_345e-4) * r
            + 1.519_866_656_361_645_7e-2)
            * r
            + 1.481_039_764_274_800_8e-1)
            * r
            + 6.897_673_349_851e-1)
            * r
            + 1.676_384_830_183_803_8)
            * r
            + 2.053_191_626_637_758_8)
            * r
            + 1.0;
        num / den
    } else {
        let r = r - 5.0;
        let num = ((((((2.010_334_399_292_288_1e-7 * r + 2.711_555_568_743_487_6e-5) * r
            + 1.242_660_947_388_078_4e-3)
            * r
            + 2.653_218_952_657_612_4e-2)
            * r
            + 2.965_605_718_285_048_7e-1)
            * r
            + 1.784_826_539_917_291_3)
            * r
            + 5.463_784_911_164_114)
            * r
            + 6.657_904_643_501_103;
        let den = ((((((2.044_263_103_389_939_7e-15 * r + 1.421_511_758_316_445_9e-7) * r
            + 1.846_318_317_510_054_8e-5)
            * r
            + 7.868_691_311_456_133e-4)
            * r
            + 1.487_536_129_085_061_5e-2)
            * r
            + 1.369_298_809_227_358e-1)
            * r
            + 5.998_322_065_558_879e-1)
            * r
            + 1.0;
        num / den
    };

    if q < 0.0 { -x } else { x }
}
